//! Scoped output destinations handed out by the reporting context.

use console::{Style, Term};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::result::TreeResult;
use crate::watermarks::Status;

enum Sink {
    File(BufWriter<File>),
    Console(Term),
}

/// Writer for report content, flushed when dropped
///
/// File writers never emit color codes. Console writers color only when
/// stdout is a terminal.
pub struct ContentWriter {
    sink: Sink,
    path: Option<PathBuf>,
    color: bool,
}

impl ContentWriter {
    /// Create (or truncate) `path`, creating missing parent directories
    pub(crate) fn file(path: PathBuf) -> TreeResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;
        Ok(Self {
            sink: Sink::File(BufWriter::new(file)),
            path: Some(path),
            color: false,
        })
    }

    /// Writer on stdout
    pub(crate) fn console() -> Self {
        let term = Term::stdout();
        let color = term.is_term();
        Self {
            sink: Sink::Console(term),
            path: None,
            color,
        }
    }

    /// Target file, `None` for the console
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether `colorize` emits ANSI codes
    #[must_use]
    pub const fn is_colored(&self) -> bool {
        self.color
    }

    /// Write text as is
    pub fn write_str(&mut self, text: &str) -> TreeResult<()> {
        self.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Write text followed by a newline
    pub fn println(&mut self, text: &str) -> TreeResult<()> {
        self.write_str(text)?;
        self.write_str("\n")
    }

    /// Wrap `text` in the color for `status` when this writer colors
    #[must_use]
    pub fn colorize(&self, text: &str, status: Status) -> String {
        if !self.color {
            return text.to_string();
        }
        let style = match status {
            Status::Low => Style::new().red(),
            Status::Medium => Style::new().yellow(),
            Status::High => Style::new().green(),
        };
        style.force_styling(true).apply_to(text).to_string()
    }

    /// Flush and release the destination
    pub fn close(mut self) -> TreeResult<()> {
        self.flush()?;
        Ok(())
    }
}

impl Write for ContentWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.sink {
            Sink::File(file) => file.write(buf),
            Sink::Console(term) => term.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.sink {
            Sink::File(file) => file.flush(),
            Sink::Console(term) => term.flush(),
        }
    }
}

impl Drop for ContentWriter {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            tracing::warn!(path = ?self.path, error = %err, "failed to flush report writer");
        }
    }
}

impl std::fmt::Debug for ContentWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.sink {
            Sink::File(_) => "file",
            Sink::Console(_) => "console",
        };
        f.debug_struct("ContentWriter")
            .field("kind", &kind)
            .field("path", &self.path)
            .field("color", &self.color)
            .finish()
    }
}
