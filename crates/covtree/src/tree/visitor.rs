//! Tree Visitors
//!
//! A visitor receives five callbacks during a traversal. Every callback has a
//! no-op default, so report generators implement only what they render.
//! State that lives for one traversal is passed as `&mut S` to every call.

use std::fmt;

use crate::result::TreeResult;

/// Callbacks invoked while walking a tree of `N` nodes with state `S`
pub trait Visitor<N, S = ()> {
    /// Once, before anything else, with the root
    fn on_start(&mut self, _root: &N, _state: &mut S) -> TreeResult<()> {
        Ok(())
    }

    /// Summary node, before its children
    fn on_summary(&mut self, _node: &N, _state: &mut S) -> TreeResult<()> {
        Ok(())
    }

    /// Detail (file) node
    fn on_detail(&mut self, _node: &N, _state: &mut S) -> TreeResult<()> {
        Ok(())
    }

    /// Summary node, after all of its descendants
    fn on_summary_end(&mut self, _node: &N, _state: &mut S) -> TreeResult<()> {
        Ok(())
    }

    /// Once, after everything else, with the root
    fn on_end(&mut self, _root: &N, _state: &mut S) -> TreeResult<()> {
        Ok(())
    }
}

impl<N, S, V: Visitor<N, S> + ?Sized> Visitor<N, S> for &mut V {
    fn on_start(&mut self, root: &N, state: &mut S) -> TreeResult<()> {
        (**self).on_start(root, state)
    }

    fn on_summary(&mut self, node: &N, state: &mut S) -> TreeResult<()> {
        (**self).on_summary(node, state)
    }

    fn on_detail(&mut self, node: &N, state: &mut S) -> TreeResult<()> {
        (**self).on_detail(node, state)
    }

    fn on_summary_end(&mut self, node: &N, state: &mut S) -> TreeResult<()> {
        (**self).on_summary_end(node, state)
    }

    fn on_end(&mut self, root: &N, state: &mut S) -> TreeResult<()> {
        (**self).on_end(root, state)
    }
}

impl<N, S, V: Visitor<N, S> + ?Sized> Visitor<N, S> for Box<V> {
    fn on_start(&mut self, root: &N, state: &mut S) -> TreeResult<()> {
        (**self).on_start(root, state)
    }

    fn on_summary(&mut self, node: &N, state: &mut S) -> TreeResult<()> {
        (**self).on_summary(node, state)
    }

    fn on_detail(&mut self, node: &N, state: &mut S) -> TreeResult<()> {
        (**self).on_detail(node, state)
    }

    fn on_summary_end(&mut self, node: &N, state: &mut S) -> TreeResult<()> {
        (**self).on_summary_end(node, state)
    }

    fn on_end(&mut self, root: &N, state: &mut S) -> TreeResult<()> {
        (**self).on_end(root, state)
    }
}

type Callback<'f, N, S> = Box<dyn FnMut(&N, &mut S) -> TreeResult<()> + 'f>;

/// Visitor assembled from optional closures, one per callback slot
///
/// Slots left empty do nothing.
///
/// ```
/// use covtree::{flat, CallbackVisitor, CoverageMap, FileCoverage, Node};
///
/// let map = CoverageMap::new().with_file(FileCoverage::new("a.js")).unwrap();
/// let tree = flat(&map).unwrap();
///
/// let mut names = Vec::new();
/// let mut visitor = CallbackVisitor::<Node<'_>, Vec<String>>::new().with_detail(|node, names| {
///     names.push(node.qualified_name().to_string());
///     Ok(())
/// });
/// tree.visit(&mut visitor, &mut names).unwrap();
/// assert_eq!(names, ["a.js"]);
/// ```
pub struct CallbackVisitor<'f, N, S = ()> {
    start: Option<Callback<'f, N, S>>,
    summary: Option<Callback<'f, N, S>>,
    detail: Option<Callback<'f, N, S>>,
    summary_end: Option<Callback<'f, N, S>>,
    end: Option<Callback<'f, N, S>>,
}

impl<'f, N, S> CallbackVisitor<'f, N, S> {
    /// A visitor with every slot empty
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: None,
            summary: None,
            detail: None,
            summary_end: None,
            end: None,
        }
    }

    /// Set the `on_start` callback
    #[must_use]
    pub fn with_start(mut self, f: impl FnMut(&N, &mut S) -> TreeResult<()> + 'f) -> Self {
        self.start = Some(Box::new(f));
        self
    }

    /// Set the `on_summary` callback
    #[must_use]
    pub fn with_summary(mut self, f: impl FnMut(&N, &mut S) -> TreeResult<()> + 'f) -> Self {
        self.summary = Some(Box::new(f));
        self
    }

    /// Set the `on_detail` callback
    #[must_use]
    pub fn with_detail(mut self, f: impl FnMut(&N, &mut S) -> TreeResult<()> + 'f) -> Self {
        self.detail = Some(Box::new(f));
        self
    }

    /// Set the `on_summary_end` callback
    #[must_use]
    pub fn with_summary_end(
        mut self,
        f: impl FnMut(&N, &mut S) -> TreeResult<()> + 'f,
    ) -> Self {
        self.summary_end = Some(Box::new(f));
        self
    }

    /// Set the `on_end` callback
    #[must_use]
    pub fn with_end(mut self, f: impl FnMut(&N, &mut S) -> TreeResult<()> + 'f) -> Self {
        self.end = Some(Box::new(f));
        self
    }
}

impl<N, S> Default for CallbackVisitor<'_, N, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, S> fmt::Debug for CallbackVisitor<'_, N, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackVisitor")
            .field("on_start", &self.start.is_some())
            .field("on_summary", &self.summary.is_some())
            .field("on_detail", &self.detail.is_some())
            .field("on_summary_end", &self.summary_end.is_some())
            .field("on_end", &self.end.is_some())
            .finish()
    }
}

fn call<N, S>(slot: &mut Option<Callback<'_, N, S>>, node: &N, state: &mut S) -> TreeResult<()> {
    match slot {
        Some(f) => f(node, state),
        None => Ok(()),
    }
}

impl<N, S> Visitor<N, S> for CallbackVisitor<'_, N, S> {
    fn on_start(&mut self, root: &N, state: &mut S) -> TreeResult<()> {
        call(&mut self.start, root, state)
    }

    fn on_summary(&mut self, node: &N, state: &mut S) -> TreeResult<()> {
        call(&mut self.summary, node, state)
    }

    fn on_detail(&mut self, node: &N, state: &mut S) -> TreeResult<()> {
        call(&mut self.detail, node, state)
    }

    fn on_summary_end(&mut self, node: &N, state: &mut S) -> TreeResult<()> {
        call(&mut self.summary_end, node, state)
    }

    fn on_end(&mut self, root: &N, state: &mut S) -> TreeResult<()> {
        call(&mut self.end, root, state)
    }
}

/// Fans one traversal out to several visitors
///
/// Each callback runs on every member in registration order with the same
/// node and state. A member error stops the fan-out for that callback and
/// aborts the traversal.
pub struct CompositeVisitor<'v, N, S = ()> {
    visitors: Vec<Box<dyn Visitor<N, S> + 'v>>,
}

impl<'v, N, S> CompositeVisitor<'v, N, S> {
    /// Compose boxed visitors, keeping their order
    pub fn new(visitors: impl IntoIterator<Item = Box<dyn Visitor<N, S> + 'v>>) -> Self {
        Self {
            visitors: visitors.into_iter().collect(),
        }
    }

    /// A composite holding a single visitor
    pub fn single(visitor: impl Visitor<N, S> + 'v) -> Self {
        Self {
            visitors: vec![Box::new(visitor)],
        }
    }

    /// Register another visitor after the existing ones
    pub fn push(&mut self, visitor: impl Visitor<N, S> + 'v) {
        self.visitors.push(Box::new(visitor));
    }

    /// Register another visitor, returning the composite
    #[must_use]
    pub fn with(mut self, visitor: impl Visitor<N, S> + 'v) -> Self {
        self.push(visitor);
        self
    }

    /// Number of member visitors
    #[must_use]
    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    /// True when no visitors are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }
}

impl<N, S> Default for CompositeVisitor<'_, N, S> {
    fn default() -> Self {
        Self {
            visitors: Vec::new(),
        }
    }
}

impl<N, S> fmt::Debug for CompositeVisitor<'_, N, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeVisitor")
            .field("visitors", &self.visitors.len())
            .finish()
    }
}

impl<N, S> Visitor<N, S> for CompositeVisitor<'_, N, S> {
    fn on_start(&mut self, root: &N, state: &mut S) -> TreeResult<()> {
        self.visitors
            .iter_mut()
            .try_for_each(|v| v.on_start(root, state))
    }

    fn on_summary(&mut self, node: &N, state: &mut S) -> TreeResult<()> {
        self.visitors
            .iter_mut()
            .try_for_each(|v| v.on_summary(node, state))
    }

    fn on_detail(&mut self, node: &N, state: &mut S) -> TreeResult<()> {
        self.visitors
            .iter_mut()
            .try_for_each(|v| v.on_detail(node, state))
    }

    fn on_summary_end(&mut self, node: &N, state: &mut S) -> TreeResult<()> {
        self.visitors
            .iter_mut()
            .try_for_each(|v| v.on_summary_end(node, state))
    }

    fn on_end(&mut self, root: &N, state: &mut S) -> TreeResult<()> {
        self.visitors
            .iter_mut()
            .try_for_each(|v| v.on_end(root, state))
    }
}
