//! Ordered, parent-chained lists of transformers with a "next" protocol.
//!
//! A [`Pipeline`] holds middlewares of one level and an optional link to the
//! pipeline of the parent level. Resolution starts with the last middleware of
//! the pipeline, and each call to [`Next::run`] hands control to the previous
//! one. When a level is exhausted, resolution continues with the last
//! middleware of the parent level. A middleware which returns without calling
//! `next` short-circuits the rest of the chain.
//!
//! # Examples
//!
//! ```
//! # use pretty_assertions::assert_eq;
//! use std::sync::Arc;
//! use xml_model::middleware::{resolve, Middleware, Next, Pipeline};
//! use xml_model::Result;
//!
//! #[derive(Clone)]
//! struct Add(u32);
//!
//! impl Middleware for Add {
//!     type Context<'a> = u32;
//!     type Output = u32;
//!
//!     fn handle<'a>(&self, context: &u32, next: Next<'_, Self>) -> Result<u32> {
//!         match self.0 {
//!             0 => Ok(*context),
//!             n => Ok(next.run(context)? + n),
//!         }
//!     }
//! }
//!
//! let root = Arc::new(Pipeline::from_iter([Add(0), Add(10)]));
//! let parent = Arc::clone(&root);
//! let child = Arc::new(
//!     Pipeline::from_iter([Add(100)]).with_parent(move || Some(Arc::clone(&parent))),
//! );
//!
//! assert_eq!(resolve(&child, &1).unwrap(), 111);
//! ```

use crate::errors::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// A transformer of a context into an output which may delegate to the next
/// middleware of the chain.
pub trait Middleware: Clone {
    /// Input of the middleware
    type Context<'a>;
    /// Result of the middleware
    type Output;

    /// Handles the context. The middleware may call `next` at most once to
    /// obtain the result of the rest of the chain.
    fn handle<'a>(&self, context: &Self::Context<'a>, next: Next<'_, Self>)
        -> Result<Self::Output>;
}

type ParentFn<M> = Box<dyn Fn() -> Option<Arc<Pipeline<M>>> + Send + Sync>;

/// Middlewares of one level with a link to the parent level.
pub struct Pipeline<M> {
    middlewares: Vec<M>,
    /// Resolved on each traversal, so the parent level may be found lazily
    parent: Option<ParentFn<M>>,
}

impl<M> Pipeline<M> {
    /// Creates an empty pipeline without parent.
    pub const fn new() -> Self {
        Self {
            middlewares: Vec::new(),
            parent: None,
        }
    }

    /// Sets the function which resolves the parent pipeline.
    pub fn with_parent<F>(mut self, parent: F) -> Self
    where
        F: Fn() -> Option<Arc<Pipeline<M>>> + Send + Sync + 'static,
    {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Appends a middleware. It will run before all already added ones.
    pub fn push(&mut self, middleware: M) {
        self.middlewares.push(middleware);
    }

    /// Returns the count of middlewares of this level.
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Returns `true` if this level has no middlewares.
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Returns the parent pipeline, if any.
    pub fn parent(&self) -> Option<Arc<Pipeline<M>>> {
        self.parent.as_ref().and_then(|parent| parent())
    }
}

impl<M: Clone> Pipeline<M> {
    /// Iterates over the middlewares of this level in reverse order, then over
    /// the parent levels.
    pub fn chain(self: &Arc<Self>) -> MiddlewareChain<M> {
        MiddlewareChain {
            index: self.middlewares.len(),
            current: Some(Arc::clone(self)),
        }
    }
}

impl<M> Default for Pipeline<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> FromIterator<M> for Pipeline<M> {
    fn from_iter<I: IntoIterator<Item = M>>(iter: I) -> Self {
        Self {
            middlewares: iter.into_iter().collect(),
            parent: None,
        }
    }
}

impl<M> fmt::Debug for Pipeline<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("middlewares", &self.middlewares.len())
            .field("parent", &self.parent.is_some())
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Iterator over all middlewares reachable from a pipeline, closest to the
/// caller first.
pub struct MiddlewareChain<M> {
    current: Option<Arc<Pipeline<M>>>,
    /// Count of not yet yielded middlewares of the current level
    index: usize,
}

impl<M: Clone> Iterator for MiddlewareChain<M> {
    type Item = M;

    fn next(&mut self) -> Option<M> {
        loop {
            let pipeline = self.current.as_ref()?;
            if self.index > 0 {
                self.index -= 1;
                return Some(pipeline.middlewares[self.index].clone());
            }
            let parent = pipeline.parent();
            self.index = parent.as_ref().map_or(0, |parent| parent.len());
            self.current = parent;
        }
    }
}

/// Handle passed to a middleware to run the rest of the chain.
///
/// Running consumes the handle, so the rest of the chain runs at most once.
pub struct Next<'n, M> {
    chain: &'n mut MiddlewareChain<M>,
}

impl<'n, M: Middleware> Next<'n, M> {
    /// Runs the next middleware of the chain.
    ///
    /// Fails with [`Error::ExhaustedPipeline`] if no middleware is left.
    pub fn run(self, context: &M::Context<'_>) -> Result<M::Output> {
        match self.chain.next() {
            Some(middleware) => middleware.handle(context, Next { chain: self.chain }),
            None => Err(Error::ExhaustedPipeline),
        }
    }
}

/// Runs a pipeline on the context, starting from its last middleware.
pub fn resolve<M: Middleware>(
    pipeline: &Arc<Pipeline<M>>,
    context: &M::Context<'_>,
) -> Result<M::Output> {
    let mut chain = pipeline.chain();
    Next { chain: &mut chain }.run(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    /// Records its name and calls `next` if the flag is set
    #[derive(Clone)]
    struct Tag(&'static str, bool);

    impl Middleware for Tag {
        type Context<'a> = RefCell<Vec<&'static str>>;
        type Output = ();

        fn handle<'a>(&self, context: &Self::Context<'a>, next: Next<'_, Self>) -> Result<()> {
            context.borrow_mut().push(self.0);
            if self.1 {
                next.run(context)
            } else {
                Ok(())
            }
        }
    }

    fn chained(child: Vec<Tag>, parent: Vec<Tag>) -> Arc<Pipeline<Tag>> {
        let parent = Arc::new(Pipeline::from_iter(parent));
        Arc::new(Pipeline::from_iter(child).with_parent(move || Some(Arc::clone(&parent))))
    }

    #[test]
    fn order() {
        let pipeline = chained(
            vec![Tag("c1", true), Tag("c2", true)],
            vec![Tag("p1", false), Tag("p2", true)],
        );
        let trace = RefCell::new(Vec::new());

        resolve(&pipeline, &trace).unwrap();
        assert_eq!(trace.into_inner(), ["c2", "c1", "p2", "p1"]);
    }

    #[test]
    fn short_circuit() {
        let pipeline = chained(
            vec![Tag("c1", false), Tag("c2", true)],
            vec![Tag("p1", false)],
        );
        let trace = RefCell::new(Vec::new());

        resolve(&pipeline, &trace).unwrap();
        assert_eq!(trace.into_inner(), ["c2", "c1"]);
    }

    #[test]
    fn exhausted() {
        let pipeline = chained(vec![Tag("c1", true)], vec![Tag("p1", true)]);
        let trace = RefCell::new(Vec::new());

        let error = resolve(&pipeline, &trace).unwrap_err();
        assert!(matches!(error, Error::ExhaustedPipeline));
        assert_eq!(trace.into_inner(), ["c1", "p1"]);
    }

    #[test]
    fn empty_levels_are_skipped() {
        let root = Arc::new(Pipeline::from_iter([Tag("root", false)]));
        let middle = Arc::new(Pipeline::new().with_parent(move || Some(Arc::clone(&root))));
        let leaf = Arc::new(Pipeline::new().with_parent(move || Some(Arc::clone(&middle))));
        let trace = RefCell::new(Vec::new());

        resolve(&leaf, &trace).unwrap();
        assert_eq!(trace.into_inner(), ["root"]);
        assert_eq!(leaf.chain().count(), 1);
    }

    #[test]
    fn empty() {
        let pipeline = Arc::new(Pipeline::<Tag>::new());
        let trace = RefCell::new(Vec::new());

        let error = resolve(&pipeline, &trace).unwrap_err();
        assert!(matches!(error, Error::ExhaustedPipeline));
    }
}
