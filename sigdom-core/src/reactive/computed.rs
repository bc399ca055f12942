//! Computed Implementation
//!
//! A Computed is a cached derived value that re-evaluates only when its
//! dependencies change.
//!
//! # How Computed Values Work
//!
//! 1. On first read, the computed runs its derivation and caches the result.
//!
//! 2. When read again, if no dependency has changed, returns the cached value.
//!
//! 3. When a dependency changes, the computed is marked dirty and passes the
//!    invalidation on to whoever read it.
//!
//! 4. On next read, the derivation runs again with fresh dependency tracking.
//!
//! # Why This Matters
//!
//! - A signal changes
//! - 10 computed values depend on it
//! - Only the ones actually read will recompute
//! - Computed values that are never read stay dirty (no wasted work)

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::runtime::Runtime;
use crate::graph::{Node, NodeId};

struct ComputedInner<T> {
    id: NodeId,
    runtime: Runtime,
    derive: Box<dyn Fn() -> T>,
    /// `None` until the first evaluation.
    value: RefCell<Option<T>>,
}

impl<T> Drop for ComputedInner<T> {
    fn drop(&mut self) {
        self.runtime.dispose_node(self.id);
    }
}

/// A cached derived value that recomputes only when dependencies change.
///
/// Computed values are read-only; the derivation should be a pure function
/// of the signals and computed values it reads.
pub struct Computed<T: 'static> {
    inner: Rc<ComputedInner<T>>,
}

impl<T: 'static> Computed<T> {
    /// Create a new computed value in the current thread's runtime.
    ///
    /// The derivation is not run immediately. It runs on first read.
    pub fn new(derive: impl Fn() -> T + 'static) -> Self {
        Self::new_in(&Runtime::current(), derive)
    }

    pub(crate) fn new_in(runtime: &Runtime, derive: impl Fn() -> T + 'static) -> Self {
        Self {
            inner: Rc::new(ComputedInner {
                id: runtime.create_node(Node::derived()),
                runtime: runtime.clone(),
                derive: Box::new(derive),
                value: RefCell::new(None),
            }),
        }
    }

    /// Get the computed value's graph node.
    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    /// The runtime this computed value belongs to.
    pub fn runtime(&self) -> &Runtime {
        &self.inner.runtime
    }

    /// Whether the next read will run the derivation.
    pub fn is_dirty(&self) -> bool {
        self.inner.runtime.is_dirty(self.inner.id)
    }

    /// Whether the derivation has run at least once.
    pub fn has_value(&self) -> bool {
        self.inner.value.borrow().is_some()
    }

    /// Borrow the value, recomputing it first if needed, and track the read.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.refresh();
        self.inner.runtime.track(self.inner.id);
        self.read_cached(f)
    }

    /// Borrow the value, recomputing it first if needed, without tracking.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.refresh();
        self.read_cached(f)
    }

    /// Number of computations currently subscribed to this value.
    pub fn subscriber_count(&self) -> usize {
        self.inner.runtime.dependent_count(self.inner.id)
    }

    /// Number of nodes read during the last evaluation.
    pub fn dependency_count(&self) -> usize {
        self.inner.runtime.dependency_count(self.inner.id)
    }

    /// Whether two handles refer to the same computed value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn refresh(&self) {
        let inner = &self.inner;
        if let Some(value) = inner.runtime.run_tracked(inner.id, || (inner.derive)()) {
            *inner.value.borrow_mut() = Some(value);
        }
    }

    fn read_cached<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self.inner.value.borrow();
        f(value
            .as_ref()
            .expect("computed value has no value: its first evaluation did not complete"))
    }
}

impl<T: Clone + 'static> Computed<T> {
    /// Get the current value, recomputing if necessary.
    ///
    /// If called within a computation, this also registers the computation
    /// as a dependent.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Get the current value, recomputing if necessary, without tracking.
    pub fn get_untracked(&self) -> T {
        self.with_untracked(T::clone)
    }
}

impl<T: 'static> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Display + 'static> fmt::Display for Computed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|value| fmt::Display::fmt(value, f))
    }
}

impl<T: 'static> fmt::Debug for Computed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computed")
            .field("id", &self.inner.id)
            .field("dirty", &self.is_dirty())
            .field("has_value", &self.has_value())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
