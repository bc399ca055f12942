//! Signal Implementation
//!
//! A Signal is the fundamental reactive primitive. It holds a value and
//! tracks which computations depend on it.
//!
//! # How Signals Work
//!
//! 1. When a signal is read within a computation (computed/effect), the
//!    signal registers that computation as a dependent.
//!
//! 2. When a signal's value changes, every dependent is invalidated and the
//!    dependent set is cleared. Dependents subscribe again when they re-run.
//!
//! 3. Writing a value that is the same as the current one (see
//!    [`SameValue`]) notifies nobody.
//!
//! # Memory Layout
//!
//! The value and the graph bookkeeping are separate: the handle owns the
//! value, the runtime's arena owns the node holding the edges. Dropping the
//! last clone of a handle frees its node.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::equality::SameValue;
use super::runtime::Runtime;
use crate::graph::{Node, NodeId};

struct SignalInner<T> {
    id: NodeId,
    runtime: Runtime,
    value: RefCell<T>,
}

impl<T> Drop for SignalInner<T> {
    fn drop(&mut self) {
        self.runtime.dispose_node(self.id);
    }
}

/// A reactive signal holding a value of type T.
///
/// # Example
///
/// ```rust
/// use sigdom_core::reactive::signal;
///
/// let count = signal(0);
///
/// // Read the value
/// assert_eq!(count.get(), 0);
///
/// // Update the value (notifies dependents)
/// count.set(5);
/// assert_eq!(count.get(), 5);
/// ```
pub struct Signal<T: 'static> {
    inner: Rc<SignalInner<T>>,
}

impl<T: 'static> Signal<T> {
    /// Create a new signal in the current thread's runtime.
    pub fn new(value: T) -> Self {
        Self::new_in(&Runtime::current(), value)
    }

    pub(crate) fn new_in(runtime: &Runtime, value: T) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                id: runtime.create_node(Node::source()),
                runtime: runtime.clone(),
                value: RefCell::new(value),
            }),
        }
    }

    /// Get the signal's graph node.
    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    /// The runtime this signal belongs to.
    pub fn runtime(&self) -> &Runtime {
        &self.inner.runtime
    }

    /// Borrow the current value, tracking the read.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.runtime.track(self.inner.id);
        self.with_untracked(f)
    }

    /// Borrow the current value without registering a dependency.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Number of computations currently subscribed to this signal.
    pub fn subscriber_count(&self) -> usize {
        self.inner.runtime.dependent_count(self.inner.id)
    }

    /// Whether two handles refer to the same signal.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + 'static> Signal<T> {
    /// Get the current value.
    ///
    /// If called within a computation, this also registers the computation
    /// as a dependent.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Get the current value without tracking dependencies.
    pub fn get_untracked(&self) -> T {
        self.with_untracked(T::clone)
    }
}

impl<T: SameValue + 'static> Signal<T> {
    /// Set a new value and notify dependents.
    ///
    /// Returns once every dependent effect has re-run.
    pub fn set(&self, value: T) {
        {
            let mut current = self.inner.value.borrow_mut();
            if current.same_value(&value) {
                return;
            }
            *current = value;
        }
        self.inner.runtime.notify(self.inner.id);
    }

    /// Update the value using a function of the current value.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = self.with_untracked(f);
        self.set(next);
    }
}

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Signals stored in signals compare by identity.
impl<T: 'static> SameValue for Signal<T> {
    fn same_value(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// Formats the current value. The read is tracked.
impl<T: fmt::Display + 'static> fmt::Display for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|value| fmt::Display::fmt(value, f))
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.borrow())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
