//! Reactive Primitives
//!
//! This module implements the core reactive system: signals, computed
//! values, and effects. These primitives drive every live binding the
//! element binder creates.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state. When a signal's value is read
//! within a computation (a computed value or an effect), the signal
//! registers that computation as a dependent. When the signal's value
//! changes, all dependents are invalidated.
//!
//! ## Computed values
//!
//! A Computed is a derived value that caches its result. It re-evaluates
//! only when one of its dependencies changed and somebody reads it again.
//!
//! ## Effects
//!
//! An Effect is a side-effecting computation that re-runs as soon as one of
//! its dependencies changes. Effects are used to synchronize reactive state
//! with the outside world, such as the document.
//!
//! # Implementation Notes
//!
//! Every [`Runtime`] owns its own stack of computations in flight. When a
//! signal is read, the innermost tracking computation of the signal's
//! runtime becomes a dependent. Dependencies are dynamic: they are dropped
//! and re-collected on every evaluation.

mod computed;
mod context;
mod effect;
mod equality;
mod runtime;
mod signal;

pub use computed::Computed;
pub use effect::EffectHandle;
pub use equality::SameValue;
pub use runtime::Runtime;
pub use signal::Signal;

/// Create a signal in the current thread's runtime.
pub fn signal<T: SameValue + 'static>(value: T) -> Signal<T> {
    Runtime::current().signal(value)
}

/// Create a computed value in the current thread's runtime.
pub fn computed<T, F>(derive: F) -> Computed<T>
where
    T: 'static,
    F: Fn() -> T + 'static,
{
    Runtime::current().computed(derive)
}

/// Create an effect in the current thread's runtime and run it once.
pub fn effect<F>(run: F) -> EffectHandle
where
    F: Fn() + 'static,
{
    Runtime::current().effect(run)
}

/// Run `f` without tracking reads in the current thread's runtime.
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    Runtime::current().untrack(f)
}
