//! Effect Implementation
//!
//! An Effect is a side-effecting computation that runs whenever its
//! dependencies change.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs its function immediately to establish
//!    initial dependencies.
//!
//! 2. When any dependency changes, the effect re-runs before the write that
//!    changed it returns.
//!
//! 3. Before re-running, the effect clears its old dependencies and tracks
//!    new ones during execution, so a branch that stops reading a signal
//!    stops reacting to it.
//!
//! # Differences from Computed
//!
//! - Computed values return a value; effects do not.
//! - Computed values are lazy (compute on read); effects are eager.
//!
//! # Lifetime
//!
//! An effect lives as long as something can still trigger it. Dropping the
//! [`EffectHandle`] does not stop it; [`EffectHandle::dispose`] does.

use std::fmt;

use super::runtime::Runtime;
use crate::graph::NodeId;

/// Handle to a running effect.
///
/// The handle is optional bookkeeping: dropping it leaves the effect
/// subscribed.
pub struct EffectHandle {
    runtime: Runtime,
    id: NodeId,
}

impl EffectHandle {
    pub(crate) fn new(runtime: Runtime, id: NodeId) -> Self {
        Self { runtime, id }
    }

    /// Get the effect's graph node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Whether the effect is still subscribed to anything.
    pub fn is_active(&self) -> bool {
        self.runtime.contains(self.id)
    }

    /// Number of nodes read during the last run.
    pub fn dependency_count(&self) -> usize {
        self.runtime.dependency_count(self.id)
    }

    /// Unsubscribe the effect and drop its closure.
    ///
    /// After disposal, the effect will not run again.
    pub fn dispose(self) {
        self.runtime.dispose_node(self.id);
    }
}

impl fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectHandle")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .field("dependency_count", &self.dependency_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn effect_runs_on_creation() {
        let run_count = Rc::new(Cell::new(0));
        let count = Rc::clone(&run_count);

        let _effect = Runtime::new().effect(move || {
            count.set(count.get() + 1);
        });

        // Effect should have run once on creation
        assert_eq!(run_count.get(), 1);
    }

    #[test]
    fn effect_does_not_run_after_disposal() {
        let runtime = Runtime::new();
        let signal = runtime.signal(0);
        let run_count = Rc::new(Cell::new(0));

        let (s, count) = (signal.clone(), Rc::clone(&run_count));
        let effect = runtime.effect(move || {
            s.get();
            count.set(count.get() + 1);
        });
        assert!(effect.is_active());
        assert_eq!(effect.dependency_count(), 1);

        effect.dispose();
        assert_eq!(signal.subscriber_count(), 0);

        signal.set(1);
        assert_eq!(run_count.get(), 1);
    }

    #[test]
    fn dropping_the_handle_keeps_the_effect() {
        let runtime = Runtime::new();
        let signal = runtime.signal(0);
        let run_count = Rc::new(Cell::new(0));

        let (s, count) = (signal.clone(), Rc::clone(&run_count));
        drop(runtime.effect(move || {
            s.get();
            count.set(count.get() + 1);
        }));

        signal.set(1);
        assert_eq!(run_count.get(), 2);
    }

    #[test]
    fn effect_writing_a_signal_cascades_synchronously() {
        let runtime = Runtime::new();
        let input = runtime.signal(1);
        let mirror = runtime.signal(0);
        let seen = Rc::new(Cell::new(0));

        let (i, m) = (input.clone(), mirror.clone());
        runtime.effect(move || m.set(i.get() * 10));
        let (m, s) = (mirror.clone(), Rc::clone(&seen));
        runtime.effect(move || s.set(m.get()));
        assert_eq!(seen.get(), 10);

        input.set(4);
        assert_eq!(seen.get(), 40);
    }
}
