//! Reactive Context
//!
//! The reactive context tracks which computation is currently running.
//! This enables automatic dependency tracking: when a signal is read,
//! we can register the current computation as a dependent.
//!
//! # Implementation
//!
//! Each runtime owns a stack of context entries. Entering a computation
//! pushes its node, and the returned guard pops it when dropped, including
//! while unwinding from a panicking derivation. Restoring the previous top
//! (rather than clearing it) is what lets a computed value evaluated inside
//! another computation attribute its reads to the innermost consumer.
//!
//! An entry of `None` marks an untracked region: reads inside it register
//! no edges even when an outer computation is running.

use std::cell::RefCell;

use crate::graph::NodeId;

/// The computing stack owned by one runtime.
#[derive(Debug, Default)]
pub(crate) struct ContextStack {
    entries: RefCell<Vec<Option<NodeId>>>,
}

impl ContextStack {
    /// The innermost tracking computation, if reads are being tracked.
    pub fn current(&self) -> Option<NodeId> {
        self.entries.borrow().last().copied().flatten()
    }

    pub fn depth(&self) -> usize {
        self.entries.borrow().len()
    }
}

/// Guard that pops the context when dropped.
pub(crate) struct ReactiveContext<'a> {
    stack: &'a ContextStack,
    entry: Option<NodeId>,
}

impl<'a> ReactiveContext<'a> {
    /// Enter a tracking context for `node`.
    pub fn enter(stack: &'a ContextStack, node: NodeId) -> Self {
        Self::push(stack, Some(node))
    }

    /// Enter a region where reads are not tracked.
    pub fn untracked(stack: &'a ContextStack) -> Self {
        Self::push(stack, None)
    }

    fn push(stack: &'a ContextStack, entry: Option<NodeId>) -> Self {
        stack.entries.borrow_mut().push(entry);
        Self { stack, entry }
    }
}

impl Drop for ReactiveContext<'_> {
    fn drop(&mut self) {
        let popped = self.stack.entries.borrow_mut().pop();

        // Verify we're popping the right context.
        debug_assert_eq!(
            popped,
            Some(self.entry),
            "ReactiveContext mismatch: expected {:?}, got {:?}",
            self.entry,
            popped
        );
    }
}
