//! Reactive Runtime
//!
//! The runtime is the central coordinator that connects signals, computed
//! values, and effects. It owns the dependency graph and the computing
//! stack, and propagates invalidations when signals change.
//!
//! # How It Works
//!
//! 1. When a signal or computed value is created, it gets a node in the
//!    runtime's arena.
//!
//! 2. When a computation reads a node, the runtime records an edge from
//!    that node to the innermost computation on the stack.
//!
//! 3. When a signal's value changes, the runtime:
//!    a. Snapshots and clears the signal's dependents
//!    b. Marks them dirty; computed dependents forward the invalidation
//!       to their own dependents
//!    c. Re-runs every effect reached this way, in subscription order
//!    d. Computed values are lazy - they recompute on next read
//!
//! Everything happens synchronously inside the `set` call. A write made by
//! an effect starts a nested propagation right away; nothing is batched.
//!
//! # Threading
//!
//! Handles are `Rc`-based and stay on the thread that created them. Each
//! thread has a default runtime, and independent runtimes can be created
//! with [`Runtime::new`]. Reads are only tracked by computations of the
//! same runtime.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::computed::Computed;
use super::context::{ContextStack, ReactiveContext};
use super::effect::EffectHandle;
use super::equality::SameValue;
use super::signal::Signal;
use crate::graph::{Graph, Node, NodeId, NodeKind, Runner};

struct RuntimeInner {
    graph: RefCell<Graph>,
    stack: ContextStack,
}

/// One signal graph: an arena of nodes plus the stack of computations in
/// flight.
///
/// Cloning a `Runtime` yields another handle to the same graph.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

thread_local! {
    static CURRENT: Runtime = Runtime::new();
}

impl Runtime {
    /// Create a new, independent runtime.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RuntimeInner {
                graph: RefCell::new(Graph::new()),
                stack: ContextStack::default(),
            }),
        }
    }

    /// The default runtime of the calling thread.
    pub fn current() -> Self {
        CURRENT.with(Runtime::clone)
    }

    /// Create a signal owned by this runtime.
    pub fn signal<T: SameValue + 'static>(&self, value: T) -> Signal<T> {
        Signal::new_in(self, value)
    }

    /// Create a computed value owned by this runtime.
    ///
    /// The derivation does not run until the value is first read.
    pub fn computed<T, F>(&self, derive: F) -> Computed<T>
    where
        T: 'static,
        F: Fn() -> T + 'static,
    {
        Computed::new_in(self, derive)
    }

    /// Create an effect and run it once, immediately.
    pub fn effect<F>(&self, run: F) -> EffectHandle
    where
        F: Fn() + 'static,
    {
        let runner: Runner = Rc::new(run);
        let id = self.inner.graph.borrow_mut().insert(Node::effect(runner));
        trace!(node = %id, "created effect");
        self.run_effect(id);
        EffectHandle::new(self.clone(), id)
    }

    /// Run `f` without registering any dependency edges.
    pub fn untrack<R>(&self, f: impl FnOnce() -> R) -> R {
        let _ctx = ReactiveContext::untracked(&self.inner.stack);
        f()
    }

    /// Whether a computation of this runtime is currently tracking reads.
    pub fn is_tracking(&self) -> bool {
        self.inner.stack.current().is_some()
    }

    /// Number of live nodes (signals, computed values, effects).
    pub fn node_count(&self) -> usize {
        self.inner.graph.borrow().len()
    }

    /// Number of dependents currently subscribed to `node`.
    pub fn dependent_count(&self, node: NodeId) -> usize {
        self.inner
            .graph
            .borrow()
            .get(node)
            .map_or(0, |n| n.dependents().len())
    }

    /// Number of nodes `node` read during its last evaluation.
    pub fn dependency_count(&self, node: NodeId) -> usize {
        self.inner
            .graph
            .borrow()
            .get(node)
            .map_or(0, |n| n.dependencies().len())
    }

    /// Whether `node` exists in this runtime.
    pub fn contains(&self, node: NodeId) -> bool {
        self.inner.graph.borrow().get(node).is_some()
    }

    pub(crate) fn create_node(&self, node: Node) -> NodeId {
        self.inner.graph.borrow_mut().insert(node)
    }

    /// Free a node and every edge touching it.
    pub(crate) fn dispose_node(&self, id: NodeId) {
        // A handle dropped while the graph is borrowed (during teardown of
        // another node) leaves its slot behind instead of panicking.
        let Ok(mut graph) = self.inner.graph.try_borrow_mut() else {
            trace!(node = %id, "graph busy, node not reclaimed");
            return;
        };
        let removed = graph.remove(id);
        drop(graph);
        // The node may own an effect closure holding other handles.
        drop(removed);
    }

    pub(crate) fn is_dirty(&self, id: NodeId) -> bool {
        self.inner
            .graph
            .borrow()
            .get(id)
            .is_some_and(Node::is_dirty)
    }

    /// Register an edge from `source` to the innermost tracking computation.
    pub(crate) fn track(&self, source: NodeId) {
        let Some(current) = self.inner.stack.current() else {
            return;
        };
        // A computation reading itself would invalidate itself forever.
        if current == source {
            return;
        }
        self.inner.graph.borrow_mut().add_edge(source, current);
    }

    /// Propagate a change of `source` to its dependents.
    pub(crate) fn notify(&self, source: NodeId) {
        let effects = {
            let mut graph = self.inner.graph.borrow_mut();
            let mut queue: VecDeque<NodeId> = graph.take_dependents(source).into_iter().collect();
            debug!(node = %source, fan_out = queue.len(), "signal changed");

            let mut effects: SmallVec<[NodeId; 8]> = SmallVec::new();
            while let Some(id) = queue.pop_front() {
                let Some(node) = graph.get_mut(id) else {
                    continue;
                };
                node.mark_dirty();
                match node.kind() {
                    NodeKind::Effect => {
                        if !effects.contains(&id) {
                            effects.push(id);
                        }
                    }
                    NodeKind::Derived => queue.extend(graph.take_dependents(id)),
                    NodeKind::Source => {}
                }
            }
            effects
        };

        for id in effects {
            self.run_effect(id);
        }
    }

    /// Run `compute` as the evaluation of `id` if, and only if, `id` is
    /// dirty. Returns `None` when the node was already up to date.
    ///
    /// The dirty flag is cleared before `compute` runs, so a computation
    /// reading its own node does not loop, and a panicking computation is
    /// not retried until the next invalidating write.
    pub(crate) fn run_tracked<R>(&self, id: NodeId, compute: impl FnOnce() -> R) -> Option<R> {
        {
            let mut graph = self.inner.graph.borrow_mut();
            let node = graph.get_mut(id)?;
            if !node.is_dirty() {
                return None;
            }
            node.mark_clean();
            graph.clear_dependencies(id);
        }

        let _ctx = ReactiveContext::enter(&self.inner.stack, id);
        trace!(node = %id, depth = self.inner.stack.depth(), "recomputing");
        Some(compute())
    }

    /// Re-run an effect if it is dirty.
    fn run_effect(&self, id: NodeId) {
        let runner = {
            let graph = self.inner.graph.borrow();
            match graph.get(id).and_then(Node::runner) {
                Some(runner) => Rc::clone(runner),
                None => return,
            }
        };
        if self.run_tracked(id, || runner()).is_none() {
            return;
        }

        // An effect that read nothing can never run again.
        let inert = self
            .inner
            .graph
            .borrow()
            .get(id)
            .is_some_and(|node| node.dependencies().is_empty() && !node.is_dirty());
        if inert {
            trace!(node = %id, "effect has no dependencies, releasing");
            self.dispose_node(id);
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Runtime {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Runtime {}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("nodes", &self.node_count())
            .field("depth", &self.inner.stack.depth())
            .finish()
    }
}
