//! Node Arena
//!
//! All nodes of one runtime live in a single `Vec` of slots. Edges are
//! stored as `NodeId`s on both ends: a node's dependents (who to invalidate
//! on write) and a computation's dependencies (which dependents sets to
//! leave when it re-tracks).
//!
//! # Edge discipline
//!
//! Edges are cleared and rebuilt on every recomputation:
//!
//! 1. Before a computation runs, it leaves the dependents set of every node
//!    it read last time (`clear_dependencies`).
//! 2. While it runs, each read adds an edge (`add_edge`).
//! 3. A write snapshots and clears the written node's dependents
//!    (`take_dependents`); those dependents subscribe again when they
//!    re-run.

use indexmap::IndexSet;
use tracing::trace;

use super::node::{Node, NodeId};

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// The arena of graph nodes for one runtime.
#[derive(Default)]
pub struct Graph {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph.
    pub fn insert(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId::new(index, slot.generation)
            }
            None => {
                let index = u32::try_from(self.slots.len())
                    .expect("reactive graph exceeded u32::MAX nodes");
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId::new(index, 0)
            }
        }
    }

    /// Remove a node from the graph.
    ///
    /// Also removes all edges involving this node. The removed node is
    /// returned so the caller can drop it (and any closure it owns) after
    /// releasing its borrow of the graph.
    pub fn remove(&mut self, node_id: NodeId) -> Option<Node> {
        self.get(node_id)?;
        let slot = &mut self.slots[node_id.index() as usize];
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(node_id.index());

        // Remove this node from its dependencies' dependent lists
        for dep_id in node.dependencies() {
            if let Some(dep) = self.get_mut(*dep_id) {
                dep.remove_dependent(node_id);
            }
        }

        // Remove this node from its dependents' dependency lists
        for dependent_id in node.dependents() {
            if let Some(dependent) = self.get_mut(*dependent_id) {
                dependent.remove_dependency(node_id);
            }
        }

        trace!(node = %node_id, "removed reactive node");
        Some(node)
    }

    /// Get a reference to a node.
    pub fn get(&self, node_id: NodeId) -> Option<&Node> {
        self.slots
            .get(node_id.index() as usize)
            .filter(|slot| slot.generation == node_id.generation())
            .and_then(|slot| slot.node.as_ref())
    }

    /// Get a mutable reference to a node.
    pub fn get_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(node_id.index() as usize)
            .filter(|slot| slot.generation == node_id.generation())
            .and_then(|slot| slot.node.as_mut())
    }

    /// Add a dependency edge: `dependent` read `dependency`.
    ///
    /// Re-adding an existing edge is harmless.
    pub fn add_edge(&mut self, dependency: NodeId, dependent: NodeId) {
        if self.get(dependency).is_none() || self.get(dependent).is_none() {
            return;
        }
        if let Some(dep_node) = self.get_mut(dependency) {
            dep_node.add_dependent(dependent);
        }
        if let Some(dependent_node) = self.get_mut(dependent) {
            dependent_node.add_dependency(dependency);
        }
    }

    /// Drop every edge from the nodes `dependent` read last time.
    pub fn clear_dependencies(&mut self, dependent: NodeId) {
        let Some(node) = self.get_mut(dependent) else {
            return;
        };
        for dep_id in node.take_dependencies() {
            if let Some(dep) = self.get_mut(dep_id) {
                dep.remove_dependent(dependent);
            }
        }
    }

    /// Snapshot and clear the dependents of `node_id`.
    pub fn take_dependents(&mut self, node_id: NodeId) -> IndexSet<NodeId> {
        self.get_mut(node_id)
            .map(Node::take_dependents)
            .unwrap_or_default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
