//! Dependency Graph
//!
//! This module implements the arena that stores the relationships between
//! reactive values and the computations that read them.
//!
//! # Overview
//!
//! - Nodes represent reactive values (signals) or computations (computed
//!   values, effects)
//! - Edges represent dependencies: if A read B, there is an edge from B to A
//!
//! Nodes are addressed by generation-checked indices rather than by object
//! identity. Both directions of every edge are stored so a computation can
//! leave all of its old sources before it re-tracks.

mod arena;
mod node;

pub use arena::Graph;
pub use node::{Node, NodeId, NodeKind};
pub(crate) use node::Runner;
