//! Shared op-graph vocabulary for the kiln converter and its passes.
//!
//! This crate is intentionally small and dependency-light. It defines the
//! graph-structured intermediate representation that conversion passes
//! transform: operations with typed attributes, nodes wired by named tensors,
//! and an insertion-ordered graph with deterministic traversal.
//!
//! ## Notes
//!
//! - This is a "vocabulary" crate: **no IO**, no global state, and no
//!   knowledge of any individual pass or target.
//! - Node traversal order is the order nodes were added; passes rely on this
//!   being deterministic.

pub mod graph;
pub mod op;

pub use graph::{GraphError, Node, NodeId, OpGraph};
pub use op::{AttrValue, Op};
