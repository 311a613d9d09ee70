//! The op graph: nodes wired by named tensors.
//!
//! Nodes are stored in insertion order and traversed in that order by every
//! pass. Node ids are stable handles: removing a node never renumbers the
//! survivors.

use std::fmt;
use std::fmt::Write as _;

use thiserror::Error;

use crate::op::Op;

/// Errors from graph mutation.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("unknown node id {0}")]
    UnknownNode(NodeId),

    #[error("a node named '{0}' already exists in the graph")]
    DuplicateNodeName(String),
}

/// Stable handle to a node in one [`OpGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One graph node: an operation plus its tensor wiring.
///
/// Inputs and outputs are tensor names; an edge exists wherever one node's
/// output name appears among another node's inputs.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    /// Unique node name, used in diagnostics and dumps.
    pub name: String,
    /// The operation this node performs.
    pub op: Op,
    /// Input tensor names, in positional order.
    pub inputs: Vec<String>,
    /// Output tensor names, in positional order.
    pub outputs: Vec<String>,
}

impl Node {
    /// This node's stable id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The op-type identifier used for pass dispatch.
    pub fn op_type(&self) -> &str {
        &self.op.ty
    }
}

/// A graph of operations with named graph-level inputs and outputs.
#[derive(Debug, Clone, Default)]
pub struct OpGraph {
    /// Graph-level input tensor names.
    pub inputs: Vec<String>,
    /// Graph-level output tensor names.
    pub outputs: Vec<String>,
    nodes: Vec<Node>,
    next_id: u32,
}

impl OpGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node, assigning it a fresh id.
    ///
    /// Node names must be unique within the graph; the name is the handle
    /// humans see in diagnostics, so collisions would make errors ambiguous.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        op: Op,
        inputs: Vec<String>,
        outputs: Vec<String>,
    ) -> Result<NodeId, GraphError> {
        let name = name.into();
        if self.nodes.iter().any(|n| n.name == name) {
            return Err(GraphError::DuplicateNodeName(name));
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push(Node {
            id,
            name,
            op,
            inputs,
            outputs,
        });
        Ok(id)
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Look up a node mutably by id.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Whether a node with this id is still present.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Nodes in traversal (insertion) order.
    pub fn list_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Number of nodes currently in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Remove a node, returning it.
    ///
    /// The caller is responsible for rewiring: tensors the node produced are
    /// not renamed anywhere else (see [`OpGraph::replace_input`]).
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, GraphError> {
        let idx = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or(GraphError::UnknownNode(id))?;
        Ok(self.nodes.remove(idx))
    }

    /// Rename a tensor everywhere it is consumed.
    ///
    /// Rewrites `from` to `to` in every node's input list and in the graph's
    /// output list. Producer output lists are left untouched; this is the
    /// primitive for splicing a node out (point the consumers of its output
    /// at its input, then remove it).
    pub fn replace_input(&mut self, from: &str, to: &str) {
        for node in &mut self.nodes {
            for input in &mut node.inputs {
                if input == from {
                    *input = to.to_string();
                }
            }
        }
        for output in &mut self.outputs {
            if output == from {
                *output = to.to_string();
            }
        }
    }

    /// Deterministic textual listing of the graph, one node per line.
    ///
    /// Attributes print in key order, so two structurally equal graphs dump
    /// identically. Used by tests and debug logging.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "inputs: [{}]", self.inputs.join(", "));
        for node in &self.nodes {
            let attrs = node
                .op
                .attrs
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(
                out,
                "{}: {}({}) [{}] -> [{}]",
                node.name,
                node.op.ty,
                attrs,
                node.inputs.join(", "),
                node.outputs.join(", ")
            );
        }
        let _ = writeln!(out, "outputs: [{}]", self.outputs.join(", "));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::AttrValue;

    fn two_node_graph() -> (OpGraph, NodeId, NodeId) {
        let mut g = OpGraph::new();
        g.inputs = vec!["data".into()];
        g.outputs = vec!["relu_out".into()];
        let conv = g
            .add_node(
                "conv1",
                Op::new("Conv").with_attr("kernel_shape", AttrValue::Ints(vec![3, 3])),
                vec!["data".into()],
                vec!["conv_out".into()],
            )
            .unwrap();
        let relu = g
            .add_node(
                "relu1",
                Op::new("Relu"),
                vec!["conv_out".into()],
                vec!["relu_out".into()],
            )
            .unwrap();
        (g, conv, relu)
    }

    #[test]
    fn traversal_order_is_insertion_order() {
        let (g, conv, relu) = two_node_graph();
        let ids: Vec<NodeId> = g.list_nodes().map(Node::id).collect();
        assert_eq!(ids, vec![conv, relu]);
    }

    #[test]
    fn removal_keeps_remaining_ids_stable() {
        let (mut g, conv, relu) = two_node_graph();
        let removed = g.remove_node(conv).unwrap();
        assert_eq!(removed.name, "conv1");
        assert!(!g.contains(conv));
        assert!(g.contains(relu));
        assert_eq!(g.len(), 1);
        // Removing again is an error, not a panic.
        assert!(matches!(
            g.remove_node(conv),
            Err(GraphError::UnknownNode(_))
        ));
    }

    #[test]
    fn duplicate_node_name_is_rejected() {
        let (mut g, _, _) = two_node_graph();
        let err = g
            .add_node("conv1", Op::new("Conv"), vec![], vec![])
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateNodeName(name) if name == "conv1"));
    }

    #[test]
    fn replace_input_rewires_consumers_and_graph_outputs() {
        let (mut g, _, relu) = two_node_graph();
        g.replace_input("conv_out", "data");
        assert_eq!(g.node(relu).unwrap().inputs, vec!["data".to_string()]);
        g.replace_input("relu_out", "conv_out");
        assert_eq!(g.outputs, vec!["conv_out".to_string()]);
    }

    #[test]
    fn dump_is_deterministic() {
        let (g, _, _) = two_node_graph();
        let expected = "inputs: [data]\n\
                        conv1: Conv(kernel_shape=[3, 3]) [data] -> [conv_out]\n\
                        relu1: Relu() [conv_out] -> [relu_out]\n\
                        outputs: [relu_out]\n";
        assert_eq!(g.dump(), expected);
    }
}
