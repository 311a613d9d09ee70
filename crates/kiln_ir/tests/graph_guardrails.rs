use std::collections::HashSet;

use kiln_ir::{AttrValue, Node, Op, OpGraph};

fn chain(op_types: &[&str]) -> OpGraph {
    let mut g = OpGraph::new();
    g.inputs = vec!["t0".into()];
    for (i, ty) in op_types.iter().enumerate() {
        g.add_node(
            format!("n{}", i),
            Op::new(*ty),
            vec![format!("t{}", i)],
            vec![format!("t{}", i + 1)],
        )
        .unwrap();
    }
    g.outputs = vec![format!("t{}", op_types.len())];
    g
}

#[test]
fn node_ids_unique_across_the_graph_lifetime() {
    let mut g = chain(&["Conv", "Relu", "Conv", "Relu"]);
    let ids: Vec<_> = g.list_nodes().map(Node::id).collect();

    let mut seen = HashSet::new();
    for id in &ids {
        assert!(seen.insert(*id), "duplicate node id {}", id);
    }

    // Ids handed out after a removal must not collide with removed ones.
    g.remove_node(ids[1]).unwrap();
    let fresh = g
        .add_node("late", Op::new("Relu"), vec!["t2".into()], vec!["t9".into()])
        .unwrap();
    assert!(!ids.contains(&fresh), "recycled node id {}", fresh);
}

#[test]
fn traversal_survives_interleaved_removal() {
    let mut g = chain(&["Conv", "Identity", "Relu"]);
    let identity = g
        .list_nodes()
        .find(|n| n.op_type() == "Identity")
        .map(Node::id)
        .unwrap();
    g.remove_node(identity).unwrap();

    let order: Vec<&str> = g.list_nodes().map(Node::op_type).collect();
    assert_eq!(order, vec!["Conv", "Relu"]);
}

#[test]
fn dump_round_trips_attribute_ordering() {
    let mut g = OpGraph::new();
    g.inputs = vec!["data".into()];
    g.outputs = vec!["out".into()];
    // Insert attributes in reverse lexical order; the dump must sort them.
    g.add_node(
        "pool1",
        Op::new("MaxPool")
            .with_attr("strides", AttrValue::Ints(vec![2, 2]))
            .with_attr("kernel_shape", AttrValue::Ints(vec![2, 2])),
        vec!["data".into()],
        vec!["out".into()],
    )
    .unwrap();

    let dump = g.dump();
    let kernel = dump.find("kernel_shape").unwrap();
    let strides = dump.find("strides").unwrap();
    assert!(kernel < strides, "attributes not sorted in dump:\n{}", dump);
}
