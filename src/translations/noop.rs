//! No-op elimination and fallback lowering.
//!
//! `Identity` and `Dropout` carry no inference-time semantics. The optimize
//! behavior splices them out of the graph: consumers of the node's output are
//! rewired to its input, then the node is removed. When splicing is disabled
//! (`ConvertOptions::keep_noops`) or the node's wiring is not one-in/one-out,
//! the node stays and lowers to `copy` instead.

use super::{LOWER, OPTIMIZE};
use crate::translate::{PassContext, TranslateError, Translation};

pub const OP_TYPES: &[&str] = &["Identity", "Dropout"];

pub fn translation() -> Translation {
    let mut t = Translation::new();
    t.index_method(OPTIMIZE, optimize);
    t.index_method(LOWER, lower);
    t
}

fn optimize(ctx: &mut PassContext<'_>) -> Result<(), TranslateError> {
    if ctx.opts.keep_noops {
        return Ok(());
    }
    let node = ctx.current()?;
    if node.inputs.len() != 1 || node.outputs.len() != 1 {
        // Unusual wiring (e.g. Dropout emitting a mask); leave it for lowering.
        return Ok(());
    }
    let name = node.name.clone();
    let input = node.inputs[0].clone();
    let output = node.outputs[0].clone();

    tracing::debug!(node = %name, from = %output, to = %input, "splicing out no-op node");
    ctx.graph.replace_input(&output, &input);
    ctx.graph.remove_node(ctx.node)?;
    Ok(())
}

fn lower(ctx: &mut PassContext<'_>) -> Result<(), TranslateError> {
    let node = ctx.current()?;
    if node.inputs.len() != 1 || node.outputs.len() != 1 {
        return Err(TranslateError::unsupported(
            &node.name,
            &node.op.ty,
            "expects exactly one input and one output",
        ));
    }
    let op = &mut ctx.current_mut()?.op;
    op.attrs.clear();
    op.ty = "copy".to_string();
    Ok(())
}

#[cfg(test)]
mod tests {
    use kiln_ir::{AttrValue, Op, OpGraph};

    use super::*;
    use crate::translate::ConvertOptions;

    fn identity_between_convs() -> OpGraph {
        let mut g = OpGraph::new();
        g.inputs = vec!["data".into()];
        g.outputs = vec!["id_out".into()];
        g.add_node(
            "conv1",
            Op::new("Conv"),
            vec!["data".into()],
            vec!["conv_out".into()],
        )
        .unwrap();
        g.add_node(
            "id1",
            Op::new("Identity"),
            vec!["conv_out".into()],
            vec!["id_out".into()],
        )
        .unwrap();
        g
    }

    #[test]
    fn splice_rewires_graph_outputs() {
        let mut g = identity_between_convs();
        let id = g.list_nodes().find(|n| n.name == "id1").unwrap().id();
        let opts = ConvertOptions::default();
        let mut ctx = PassContext {
            node: id,
            graph: &mut g,
            opts: &opts,
        };
        optimize(&mut ctx).unwrap();

        assert_eq!(g.len(), 1);
        assert_eq!(g.outputs, vec!["conv_out".to_string()]);
    }

    #[test]
    fn keep_noops_leaves_the_node() {
        let mut g = identity_between_convs();
        let id = g.list_nodes().find(|n| n.name == "id1").unwrap().id();
        let opts = ConvertOptions { keep_noops: true };
        let mut ctx = PassContext {
            node: id,
            graph: &mut g,
            opts: &opts,
        };
        optimize(&mut ctx).unwrap();
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn kept_dropout_lowers_to_bare_copy() {
        let mut g = OpGraph::new();
        let node = g
            .add_node(
                "drop1",
                Op::new("Dropout").with_attr("ratio", AttrValue::Float(0.5)),
                vec!["x".into()],
                vec!["y".into()],
            )
            .unwrap();
        let opts = ConvertOptions::default();
        let mut ctx = PassContext {
            node,
            graph: &mut g,
            opts: &opts,
        };
        lower(&mut ctx).unwrap();
        let op = &g.list_nodes().next().unwrap().op;
        assert_eq!(op.ty, "copy");
        assert!(op.attrs.is_empty());
    }
}
