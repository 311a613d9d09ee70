//! Pooling lowering.
//!
//! `MaxPool` and `AvgPool` both lower to `pool`; the pooling mode becomes an
//! attribute, and strides default to the kernel shape (non-overlapping
//! windows) when unspecified.

use kiln_ir::AttrValue;

use super::LOWER;
use crate::translate::{PassContext, TranslateError, Translation};

pub const OP_TYPES: &[&str] = &["MaxPool", "AvgPool"];

pub fn translation() -> Translation {
    let mut t = Translation::new();
    t.index_method(LOWER, lower);
    t
}

fn lower(ctx: &mut PassContext<'_>) -> Result<(), TranslateError> {
    let node = ctx.current()?;
    let name = node.name.clone();
    let ty = node.op.ty.clone();

    let kernel = node
        .op
        .attr("kernel_shape")
        .and_then(AttrValue::as_ints)
        .map(<[i64]>::to_vec)
        .ok_or_else(|| {
            TranslateError::unsupported(&name, &ty, "missing 'kernel_shape' attribute")
        })?;
    if node.inputs.len() != 1 || node.outputs.len() != 1 {
        return Err(TranslateError::unsupported(
            &name,
            &ty,
            "expects exactly one input and one output",
        ));
    }

    let mode = if ty == "MaxPool" { "max" } else { "avg" };
    let op = &mut ctx.current_mut()?.op;
    if op.attr("strides").is_none() {
        op.set_attr("strides", AttrValue::Ints(kernel));
    }
    op.set_attr("mode", AttrValue::Str(mode.to_string()));
    op.ty = "pool".to_string();
    Ok(())
}

#[cfg(test)]
mod tests {
    use kiln_ir::{Op, OpGraph};

    use super::*;
    use crate::translate::ConvertOptions;

    fn lower_one(op: Op) -> Result<Op, TranslateError> {
        let mut g = OpGraph::new();
        let node = g
            .add_node("pool1", op, vec!["data".into()], vec!["out".into()])
            .unwrap();
        let opts = ConvertOptions::default();
        let mut ctx = PassContext {
            node,
            graph: &mut g,
            opts: &opts,
        };
        lower(&mut ctx)?;
        Ok(g.list_nodes().next().unwrap().op.clone())
    }

    #[test]
    fn strides_default_to_kernel_shape() {
        let op =
            lower_one(Op::new("MaxPool").with_attr("kernel_shape", AttrValue::Ints(vec![2, 2])))
                .unwrap();
        assert_eq!(op.ty, "pool");
        assert_eq!(op.attr("strides").and_then(AttrValue::as_ints), Some(&[2, 2][..]));
        assert_eq!(op.attr("mode").and_then(AttrValue::as_str), Some("max"));
    }

    #[test]
    fn avg_pool_keeps_explicit_strides() {
        let op = lower_one(
            Op::new("AvgPool")
                .with_attr("kernel_shape", AttrValue::Ints(vec![3, 3]))
                .with_attr("strides", AttrValue::Ints(vec![1, 1])),
        )
        .unwrap();
        assert_eq!(op.attr("strides").and_then(AttrValue::as_ints), Some(&[1, 1][..]));
        assert_eq!(op.attr("mode").and_then(AttrValue::as_str), Some("avg"));
    }

    #[test]
    fn missing_kernel_shape_is_unsupported() {
        let err = lower_one(Op::new("MaxPool")).unwrap_err();
        assert!(matches!(err, TranslateError::Unsupported { .. }));
    }
}
