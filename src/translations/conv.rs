//! Convolution lowering.
//!
//! `Conv` and `DepthwiseConv` share one bundle: both lower to `conv2d`, with
//! depthwise convolutions tagged by an attribute rather than a separate
//! target op.

use kiln_ir::AttrValue;

use super::LOWER;
use crate::translate::{PassContext, TranslateError, Translation};

pub const OP_TYPES: &[&str] = &["Conv", "DepthwiseConv"];

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
    if kernel.len() != 2 {
        return Err(TranslateError::unsupported(
            &name,
            &ty,
            format!("expected a 2-d kernel, got {} dimension(s)", kernel.len()),
        ));
    }
    if node.inputs.is_empty() || node.outputs.len() != 1 {
        return Err(TranslateError::unsupported(
            &name,
            &ty,
            "expects at least one input and exactly one output",
        ));
    }

    let depthwise = ty == "DepthwiseConv";
    let op = &mut ctx.current_mut()?.op;
    if op.attr("strides").is_none() {
        op.set_attr("strides", AttrValue::Ints(vec![1, 1]));
    }
    if op.attr("pads").is_none() {
        op.set_attr("pads", AttrValue::Ints(vec![0, 0, 0, 0]));
    }
    if depthwise {
        op.set_attr("depthwise", AttrValue::Int(1));
    } else if op.attr("group").is_none() {
        op.set_attr("group", AttrValue::Int(1));
    }
    op.ty = "conv2d".to_string();
    Ok(())
}
