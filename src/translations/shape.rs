//! Shape-manipulation lowering.

use kiln_ir::AttrValue;

use super::LOWER;
use crate::translate::{PassContext, TranslateError, Translation};

pub const OP_TYPES: &[&str] = &["Reshape", "Flatten"];

pub fn translation() -> Translation {
    let mut t = Translation::new();
    t.index_method(LOWER, lower);
    t
}

fn lower(ctx: &mut PassContext<'_>) -> Result<(), TranslateError> {
    let node = ctx.current()?;
    let name = node.name.clone();
    let ty = node.op.ty.clone();

    if node.inputs.len() != 1 || node.outputs.len() != 1 {
        return Err(TranslateError::unsupported(
            &name,
            &ty,
            "expects exactly one input and one output",
        ));
    }

    match ty.as_str() {
        "Reshape" => {
            if node.op.attr("shape").and_then(AttrValue::as_ints).is_none() {
                return Err(TranslateError::unsupported(
                    &name,
                    &ty,
                    "missing 'shape' attribute",
                ));
            }
            ctx.current_mut()?.op.ty = "reshape".to_string();
        }
        "Flatten" => {
            let op = &mut ctx.current_mut()?.op;
            if op.attr("axis").is_none() {
                op.set_attr("axis", AttrValue::Int(1));
            }
            op.ty = "flatten".to_string();
        }
        other => {
            return Err(TranslateError::unsupported(&name, other, "not a shape op"));
        }
    }
    Ok(())
}
