//! Elementwise and activation lowering.
//!
//! One bundle covers the whole family; the behavior picks the target
//! mnemonic and expected arity from the node's op type.

use super::LOWER;
use crate::translate::{PassContext, TranslateError, Translation};

pub const OP_TYPES: &[&str] = &["Relu", "Sigmoid", "Tanh", "Softmax", "Add", "Mul"];

pub fn translation() -> Translation {
    let mut t = Translation::new();
    t.index_method(LOWER, lower);
    t
}

fn target(op_type: &str) -> Option<(&'static str, usize)> {
    match op_type {
        "Relu" => Some(("relu", 1)),
        "Sigmoid" => Some(("sigmoid", 1)),
        "Tanh" => Some(("tanh", 1)),
        "Softmax" => Some(("softmax", 1)),
        "Add" => Some(("add", 2)),
        "Mul" => Some(("mul", 2)),
        _ => None,
    }
}

fn lower(ctx: &mut PassContext<'_>) -> Result<(), TranslateError> {
    let node = ctx.current()?;
    let name = node.name.clone();
    let ty = node.op.ty.clone();
    let input_count = node.inputs.len();

    let (mnemonic, arity) = target(&ty)
        .ok_or_else(|| TranslateError::unsupported(&name, &ty, "not an elementwise op"))?;
    if input_count != arity {
        return Err(TranslateError::unsupported(
            &name,
            &ty,
            format!("expected {} input(s), got {}", arity, input_count),
        ));
    }

    ctx.current_mut()?.op.ty = mnemonic.to_string();
    Ok(())
}
