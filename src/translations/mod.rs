//! Builtin translations for the conversion pipeline.
//!
//! Each submodule owns the conversion behaviors for one family of op types
//! and exposes two things: the op-type identifiers it covers (`OP_TYPES`) and
//! a constructor for its [`Translation`] bundle. [`register_builtins`] wires
//! them all into a bank; callers may register additional bundles for op types
//! the builtins do not cover.
//!
//! Two pass methods are defined across the builtins:
//!
//! - [`OPTIMIZE`]: opt-in graph cleanup. Only bundles that index it take
//!   part; today that is the no-op family, which splices `Identity`/`Dropout`
//!   nodes out of the graph.
//! - [`LOWER`]: mandatory lowering of every node to a canonical target
//!   mnemonic with validated, defaulted attributes. Run with
//!   `apply_total`, so a graph containing an op type without a `lower`
//!   behavior fails conversion instead of passing through silently.

pub mod conv;
pub mod elementwise;
pub mod noop;
pub mod pool;
pub mod shape;

use std::rc::Rc;

use crate::translate::{TranslateError, TranslationBank};

/// Opt-in cleanup pass, applied with `apply_partial`.
pub const OPTIMIZE: &str = "optimize";

/// Mandatory lowering pass, applied with `apply_total`.
pub const LOWER: &str = "lower";

/// Register every builtin translation into `bank`.
pub fn register_builtins(bank: &mut TranslationBank) -> Result<(), TranslateError> {
    bank.register(Rc::new(conv::translation()), conv::OP_TYPES)?;
    bank.register(Rc::new(elementwise::translation()), elementwise::OP_TYPES)?;
    bank.register(Rc::new(noop::translation()), noop::OP_TYPES)?;
    bank.register(Rc::new(pool::translation()), pool::OP_TYPES)?;
    bank.register(Rc::new(shape::translation()), shape::OP_TYPES)?;
    Ok(())
}
