//! Error types for translation dispatch.
//!
//! Every dispatch failure is synchronous and propagates to the immediate
//! caller; nothing at this layer retries or recovers. The variants keep the
//! op type and method name separate so a failed lowering names exactly what
//! was missing.

use thiserror::Error;

use kiln_ir::GraphError;

/// Errors raised by [`Translation`](super::Translation) and
/// [`TranslationBank`](super::TranslationBank) dispatch, and by the behaviors
/// they invoke.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// A method name was requested on a translation that never indexed it.
    #[error("no method '{0}' indexed on this translation")]
    UnknownMethod(String),

    /// An op-type identifier has no translation bound in the bank.
    #[error("no translation registered for op type '{0}'")]
    UnregisteredOp(String),

    /// The op type resolved to a translation, but that translation lacks the
    /// requested method. Distinct from [`TranslateError::UnknownMethod`]: it
    /// carries both identifiers for diagnostics.
    #[error("translation for '{op_type}' does not define an indexed method '{method}'")]
    MissingMethod { op_type: String, method: String },

    /// An op-type identifier was registered a second time.
    #[error("a translation is already registered for op type '{0}'")]
    DuplicateRegistration(String),

    /// A behavior rejected the node it was handed.
    #[error("node '{node}' ({op_type}): {reason}")]
    Unsupported {
        node: String,
        op_type: String,
        reason: String,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl TranslateError {
    /// Shorthand for behavior-level rejection of a node.
    pub fn unsupported(
        node: impl Into<String>,
        op_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Unsupported {
            node: node.into(),
            op_type: op_type.into(),
            reason: reason.into(),
        }
    }
}
