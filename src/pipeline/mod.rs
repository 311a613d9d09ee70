//! The conversion driver.
//!
//! A [`Converter`] owns one [`TranslationBank`] populated from the builtin
//! translations, plus the [`ConvertOptions`] threaded to every behavior. The
//! bank is mutable only between construction and the first dispatch: extend
//! it through [`Converter::bank_mut`] while you still hold the converter
//! mutably, then run passes through `&self`.

use kiln_ir::OpGraph;

use crate::translate::{ConvertOptions, TranslateError, TranslationBank};
use crate::translations::{self, LOWER, OPTIMIZE};

/// Drives the ordered conversion passes over one graph at a time.
pub struct Converter {
    bank: TranslationBank,
    opts: ConvertOptions,
}

impl Converter {
    /// Create a converter with the builtin translations registered.
    pub fn new(opts: ConvertOptions) -> Result<Self, TranslateError> {
        let mut bank = TranslationBank::new();
        translations::register_builtins(&mut bank)?;
        Ok(Self { bank, opts })
    }

    /// The dispatch bank, for callers that invoke methods directly.
    pub fn bank(&self) -> &TranslationBank {
        &self.bank
    }

    /// Mutable access to the bank, for registering additional translations
    /// before the first dispatch.
    pub fn bank_mut(&mut self) -> &mut TranslationBank {
        &mut self.bank
    }

    /// Run the conversion passes over `graph`, in order:
    ///
    /// 1. `optimize` (partial): cleanup behaviors for op types that opted in.
    /// 2. `lower` (total): every remaining node must lower to a target op.
    ///
    /// The graph is left partially transformed if a pass fails; callers that
    /// need the original should convert a clone.
    #[tracing::instrument(skip_all, fields(nodes = graph.len()))]
    pub fn run(&self, graph: &mut OpGraph) -> Result<(), TranslateError> {
        self.bank.apply_partial(OPTIMIZE, graph, &self.opts)?;
        self.bank.apply_total(LOWER, graph, &self.opts)?;
        tracing::debug!(nodes = graph.len(), "conversion passes complete");
        Ok(())
    }
}
