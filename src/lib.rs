#![forbid(unsafe_code)]
//! kiln - model conversion toolkit
//!
//! kiln turns trained network graphs into a deployable target form through a
//! series of translation passes. The heart of the crate is a per-op-type
//! dispatch registry: each op type registers a bundle of named behaviors
//! (`translate`), the builtin bundles cover the common op families
//! (`translations`), and a driver applies the passes in order (`pipeline`).
//! A standalone batch utility prepares image inputs for converted networks
//! (`preprocess`).
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module
//!   enforces `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a converter bug (logic error), use
//!   `.expect("INVARIANT: reason")` with a clear explanation.

pub mod cli;
pub mod pipeline;
pub mod preprocess;
pub mod translate;
pub mod translations;
pub mod version;

pub use pipeline::Converter;
pub use translate::{ConvertOptions, PassContext, TranslateError, Translation, TranslationBank};
