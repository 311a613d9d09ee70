//! Per-op-type method dispatch for graph transformation passes.
//!
//! Conversion is organized as named passes applied across an op graph. Each
//! op type contributes a [`Translation`]: a bundle of named behaviors (for
//! example `"optimize"` or `"lower"`). A [`TranslationBank`] maps op-type
//! identifiers to translations and drives a pass in one of three modes:
//!
//! 1. [`TranslationBank::apply_specific`] - invoke one method for one
//!    explicit op type.
//! 2. [`TranslationBank::apply_partial`] - invoke the method on every node
//!    whose translation opted in by indexing it; other nodes are skipped.
//! 3. [`TranslationBank::apply_total`] - invoke the method on every node,
//!    requiring every node's op type to be registered and to define the
//!    method. The strict variant: use it when a pass claims completeness.
//!
//! # Architecture
//!
//! - `errors` - the [`TranslateError`] taxonomy
//! - behaviors receive a [`PassContext`] (current node id, mutable graph,
//!   shared [`ConvertOptions`]) instead of an open argument list, so call
//!   sites are type checked
//!
//! Registration happens once, at pipeline construction: `register` takes
//! `&mut self` while every dispatch mode takes `&self`, so the borrow checker
//! enforces the write-once-then-read-many phase split. The bank is passed by
//! reference through the pipeline driver; there is no process-wide singleton.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut bank = TranslationBank::new();
//! bank.register(Rc::new(conv_translation()), &["Conv", "DepthwiseConv"])?;
//! // ... registration phase ends here ...
//! bank.apply_partial("optimize", &mut graph, &opts)?;
//! bank.apply_total("lower", &mut graph, &opts)?;
//! ```

mod errors;

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use kiln_ir::{Node, NodeId, OpGraph};

pub use errors::TranslateError;

/// Converter knobs threaded to every behavior through [`PassContext`].
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Keep no-op nodes (`Identity`, `Dropout`) instead of splicing them out
    /// during the optimize pass. Kept nodes still lower (to `copy`).
    pub keep_noops: bool,
}

/// Context handed to a behavior for one node during a pass.
///
/// Behaviors mutate the graph through this context; the node id stays valid
/// even if earlier invocations in the same pass removed other nodes.
pub struct PassContext<'g> {
    /// The node this invocation is for.
    pub node: NodeId,
    /// The graph being transformed.
    pub graph: &'g mut OpGraph,
    /// Shared converter options.
    pub opts: &'g ConvertOptions,
}

impl PassContext<'_> {
    /// The node this context targets.
    ///
    /// Errors if the node was removed from the graph, which means the caller
    /// is holding a stale context across mutations.
    pub fn current(&self) -> Result<&Node, TranslateError> {
        self.graph
            .node(self.node)
            .ok_or_else(|| kiln_ir::GraphError::UnknownNode(self.node).into())
    }

    /// Mutable access to the node this context targets.
    pub fn current_mut(&mut self) -> Result<&mut Node, TranslateError> {
        self.graph
            .node_mut(self.node)
            .ok_or_else(|| kiln_ir::GraphError::UnknownNode(self.node).into())
    }
}

/// A behavior registered under a method name.
pub type PassFn = Box<dyn Fn(&mut PassContext<'_>) -> Result<(), TranslateError>>;

/// The named behaviors for one op type.
///
/// Constructed once per op type by the module defining that op's conversion
/// behavior, then registered (possibly under several op-type aliases) into a
/// [`TranslationBank`]. Method names are unique within a bundle; indexing a
/// name twice silently replaces the earlier behavior.
#[derive(Default)]
pub struct Translation {
    indexed_methods: HashMap<String, PassFn>,
}

impl Translation {
    /// Create an empty translation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or overwrite) the behavior for `method_name`.
    pub fn index_method<F>(&mut self, method_name: impl Into<String>, behavior: F)
    where
        F: Fn(&mut PassContext<'_>) -> Result<(), TranslateError> + 'static,
    {
        self.indexed_methods
            .insert(method_name.into(), Box::new(behavior));
    }

    /// Whether `method_name` is indexed. Pure query, never fails.
    pub fn has_indexed_method(&self, method_name: &str) -> bool {
        self.indexed_methods.contains_key(method_name)
    }

    /// Invoke the behavior indexed under `method_name`.
    ///
    /// # Errors
    ///
    /// [`TranslateError::UnknownMethod`] if no behavior is indexed under that
    /// name; otherwise whatever the behavior itself returns.
    pub fn apply_method(
        &self,
        method_name: &str,
        ctx: &mut PassContext<'_>,
    ) -> Result<(), TranslateError> {
        let behavior = self
            .indexed_methods
            .get(method_name)
            .ok_or_else(|| TranslateError::UnknownMethod(method_name.to_string()))?;
        behavior(ctx)
    }
}

impl fmt::Debug for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.indexed_methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Translation").field("methods", &names).finish()
    }
}

/// The op-type-to-translation table plus the traversal dispatch modes.
///
/// The same [`Translation`] instance may be registered under multiple op-type
/// keys (several op types sharing one translation), hence the `Rc`. The bank
/// is single-threaded by design: `Rc` makes it `!Send`, so handing it to a
/// worker thread is a compile error rather than a data race.
#[derive(Debug, Default)]
pub struct TranslationBank {
    translations: HashMap<String, Rc<Translation>>,
}

impl TranslationBank {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `translation` to each of the given op-type identifiers.
    ///
    /// Identifiers are checked and bound one at a time: on a duplicate, the
    /// identifiers preceding it in the slice stay bound and the rest are not
    /// attempted. The first registration's binding remains intact.
    ///
    /// # Errors
    ///
    /// [`TranslateError::DuplicateRegistration`] if an identifier is already
    /// bound.
    pub fn register(
        &mut self,
        translation: Rc<Translation>,
        op_types: &[&str],
    ) -> Result<(), TranslateError> {
        for &op_type in op_types {
            if self.translations.contains_key(op_type) {
                return Err(TranslateError::DuplicateRegistration(op_type.to_string()));
            }
            self.translations
                .insert(op_type.to_string(), Rc::clone(&translation));
        }
        Ok(())
    }

    /// Whether an op-type identifier has a translation bound.
    pub fn is_registered(&self, op_type: &str) -> bool {
        self.translations.contains_key(op_type)
    }

    fn translation(&self, op_type: &str) -> Result<&Rc<Translation>, TranslateError> {
        self.translations
            .get(op_type)
            .ok_or_else(|| TranslateError::UnregisteredOp(op_type.to_string()))
    }

    /// Invoke `method_name` for one explicit op type.
    ///
    /// # Errors
    ///
    /// [`TranslateError::UnregisteredOp`] if `op_type` is unbound,
    /// [`TranslateError::MissingMethod`] if its translation does not define
    /// `method_name`, otherwise whatever the behavior returns.
    pub fn apply_specific(
        &self,
        op_type: &str,
        method_name: &str,
        ctx: &mut PassContext<'_>,
    ) -> Result<(), TranslateError> {
        let translation = self.translation(op_type)?;
        if !translation.has_indexed_method(method_name) {
            return Err(TranslateError::MissingMethod {
                op_type: op_type.to_string(),
                method: method_name.to_string(),
            });
        }
        translation.apply_method(method_name, ctx)
    }

    /// Invoke `method_name` on every node whose translation indexes it.
    ///
    /// Nodes are visited in the graph's traversal order. A node whose op type
    /// has no registered translation is an error; a node whose translation
    /// simply lacks `method_name` is skipped (opt-in semantics, so a pass may
    /// apply to a subset of op types). A node removed by an earlier behavior
    /// in the same pass is skipped.
    #[tracing::instrument(skip_all, fields(method = method_name, nodes = graph.len()))]
    pub fn apply_partial(
        &self,
        method_name: &str,
        graph: &mut OpGraph,
        opts: &ConvertOptions,
    ) -> Result<(), TranslateError> {
        for (node, op_type) in Self::schedule(graph) {
            if !graph.contains(node) {
                continue;
            }
            let translation = self.translation(&op_type)?;
            if !translation.has_indexed_method(method_name) {
                continue;
            }
            let mut ctx = PassContext {
                node,
                graph: &mut *graph,
                opts,
            };
            translation.apply_method(method_name, &mut ctx)?;
        }
        Ok(())
    }

    /// Invoke `method_name` on every node, unconditionally.
    ///
    /// Every node's op type must be registered *and* define `method_name`;
    /// the first failure aborts the pass. Invocations on nodes before the
    /// failure point do occur and are not rolled back.
    #[tracing::instrument(skip_all, fields(method = method_name, nodes = graph.len()))]
    pub fn apply_total(
        &self,
        method_name: &str,
        graph: &mut OpGraph,
        opts: &ConvertOptions,
    ) -> Result<(), TranslateError> {
        for (node, op_type) in Self::schedule(graph) {
            if !graph.contains(node) {
                continue;
            }
            let mut ctx = PassContext {
                node,
                graph: &mut *graph,
                opts,
            };
            self.apply_specific(&op_type, method_name, &mut ctx)?;
        }
        Ok(())
    }

    /// Snapshot of `(node id, op type)` pairs in traversal order.
    ///
    /// Taken before the pass runs so behaviors may remove nodes without
    /// invalidating the iteration.
    fn schedule(graph: &OpGraph) -> Vec<(NodeId, String)> {
        graph
            .list_nodes()
            .map(|n| (n.id(), n.op_type().to_string()))
            .collect()
    }
}
