//! # Result Sink
//!
//! Collects what a type-checking run produces: the node-to-type table and the
//! diagnostics raised along the way. Reporting a diagnostic permanently fails
//! the run; nothing un-fails it.

use crate::ast::NodeId;
use crate::diagnostic::Diagnostic;
use crate::error::TypeError;
use crate::span::Span;
use crate::types::TypeId;
use serde::Serialize;
use std::collections::BTreeMap;

/// The computed type of every checked node. Each node is written once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TypeTable {
    types: BTreeMap<NodeId, TypeId>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `ty` for `node` and returns the type now stored for it.
    ///
    /// A node that already has a type keeps it: the tree handed to the checker
    /// reused a node id.
    pub(crate) fn record(&mut self, node: NodeId, ty: TypeId) -> TypeId {
        match self.types.get(&node) {
            Some(existing) => {
                tracing::warn!(%node, "node typed twice; keeping first type");
                *existing
            }
            None => {
                self.types.insert(node, ty);
                ty
            }
        }
    }

    pub fn get(&self, node: NodeId) -> Option<TypeId> {
        self.types.get(&node).copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, TypeId)> + '_ {
        self.types.iter().map(|(node, ty)| (*node, *ty))
    }
}

/// One reported rule violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDiagnostic {
    pub error: TypeError,
    pub span: Span,
}

impl TypeDiagnostic {
    /// Builds the renderable form: code, message, a primary label and help.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.error.to_string())
            .with_code(self.error.code())
            .with_label(self.span, self.error.label());
        match self.error.help() {
            Some(help) => diagnostic.with_help(help),
            None => diagnostic,
        }
    }
}

/// Accumulates diagnostics and the pass/fail verdict for one run.
#[derive(Debug, Default)]
pub struct Sink {
    diagnostics: Vec<TypeDiagnostic>,
    failed: bool,
}

impl Sink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, error: TypeError, span: Span) {
        tracing::debug!(code = error.code(), %span, "{}", error);
        self.failed = true;
        self.diagnostics.push(TypeDiagnostic { error, span });
    }

    pub fn passed(&self) -> bool {
        !self.failed
    }

    pub fn diagnostics(&self) -> &[TypeDiagnostic] {
        &self.diagnostics
    }
}
