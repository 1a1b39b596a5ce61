use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::span::{NodeId, Span};

/// Errors raised while lowering. Node-local variants are caught by the
/// orchestrator and converted into a placeholder plus a [`Diagnostic`];
/// procedure-scoped variants abort the enclosing procedure only.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("unsupported construct: {msg}")]
    Unsupported { msg: String, node: NodeId, span: Span },

    #[error("unresolved jump target '{label}'")]
    AmbiguousLabel { label: String, node: NodeId, span: Span },

    #[error("inconsistent dispatch state: {msg}")]
    InconsistentDispatch { msg: String, node: NodeId, span: Span },

    #[error("semantic fact unavailable: {fact} for node {node:?}")]
    MissingFact { fact: String, node: NodeId, span: Span },

    #[error("translation cancelled")]
    Cancelled,
}

impl TranslateError {
    pub fn unsupported(msg: impl Into<String>, node: NodeId, span: Span) -> Self {
        Self::Unsupported { msg: msg.into(), node, span }
    }

    pub fn ambiguous_label(label: impl Into<String>, node: NodeId, span: Span) -> Self {
        Self::AmbiguousLabel { label: label.into(), node, span }
    }

    pub fn inconsistent_dispatch(msg: impl Into<String>, node: NodeId, span: Span) -> Self {
        Self::InconsistentDispatch { msg: msg.into(), node, span }
    }

    pub fn missing_fact(fact: impl Into<String>, node: NodeId, span: Span) -> Self {
        Self::MissingFact { fact: fact.into(), node, span }
    }

    /// Whether this failure is fatal to the enclosing procedure, as opposed
    /// to a node-local failure that becomes a placeholder statement.
    pub fn is_procedure_fatal(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousLabel { .. } | Self::InconsistentDispatch { .. } | Self::Cancelled
        )
    }
}

/// Classification carried on every emitted diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    UnsupportedConstruct,
    AmbiguousLabelTarget,
    InconsistentDispatchState,
}

/// One structured diagnostic handed to collaborators. Never a silent
/// best-effort substitution: every placeholder node has one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub node: NodeId,
    pub kind: FailureKind,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn from_error(err: &TranslateError) -> Self {
        match err {
            TranslateError::Unsupported { msg, node, span } => Self {
                node: *node,
                kind: FailureKind::UnsupportedConstruct,
                message: msg.clone(),
                span: *span,
            },
            TranslateError::AmbiguousLabel { label, node, span } => Self {
                node: *node,
                kind: FailureKind::AmbiguousLabelTarget,
                message: format!("unresolved jump target '{label}'"),
                span: *span,
            },
            TranslateError::InconsistentDispatch { msg, node, span } => Self {
                node: *node,
                kind: FailureKind::InconsistentDispatchState,
                message: msg.clone(),
                span: *span,
            },
            // A missing fact surfaces as an unsupported construct carrying
            // the missing-fact identity.
            TranslateError::MissingFact { fact, node, span } => Self {
                node: *node,
                kind: FailureKind::UnsupportedConstruct,
                message: format!("semantic fact unavailable: {fact}"),
                span: *span,
            },
            TranslateError::Cancelled => Self {
                node: NodeId(0),
                kind: FailureKind::UnsupportedConstruct,
                message: "translation cancelled".to_string(),
                span: Span::dummy(),
            },
        }
    }
}

/// Render a diagnostic with ariadne for nice terminal output.
pub fn render_diagnostic(source: &str, diag: &Diagnostic) {
    use ariadne::{Label, Report, ReportKind, Source};

    let kind_str = match diag.kind {
        FailureKind::UnsupportedConstruct => "unsupported construct",
        FailureKind::AmbiguousLabelTarget => "unresolved label",
        FailureKind::InconsistentDispatchState => "internal dispatch error",
    };
    Report::build(ReportKind::Error, (), diag.span.start)
        .with_message(kind_str)
        .with_label(
            Label::new(diag.span.start..diag.span.end)
                .with_message(&diag.message),
        )
        .finish()
        .eprint(Source::from(source))
        .unwrap();
}
