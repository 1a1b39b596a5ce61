//! Statement-level translation from a VB-style surface syntax to a C#-style
//! one, preserving exact observable behavior: side-effect ordering and
//! count, loop-bound evaluation, exception-handling order,
//! implicit-receiver scoping, and array-resize content preservation.
//!
//! Parsing, semantic analysis, and pretty-printing are external
//! collaborators. The crate is a pure function from (source statement tree,
//! semantic facts) to (target statement tree, diagnostics): feed it a
//! [`ast::vb::Unit`] or a single [`ast::vb::Procedure`] plus an
//! implementation of [`facts::SemanticFacts`], get back [`ast::cs`] nodes
//! ready for the pretty-printer and a list of structured diagnostics.
//! Constructs with no defined target analogue fail explicitly — a
//! placeholder node plus a diagnostic, never a silent best-effort guess.

pub mod span;
pub mod diagnostics;
pub mod ast;
pub mod visit;
pub mod facts;
pub mod lower;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub use diagnostics::{Diagnostic, FailureKind, TranslateError};
pub use facts::{DataFlow, FlowRange, SemanticFacts, SymbolKind, TypeRef};
pub use lower::{Lowered, LoweredMember, UnitLowered, lower_procedure, lower_unit};
pub use span::{NodeId, Span, Spanned};

/// Cooperative cancellation for unit-level translation. Checked between
/// procedure boundaries only, so a partially-lowered body is never
/// surfaced.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
