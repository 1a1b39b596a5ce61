//! Per-procedure lowering scopes: temporary-name allocation, the
//! implicit-receiver (`With`) frame stack, the breakable-construct stack
//! used to map `Exit`/`Continue` keywords, and the label table.
//!
//! All of this state lives for exactly one procedure-body traversal and is
//! threaded explicitly through the lowering engine — there is no global
//! naming counter.

use std::collections::{HashMap, HashSet};

use crate::ast::cs;
use crate::ast::vb::{Procedure, Stmt, StmtKind};
use crate::facts::IdentTokens;
use crate::visit::{self, Visitor};

/// Allocates synthesized temporary names that cannot collide with any
/// identifier in the procedure — user-written or previously synthesized.
/// Identifiers are compared case-insensitively, following the source
/// language's rules.
#[derive(Debug, Default)]
pub struct NameAllocator {
    used: HashSet<String>,
}

impl NameAllocator {
    /// Seed the allocator with every identifier token in the procedure:
    /// parameter names plus everything mentioned in the body.
    pub fn for_procedure(proc: &Procedure) -> Self {
        let mut alloc = Self::default();
        for param in &proc.params {
            alloc.reserve(&param.name.node);
        }
        for name in IdentTokens::of_block(&proc.body).names {
            alloc.reserve(&name);
        }
        alloc
    }

    pub fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_ascii_lowercase());
    }

    /// Return `base` if free, otherwise `base1`, `base2`, … — the first
    /// numeric suffix that collides with nothing already reserved. The
    /// returned name is reserved immediately.
    pub fn fresh(&mut self, base: &str) -> String {
        if !self.used.contains(&base.to_ascii_lowercase()) {
            self.reserve(base);
            return base.to_string();
        }
        let mut n = 1u32;
        loop {
            let candidate = format!("{base}{n}");
            if !self.used.contains(&candidate.to_ascii_lowercase()) {
                self.reserve(&candidate);
                return candidate;
            }
            n += 1;
        }
    }
}

/// One implicit-receiver frame: the (already lowered) receiver expression
/// every shorthand member access in the scope routes through.
#[derive(Debug, Clone)]
pub struct WithFrame {
    pub receiver: cs::Expr,
    pub depth: usize,
}

/// Stack of implicit-receiver scopes; lookup resolves innermost-first.
#[derive(Debug, Default)]
pub struct WithStack {
    frames: Vec<WithFrame>,
}

impl WithStack {
    pub fn push(&mut self, receiver: cs::Expr) {
        let depth = self.frames.len();
        self.frames.push(WithFrame { receiver, depth });
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn innermost(&self) -> Option<&WithFrame> {
        self.frames.last()
    }
}

/// Constructs a `break` statement can bind to, innermost last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakable {
    For,
    While,
    Do,
    /// A native multi-way dispatch: `break` terminates a section.
    SwitchNative,
    /// A guarded ladder: `break` has no meaning here.
    SwitchLadder,
}

impl Breakable {
    pub fn is_loop(self) -> bool {
        matches!(self, Breakable::For | Breakable::While | Breakable::Do)
    }
}

/// Label name → canonical target label, scoped to one procedure body.
/// Populated by a pre-pass so forward jumps resolve before any statement
/// body is lowered.
#[derive(Debug, Default)]
pub struct LabelTable {
    labels: HashMap<String, String>,
}

impl LabelTable {
    /// Collect every label in the body, including labels nested inside
    /// block statements.
    pub fn collect(body: &[Stmt]) -> Self {
        struct LabelScan {
            table: LabelTable,
        }
        impl Visitor for LabelScan {
            fn visit_stmt(&mut self, stmt: &Stmt) {
                if let StmtKind::Label(name) = &stmt.kind {
                    self.table
                        .labels
                        .insert(name.node.to_ascii_lowercase(), name.node.clone());
                }
                visit::walk_stmt(self, stmt);
            }
        }
        let mut scan = LabelScan { table: LabelTable::default() };
        visit::walk_block(&mut scan, body);
        scan.table
    }

    /// Canonical target label for a jump, if the label exists in this
    /// procedure.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.labels.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}
