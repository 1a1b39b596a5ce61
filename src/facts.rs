//! Consumed contract of the semantic-analysis collaborator, plus the one
//! derived query the lowering engine computes itself
//! (definite-assignment-before-read).

use std::collections::HashSet;

use crate::ast::vb::{Declarator, Expr, ExprKind, Stmt, StmtKind};
use crate::span::NodeId;
use crate::visit::{self, Visitor};

/// A resolved type, as produced by the collaborator. Display names for the
/// target surface come from [`SemanticFacts::minimal_display_name`].
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Named { name: String, nullable: bool },
    Array { elem: Box<TypeRef>, rank: u32 },
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named { name: name.into(), nullable: false }
    }

    pub fn array(elem: TypeRef, rank: u32) -> Self {
        TypeRef::Array { elem: Box::new(elem), rank }
    }

    /// Element type if this is an array type.
    pub fn element(&self) -> Option<(&TypeRef, u32)> {
        match self {
            TypeRef::Array { elem, rank } => Some((elem, *rank)),
            TypeRef::Named { .. } => None,
        }
    }
}

/// What kind of symbol a node resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Local,
    Parameter,
    Field,
    Property,
    Method,
    EnumMember,
    Const,
    Event,
}

impl SymbolKind {
    /// Reading one of these cannot run user code, so a bare reference to it
    /// may be re-evaluated freely.
    pub fn is_side_effect_free(self) -> bool {
        matches!(
            self,
            SymbolKind::Local
                | SymbolKind::Parameter
                | SymbolKind::Field
                | SymbolKind::EnumMember
                | SymbolKind::Const
        )
    }
}

/// Range handed to the collaborator's data-flow analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowRange {
    /// Inclusive statement range `[first, last]` within one block.
    Statements { first: NodeId, last: NodeId },
    /// A single expression (e.g. the guard of a conditional).
    Expression(NodeId),
}

/// Data-flow result sets over a [`FlowRange`]. Symbol names are matched
/// case-insensitively, following the source language's identifier rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFlow {
    pub always_assigned: Vec<String>,
    pub read_inside: Vec<String>,
    pub written_inside: Vec<String>,
}

impl DataFlow {
    fn contains(set: &[String], name: &str) -> bool {
        set.iter().any(|s| s.eq_ignore_ascii_case(name))
    }

    pub fn always_assigned(&self, name: &str) -> bool {
        Self::contains(&self.always_assigned, name)
    }

    pub fn read_inside(&self, name: &str) -> bool {
        Self::contains(&self.read_inside, name)
    }

    pub fn written_inside(&self, name: &str) -> bool {
        Self::contains(&self.written_inside, name)
    }
}

/// The semantic-analysis collaborator. All facts are pre-resolved or
/// resolvable on demand without re-analysis; `None` means the fact is
/// unavailable and is surfaced by the caller as a diagnostic.
pub trait SemanticFacts {
    fn resolve_type(&self, node: NodeId) -> Option<TypeRef>;
    fn analyze_data_flow(&self, range: &FlowRange) -> Option<DataFlow>;
    fn minimal_display_name(&self, ty: &TypeRef, context: NodeId) -> String;
    fn symbol_kind_of(&self, node: NodeId) -> Option<SymbolKind>;
}

/// A provider with no facts. Every lookup fails, which drives all callers
/// down their conservative paths.
#[derive(Debug, Default)]
pub struct NoFacts;

impl SemanticFacts for NoFacts {
    fn resolve_type(&self, _node: NodeId) -> Option<TypeRef> {
        None
    }

    fn analyze_data_flow(&self, _range: &FlowRange) -> Option<DataFlow> {
        None
    }

    fn minimal_display_name(&self, ty: &TypeRef, _context: NodeId) -> String {
        match ty {
            TypeRef::Named { name, .. } => name.clone(),
            TypeRef::Array { elem, rank } => {
                let commas = ",".repeat((*rank - 1) as usize);
                format!("{}[{}]", self.minimal_display_name(elem, NodeId(0)), commas)
            }
        }
    }

    fn symbol_kind_of(&self, _node: NodeId) -> Option<SymbolKind> {
        None
    }
}

/// Collects every identifier token in a statement subtree: bare
/// identifiers, member names, declared names, labels and jump targets.
/// Used both for temporary-name collision checking and for the textual
/// statement scan of the definite-assignment heuristic.
#[derive(Default)]
pub struct IdentTokens {
    pub names: HashSet<String>,
}

impl IdentTokens {
    pub fn of_block(stmts: &[Stmt]) -> Self {
        let mut collector = Self::default();
        visit::walk_block(&mut collector, stmts);
        collector
    }

    pub fn of_stmt(stmt: &Stmt) -> Self {
        let mut collector = Self::default();
        collector.visit_stmt(stmt);
        collector
    }

    pub fn contains_ignore_case(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }
}

impl Visitor for IdentTokens {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Label(name) | StmtKind::Goto(name) => {
                self.names.insert(name.node.clone());
            }
            StmtKind::Try { catches, .. } => {
                for catch in catches {
                    if let Some(var) = &catch.var {
                        self.names.insert(var.node.clone());
                    }
                }
            }
            StmtKind::ForEach { control, .. } | StmtKind::ForNext { control, .. } => {
                if let ExprKind::Ident(name) = &control.target.kind {
                    self.names.insert(name.clone());
                }
            }
            StmtKind::ExternDecl(decl) => {
                self.names.insert(decl.name.node.clone());
                for param in &decl.params {
                    self.names.insert(param.name.node.clone());
                }
            }
            _ => {}
        }
        visit::walk_stmt(self, stmt);
    }

    fn visit_declarator(&mut self, decl: &Declarator) {
        self.names.insert(decl.name.node.clone());
        visit::walk_declarator(self, decl);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Ident(name) => {
                self.names.insert(name.clone());
            }
            ExprKind::Member { name, .. } => {
                self.names.insert(name.clone());
            }
            _ => {}
        }
        visit::walk_expr(self, expr);
    }
}

/// Definite-assignment-before-read, derived from the collaborator's
/// primitives by a deliberately conservative textual scan.
///
/// Finds the first two statements of the enclosing block whose descendant
/// identifier tokens match `name` (case-insensitive — this may overshoot
/// when unrelated identifiers share the name, which only costs a redundant
/// initializer), runs data-flow analysis across `[first, second]` (narrowed
/// to the guard expression when `second` is a single-branch conditional),
/// and reports `(always_assigned && !written_inside) || !read_inside`.
///
/// May return `false` when assignment is in fact guaranteed (the caller
/// emits a redundant initializer); must never return `true` when it is not.
pub fn is_definitely_assigned_before_read(
    name: &str,
    enclosing_block: &[Stmt],
    facts: &dyn SemanticFacts,
) -> bool {
    let mut mentioning = enclosing_block
        .iter()
        .filter(|s| IdentTokens::of_stmt(s).contains_ignore_case(name))
        .take(2);

    let Some(first) = mentioning.next() else {
        // Declared but never mentioned again: no read can precede a write.
        return true;
    };
    let second = mentioning.next().unwrap_or(first);

    let range = match &second.kind {
        // The if (TryParse()) pattern: only the guard decides whether the
        // variable is assigned before the block reads it.
        StmtKind::If { branches, else_body }
            if branches.len() == 1 && else_body.is_none() =>
        {
            FlowRange::Expression(branches[0].condition.id)
        }
        _ => FlowRange::Statements { first: first.id, last: second.id },
    };

    let Some(flow) = facts.analyze_data_flow(&range) else {
        // No flow facts: claiming assignment would be unsound, so refuse.
        return false;
    };

    flow.always_assigned(name) && !flow.written_inside(name) || !flow.read_inside(name)
}
