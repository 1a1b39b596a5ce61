//! Shared helpers for lowering tests: a source-tree builder that assigns
//! node ids the way the parser collaborator would, and a stub facts
//! provider with per-node registrations.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;

use vbsharp::ast::vb::*;
use vbsharp::facts::{DataFlow, FlowRange, SemanticFacts, SymbolKind, TypeRef};
use vbsharp::span::{NodeId, Span, Spanned};

/// Builds source trees with fresh node ids.
#[derive(Default)]
pub struct Ast {
    next: Cell<u32>,
}

impl Ast {
    pub fn new() -> Self {
        // Start at 1; NodeId(0) is reserved for "no node" in diagnostics.
        Ast { next: Cell::new(1) }
    }

    pub fn fresh_id(&self) -> NodeId {
        let id = self.next.get();
        self.next.set(id + 1);
        NodeId(id)
    }

    pub fn stmt(&self, kind: StmtKind) -> Stmt {
        Stmt { id: self.fresh_id(), span: Span::dummy(), kind }
    }

    pub fn expr(&self, kind: ExprKind) -> Expr {
        Expr { id: self.fresh_id(), span: Span::dummy(), kind }
    }

    // ── Expressions ──────────────────────────────────────────────────

    pub fn int(&self, v: i64) -> Expr {
        self.expr(ExprKind::IntLit(v))
    }

    pub fn bool(&self, v: bool) -> Expr {
        self.expr(ExprKind::BoolLit(v))
    }

    pub fn string(&self, s: &str) -> Expr {
        self.expr(ExprKind::StringLit(s.to_string()))
    }

    pub fn nothing(&self) -> Expr {
        self.expr(ExprKind::Nothing)
    }

    pub fn ident(&self, name: &str) -> Expr {
        self.expr(ExprKind::Ident(name.to_string()))
    }

    pub fn member(&self, receiver: Expr, name: &str) -> Expr {
        self.expr(ExprKind::Member {
            receiver: Some(Box::new(receiver)),
            name: name.to_string(),
            conditional: false,
        })
    }

    /// `.Name` shorthand inside a With block.
    pub fn shorthand(&self, name: &str) -> Expr {
        self.expr(ExprKind::Member {
            receiver: None,
            name: name.to_string(),
            conditional: false,
        })
    }

    /// `?.Name` conditional shorthand.
    pub fn shorthand_conditional(&self, name: &str) -> Expr {
        self.expr(ExprKind::Member {
            receiver: None,
            name: name.to_string(),
            conditional: true,
        })
    }

    pub fn binary(&self, op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        self.expr(ExprKind::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) })
    }

    pub fn invoke(&self, callee: Expr, args: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Invoke { callee: Box::new(callee), args })
    }

    pub fn call(&self, name: &str, args: Vec<Expr>) -> Expr {
        let callee = self.ident(name);
        self.invoke(callee, args)
    }

    pub fn new_object(&self, ty: TypeSyntax, args: Vec<Expr>) -> Expr {
        self.expr(ExprKind::New { ty, args })
    }

    // ── Statements ───────────────────────────────────────────────────

    pub fn assign(&self, target: Expr, value: Expr) -> Stmt {
        self.stmt(StmtKind::Assign { target, op: AssignOp::Assign, value })
    }

    pub fn expr_stmt(&self, e: Expr) -> Stmt {
        self.stmt(StmtKind::ExprStmt(e))
    }

    /// `Dim <name> [As ty] [= init]`; returns the statement and the
    /// declarator's node id for fact registration.
    pub fn dim(&self, name: &str, ty: Option<TypeSyntax>, init: Option<Expr>) -> (Stmt, NodeId) {
        let decl_id = self.fresh_id();
        let stmt = self.stmt(StmtKind::Local {
            declarators: vec![Declarator {
                id: decl_id,
                name: Spanned::dummy(name.to_string()),
                array_bounds: None,
                ty,
                init,
            }],
            is_const: false,
        });
        (stmt, decl_id)
    }

    /// `Dim <name>(bounds) As ty`.
    pub fn dim_array(
        &self,
        name: &str,
        bounds: Vec<Expr>,
        ty: Option<TypeSyntax>,
    ) -> (Stmt, NodeId) {
        let decl_id = self.fresh_id();
        let stmt = self.stmt(StmtKind::Local {
            declarators: vec![Declarator {
                id: decl_id,
                name: Spanned::dummy(name.to_string()),
                array_bounds: Some(bounds),
                ty,
                init: None,
            }],
            is_const: false,
        });
        (stmt, decl_id)
    }

    /// `ReDim [Preserve] <name>(bounds)`; returns the statement and the
    /// resize target's node id.
    pub fn redim(&self, name: &str, preserve: bool, bounds: Vec<Expr>) -> (Stmt, NodeId) {
        let target_id = self.fresh_id();
        let target = self.ident(name);
        let stmt = self.stmt(StmtKind::Redim {
            preserve,
            targets: vec![RedimTarget {
                id: target_id,
                span: Span::dummy(),
                target,
                bounds,
            }],
        });
        (stmt, target_id)
    }

    pub fn if_stmt(&self, condition: Expr, body: Vec<Stmt>) -> Stmt {
        self.stmt(StmtKind::If {
            branches: vec![IfBranch { condition, body }],
            else_body: None,
        })
    }

    pub fn for_next(&self, var: &str, from: Expr, to: Expr, body: Vec<Stmt>) -> Stmt {
        let control = ForControl {
            id: self.fresh_id(),
            target: self.ident(var),
            declares: true,
            ty: None,
        };
        self.stmt(StmtKind::ForNext { control, from, to, step: None, body })
    }

    pub fn while_stmt(&self, condition: Expr, body: Vec<Stmt>) -> Stmt {
        self.stmt(StmtKind::While { condition, body })
    }

    pub fn with_stmt(&self, receiver: Expr, body: Vec<Stmt>) -> Stmt {
        self.stmt(StmtKind::With { receiver, body })
    }

    pub fn label(&self, name: &str) -> Stmt {
        self.stmt(StmtKind::Label(Spanned::dummy(name.to_string())))
    }

    pub fn goto(&self, name: &str) -> Stmt {
        self.stmt(StmtKind::Goto(Spanned::dummy(name.to_string())))
    }

    pub fn case_section(&self, clauses: Vec<CaseClause>, body: Vec<Stmt>) -> CaseSection {
        CaseSection { clauses, body }
    }

    // ── Procedures ───────────────────────────────────────────────────

    pub fn procedure(&self, name: &str, body: Vec<Stmt>) -> Procedure {
        Procedure {
            name: Spanned::dummy(name.to_string()),
            params: Vec::new(),
            is_iterator: false,
            body,
        }
    }

    pub fn iterator(&self, name: &str, body: Vec<Stmt>) -> Procedure {
        Procedure {
            name: Spanned::dummy(name.to_string()),
            params: Vec::new(),
            is_iterator: true,
            body,
        }
    }
}

pub fn named(name: &str) -> TypeSyntax {
    TypeSyntax::Named(name.to_string())
}

pub fn array_of(name: &str, rank: u32) -> TypeSyntax {
    TypeSyntax::Array { elem: Box::new(named(name)), rank }
}

/// Stub facts provider with per-node registrations. Data-flow queries all
/// answer with one configured result (tests exercise one range at a time).
#[derive(Default)]
pub struct TestFacts {
    types: HashMap<NodeId, TypeRef>,
    kinds: HashMap<NodeId, SymbolKind>,
    flow: Option<DataFlow>,
    displays: HashMap<String, String>,
}

impl TestFacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, node: NodeId, ty: TypeRef) -> Self {
        self.types.insert(node, ty);
        self
    }

    pub fn with_kind(mut self, node: NodeId, kind: SymbolKind) -> Self {
        self.kinds.insert(node, kind);
        self
    }

    pub fn with_flow(mut self, flow: DataFlow) -> Self {
        self.flow = Some(flow);
        self
    }

    pub fn with_display(mut self, source: &str, display: &str) -> Self {
        self.displays.insert(source.to_string(), display.to_string());
        self
    }
}

impl SemanticFacts for TestFacts {
    fn resolve_type(&self, node: NodeId) -> Option<TypeRef> {
        self.types.get(&node).cloned()
    }

    fn analyze_data_flow(&self, _range: &FlowRange) -> Option<DataFlow> {
        self.flow.clone()
    }

    fn minimal_display_name(&self, ty: &TypeRef, context: NodeId) -> String {
        match ty {
            TypeRef::Named { name, .. } => self
                .displays
                .get(name)
                .cloned()
                .unwrap_or_else(|| name.clone()),
            TypeRef::Array { elem, rank } => {
                let commas = ",".repeat((*rank - 1) as usize);
                format!("{}[{}]", self.minimal_display_name(elem, context), commas)
            }
        }
    }

    fn symbol_kind_of(&self, node: NodeId) -> Option<SymbolKind> {
        self.kinds.get(&node).copied()
    }
}

/// Lower a single-procedure body with the given facts, expecting no
/// procedure-fatal error.
pub fn lower_body(ast: &Ast, body: Vec<Stmt>, facts: &dyn SemanticFacts) -> vbsharp::Lowered {
    let proc = ast.procedure("TestMethod", body);
    vbsharp::lower_procedure(&proc, facts).expect("procedure lowering failed")
}

/// Lower and assert the run produced no diagnostics.
pub fn lower_body_clean(
    ast: &Ast,
    body: Vec<Stmt>,
    facts: &dyn SemanticFacts,
) -> Vec<vbsharp::ast::cs::Stmt> {
    let lowered = lower_body(ast, body, facts);
    assert!(
        lowered.diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        lowered.diagnostics
    );
    lowered.stmts
}
