//! Read-only visitor over the source statement tree.
//!
//! Implement [`Visitor`] and override only the methods you need; call the
//! corresponding `walk_*` function inside your override to get default
//! recursion. The lowering engine uses this for its pre-passes (label
//! discovery, identifier collection) — passes where almost every arm is
//! pure recursion.

use crate::ast::vb::*;

/// Read-only source-tree visitor. Default implementations recurse into all
/// children; omit the walk call in an override to prune traversal there.
pub trait Visitor: Sized {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_declarator(&mut self, decl: &Declarator) {
        walk_declarator(self, decl);
    }
}

pub fn walk_block<V: Visitor>(v: &mut V, stmts: &[Stmt]) {
    for stmt in stmts {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visitor>(v: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Local { declarators, .. } => {
            for d in declarators {
                v.visit_declarator(d);
            }
        }
        StmtKind::Assign { target, value, .. } => {
            v.visit_expr(target);
            v.visit_expr(value);
        }
        StmtKind::ExprStmt(e) | StmtKind::Yield(e) => v.visit_expr(e),
        StmtKind::If { branches, else_body } => {
            for branch in branches {
                v.visit_expr(&branch.condition);
                walk_block(v, &branch.body);
            }
            if let Some(body) = else_body {
                walk_block(v, body);
            }
        }
        StmtKind::Select { discriminant, sections, else_section } => {
            v.visit_expr(discriminant);
            for section in sections {
                for clause in &section.clauses {
                    walk_case_clause(v, clause);
                }
                walk_block(v, &section.body);
            }
            if let Some(body) = else_section {
                walk_block(v, body);
            }
        }
        StmtKind::ForNext { control, from, to, step, body } => {
            v.visit_expr(&control.target);
            v.visit_expr(from);
            v.visit_expr(to);
            if let Some(step) = step {
                v.visit_expr(step);
            }
            walk_block(v, body);
        }
        StmtKind::ForEach { control, iterable, body } => {
            v.visit_expr(&control.target);
            v.visit_expr(iterable);
            walk_block(v, body);
        }
        StmtKind::While { condition, body } => {
            v.visit_expr(condition);
            walk_block(v, body);
        }
        StmtKind::DoLoop { condition, body } => {
            match condition {
                Some(
                    LoopCondition::PreWhile(e)
                    | LoopCondition::PreUntil(e)
                    | LoopCondition::PostWhile(e)
                    | LoopCondition::PostUntil(e),
                ) => v.visit_expr(e),
                None => {}
            }
            walk_block(v, body);
        }
        StmtKind::With { receiver, body } => {
            v.visit_expr(receiver);
            walk_block(v, body);
        }
        StmtKind::Try { body, catches, finally } => {
            walk_block(v, body);
            for catch in catches {
                if let Some(filter) = &catch.filter {
                    v.visit_expr(filter);
                }
                walk_block(v, &catch.body);
            }
            if let Some(body) = finally {
                walk_block(v, body);
            }
        }
        StmtKind::Throw(e) => {
            if let Some(e) = e {
                v.visit_expr(e);
            }
        }
        StmtKind::Redim { targets, .. } => {
            for t in targets {
                v.visit_expr(&t.target);
                for b in &t.bounds {
                    v.visit_expr(b);
                }
            }
        }
        StmtKind::Erase { targets } => {
            for t in targets {
                v.visit_expr(t);
            }
        }
        StmtKind::Return(e) => {
            if let Some(e) = e {
                v.visit_expr(e);
            }
        }
        StmtKind::SyncLock { object, body } => {
            v.visit_expr(object);
            walk_block(v, body);
        }
        StmtKind::AddHandler { event, handler } | StmtKind::RemoveHandler { event, handler } => {
            v.visit_expr(event);
            v.visit_expr(handler);
        }
        StmtKind::Label(_)
        | StmtKind::Goto(_)
        | StmtKind::Exit(_)
        | StmtKind::Continue(_)
        | StmtKind::End
        | StmtKind::Stop
        | StmtKind::ExternDecl(_) => {}
    }
}

fn walk_case_clause<V: Visitor>(v: &mut V, clause: &CaseClause) {
    match clause {
        CaseClause::Value(e) | CaseClause::Guard(e) => v.visit_expr(e),
        CaseClause::Range { from, to } => {
            v.visit_expr(from);
            v.visit_expr(to);
        }
        CaseClause::Relational { operand, .. } => v.visit_expr(operand),
        CaseClause::TypeIs(_) => {}
    }
}

pub fn walk_declarator<V: Visitor>(v: &mut V, decl: &Declarator) {
    if let Some(bounds) = &decl.array_bounds {
        for b in bounds {
            v.visit_expr(b);
        }
    }
    if let Some(init) = &decl.init {
        v.visit_expr(init);
    }
}

pub fn walk_expr<V: Visitor>(v: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::IntLit(_)
        | ExprKind::FloatLit(_)
        | ExprKind::BoolLit(_)
        | ExprKind::StringLit(_)
        | ExprKind::CharLit(_)
        | ExprKind::Nothing
        | ExprKind::Ident(_) => {}
        ExprKind::Member { receiver, .. } => {
            if let Some(receiver) = receiver {
                v.visit_expr(receiver);
            }
        }
        ExprKind::Index { object, args } => {
            v.visit_expr(object);
            for a in args {
                v.visit_expr(a);
            }
        }
        ExprKind::Invoke { callee, args } => {
            v.visit_expr(callee);
            for a in args {
                v.visit_expr(a);
            }
        }
        ExprKind::New { args, .. } => {
            for a in args {
                v.visit_expr(a);
            }
        }
        ExprKind::ArrayLit(values) => {
            for value in values {
                v.visit_expr(value);
            }
        }
        ExprKind::Binary { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        ExprKind::Unary { operand, .. } => v.visit_expr(operand),
        ExprKind::TypeOfIs { operand, .. } => v.visit_expr(operand),
        ExprKind::AddressOf(target) => v.visit_expr(target),
    }
}
