//! Loop lowering. The interesting part is the inclusive-bound `For` header:
//! the source evaluates its upper bound exactly once before iteration
//! starts, so any bound that is not a literal or a bare identifier is
//! hoisted into a `loopTo` temporary. `Exit`/`Continue` keywords resolve
//! against the innermost matching construct, not syntactic proximity.

use crate::ast::cs;
use crate::ast::vb::{self, ContinueKind, ExitKind, LoopCondition};
use crate::diagnostics::TranslateError;

use super::expr::{lower_expr, negate};
use super::scope::Breakable;
use super::types::lower_type_syntax;
use super::Lowerer;

pub(crate) fn lower_for_next(
    lw: &mut Lowerer,
    stmt: &vb::Stmt,
    control: &vb::ForControl,
    from: &vb::Expr,
    to: &vb::Expr,
    step: Option<&vb::Expr>,
    body: &[vb::Stmt],
) -> Result<Vec<cs::Stmt>, TranslateError> {
    let mut out = Vec::new();

    let from_cs = lower_expr(lw, from)?;
    let control_cs = lower_expr(lw, &control.target)?;

    // Single evaluation of the inclusive bound: literals and bare
    // identifiers inline, everything else hoists.
    let bound = if to.is_literal_or_ident() {
        lower_expr(lw, to)?
    } else {
        let name = lw.names.fresh("loopTo");
        let value = lower_expr(lw, to)?;
        out.push(cs::Stmt::LocalDecl {
            ty: None,
            is_const: false,
            declarators: vec![cs::Declarator { name: name.clone(), init: Some(value) }],
        });
        cs::Expr::ident(name)
    };

    // The comparison keeps the bound itself in range: <= for ascending
    // steps, >= for descending ones.
    let (cmp, update) = match step {
        None => (
            cs::BinOp::LtEq,
            cs::Expr::Increment(Box::new(control_cs.clone())),
        ),
        Some(step_expr) => match step_expr.as_int_literal() {
            Some(1) => (
                cs::BinOp::LtEq,
                cs::Expr::Increment(Box::new(control_cs.clone())),
            ),
            Some(n) if n >= 0 => (
                cs::BinOp::LtEq,
                cs::Expr::Assign {
                    target: Box::new(control_cs.clone()),
                    op: cs::AssignOp::Add,
                    value: Box::new(cs::Expr::int(n)),
                },
            ),
            Some(n) => (
                cs::BinOp::GtEq,
                cs::Expr::Assign {
                    target: Box::new(control_cs.clone()),
                    op: cs::AssignOp::Sub,
                    value: Box::new(cs::Expr::int(-n)),
                },
            ),
            // A step of unknown sign cannot pick a comparison direction
            // without re-evaluating it; there is no native form.
            None => {
                return Err(TranslateError::unsupported(
                    "loop step must be an integer literal",
                    step_expr.id,
                    step_expr.span,
                ));
            }
        },
    };

    let init = if control.declares {
        let var = match &control.target.kind {
            vb::ExprKind::Ident(name) => name.clone(),
            _ => {
                return Err(TranslateError::unsupported(
                    "declaring loop header requires a simple control variable",
                    control.id,
                    stmt.span,
                ));
            }
        };
        let ty = control
            .ty
            .as_ref()
            .map(|t| lower_type_syntax(t, control.id, stmt.span, lw.facts))
            .transpose()?;
        cs::ForInit::Decl { ty, var, value: from_cs }
    } else {
        cs::ForInit::Assign { target: control_cs.clone(), value: from_cs }
    };

    lw.breakables.push(Breakable::For);
    let body_cs = lw.lower_block(body);
    lw.breakables.pop();

    out.push(cs::Stmt::For {
        init,
        condition: cs::Expr::binary(cmp, control_cs, bound),
        update,
        body: body_cs?,
    });
    Ok(out)
}

pub(crate) fn lower_for_each(
    lw: &mut Lowerer,
    stmt: &vb::Stmt,
    control: &vb::ForControl,
    iterable: &vb::Expr,
    body: &[vb::Stmt],
) -> Result<Vec<cs::Stmt>, TranslateError> {
    let var = match &control.target.kind {
        vb::ExprKind::Ident(name) if control.declares => name.clone(),
        _ => {
            // The target iteration statement always declares its variable.
            return Err(TranslateError::unsupported(
                "iteration over an existing variable has no native form",
                control.id,
                stmt.span,
            ));
        }
    };
    let ty = control
        .ty
        .as_ref()
        .map(|t| lower_type_syntax(t, control.id, stmt.span, lw.facts))
        .transpose()?;
    let iterable = lower_expr(lw, iterable)?;

    lw.breakables.push(Breakable::For);
    let body_cs = lw.lower_block(body);
    lw.breakables.pop();

    Ok(vec![cs::Stmt::Foreach { ty, var, iterable, body: body_cs? }])
}

pub(crate) fn lower_while(
    lw: &mut Lowerer,
    condition: &vb::Expr,
    body: &[vb::Stmt],
) -> Result<Vec<cs::Stmt>, TranslateError> {
    let condition = lower_expr(lw, condition)?;
    lw.breakables.push(Breakable::While);
    let body_cs = lw.lower_block(body);
    lw.breakables.pop();
    Ok(vec![cs::Stmt::While { condition, body: body_cs? }])
}

pub(crate) fn lower_do_loop(
    lw: &mut Lowerer,
    condition: Option<&LoopCondition>,
    body: &[vb::Stmt],
) -> Result<Vec<cs::Stmt>, TranslateError> {
    lw.breakables.push(Breakable::Do);
    let body_cs = lw.lower_block(body);
    lw.breakables.pop();
    let body_cs = body_cs?;

    let stmt = match condition {
        Some(LoopCondition::PreWhile(c)) => {
            cs::Stmt::While { condition: lower_expr(lw, c)?, body: body_cs }
        }
        Some(LoopCondition::PreUntil(c)) => {
            cs::Stmt::While { condition: negate(lower_expr(lw, c)?), body: body_cs }
        }
        Some(LoopCondition::PostWhile(c)) => {
            cs::Stmt::DoWhile { body: body_cs, condition: lower_expr(lw, c)? }
        }
        Some(LoopCondition::PostUntil(c)) => {
            cs::Stmt::DoWhile { body: body_cs, condition: negate(lower_expr(lw, c)?) }
        }
        // No condition anywhere: synthesize the always-true trailing one.
        None => cs::Stmt::DoWhile { body: body_cs, condition: cs::Expr::BoolLit(true) },
    };
    Ok(vec![stmt])
}

pub(crate) fn lower_exit(
    lw: &mut Lowerer,
    stmt: &vb::Stmt,
    kind: ExitKind,
) -> Result<Vec<cs::Stmt>, TranslateError> {
    let unsupported = |msg: &str| TranslateError::unsupported(msg, stmt.id, stmt.span);

    match kind {
        ExitKind::Procedure => Ok(vec![if lw.is_iterator {
            cs::Stmt::YieldBreak
        } else {
            cs::Stmt::Return(None)
        }]),
        ExitKind::Select => match lw.breakables.last() {
            Some(Breakable::SwitchNative) => Ok(vec![cs::Stmt::Break]),
            Some(Breakable::SwitchLadder) => Err(unsupported(
                "exit from a guarded-ladder branch construct has no native form",
            )),
            _ => Err(unsupported("exit-select outside a branch construct")),
        },
        ExitKind::For | ExitKind::While | ExitKind::Do => {
            let wanted = match kind {
                ExitKind::For => Breakable::For,
                ExitKind::While => Breakable::While,
                _ => Breakable::Do,
            };
            // break binds the innermost breakable construct; if that is not
            // the loop this keyword names, there is no native form.
            match lw.breakables.last() {
                Some(&top) if top == wanted => Ok(vec![cs::Stmt::Break]),
                Some(_) => Err(unsupported(
                    "exit statement does not target the innermost enclosing construct",
                )),
                None => Err(unsupported("exit statement outside a loop")),
            }
        }
    }
}

pub(crate) fn lower_continue(
    lw: &mut Lowerer,
    stmt: &vb::Stmt,
    kind: ContinueKind,
) -> Result<Vec<cs::Stmt>, TranslateError> {
    let wanted = match kind {
        ContinueKind::For => Breakable::For,
        ContinueKind::While => Breakable::While,
        ContinueKind::Do => Breakable::Do,
    };
    // continue passes through switch constructs to the innermost loop.
    let innermost_loop = lw.breakables.iter().rev().copied().find(|b| b.is_loop());
    match innermost_loop {
        Some(top) if top == wanted => Ok(vec![cs::Stmt::Continue]),
        Some(_) => Err(TranslateError::unsupported(
            "continue statement does not target the innermost enclosing loop",
            stmt.id,
            stmt.span,
        )),
        None => Err(TranslateError::unsupported(
            "continue statement outside a loop",
            stmt.id,
            stmt.span,
        )),
    }
}
