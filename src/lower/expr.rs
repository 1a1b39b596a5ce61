//! Expression conversion. Mostly a mechanical one-to-one mapping; the two
//! places with real work are implicit-receiver shorthand (resolved against
//! the innermost `With` frame) and reference-equality operators.

use crate::ast::cs;
use crate::ast::vb::{self, ExprKind};
use crate::diagnostics::TranslateError;

use super::types::lower_type_syntax;
use super::Lowerer;

pub(crate) fn lower_expr(lw: &mut Lowerer, expr: &vb::Expr) -> Result<cs::Expr, TranslateError> {
    match &expr.kind {
        ExprKind::IntLit(v) => Ok(cs::Expr::IntLit(*v)),
        ExprKind::FloatLit(v) => Ok(cs::Expr::FloatLit(*v)),
        ExprKind::BoolLit(v) => Ok(cs::Expr::BoolLit(*v)),
        ExprKind::StringLit(s) => Ok(cs::Expr::StringLit(s.clone())),
        ExprKind::CharLit(c) => Ok(cs::Expr::CharLit(*c)),
        ExprKind::Nothing => Ok(cs::Expr::Null),
        ExprKind::Ident(name) => Ok(cs::Expr::Ident(name.clone())),
        ExprKind::Member { receiver, name, conditional } => {
            let object = match receiver {
                Some(receiver) => lower_expr(lw, receiver)?,
                // Shorthand member access routes through the innermost
                // implicit-receiver frame.
                None => match lw.withs.innermost() {
                    Some(frame) => frame.receiver.clone(),
                    None => {
                        return Err(TranslateError::unsupported(
                            format!("member access '.{name}' outside an implicit-receiver block"),
                            expr.id,
                            expr.span,
                        ));
                    }
                },
            };
            Ok(cs::Expr::Member {
                object: Box::new(object),
                name: name.clone(),
                conditional: *conditional,
            })
        }
        ExprKind::Index { object, args } => Ok(cs::Expr::Index {
            object: Box::new(lower_expr(lw, object)?),
            args: lower_exprs(lw, args)?,
        }),
        ExprKind::Invoke { callee, args } => Ok(cs::Expr::Invoke {
            callee: Box::new(lower_expr(lw, callee)?),
            args: lower_exprs(lw, args)?,
        }),
        ExprKind::New { ty, args } => Ok(cs::Expr::New {
            ty: lower_type_syntax(ty, expr.id, expr.span, lw.facts)?,
            args: lower_exprs(lw, args)?,
        }),
        ExprKind::ArrayLit(values) => Ok(cs::Expr::NewArrayInit {
            elem: None,
            values: lower_exprs(lw, values)?,
        }),
        ExprKind::Binary { op, lhs, rhs } => lower_binary(lw, *op, lhs, rhs),
        ExprKind::Unary { op, operand } => {
            let operand = lower_expr(lw, operand)?;
            let op = match op {
                vb::UnaryOp::Neg => cs::UnaryOp::Neg,
                vb::UnaryOp::Not => cs::UnaryOp::Not,
            };
            Ok(cs::Expr::Unary { op, operand: Box::new(operand) })
        }
        ExprKind::TypeOfIs { operand, ty } => Ok(cs::Expr::Is {
            operand: Box::new(lower_expr(lw, operand)?),
            ty: lower_type_syntax(ty, expr.id, expr.span, lw.facts)?,
        }),
        // A method-group reference needs no wrapper on the target side.
        ExprKind::AddressOf(target) => lower_expr(lw, target),
    }
}

pub(crate) fn lower_exprs(
    lw: &mut Lowerer,
    exprs: &[vb::Expr],
) -> Result<Vec<cs::Expr>, TranslateError> {
    exprs.iter().map(|e| lower_expr(lw, e)).collect()
}

fn lower_binary(
    lw: &mut Lowerer,
    op: vb::BinOp,
    lhs: &vb::Expr,
    rhs: &vb::Expr,
) -> Result<cs::Expr, TranslateError> {
    let is_nothing =
        |e: &vb::Expr| matches!(e.kind, ExprKind::Nothing);

    // Reference equality: against the null literal it is plain ==/!=,
    // otherwise it must go through ReferenceEquals to dodge operator
    // overloads.
    if matches!(op, vb::BinOp::Is | vb::BinOp::IsNot) {
        let lhs_cs = lower_expr(lw, lhs)?;
        let rhs_cs = lower_expr(lw, rhs)?;
        if is_nothing(lhs) || is_nothing(rhs) {
            let cmp = if op == vb::BinOp::Is { cs::BinOp::Eq } else { cs::BinOp::Ne };
            return Ok(cs::Expr::binary(cmp, lhs_cs, rhs_cs));
        }
        let call = cs::Expr::invoke(cs::Expr::ident("ReferenceEquals"), vec![lhs_cs, rhs_cs]);
        return Ok(if op == vb::BinOp::Is {
            call
        } else {
            cs::Expr::Unary { op: cs::UnaryOp::Not, operand: Box::new(call) }
        });
    }

    let lhs = lower_expr(lw, lhs)?;
    let rhs = lower_expr(lw, rhs)?;
    let op = match op {
        vb::BinOp::Add => cs::BinOp::Add,
        vb::BinOp::Sub => cs::BinOp::Sub,
        vb::BinOp::Mul => cs::BinOp::Mul,
        vb::BinOp::Div | vb::BinOp::IntDiv => cs::BinOp::Div,
        vb::BinOp::Mod => cs::BinOp::Mod,
        // String concatenation becomes operator + on the target.
        vb::BinOp::Concat => cs::BinOp::Add,
        vb::BinOp::Eq => cs::BinOp::Eq,
        vb::BinOp::Ne => cs::BinOp::Ne,
        vb::BinOp::Lt => cs::BinOp::Lt,
        vb::BinOp::LtEq => cs::BinOp::LtEq,
        vb::BinOp::Gt => cs::BinOp::Gt,
        vb::BinOp::GtEq => cs::BinOp::GtEq,
        // Non-short-circuit forms keep their eager evaluation.
        vb::BinOp::And => cs::BinOp::BitAnd,
        vb::BinOp::Or => cs::BinOp::BitOr,
        vb::BinOp::AndAlso => cs::BinOp::AndAlso,
        vb::BinOp::OrElse => cs::BinOp::OrElse,
        vb::BinOp::Is | vb::BinOp::IsNot => unreachable!("handled above"),
    };
    Ok(cs::Expr::binary(op, lhs, rhs))
}

/// Logical negation of an already-lowered condition, used when an
/// until-style condition becomes a while-style one. Comparisons flip their
/// operator, double negation cancels, everything else is wrapped in `!`.
pub fn negate(expr: cs::Expr) -> cs::Expr {
    match expr {
        cs::Expr::Unary { op: cs::UnaryOp::Not, operand } => *operand,
        cs::Expr::BoolLit(v) => cs::Expr::BoolLit(!v),
        cs::Expr::Binary { op, lhs, rhs } => {
            let flipped = match op {
                cs::BinOp::Eq => Some(cs::BinOp::Ne),
                cs::BinOp::Ne => Some(cs::BinOp::Eq),
                cs::BinOp::Lt => Some(cs::BinOp::GtEq),
                cs::BinOp::LtEq => Some(cs::BinOp::Gt),
                cs::BinOp::Gt => Some(cs::BinOp::LtEq),
                cs::BinOp::GtEq => Some(cs::BinOp::Lt),
                _ => None,
            };
            match flipped {
                Some(op) => cs::Expr::Binary { op, lhs, rhs },
                None => cs::Expr::Unary {
                    op: cs::UnaryOp::Not,
                    operand: Box::new(cs::Expr::Binary { op, lhs, rhs }),
                },
            }
        }
        other => cs::Expr::Unary { op: cs::UnaryOp::Not, operand: Box::new(other) },
    }
}
