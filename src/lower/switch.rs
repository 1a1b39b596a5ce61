//! Multi-way branch lowering. A construct whose every clause is an exact
//! constant match becomes a native switch; one relational, range, type, or
//! guard clause anywhere demotes the whole construct to a guarded ladder so
//! the discriminant is never re-evaluated or reordered. Also lowers
//! multi-line conditional chains.

use crate::ast::cs;
use crate::ast::vb::{self, CaseClause, CaseSection, IfBranch, RelationalOp};
use crate::diagnostics::TranslateError;
use crate::facts::SymbolKind;

use super::expr::lower_expr;
use super::scope::Breakable;
use super::types::lower_type_syntax;
use super::Lowerer;

pub(crate) fn lower_select(
    lw: &mut Lowerer,
    stmt: &vb::Stmt,
    discriminant: &vb::Expr,
    sections: &[CaseSection],
    else_section: Option<&[vb::Stmt]>,
) -> Result<Vec<cs::Stmt>, TranslateError> {
    if sections.iter().all(|s| s.clauses.iter().all(|c| is_exact_constant(lw, c))) {
        lower_native_switch(lw, stmt, discriminant, sections, else_section)
    } else {
        lower_guarded_ladder(lw, stmt, discriminant, sections, else_section)
    }
}

/// Whether a clause is an exact-value match the native dispatch can label:
/// a literal constant or a constant/enum-member reference.
fn is_exact_constant(lw: &Lowerer, clause: &CaseClause) -> bool {
    let CaseClause::Value(expr) = clause else { return false };
    match &expr.kind {
        vb::ExprKind::IntLit(_)
        | vb::ExprKind::StringLit(_)
        | vb::ExprKind::CharLit(_)
        | vb::ExprKind::BoolLit(_) => true,
        vb::ExprKind::Unary { op: vb::UnaryOp::Neg, operand } => {
            matches!(operand.kind, vb::ExprKind::IntLit(_))
        }
        vb::ExprKind::Ident(_) | vb::ExprKind::Member { .. } => matches!(
            lw.facts.symbol_kind_of(expr.id),
            Some(SymbolKind::EnumMember | SymbolKind::Const)
        ),
        _ => false,
    }
}

fn lower_native_switch(
    lw: &mut Lowerer,
    stmt: &vb::Stmt,
    discriminant: &vb::Expr,
    sections: &[CaseSection],
    else_section: Option<&[vb::Stmt]>,
) -> Result<Vec<cs::Stmt>, TranslateError> {
    let discriminant = lower_expr(lw, discriminant)?;

    let mut out_sections = Vec::with_capacity(sections.len());
    for section in sections {
        // The construct committed to native dispatch; a non-value clause
        // here means the decision pass and the emission pass disagree.
        let values: Vec<&vb::Expr> = section
            .clauses
            .iter()
            .map(|c| match c {
                CaseClause::Value(e) => Ok(e),
                _ => Err(TranslateError::inconsistent_dispatch(
                    "non-constant clause in a construct committed to native dispatch",
                    stmt.id,
                    stmt.span,
                )),
            })
            .collect::<Result<_, _>>()?;
        let labels = values
            .into_iter()
            .map(|e| lower_expr(lw, e))
            .collect::<Result<Vec<_>, _>>()?;

        lw.breakables.push(Breakable::SwitchNative);
        let body = lw.lower_block(&section.body);
        lw.breakables.pop();
        let mut body = body?;
        // Never fall through implicitly into the next section.
        if !ends_with_jump(&body) {
            body.push(cs::Stmt::Break);
        }
        out_sections.push(cs::SwitchSection { labels, body });
    }

    let default = match else_section {
        Some(stmts) => {
            lw.breakables.push(Breakable::SwitchNative);
            let body = lw.lower_block(stmts);
            lw.breakables.pop();
            let mut body = body?;
            if !ends_with_jump(&body) {
                body.push(cs::Stmt::Break);
            }
            Some(body)
        }
        None => None,
    };

    Ok(vec![cs::Stmt::Switch { discriminant, sections: out_sections, default }])
}

fn lower_guarded_ladder(
    lw: &mut Lowerer,
    stmt: &vb::Stmt,
    discriminant: &vb::Expr,
    sections: &[CaseSection],
    else_section: Option<&[vb::Stmt]>,
) -> Result<Vec<cs::Stmt>, TranslateError> {
    // Evaluate the discriminant exactly once; every guard reuses the
    // binding.
    let name = lw.names.fresh("switchExpr");
    let binding = cs::Stmt::LocalDecl {
        ty: None,
        is_const: false,
        declarators: vec![cs::Declarator {
            name: name.clone(),
            init: Some(lower_expr(lw, discriminant)?),
        }],
    };
    let disc = cs::Expr::ident(name);

    // Guards and bodies in source order; first match wins.
    let mut lowered: Vec<(cs::Expr, Vec<cs::Stmt>)> = Vec::with_capacity(sections.len());
    for section in sections {
        let mut guard: Option<cs::Expr> = None;
        for clause in &section.clauses {
            let test = clause_guard(lw, stmt, &disc, clause)?;
            guard = Some(match guard {
                Some(prev) => cs::Expr::binary(cs::BinOp::OrElse, prev, test),
                None => test,
            });
        }
        let Some(guard) = guard else {
            return Err(TranslateError::inconsistent_dispatch(
                "case section with no clauses",
                stmt.id,
                stmt.span,
            ));
        };

        lw.breakables.push(Breakable::SwitchLadder);
        let body = lw.lower_block(&section.body);
        lw.breakables.pop();
        lowered.push((guard, body?));
    }

    let mut tail: Option<Vec<cs::Stmt>> = match else_section {
        Some(stmts) => {
            lw.breakables.push(Breakable::SwitchLadder);
            let body = lw.lower_block(stmts);
            lw.breakables.pop();
            Some(body?)
        }
        None => None,
    };
    for (guard, body) in lowered.into_iter().rev() {
        tail = Some(vec![cs::Stmt::If {
            condition: guard,
            then_body: body,
            else_body: tail,
        }]);
    }

    let mut block = vec![binding];
    block.extend(tail.unwrap_or_default());
    Ok(vec![cs::Stmt::Block(block)])
}

fn clause_guard(
    lw: &mut Lowerer,
    stmt: &vb::Stmt,
    disc: &cs::Expr,
    clause: &CaseClause,
) -> Result<cs::Expr, TranslateError> {
    match clause {
        CaseClause::Value(e) => {
            Ok(cs::Expr::binary(cs::BinOp::Eq, disc.clone(), lower_expr(lw, e)?))
        }
        CaseClause::Range { from, to } => {
            let lo = cs::Expr::binary(cs::BinOp::LtEq, lower_expr(lw, from)?, disc.clone());
            let hi = cs::Expr::binary(cs::BinOp::LtEq, disc.clone(), lower_expr(lw, to)?);
            Ok(cs::Expr::binary(cs::BinOp::AndAlso, lo, hi))
        }
        CaseClause::Relational { op, operand } => {
            let op = match op {
                RelationalOp::Lt => cs::BinOp::Lt,
                RelationalOp::LtEq => cs::BinOp::LtEq,
                RelationalOp::Gt => cs::BinOp::Gt,
                RelationalOp::GtEq => cs::BinOp::GtEq,
                RelationalOp::Eq => cs::BinOp::Eq,
                RelationalOp::Ne => cs::BinOp::Ne,
            };
            Ok(cs::Expr::binary(op, disc.clone(), lower_expr(lw, operand)?))
        }
        CaseClause::TypeIs(ty) => Ok(cs::Expr::Is {
            operand: Box::new(disc.clone()),
            ty: lower_type_syntax(ty, stmt.id, stmt.span, lw.facts)?,
        }),
        CaseClause::Guard(e) => lower_expr(lw, e),
    }
}

/// Whether a section body already ends in a statement that cannot fall
/// through.
fn ends_with_jump(stmts: &[cs::Stmt]) -> bool {
    matches!(
        stmts.last(),
        Some(
            cs::Stmt::Break
                | cs::Stmt::Continue
                | cs::Stmt::Return(_)
                | cs::Stmt::YieldBreak
                | cs::Stmt::Throw(_)
                | cs::Stmt::Goto(_)
        )
    )
}

pub(crate) fn lower_if(
    lw: &mut Lowerer,
    branches: &[IfBranch],
    else_body: Option<&[vb::Stmt]>,
) -> Result<Vec<cs::Stmt>, TranslateError> {
    // Lower in document order (temporary synthesis depends on it), then
    // fold the arms into a single else-if chain.
    let mut lowered = Vec::with_capacity(branches.len());
    for branch in branches {
        let condition = lower_expr(lw, &branch.condition)?;
        let then_body = lw.lower_block(&branch.body)?;
        lowered.push((condition, then_body));
    }
    let mut tail: Option<Vec<cs::Stmt>> = match else_body {
        Some(stmts) => Some(lw.lower_block(stmts)?),
        None => None,
    };
    for (condition, then_body) in lowered.into_iter().rev() {
        tail = Some(vec![cs::Stmt::If { condition, then_body, else_body: tail }]);
    }
    // At least one branch always exists; the final tail is the if chain.
    Ok(tail.unwrap_or_default())
}
