//! Exception construct lowering. Catch sections map one-to-one in source
//! order (first matching section wins), guard clauses become native
//! exception filters, and finally blocks carry over unchanged.

use crate::ast::cs;
use crate::ast::vb::{self, CatchSection};
use crate::diagnostics::TranslateError;

use super::expr::lower_expr;
use super::types::lower_type_syntax;
use super::Lowerer;

pub(crate) fn lower_try(
    lw: &mut Lowerer,
    stmt: &vb::Stmt,
    body: &[vb::Stmt],
    catches: &[CatchSection],
    finally: Option<&[vb::Stmt]>,
) -> Result<Vec<cs::Stmt>, TranslateError> {
    let body = lw.lower_block(body)?;

    let mut out_catches = Vec::with_capacity(catches.len());
    for catch in catches {
        let ty = catch
            .ty
            .as_ref()
            .map(|t| lower_type_syntax(t, catch.id, stmt.span, lw.facts))
            .transpose()?;
        let filter = catch.filter.as_ref().map(|f| lower_expr(lw, f)).transpose()?;
        let catch_body = lw.lower_block(&catch.body)?;
        out_catches.push(cs::CatchClause {
            ty,
            var: catch.var.as_ref().map(|v| v.node.clone()),
            filter,
            body: catch_body,
        });
    }

    let finally = match finally {
        Some(stmts) => Some(lw.lower_block(stmts)?),
        None => None,
    };

    Ok(vec![cs::Stmt::Try { body, catches: out_catches, finally }])
}

pub(crate) fn lower_throw(
    lw: &mut Lowerer,
    value: Option<&vb::Expr>,
) -> Result<Vec<cs::Stmt>, TranslateError> {
    let value = value.map(|e| lower_expr(lw, e)).transpose()?;
    Ok(vec![cs::Stmt::Throw(value)])
}
