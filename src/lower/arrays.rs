//! Array resize lowering. A resize-in-place reassigns the source variable,
//! so a content-preserving resize expands to capture / allocate / guarded
//! copy, and `Erase` is a plain null assignment. Inclusive bounds become
//! extents by a uniform `+1` on every dimension (folded for literals).

use crate::ast::cs;
use crate::ast::vb::{self, RedimTarget};
use crate::diagnostics::TranslateError;
use crate::facts::TypeRef;

use super::expr::lower_expr;
use super::types::lower_type_ref;
use super::Lowerer;

/// Inclusive upper bound → extent. Literal bounds fold the `+1`.
pub(crate) fn bound_to_extent(
    lw: &mut Lowerer,
    bound: &vb::Expr,
) -> Result<cs::Expr, TranslateError> {
    if let Some(n) = bound.as_int_literal() {
        return Ok(cs::Expr::int(n + 1));
    }
    let lowered = lower_expr(lw, bound)?;
    Ok(cs::Expr::binary(cs::BinOp::Add, lowered, cs::Expr::int(1)))
}

/// `new T[b0 + 1, b1 + 1, …]` from inclusive bounds.
pub(crate) fn alloc_from_bounds(
    lw: &mut Lowerer,
    elem: cs::Type,
    bounds: &[vb::Expr],
) -> Result<cs::Expr, TranslateError> {
    let extents = bounds
        .iter()
        .map(|b| bound_to_extent(lw, b))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(cs::Expr::NewArray { elem, extents })
}

pub(crate) fn lower_redim(
    lw: &mut Lowerer,
    preserve: bool,
    targets: &[RedimTarget],
) -> Result<Vec<cs::Stmt>, TranslateError> {
    let mut out = Vec::new();
    for target in targets {
        lower_redim_target(lw, preserve, target, &mut out)?;
    }
    Ok(out)
}

fn lower_redim_target(
    lw: &mut Lowerer,
    preserve: bool,
    target: &RedimTarget,
    out: &mut Vec<cs::Stmt>,
) -> Result<(), TranslateError> {
    let target_cs = lower_expr(lw, &target.target)?;

    let resolved = lw.facts.resolve_type(target.id).ok_or_else(|| {
        TranslateError::missing_fact("resolve_type(resize target)", target.id, target.span)
    })?;
    let elem = match &resolved {
        TypeRef::Array { elem, .. } => lower_type_ref(elem, target.id, lw.facts),
        TypeRef::Named { .. } => {
            return Err(TranslateError::unsupported(
                "resize target is not an array",
                target.id,
                target.span,
            ));
        }
    };

    let rank = target.bounds.len() as u32;
    let extents = target
        .bounds
        .iter()
        .map(|b| bound_to_extent(lw, b))
        .collect::<Result<Vec<_>, _>>()?;
    let alloc = cs::Expr::NewArray { elem, extents: extents.clone() };

    if !preserve {
        out.push(cs::Stmt::Expr(cs::Expr::assign(target_cs, alloc)));
        return Ok(());
    }

    // Capture the prior value once, then reassign and copy behind a null
    // guard.
    let old_name = lw.names.fresh(&format!("old{}", capitalize(leaf_name(&target.target))));
    let old = cs::Expr::ident(old_name.clone());
    out.push(cs::Stmt::LocalDecl {
        ty: None,
        is_const: false,
        declarators: vec![cs::Declarator { name: old_name, init: Some(target_cs.clone()) }],
    });
    out.push(cs::Stmt::Expr(cs::Expr::assign(target_cs.clone(), alloc)));

    let copy = if rank <= 1 {
        // Flat copy of min(new extent, old length) elements.
        let len = cs::Expr::invoke_static(
            "Math",
            "Min",
            vec![extents[0].clone(), cs::Expr::member(old.clone(), "Length")],
        );
        cs::Stmt::Expr(cs::Expr::invoke_static(
            "Array",
            "Copy",
            vec![old.clone(), target_cs.clone(), len],
        ))
    } else {
        row_copy_loop(lw, &old, &target_cs, rank)
    };

    out.push(cs::Stmt::If {
        condition: cs::Expr::not_null(old),
        then_body: vec![copy],
        else_body: None,
    });
    Ok(())
}

/// Row-by-row copy for rank > 1: a flat bulk copy is invalid once a
/// trailing dimension's extent changes, so copy stride-sized rows, with the
/// row count and the per-row length both clamped to the smaller side.
fn row_copy_loop(lw: &mut Lowerer, old: &cs::Expr, target: &cs::Expr, rank: u32) -> cs::Stmt {
    let last_dim = cs::Expr::int((rank - 1) as i64);
    let stride_of = |arr: &cs::Expr| {
        cs::Expr::invoke(
            cs::Expr::member(arr.clone(), "GetLength"),
            vec![last_dim.clone()],
        )
    };
    let rows_of = |arr: &cs::Expr| {
        cs::Expr::binary(
            cs::BinOp::Div,
            cs::Expr::member(arr.clone(), "Length"),
            stride_of(arr),
        )
    };

    let old_stride = stride_of(old);
    let new_stride = stride_of(target);
    let row_bound = cs::Expr::binary(
        cs::BinOp::Sub,
        cs::Expr::invoke_static("Math", "Min", vec![rows_of(old), rows_of(target)]),
        cs::Expr::int(1),
    );

    let i_name = lw.names.fresh("i");
    let i = cs::Expr::ident(i_name.clone());
    let copy = cs::Expr::invoke_static(
        "Array",
        "Copy",
        vec![
            old.clone(),
            cs::Expr::binary(cs::BinOp::Mul, i.clone(), old_stride.clone()),
            target.clone(),
            cs::Expr::binary(cs::BinOp::Mul, i.clone(), new_stride.clone()),
            cs::Expr::invoke_static("Math", "Min", vec![old_stride, new_stride]),
        ],
    );

    cs::Stmt::For {
        init: cs::ForInit::Decl { ty: None, var: i_name, value: cs::Expr::int(0) },
        condition: cs::Expr::binary(cs::BinOp::LtEq, i.clone(), row_bound),
        update: cs::Expr::Increment(Box::new(i)),
        body: vec![cs::Stmt::Expr(copy)],
    }
}

pub(crate) fn lower_erase(
    lw: &mut Lowerer,
    targets: &[vb::Expr],
) -> Result<Vec<cs::Stmt>, TranslateError> {
    targets
        .iter()
        .map(|t| {
            let target = lower_expr(lw, t)?;
            Ok(cs::Stmt::Expr(cs::Expr::assign(target, cs::Expr::Null)))
        })
        .collect()
}

/// Leaf identifier of a resize target, used to derive the capture
/// temporary's name.
fn leaf_name(expr: &vb::Expr) -> &str {
    match &expr.kind {
        vb::ExprKind::Ident(name) => name,
        vb::ExprKind::Member { name, .. } => name,
        _ => "Array",
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
