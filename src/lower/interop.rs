//! External-procedure declarations lower to calling-convention-annotated
//! extern stubs: library, entry point, character set, by-reference
//! parameter markers. A binding contract only — no body is emitted.

use crate::ast::cs;
use crate::ast::vb::{self, DeclareDecl};
use crate::diagnostics::TranslateError;

use super::types::lower_type_syntax;

use crate::facts::SemanticFacts;

pub fn lower_declare(
    decl: &DeclareDecl,
    facts: &dyn SemanticFacts,
) -> Result<cs::ExternFunction, TranslateError> {
    let mut params = Vec::with_capacity(decl.params.len());
    for param in &decl.params {
        let Some(ty) = &param.ty else {
            return Err(TranslateError::unsupported(
                format!("untyped parameter '{}' in external declaration", param.name.node),
                decl.id,
                decl.span,
            ));
        };
        params.push(cs::ExternParam {
            name: param.name.node.clone(),
            ty: lower_type_syntax(ty, decl.id, decl.span, facts)?,
            by_ref: param.by_ref,
        });
    }

    let return_type = decl
        .return_type
        .as_ref()
        .map(|t| lower_type_syntax(t, decl.id, decl.span, facts))
        .transpose()?;

    Ok(cs::ExternFunction {
        library: decl.library.clone(),
        // The alias wins; otherwise the declared name is the entry point
        // and needs no separate annotation.
        entry_point: decl.alias.clone(),
        char_set: decl.char_set.map(|c| match c {
            vb::CharSet::Ansi => cs::CharSet::Ansi,
            vb::CharSet::Unicode => cs::CharSet::Unicode,
            vb::CharSet::Auto => cs::CharSet::Auto,
        }),
        name: decl.name.node.clone(),
        params,
        return_type,
    })
}
