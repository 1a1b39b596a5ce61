//! Type-syntax lowering. Well-known source type names map straight to the
//! target's predefined keywords; anything else needs the facts provider to
//! resolve a type and render its minimal display name in context.

use crate::ast::cs;
use crate::ast::vb::TypeSyntax;
use crate::diagnostics::TranslateError;
use crate::facts::{SemanticFacts, TypeRef};
use crate::span::{NodeId, Span};

/// Predefined keyword for a well-known source type name, if any.
pub fn predefined_name(source: &str) -> Option<&'static str> {
    let name = match source.to_ascii_lowercase().as_str() {
        "boolean" => "bool",
        "byte" => "byte",
        "sbyte" => "sbyte",
        "short" => "short",
        "ushort" => "ushort",
        "integer" => "int",
        "uinteger" => "uint",
        "long" => "long",
        "ulong" => "ulong",
        "single" => "float",
        "double" => "double",
        "decimal" => "decimal",
        "char" => "char",
        "string" => "string",
        "object" => "object",
        "date" => "DateTime",
        _ => return None,
    };
    Some(name)
}

/// Lower written type syntax. `node`/`span` identify the owning source node
/// for fact lookups and failure reporting.
pub fn lower_type_syntax(
    ty: &TypeSyntax,
    node: NodeId,
    span: Span,
    facts: &dyn SemanticFacts,
) -> Result<cs::Type, TranslateError> {
    match ty {
        TypeSyntax::Named(name) => {
            if let Some(predefined) = predefined_name(name) {
                return Ok(cs::Type::named(predefined));
            }
            let resolved = facts
                .resolve_type(node)
                .ok_or_else(|| TranslateError::missing_fact(format!("resolve_type({name})"), node, span))?;
            Ok(lower_type_ref(&resolved, node, facts))
        }
        TypeSyntax::Array { elem, rank } => {
            let elem = lower_type_syntax(elem, node, span, facts)?;
            Ok(cs::Type::array(elem, *rank))
        }
    }
}

/// Lower a resolved type to target type syntax using the provider's
/// minimal display name for named types.
pub fn lower_type_ref(ty: &TypeRef, context: NodeId, facts: &dyn SemanticFacts) -> cs::Type {
    match ty {
        TypeRef::Named { name, nullable } => {
            let display = predefined_name(name)
                .map(str::to_string)
                .unwrap_or_else(|| facts.minimal_display_name(ty, context));
            if *nullable {
                cs::Type::named(format!("{display}?"))
            } else {
                cs::Type::named(display)
            }
        }
        TypeRef::Array { elem, rank } => {
            cs::Type::array(lower_type_ref(elem, context, facts), *rank)
        }
    }
}
