//! Translation of parsed type annotations into type store entries.
//!
//! Only the outer constructor survives: `Array<T>` becomes `Array` and a
//! function type becomes `Function`. Element and parameter types stay in the
//! annotation tree, where declaration checks read them directly. Unions
//! become a fresh variable for the same reason.

use crate::store::{FieldMap, TypeId, TypeStore};
use jscriptor_ast::TypeAnnotation;
use smol_str::SmolStr;

/// Canonical concrete name for an annotation spelling.
///
/// Built-in lowercase spellings map to their capitalized names; anything else
/// is used with its first letter uppercased.
pub fn canonical_name(name: &str) -> SmolStr {
    match name {
        "number" => SmolStr::new_inline("Number"),
        "string" => SmolStr::new_inline("String"),
        "boolean" => SmolStr::new_inline("Boolean"),
        "void" | "Void" => SmolStr::new_inline("Void"),
        "Array" => SmolStr::new_inline("Array"),
        _ => {
            let mut chars = name.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>().into(),
                None => SmolStr::new_inline("Unknown"),
            }
        }
    }
}

/// Allocate the type for an annotation; a missing annotation is a fresh
/// variable.
pub fn type_from_annotation(store: &mut TypeStore, annotation: Option<&TypeAnnotation>) -> TypeId {
    let Some(annotation) = annotation else {
        return store.fresh();
    };

    match annotation {
        TypeAnnotation::Named { name, .. } => store.concrete(canonical_name(name)),
        TypeAnnotation::Array { .. } => store.concrete("Array"),
        TypeAnnotation::Function { .. } => store.concrete("Function"),
        TypeAnnotation::Object { fields, .. } => {
            let mut map = FieldMap::with_capacity(fields.len());
            for field in fields {
                let ty = type_from_annotation(store, Some(&field.ty));
                map.insert(field.name.clone(), ty);
            }
            store.object(map)
        }
        TypeAnnotation::Union { .. } => store.fresh(),
    }
}
