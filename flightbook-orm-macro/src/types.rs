//! # Type Mapping Module
//!
//! Converts the Rust types used by flightbook models into SQL column types.
//!
//! ## Supported Type Mappings
//!
//! ### Primitive Types
//! - `i16` → `SMALLINT`
//! - `i32` → `INTEGER`
//! - `i64` → `BIGINT`
//! - `String` → `TEXT` (or `VARCHAR(N)` with `#[orm(size = N)]`)
//! - `bool` → `BOOLEAN`
//! - `f64` → `DOUBLE PRECISION`
//!
//! ### Date Types (chrono)
//! - `NaiveDate` → `DATE`
//!
//! ### Nullable Types
//! - `Option<T>` → SQL type of `T` with `NULL` allowed

use syn::{GenericArgument, PathArguments, Type};

/// Maps a Rust type to its SQL type.
///
/// Returns the SQL type string and whether the column is nullable
/// (the field type was wrapped in `Option<T>`). Unknown types fall back to `TEXT`.
///
/// ```rust,ignore
/// let (sql_type, nullable) = rust_type_to_sql(&parse_quote!(Option<i64>));
/// assert_eq!(sql_type, "BIGINT");
/// assert!(nullable);
/// ```
pub fn rust_type_to_sql(ty: &Type) -> (String, bool) {
    if let Some(inner) = option_inner(ty) {
        let (inner_sql_type, _) = rust_type_to_sql(inner);
        return (inner_sql_type, true);
    }

    let sql_type = match last_ident(ty).as_deref() {
        Some("i8") | Some("i16") | Some("u8") => "SMALLINT",
        Some("i32") | Some("u16") => "INTEGER",
        Some("i64") | Some("u32") => "BIGINT",
        Some("bool") => "BOOLEAN",
        Some("f64") => "DOUBLE PRECISION",
        Some("f32") => "REAL",
        // Stored as ISO `YYYY-MM-DD`
        Some("NaiveDate") => "DATE",
        _ => "TEXT",
    };

    (sql_type.to_string(), false)
}

/// Returns the `T` of an `Option<T>`, or `None` for any other type.
pub fn option_inner(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty
        && let Some(segment) = type_path.path.segments.last()
        && segment.ident == "Option"
        && let PathArguments::AngleBracketed(args) = &segment.arguments
        && let Some(GenericArgument::Type(inner_ty)) = args.args.first()
    {
        return Some(inner_ty);
    }
    None
}

/// Checks whether the type (ignoring an `Option` wrapper) is `NaiveDate`.
pub fn is_naive_date(ty: &Type) -> bool {
    let ty = option_inner(ty).unwrap_or(ty);
    last_ident(ty).as_deref() == Some("NaiveDate")
}

fn last_ident(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => type_path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn maps_primitives() {
        assert_eq!(rust_type_to_sql(&parse_quote!(i64)), ("BIGINT".to_string(), false));
        assert_eq!(rust_type_to_sql(&parse_quote!(String)), ("TEXT".to_string(), false));
        assert_eq!(rust_type_to_sql(&parse_quote!(chrono::NaiveDate)), ("DATE".to_string(), false));
    }

    #[test]
    fn option_is_nullable() {
        assert_eq!(rust_type_to_sql(&parse_quote!(Option<i64>)), ("BIGINT".to_string(), true));
        assert!(is_naive_date(&parse_quote!(Option<NaiveDate>)));
        assert!(!is_naive_date(&parse_quote!(Option<String>)));
    }
}
