//! # Model Derive Macro Implementation
//!
//! Expands `#[derive(Model)]`: reads the struct-level `#[orm(table = "...")]`
//! and every field's `#[orm(...)]` attributes, then generates the
//! `flightbook_orm::Model` implementation plus a `{model}_fields` module of
//! column-name constants.
//!
//! ## Supported Attributes
//!
//! Struct level:
//! - `#[orm(table = "name")]` - Table name (defaults to the snake_case struct name)
//!
//! Field level:
//! - `#[orm(primary_key)]` - Marks field as primary key
//! - `#[orm(auto_increment)]` - Primary key generated by the store
//! - `#[orm(unique)]` - Adds UNIQUE constraint
//! - `#[orm(index)]` - Creates database index
//! - `#[orm(size = N)]` - Sets VARCHAR size for String fields
//! - `#[orm(foreign_key = "table::column")]` - Defines foreign key relationship
//! - `#[orm(on_delete = "cascade")]` - Referential action for the foreign key
//!
//! ## Example
//!
//! ```rust,ignore
//! #[derive(Model)]
//! #[orm(table = "posts")]
//! struct Post {
//!     #[orm(primary_key, auto_increment)]
//!     id: Option<i64>,
//!     #[orm(foreign_key = "users::id", on_delete = "cascade")]
//!     user_id: i64,
//!     note: String,
//! }
//!
//! // Generated:
//! impl Model for Post {
//!     fn table_name() -> &'static str { "posts" }
//!     fn columns() -> Vec<ColumnInfo> { /* ... */ }
//!     fn active_columns() -> Vec<&'static str> { vec!["id", "user_id", "note"] }
//!     fn to_map(&self) -> HashMap<String, String> { /* ... */ }
//! }
//!
//! pub mod post_fields {
//!     pub const ID: &str = "id";
//!     pub const USER_ID: &str = "user_id";
//!     pub const NOTE: &str = "note";
//! }
//! ```

// ============================================================================
// External Crate Imports
// ============================================================================

use heck::{ToShoutySnakeCase, ToSnakeCase};
use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, LitStr};

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::types::rust_type_to_sql;

// ============================================================================
// Attribute Parsing
// ============================================================================

/// Column options collected from a field's `#[orm(...)]` attributes.
#[derive(Default)]
struct FieldOptions {
    primary_key: bool,
    auto_increment: bool,
    unique: bool,
    index: bool,
    size: Option<usize>,
    foreign: Option<(String, String)>,
    on_delete: Option<String>,
}

fn parse_field_options(attrs: &[Attribute]) -> syn::Result<FieldOptions> {
    let mut opts = FieldOptions::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("orm")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("primary_key") {
                opts.primary_key = true;
            } else if meta.path.is_ident("auto_increment") {
                opts.auto_increment = true;
            } else if meta.path.is_ident("unique") {
                opts.unique = true;
            } else if meta.path.is_ident("index") {
                opts.index = true;
            } else if meta.path.is_ident("size") {
                let value: syn::LitInt = meta.value()?.parse()?;
                opts.size = Some(value.base10_parse::<usize>()?);
            } else if meta.path.is_ident("foreign_key") {
                // "table::column"
                let value: LitStr = meta.value()?.parse()?;
                let fk = value.value();
                match fk.split_once("::") {
                    Some((table, column)) if !table.is_empty() && !column.is_empty() => {
                        opts.foreign = Some((table.to_string(), column.to_string()));
                    }
                    _ => return Err(meta.error("Invalid format for foreign_key. Use 'table::column'")),
                }
            } else if meta.path.is_ident("on_delete") {
                let value: LitStr = meta.value()?.parse()?;
                let action = value.value().to_uppercase();
                match action.as_str() {
                    "CASCADE" | "SET NULL" | "RESTRICT" | "NO ACTION" => opts.on_delete = Some(action),
                    _ => return Err(meta.error("on_delete must be one of: cascade, set null, restrict, no action")),
                }
            } else {
                return Err(meta.error("unsupported orm attribute"));
            }
            Ok(())
        })?;
    }

    if opts.auto_increment && !opts.primary_key {
        return Err(syn::Error::new(Span::call_site(), "auto_increment requires primary_key"));
    }
    if opts.on_delete.is_some() && opts.foreign.is_none() {
        return Err(syn::Error::new(Span::call_site(), "on_delete requires foreign_key"));
    }

    Ok(opts)
}

fn parse_table_name(ast: &DeriveInput) -> syn::Result<String> {
    let mut table = None;
    for attr in ast.attrs.iter().filter(|a| a.path().is_ident("orm")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let value: LitStr = meta.value()?.parse()?;
                table = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported orm attribute on struct"))
            }
        })?;
    }
    Ok(table.unwrap_or_else(|| ast.ident.to_string().to_snake_case()))
}

// ============================================================================
// Macro Expansion Function
// ============================================================================

/// Expands the `#[derive(Model)]` macro.
///
/// Emits a compile error (instead of panicking) when the input is not a
/// struct with named fields or when an `#[orm(...)]` attribute is malformed.
pub fn expand(ast: DeriveInput) -> TokenStream {
    match try_expand(&ast) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn try_expand(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let struct_name = &ast.ident;
    let vis = &ast.vis;

    let fields = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => return Err(syn::Error::new_spanned(struct_name, "Model must have named fields")),
        },
        _ => return Err(syn::Error::new_spanned(struct_name, "Model must be a struct")),
    };

    let table_name = parse_table_name(ast)?;

    let mut column_defs = Vec::with_capacity(fields.len());
    let mut column_names = Vec::with_capacity(fields.len());
    let mut map_inserts = Vec::with_capacity(fields.len());
    let mut field_consts = Vec::with_capacity(fields.len());

    for f in fields {
        let Some(field_ident) = &f.ident else {
            continue;
        };
        let raw_name = field_ident.to_string();
        let column_name = raw_name.strip_prefix("r#").unwrap_or(&raw_name).to_string();

        let opts = parse_field_options(&f.attrs)?;
        let (mut sql_type, is_nullable) = rust_type_to_sql(&f.ty);

        if let Some(size) = opts.size
            && sql_type == "TEXT"
        {
            sql_type = format!("VARCHAR({})", size);
        }

        let is_primary_key = opts.primary_key;
        let auto_increment = opts.auto_increment;
        let unique = opts.unique;
        let index = opts.index;
        let (foreign_table, foreign_key) = match &opts.foreign {
            Some((table, column)) => (quote! { Some(#table) }, quote! { Some(#column) }),
            None => (quote! { None }, quote! { None }),
        };
        let on_delete = match &opts.on_delete {
            Some(action) => quote! { Some(#action) },
            None => quote! { None },
        };

        column_defs.push(quote! {
            flightbook_orm::ColumnInfo {
                name: #column_name,
                sql_type: #sql_type,
                is_primary_key: #is_primary_key,
                auto_increment: #auto_increment,
                is_nullable: #is_nullable,
                unique: #unique,
                index: #index,
                foreign_table: #foreign_table,
                foreign_key: #foreign_key,
                on_delete: #on_delete,
            }
        });

        // Option<T> fields are only written when Some
        map_inserts.push(if is_nullable {
            quote! {
                if let Some(val) = &self.#field_ident {
                    map.insert(#column_name.to_string(), val.to_string());
                }
            }
        } else {
            quote! {
                map.insert(#column_name.to_string(), self.#field_ident.to_string());
            }
        });

        let const_ident = format_ident!("{}", column_name.to_shouty_snake_case());
        field_consts.push(quote! {
            pub const #const_ident: &str = #column_name;
        });

        column_names.push(column_name);
    }

    let fields_mod = format_ident!("{}_fields", struct_name.to_string().to_snake_case());

    Ok(quote! {
        impl flightbook_orm::Model for #struct_name {
            fn table_name() -> &'static str {
                #table_name
            }

            fn columns() -> Vec<flightbook_orm::ColumnInfo> {
                vec![#(#column_defs),*]
            }

            fn active_columns() -> Vec<&'static str> {
                vec![#(#column_names),*]
            }

            fn to_map(&self) -> std::collections::HashMap<String, String> {
                let mut map = std::collections::HashMap::new();
                #(#map_inserts)*
                map
            }
        }

        /// Column names of the model, for use with `filter` and `order_by`.
        #[allow(dead_code)]
        #vis mod #fields_mod {
            #(#field_consts)*
        }
    })
}
