//! # Derive AnyRow Module
//!
//! Implements the `FromAnyRow` derive macro, which decodes a `sqlx::any::AnyRow`
//! into a struct by column name.
//!
//! The `Any` driver cannot decode dates, so `NaiveDate` fields (and
//! `Option<NaiveDate>`) are read as text and parsed; the query builder selects
//! such columns as text on every driver.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

use crate::types::{is_naive_date, option_inner};

/// Expands the `FromAnyRow` derive macro.
pub fn expand(input: DeriveInput) -> TokenStream {
    let struct_name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(struct_name, "Only structs with named fields are supported")
                    .to_compile_error();
            }
        },
        _ => return syn::Error::new_spanned(struct_name, "Only structs are supported").to_compile_error(),
    };

    let ext_logic = fields.iter().filter_map(|f| {
        let field_name = f.ident.as_ref()?;
        let field_type = &f.ty;
        let raw_name = field_name.to_string();
        let column_name = raw_name.strip_prefix("r#").unwrap_or(&raw_name).to_string();

        let tokens = if is_naive_date(field_type) && option_inner(field_type).is_some() {
            quote! {
                let #field_name: #field_type = {
                    let s: Option<String> = row.try_get(#column_name)?;
                    s.map(|s| flightbook_orm::temporal::parse_naive_date(&s))
                        .transpose()
                        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
                };
            }
        } else if is_naive_date(field_type) {
            quote! {
                let #field_name: #field_type = {
                    let s: String = row.try_get(#column_name)?;
                    flightbook_orm::temporal::parse_naive_date(&s)
                        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
                };
            }
        } else {
            quote! {
                let #field_name: #field_type = row.try_get(#column_name)?;
            }
        };
        Some(tokens)
    });

    let field_names = fields.iter().filter_map(|f| f.ident.as_ref());

    quote! {
        impl flightbook_orm::FromAnyRow for #struct_name {
            fn from_any_row(row: &sqlx::any::AnyRow) -> Result<Self, sqlx::Error> {
                use sqlx::Row;
                #(#ext_logic)*

                Ok(#struct_name {
                    #(#field_names),*
                })
            }
        }
    }
}
