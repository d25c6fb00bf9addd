//! # flightbook ORM Procedural Macros
//!
//! Derive macros re-exported by `flightbook-orm`:
//!
//! - **`#[derive(Model)]`**: table name, column metadata, value map and a
//!   `{model}_fields` module of column-name constants
//! - **`#[derive(FromAnyRow)]`**: decoding of `sqlx::any::AnyRow` results
//!
//! ## Usage
//!
//! ```rust,ignore
//! use flightbook_orm::{FromAnyRow, Model};
//!
//! #[derive(Model, FromAnyRow)]
//! #[orm(table = "users")]
//! struct User {
//!     #[orm(primary_key, auto_increment)]
//!     id: Option<i64>,
//!     #[orm(size = 255, unique)]
//!     uid: String,
//! }
//! ```
//!
//! Generated code refers to `flightbook_orm` and `sqlx` by name, so both must
//! be dependencies of the crate using the derives.

#![warn(missing_docs)]

// ============================================================================
// External Crate Imports
// ============================================================================

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

// ============================================================================
// Module Declarations
// ============================================================================

/// Rust → SQL type mapping.
mod types;

/// `#[derive(Model)]` expansion.
mod derive_model;

/// `#[derive(FromAnyRow)]` expansion.
mod derive_anyrow;

// ============================================================================
// Procedural Macro Definitions
// ============================================================================

/// Derives the `Model` trait for a struct.
///
/// # Supported Attributes
///
/// On the struct:
///
/// * `table = "name"` - Table name; defaults to the snake_case struct name
///
/// On fields:
///
/// * `primary_key` - Marks the field as a primary key
/// * `auto_increment` - The store generates the key (use `Option<i64>`)
/// * `unique` - Adds a UNIQUE constraint
/// * `index` - Creates a database index
/// * `size = N` - Sets column size (VARCHAR(N))
/// * `foreign_key = "table::column"` - Defines a Foreign Key relationship
/// * `on_delete = "cascade"` - Referential action of the foreign key
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Model)]
/// #[orm(table = "bookings")]
/// struct Booking {
///     #[orm(primary_key, size = 255)]
///     bookingid: String,
///     #[orm(size = 20)]
///     destination: String,
///     #[orm(foreign_key = "users::id", on_delete = "cascade")]
///     user_id: Option<i64>,
/// }
/// ```
#[proc_macro_derive(Model, attributes(orm))]
pub fn model_derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    TokenStream::from(derive_model::expand(ast))
}

/// Derives `FromAnyRow`, mapping `AnyRow` columns to struct fields by name.
///
/// `NaiveDate` fields are decoded from their ISO text form.
#[proc_macro_derive(FromAnyRow)]
pub fn any_derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    TokenStream::from(derive_anyrow::expand(ast))
}
