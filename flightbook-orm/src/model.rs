//! # Model Module
//!
//! The `Model` trait and the column metadata used to create tables and build
//! queries.
//!
//! `Model` is normally implemented with `#[derive(Model)]`:
//!
//! ```rust,ignore
//! use flightbook_orm::{FromAnyRow, Model};
//! use chrono::NaiveDate;
//!
//! #[derive(Model, FromAnyRow, Debug, Clone)]
//! #[orm(table = "users")]
//! struct User {
//!     #[orm(primary_key, auto_increment)]
//!     id: Option<i64>,
//!
//!     #[orm(size = 255, unique)]
//!     uid: String,
//!
//!     dob: NaiveDate,
//! }
//! ```

// ============================================================================
// External Crate Imports
// ============================================================================

use std::collections::HashMap;

use heck::ToSnakeCase;

// ============================================================================
// Column Metadata Structure
// ============================================================================

/// Metadata about a database column, generated by `#[derive(Model)]`.
///
/// # SQL Type Mapping
///
/// - `i32` → `"INTEGER"`
/// - `i64` → `"BIGINT"`
/// - `String` → `"TEXT"` or `"VARCHAR(N)"` with a size attribute
/// - `bool` → `"BOOLEAN"`
/// - `f64` → `"DOUBLE PRECISION"`
/// - `NaiveDate` → `"DATE"`
/// - `Option<T>` → Same as T, but `is_nullable = true`
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    /// The column name in the database.
    pub name: &'static str,

    /// The SQL type of the column, used verbatim in CREATE TABLE.
    pub sql_type: &'static str,

    /// Whether this column is the primary key.
    pub is_primary_key: bool,

    /// Whether the store generates the value on insert.
    ///
    /// Rendered per driver: `INTEGER PRIMARY KEY AUTOINCREMENT` on SQLite,
    /// `BIGSERIAL PRIMARY KEY` on PostgreSQL, `AUTO_INCREMENT` on MySQL.
    pub auto_increment: bool,

    /// Whether NULL is allowed (the field is an `Option<T>`).
    pub is_nullable: bool,

    /// Whether this column has a UNIQUE constraint.
    pub unique: bool,

    /// Whether an index `idx_{table}_{column}` is created for this column.
    pub index: bool,

    /// The referenced table, if this is a foreign key.
    pub foreign_table: Option<&'static str>,

    /// The referenced column, if this is a foreign key.
    pub foreign_key: Option<&'static str>,

    /// Referential action on delete (e.g. `"CASCADE"`).
    pub on_delete: Option<&'static str>,
}

impl ColumnInfo {
    /// The column name as written in SQL.
    pub fn sql_name(&self) -> String {
        self.name.strip_prefix("r#").unwrap_or(self.name).to_snake_case()
    }

    /// Whether values of this column travel as ISO date text.
    pub fn is_date(&self) -> bool {
        self.sql_type == "DATE"
    }
}

// ============================================================================
// Model Trait
// ============================================================================

/// A struct mapped to a database table.
///
/// # Required Methods
///
/// * `table_name()` - Returns the table name
/// * `columns()` - Returns column metadata
/// * `active_columns()` - Returns column names
/// * `to_map()` - Serializes the instance to column → string value
pub trait Model {
    /// The table name used in SQL.
    fn table_name() -> &'static str;

    /// Column definitions, in field order.
    fn columns() -> Vec<ColumnInfo>;

    /// Column names, in field order.
    fn active_columns() -> Vec<&'static str>;

    /// Converts the instance into a column → value map.
    ///
    /// `Option<T>` fields are omitted when `None`. Dates use ISO `YYYY-MM-DD`.
    fn to_map(&self) -> HashMap<String, String>;

    /// The primary key column, if the model declares one.
    fn primary_key() -> Option<ColumnInfo> {
        Self::columns().into_iter().find(|c| c.is_primary_key)
    }
}

// ============================================================================
// Tests
// ============================================================================
