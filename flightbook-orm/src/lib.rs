//! Persistence layer of flightbook: models, migrations, queries and
//! transactions on top of `sqlx`'s `Any` driver.

// Lets the derive output (`flightbook_orm::...`) resolve inside this crate too.
extern crate self as flightbook_orm;

pub use flightbook_orm_macro::{FromAnyRow, Model};

pub mod any_struct;
pub mod database;
pub mod errors;
pub mod migration;
pub mod model;
pub mod pagination;
pub mod query_builder;
pub mod temporal;
pub mod transaction;
pub mod value_binding;

pub use any_struct::FromAnyRow;
pub use database::{Database, DatabaseBuilder, Drivers};
pub use errors::Error;
pub use migration::Migrator;
pub use model::{ColumnInfo, Model};
pub use pagination::Pagination;
pub use query_builder::{Op, QueryBuilder};
pub use transaction::Transaction;
