//! # Error Handling Module
//!
//! The error type returned by every flightbook-orm operation.
//!
//! Driver errors are classified on conversion, so callers can tell a
//! duplicate key apart from any other failure without inspecting `sqlx` types:
//!
//! - **DuplicateKey**: a UNIQUE or PRIMARY KEY constraint rejected the row
//! - **ConstraintViolation**: a foreign key, NOT NULL or CHECK constraint rejected the row
//! - **NotFound**: a query that must return a row returned none
//! - **Database**: anything else coming from sqlx (connection, syntax, decoding)
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use flightbook_orm::Error;
//!
//! match db.model::<Booking>().insert(&booking).await {
//!     Ok(_) => println!("created"),
//!     Err(Error::DuplicateKey(msg)) => eprintln!("already booked: {}", msg),
//!     Err(e) => eprintln!("insert failed: {}", e),
//! }
//! ```

// ============================================================================
// External Crate Imports
// ============================================================================

use sqlx::error::ErrorKind;
use thiserror::Error;

// ============================================================================
// Error Enum Definition
// ============================================================================

/// The main error type for flightbook-orm operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Data validation failed before reaching the database.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Converting a value between its Rust and SQL representation failed.
    #[error("Type conversion error: {0}")]
    Conversion(String),

    /// A method received an argument it cannot work with
    /// (e.g. saving a model whose primary key is unset).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A UNIQUE or PRIMARY KEY constraint was violated.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// A foreign key, NOT NULL or CHECK constraint was violated.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The query matched no row.
    #[error("Row not found")]
    NotFound,

    /// Any other sqlx error.
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

// ============================================================================
// Error Conversion Implementations
// ============================================================================

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => Error::NotFound,
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation => Error::DuplicateKey(db_err.message().to_string()),
                ErrorKind::ForeignKeyViolation | ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
                    Error::ConstraintViolation(db_err.message().to_string())
                }
                _ => Error::Database(sqlx::Error::Database(db_err)),
            },
            other => Error::Database(other),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

impl Error {
    /// Creates an `InvalidData` error from a string slice.
    pub fn invalid_data(msg: &str) -> Self {
        Error::InvalidData(msg.to_string())
    }

    /// Creates an `InvalidArgument` error from a string slice.
    pub fn invalid_argument(msg: &str) -> Self {
        Error::InvalidArgument(msg.to_string())
    }

    /// Creates a `Conversion` error from a string slice.
    pub fn conversion(msg: &str) -> Self {
        Error::Conversion(msg.to_string())
    }

    /// `true` for UNIQUE / PRIMARY KEY violations.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::DuplicateKey(_))
    }

    /// `true` for any constraint rejection, duplicates included.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Error::DuplicateKey(_) | Error::ConstraintViolation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::NotFound));
        assert!(!err.is_constraint_violation());
    }

    #[test]
    fn other_sqlx_errors_are_wrapped() {
        let err: Error = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, Error::Database(sqlx::Error::PoolTimedOut)));
    }

    #[test]
    fn duplicate_counts_as_constraint_violation() {
        let err = Error::DuplicateKey("bookings.bookingid".to_string());
        assert!(err.is_duplicate());
        assert!(err.is_constraint_violation());
        assert!(!Error::ConstraintViolation("fk".to_string()).is_duplicate());
    }
}
