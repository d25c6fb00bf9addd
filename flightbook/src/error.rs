//! # Error Handling Module
//!
//! Application-level error type. Storage errors keep the classification done
//! by `flightbook_orm::Error`, so callers can still tell a duplicate key from
//! any other failure.

use thiserror::Error;

/// The main error type for flightbook operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A persistence operation failed.
    #[error(transparent)]
    Orm(#[from] flightbook_orm::Error),

    /// Reading an image or binding the listener failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Hashing or verifying a password failed.
    #[error("Password hashing error: {0}")]
    Password(#[from] bcrypt::BcryptError),

    /// A setting is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP server stopped with an error.
    #[error("Server error: {0}")]
    Server(String),
}

impl Error {
    /// Creates a `Config` error from a string slice.
    pub fn config(msg: &str) -> Self {
        Error::Config(msg.to_string())
    }

    /// `true` when a UNIQUE / PRIMARY KEY constraint rejected the row.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::Orm(e) if e.is_duplicate())
    }

    /// `true` for any constraint rejection, duplicates included.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Error::Orm(e) if e.is_constraint_violation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_wrapped_orm_errors() {
        let dup: Error = flightbook_orm::Error::DuplicateKey("users.uid".to_string()).into();
        assert!(dup.is_duplicate());
        assert!(dup.is_constraint_violation());

        let fk: Error = flightbook_orm::Error::ConstraintViolation("posts.user_id".to_string()).into();
        assert!(!fk.is_duplicate());
        assert!(fk.is_constraint_violation());

        assert!(!Error::config("DATABASE_URL").is_constraint_violation());
    }

    #[test]
    fn missing_file_is_io() {
        let err: Error = std::io::Error::from(std::io::ErrorKind::NotFound).into();
        assert!(matches!(err, Error::Io(_)));
    }
}
