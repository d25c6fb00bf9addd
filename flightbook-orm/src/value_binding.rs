//! # Value Binding Module
//!
//! Binds the string values produced by `Model::to_map()` to query arguments,
//! converting each one to the Rust type matching its column's SQL type.

use sqlx::Arguments;
use sqlx::any::AnyArguments;

use crate::{Error, temporal};

/// Type-directed binding of string values onto `AnyArguments`.
pub trait ValueBinder {
    /// Parses `value_str` according to `sql_type` and binds it.
    fn bind_value(&mut self, value_str: &str, sql_type: &str) -> Result<(), Error>;

    /// Binds a typed value, reporting encoder failures as `Error::Conversion`.
    fn bind_typed<T>(&mut self, value: T) -> Result<(), Error>
    where
        T: for<'q> sqlx::Encode<'q, sqlx::Any> + sqlx::Type<sqlx::Any> + Send + 'static;
}

impl ValueBinder for AnyArguments<'_> {
    fn bind_value(&mut self, value_str: &str, sql_type: &str) -> Result<(), Error> {
        match sql_type {
            "INTEGER" | "INT" | "int4" => {
                let val: i32 = value_str
                    .parse()
                    .map_err(|e| Error::Conversion(format!("Failed to parse integer '{}': {}", value_str, e)))?;
                self.bind_typed(val)
            }

            "BIGINT" | "INT8" | "int8" | "BIGSERIAL" => {
                let val: i64 = value_str
                    .parse()
                    .map_err(|e| Error::Conversion(format!("Failed to parse i64 '{}': {}", value_str, e)))?;
                self.bind_typed(val)
            }

            "SMALLINT" | "INT2" | "int2" => {
                let val: i16 = value_str
                    .parse()
                    .map_err(|e| Error::Conversion(format!("Failed to parse i16 '{}': {}", value_str, e)))?;
                self.bind_typed(val)
            }

            "BOOLEAN" | "BOOL" | "bool" => {
                let val: bool = value_str
                    .parse()
                    .map_err(|e| Error::Conversion(format!("Failed to parse bool '{}': {}", value_str, e)))?;
                self.bind_typed(val)
            }

            "DOUBLE PRECISION" | "REAL" | "FLOAT" | "float8" => {
                let val: f64 = value_str
                    .parse()
                    .map_err(|e| Error::Conversion(format!("Failed to parse f64 '{}': {}", value_str, e)))?;
                self.bind_typed(val)
            }

            "DATE" => {
                let val = temporal::parse_naive_date(value_str)?;
                temporal::bind_naive_date(self, &val)
            }

            // TEXT, VARCHAR(N) and anything unknown
            _ => self.bind_typed(value_str.to_string()),
        }
    }

    fn bind_typed<T>(&mut self, value: T) -> Result<(), Error>
    where
        T: for<'q> sqlx::Encode<'q, sqlx::Any> + sqlx::Type<sqlx::Any> + Send + 'static,
    {
        self.add(value).map_err(|e| Error::Conversion(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_numeric_integers() {
        let mut args = AnyArguments::default();
        let err = args.bind_value("abc", "BIGINT").unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
    }

    #[test]
    fn binds_each_supported_type() {
        let mut args = AnyArguments::default();
        args.bind_value("42", "INTEGER").unwrap();
        args.bind_value("7", "BIGINT").unwrap();
        args.bind_value("true", "BOOLEAN").unwrap();
        args.bind_value("2024-03-01", "DATE").unwrap();
        args.bind_value("LAX", "VARCHAR(20)").unwrap();
        assert_eq!(args.len(), 5);
    }
}
