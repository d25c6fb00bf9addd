//! # Temporal Module
//!
//! Date handling for the `Any` driver, which has no native date type.
//! Dates are bound and read back as ISO `YYYY-MM-DD` text; PostgreSQL needs
//! explicit casts in both directions.

use chrono::NaiveDate;
use sqlx::Arguments;
use sqlx::any::AnyArguments;

use crate::Error;
use crate::database::Drivers;

/// ISO 8601 calendar date, the storage format for `DATE` columns.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Binds a `NaiveDate` as ISO text.
pub fn bind_naive_date(query_args: &mut AnyArguments<'_>, value: &NaiveDate) -> Result<(), Error> {
    query_args
        .add(value.format(DATE_FORMAT).to_string())
        .map_err(|e| Error::Conversion(format!("Failed to bind NaiveDate: {}", e)))
}

/// Parses a `NaiveDate` from ISO text.
///
/// Tolerates a trailing time component, which some drivers append when a
/// `DATE` column round-trips through text.
pub fn parse_naive_date(value: &str) -> Result<NaiveDate, Error> {
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map_err(|e| Error::Conversion(format!("Failed to parse NaiveDate from '{}': {}", value, e)))
}

/// Placeholder cast for a bound value on PostgreSQL (`$1::DATE`).
pub fn get_postgres_type_cast(sql_type: &str) -> &'static str {
    match sql_type {
        "DATE" => "::DATE",
        _ => "",
    }
}

/// Select expression that reads a date column back as text.
///
/// Needed on every driver: the `Any` driver refuses to decode a column whose
/// declared type is `DATE`, even when SQLite stored it as text.
pub fn select_as_text(column: &str, driver: &Drivers) -> String {
    match driver {
        Drivers::Postgres => format!("\"{0}\"::TEXT AS \"{0}\"", column),
        Drivers::MySQL => format!("CAST(\"{0}\" AS CHAR) AS \"{0}\"", column),
        Drivers::SQLite => format!("CAST(\"{0}\" AS TEXT) AS \"{0}\"", column),
    }
}
