//! Row decoding for the `Any` driver.

use sqlx::{Error, Row, any::AnyRow};

// ============================================================================
// FromAnyRow Trait
// ============================================================================

/// A type that can be built from an `AnyRow`.
///
/// Used instead of `sqlx::FromRow` so that types the `Any` driver cannot
/// decode natively (dates) can be parsed from text. Implemented for models via
/// `#[derive(FromAnyRow)]`; scalar implementations read the first column.
pub trait FromAnyRow: Sized {
    /// Builds the value from a result row.
    fn from_any_row(row: &AnyRow) -> Result<Self, Error>;
}

// ============================================================================
// Primitive Implementations
// ============================================================================

macro_rules! impl_supported_primitive {
    ($($t:ty),*) => {
        $(
            impl FromAnyRow for $t {
                fn from_any_row(row: &AnyRow) -> Result<Self, Error> {
                    row.try_get(0)
                }
            }
        )*
    };
}

// Primitives directly supported by sqlx::Any (Decode implemented)
impl_supported_primitive!(bool, i16, i32, i64, f32, f64, String);

impl FromAnyRow for chrono::NaiveDate {
    fn from_any_row(row: &AnyRow) -> Result<Self, Error> {
        let s: String = row.try_get(0)?;
        crate::temporal::parse_naive_date(&s).map_err(|e| Error::Decode(Box::new(e)))
    }
}
