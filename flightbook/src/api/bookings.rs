//! Booking endpoints.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use super::{ApiError, AppState};
use crate::database::{Booking, BookingSnapshot};

const MIN_FIELD_LEN: usize = 2;

pub const NAME_MISSING: &str = "Name is missing, or is less than 2 characters";
pub const UID_MISSING: &str = "User ID is missing, or is less than 2 characters";
pub const BOOKINGID_MISSING: &str = "Booking ID is missing, or is less than 2 characters";

/// Body of `POST /api/bookings/create`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateBooking {
    pub name: Option<String>,
    pub uid: Option<String>,
    pub bookingid: Option<String>,
}

/// The field's value when it is present and at least two characters long.
fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, ApiError> {
    match value {
        Some(v) if v.chars().count() >= MIN_FIELD_LEN => Ok(v),
        _ => Err(ApiError::Rejected(message.to_string())),
    }
}

/// Checks the fields in order: name, uid, bookingid.
pub fn validate(body: &CreateBooking) -> Result<(&str, &str, &str), ApiError> {
    let name = required(body.name.as_deref(), NAME_MISSING)?;
    let uid = required(body.uid.as_deref(), UID_MISSING)?;
    let bookingid = required(body.bookingid.as_deref(), BOOKINGID_MISSING)?;
    Ok((name, uid, bookingid))
}

/// `POST /api/bookings/create`
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateBooking>,
) -> Result<Json<BookingSnapshot>, ApiError> {
    let (name, uid, bookingid) = validate(&body)?;

    match Booking::new(bookingid, name, uid).create(&state.db).await {
        Ok(booking) => {
            log::info!("New Booking ID: {}", booking.bookingid());
            Ok(Json(booking.read()))
        }
        Err(e) if e.is_constraint_violation() => {
            log::debug!("booking {} rejected: {}", bookingid, e);
            Err(ApiError::Rejected(format!("Processed {}, either a format error or User ID {} is duplicate", name, uid)))
        }
        Err(e) => {
            log::error!("failed to create booking {}: {}", bookingid, e);
            Err(ApiError::Internal(e.to_string()))
        }
    }
}

/// `GET /api/bookings/`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<BookingSnapshot>>, ApiError> {
    let bookings = Booking::all(&state.db).await.map_err(|e| {
        log::error!("failed to list bookings: {}", e);
        ApiError::Internal(e.to_string())
    })?;
    Ok(Json(bookings.iter().map(Booking::read).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(name: Option<&str>, uid: Option<&str>, bookingid: Option<&str>) -> CreateBooking {
        CreateBooking {
            name: name.map(str::to_string),
            uid: uid.map(str::to_string),
            bookingid: bookingid.map(str::to_string),
        }
    }

    fn rejection(body: &CreateBooking) -> String {
        match validate(body) {
            Err(ApiError::Rejected(msg)) => msg,
            other => panic!("expected a rejection, got {:?}", other),
        }
    }

    #[test]
    fn checks_name_first() {
        assert_eq!(rejection(&body(None, None, None)), NAME_MISSING);
        assert_eq!(rejection(&body(Some("A"), Some("ada1"), Some("99"))), NAME_MISSING);
    }

    #[test]
    fn checks_uid_then_bookingid() {
        assert_eq!(rejection(&body(Some("Ada"), Some("a"), None)), UID_MISSING);
        assert_eq!(rejection(&body(Some("Ada"), Some("ada1"), Some("9"))), BOOKINGID_MISSING);
        assert_eq!(rejection(&body(Some("Ada"), Some("ada1"), None)), BOOKINGID_MISSING);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // "é" is two bytes but one character
        assert_eq!(rejection(&body(Some("é"), Some("ada1"), Some("99"))), NAME_MISSING);
        assert_eq!(validate(&body(Some("Zoë"), Some("zo"), Some("99"))).unwrap(), ("Zoë", "zo", "99"));
    }
}
