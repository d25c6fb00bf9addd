//! # API Module
//!
//! The HTTP surface:
//!
//! - `POST /api/bookings/create`: validate `{name, uid, bookingid}` and create a booking
//! - `GET /api/bookings/`: list every booking
//!
//! Rejections answer with status 210 and a `{message}` body.

pub mod bookings;
pub mod error;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use flightbook_orm::Database;

pub use error::{ApiError, REJECTED};

use crate::Settings;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        Self { db, settings: Arc::new(settings) }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/bookings/create", post(bookings::create))
        .route("/api/bookings/", get(bookings::list))
        .route("/api/bookings", get(bookings::list))
        .with_state(state)
}
