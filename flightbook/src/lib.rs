//! flightbook: a booking backend.
//!
//! Users own notes ([`database::Post`]) and flight bookings
//! ([`database::Booking`]). Every persistence operation takes an explicit
//! `&Database` handle; the HTTP surface lives in [`api`].

pub mod api;
pub mod database;
pub mod error;
pub mod seed;
pub mod settings;

pub use error::Error;
pub use settings::Settings;
