//! # Database Module
//!
//! The entity models (`User`, `Post`, `Booking`) and the schema they map to.
//!
//! ```rust,ignore
//! let db = Database::connect(&settings.database_url).await?;
//! database::migrate(&db).await?;
//!
//! let user = User::new("Ada Lovelace", "ada", "secret", dob, cost)?.create(&db).await?;
//! let booking = Booking::new("99", "Ada Lovelace", "ada").create(&db).await?;
//! ```

pub mod booking;
pub mod post;
pub mod user;

use chrono::NaiveDate;
use flightbook_orm::{Database, Pagination};

pub use booking::{Booking, BookingSnapshot};
pub use post::{Post, PostSnapshot};
pub use user::{User, UserSnapshot};

use crate::Error;

/// Display format of every date in a snapshot.
pub const DISPLAY_DATE_FORMAT: &str = "%m-%d-%Y";

/// How much of a user's children `User::read` loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Expansion {
    /// Leave `posts` and `bookings` empty.
    #[default]
    None,
    /// One page of each child collection.
    Page(Pagination),
    /// Every child row.
    All,
}

/// Creates the tables, parents first.
pub async fn migrate(db: &Database) -> Result<(), Error> {
    db.migrator().register::<User>().register::<Post>().register::<Booking>().run().await?;
    Ok(())
}

/// Drops every table (children first) and creates them again.
pub async fn reset(db: &Database) -> Result<(), Error> {
    db.drop_table::<Booking>().await?.drop_table::<Post>().await?.drop_table::<User>().await?;
    migrate(db).await
}

/// Today's date in the server's local time zone.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub(crate) fn display_date(date: &NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// The replacement value for an update: `None` for an empty string.
pub(crate) fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}
