use std::fmt;

use chrono::NaiveDate;
use flightbook_orm::{Database, FromAnyRow, Model, Pagination, QueryBuilder};
use serde::{Deserialize, Serialize};
use sqlx::{Any, Executor};

use super::{User, display_date, non_empty, today};
use crate::Error;

/// A flight reservation.
///
/// `bookingid` is chosen by the caller, so creating the same id twice fails
/// with a duplicate-key error instead of overwriting. `uid` is the login id
/// given at booking time; `user_id` links the row to that user when one
/// exists, and the booking is deleted along with the user.
#[derive(Debug, Clone, PartialEq, Model, FromAnyRow)]
#[orm(table = "bookings")]
pub struct Booking {
    #[orm(primary_key, size = 255)]
    bookingid: String,
    #[orm(size = 255)]
    travelername: String,
    dob: NaiveDate,
    flightdate: NaiveDate,
    #[orm(size = 20)]
    destination: String,
    #[orm(size = 255, index)]
    uid: String,
    #[orm(foreign_key = "users::id", on_delete = "cascade", index)]
    user_id: Option<i64>,
}

/// Serializable view of a `Booking`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSnapshot {
    pub bookingid: String,
    pub travelername: String,
    pub uid: String,
    pub flightdate: String,
    pub destination: String,
}

impl Booking {
    pub const DEFAULT_DESTINATION: &'static str = "LAX";
    pub const MAX_DESTINATION_LEN: usize = 20;

    /// An unsaved booking to the default destination, dated today.
    pub fn new(bookingid: &str, travelername: &str, uid: &str) -> Self {
        let today = today();
        Self {
            bookingid: bookingid.to_string(),
            travelername: travelername.to_string(),
            dob: today,
            flightdate: today,
            destination: Self::DEFAULT_DESTINATION.to_string(),
            uid: uid.to_string(),
            user_id: None,
        }
    }

    pub fn with_dates(mut self, dob: NaiveDate, flightdate: NaiveDate) -> Self {
        self.dob = dob;
        self.flightdate = flightdate;
        self
    }

    pub fn with_destination(mut self, destination: &str) -> Self {
        self.destination = destination.to_string();
        self
    }

    /// Links the booking to a user row directly, skipping the `uid` lookup.
    pub fn with_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn bookingid(&self) -> &str {
        &self.bookingid
    }

    pub fn travelername(&self) -> &str {
        &self.travelername
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn is_uid(&self, uid: &str) -> bool {
        self.uid == uid
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Date of birth as `MM-DD-YYYY`.
    pub fn dob(&self) -> String {
        display_date(&self.dob)
    }

    /// Flight date as `MM-DD-YYYY`.
    pub fn flightdate(&self) -> String {
        display_date(&self.flightdate)
    }

    pub fn read(&self) -> BookingSnapshot {
        BookingSnapshot {
            bookingid: self.bookingid.clone(),
            travelername: self.travelername.clone(),
            uid: self.uid.clone(),
            flightdate: self.flightdate(),
            destination: self.destination.clone(),
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if self.destination.chars().count() > Self::MAX_DESTINATION_LEN {
            return Err(flightbook_orm::Error::InvalidData(format!(
                "destination '{}' is longer than {} characters",
                self.destination,
                Self::MAX_DESTINATION_LEN
            ))
            .into());
        }
        Ok(())
    }

    /// Looks up the user owning `uid` and links to it; unlinks when there is none.
    async fn link(&mut self, db: &Database) -> Result<(), Error> {
        self.user_id = User::find_by_uid(db, &self.uid).await?.and_then(|user| user.id());
        Ok(())
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    /// Inserts the booking, linking it to the user with the same `uid` if any.
    pub async fn create(mut self, db: &Database) -> Result<Self, Error> {
        if self.user_id.is_none() {
            self.link(db).await?;
        }
        self.create_with(db.model::<Booking>()).await
    }

    /// Inserts through `query` as is, without the `uid` lookup.
    pub async fn create_with<'a, E>(self, query: QueryBuilder<'a, Booking, E>) -> Result<Self, Error>
    where
        E: Executor<'a, Database = Any>,
    {
        self.validate()?;
        query.insert(&self).await?;
        Ok(self)
    }

    /// Overwrites the fields given non-empty values, then saves the row.
    ///
    /// A new `uid` re-links the booking to the matching user. On error `self`
    /// is left as it was.
    pub async fn update(
        &mut self,
        db: &Database,
        travelername: &str,
        uid: &str,
        destination: &str,
    ) -> Result<&mut Self, Error> {
        let mut updated = self.clone();
        if let Some(travelername) = non_empty(travelername) {
            updated.travelername = travelername.to_string();
        }
        if let Some(destination) = non_empty(destination) {
            updated.destination = destination.to_string();
        }
        updated.validate()?;
        if let Some(uid) = non_empty(uid) {
            updated.uid = uid.to_string();
            updated.link(db).await?;
        }
        db.model::<Booking>().save(&updated).await?;
        *self = updated;
        Ok(self)
    }

    pub async fn delete(self, db: &Database) -> Result<(), Error> {
        let removed = db.model::<Booking>().equals(booking_fields::BOOKINGID, self.bookingid).delete().await?;
        match removed {
            0 => Err(flightbook_orm::Error::NotFound.into()),
            _ => Ok(()),
        }
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub async fn find(db: &Database, bookingid: &str) -> Result<Option<Self>, Error> {
        Ok(db.model::<Booking>().equals(booking_fields::BOOKINGID, bookingid.to_string()).first_or_none().await?)
    }

    /// Every booking, in the store's default order.
    pub async fn all(db: &Database) -> Result<Vec<Self>, Error> {
        Ok(db.model::<Booking>().scan().await?)
    }

    /// Bookings linked to one user; one page of them when `page` is given.
    ///
    /// Ordered by `bookingid` as text, so `"10"` sorts before `"2"`.
    pub async fn for_user(db: &Database, user_id: i64, page: Option<Pagination>) -> Result<Vec<Self>, Error> {
        let query =
            db.model::<Booking>().equals(booking_fields::USER_ID, user_id).order_by(booking_fields::BOOKINGID, true);
        let query = match page {
            Some(page) => page.apply(query),
            None => query,
        };
        Ok(query.scan().await?)
    }
}

impl fmt::Display for Booking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.read()).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_lax_and_today() {
        let booking = Booking::new("99", "Ada", "ada1");
        let today = display_date(&today());

        let snapshot = booking.read();
        assert_eq!(snapshot.destination, "LAX");
        assert_eq!(snapshot.flightdate, today);
        assert_eq!(booking.dob(), today);
        assert_eq!(booking.user_id(), None);
    }

    #[test]
    fn rejects_long_destinations() {
        let booking = Booking::new("99", "Ada", "ada1").with_destination("Llanfairpwllgwyngyll Station");
        let err = booking.validate().unwrap_err();
        assert!(matches!(err, Error::Orm(flightbook_orm::Error::InvalidData(_))));
    }

    #[test]
    fn display_renders_snapshot_json() {
        let booking = Booking::new("42", "Eli Whitney", "whit")
            .with_dates(NaiveDate::from_ymd_opt(1765, 12, 8).unwrap(), NaiveDate::from_ymd_opt(2024, 7, 4).unwrap());
        let value: serde_json::Value = serde_json::from_str(&booking.to_string()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "bookingid": "42",
                "travelername": "Eli Whitney",
                "uid": "whit",
                "flightdate": "07-04-2024",
                "destination": "LAX",
            })
        );
    }
}
