use std::fmt;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use flightbook_orm::{Database, FromAnyRow, Model, Pagination, QueryBuilder};
use serde::{Deserialize, Serialize};
use sqlx::{Any, Executor};

use super::booking::booking_fields;
use super::{Booking, BookingSnapshot, Expansion, Post, PostSnapshot, display_date, non_empty};
use crate::Error;

/// A registered user. Owns posts and bookings; deleting the user deletes them.
#[derive(Debug, Clone, Model, FromAnyRow)]
#[orm(table = "users")]
pub struct User {
    #[orm(primary_key, auto_increment)]
    id: Option<i64>,
    #[orm(size = 255)]
    name: String,
    #[orm(size = 255, unique)]
    uid: String,
    /// bcrypt hash
    #[orm(size = 255)]
    password: String,
    dob: NaiveDate,
}

/// Serializable view of a `User`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: Option<i64>,
    pub name: String,
    pub uid: String,
    pub dob: String,
    pub age: i32,
    pub posts: Vec<PostSnapshot>,
    pub bookings: Vec<BookingSnapshot>,
}

impl User {
    /// Password given to users created without one.
    pub const DEFAULT_PASSWORD: &'static str = "123qwerty";

    /// Builds an unsaved user, hashing `password` at the given bcrypt cost.
    pub fn new(name: &str, uid: &str, password: &str, dob: NaiveDate, cost: u32) -> Result<Self, Error> {
        let mut user = Self { id: None, name: name.to_string(), uid: uid.to_string(), password: String::new(), dob };
        user.set_password(password, cost)?;
        Ok(user)
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn set_uid(&mut self, uid: &str) {
        self.uid = uid.to_string();
    }

    pub fn is_uid(&self, uid: &str) -> bool {
        self.uid == uid
    }

    /// The first 10 characters of the stored hash followed by `...`.
    pub fn password(&self) -> String {
        let prefix: String = self.password.chars().take(10).collect();
        format!("{}...", prefix)
    }

    /// Replaces the stored hash with a fresh salted hash of `password`.
    pub fn set_password(&mut self, password: &str, cost: u32) -> Result<(), Error> {
        self.password = bcrypt::hash(password, cost)?;
        Ok(())
    }

    /// Checks `password` against the stored hash. A malformed hash never matches.
    pub fn is_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password).unwrap_or(false)
    }

    /// Date of birth as `MM-DD-YYYY`.
    pub fn dob(&self) -> String {
        display_date(&self.dob)
    }

    pub fn dob_date(&self) -> NaiveDate {
        self.dob
    }

    pub fn set_dob(&mut self, dob: NaiveDate) {
        self.dob = dob;
    }

    /// Age in whole years as of today.
    pub fn age(&self) -> i32 {
        self.age_on(super::today())
    }

    /// Age in whole years on `day`; the birthday itself counts.
    pub fn age_on(&self, day: NaiveDate) -> i32 {
        let before_birthday = (day.month(), day.day()) < (self.dob.month(), self.dob.day());
        day.year() - self.dob.year() - i32::from(before_birthday)
    }

    /// The user's own fields, without children.
    pub fn snapshot(&self) -> UserSnapshot {
        UserSnapshot {
            id: self.id,
            name: self.name.clone(),
            uid: self.uid.clone(),
            dob: self.dob(),
            age: self.age(),
            posts: Vec::new(),
            bookings: Vec::new(),
        }
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    /// Inserts the user and returns it with its generated id.
    ///
    /// A taken `uid` fails with a duplicate-key error.
    pub async fn create(self, db: &Database) -> Result<Self, Error> {
        self.create_with(db.model::<User>()).await
    }

    /// Inserts through `query`, which may run on a transaction.
    pub async fn create_with<'a, E>(mut self, query: QueryBuilder<'a, User, E>) -> Result<Self, Error>
    where
        E: Executor<'a, Database = Any>,
    {
        self.id = query.insert(&self).await?;
        Ok(self)
    }

    /// The snapshot, with children loaded according to `expansion`.
    ///
    /// Post images are read from `upload_dir`; a missing image is an error.
    pub async fn read(&self, db: &Database, upload_dir: &Path, expansion: Expansion) -> Result<UserSnapshot, Error> {
        let mut snapshot = self.snapshot();
        let Some(id) = self.id else {
            return Ok(snapshot);
        };

        let page = match expansion {
            Expansion::None => return Ok(snapshot),
            Expansion::Page(page) => Some(page),
            Expansion::All => None,
        };

        for post in Post::for_user(db, id, page).await? {
            snapshot.posts.push(post.read(upload_dir).await?);
        }
        snapshot.bookings = Booking::for_user(db, id, page).await?.iter().map(Booking::read).collect();

        Ok(snapshot)
    }

    /// Overwrites the fields given non-empty values, then saves the row.
    ///
    /// A new `uid` is copied to the user's bookings in the same transaction.
    /// On error `self` is left as it was.
    pub async fn update(
        &mut self,
        db: &Database,
        name: &str,
        uid: &str,
        password: &str,
        cost: u32,
    ) -> Result<&mut Self, Error> {
        let id = self.id.ok_or_else(|| flightbook_orm::Error::invalid_argument("user was never saved"))?;

        let mut updated = self.clone();
        if let Some(name) = non_empty(name) {
            updated.set_name(name);
        }
        if let Some(uid) = non_empty(uid) {
            updated.set_uid(uid);
        }
        if let Some(password) = non_empty(password) {
            updated.set_password(password, cost)?;
        }

        let mut tx = db.begin().await?;
        tx.model::<User>().save(&updated).await?;
        if updated.uid != self.uid {
            tx.model::<Booking>()
                .equals(booking_fields::USER_ID, id)
                .set(booking_fields::UID, updated.uid.clone())
                .await?;
        }
        tx.commit().await?;

        *self = updated;
        Ok(self)
    }

    /// Deletes the user; its posts and bookings go with it.
    pub async fn delete(self, db: &Database) -> Result<(), Error> {
        let id = self.id.ok_or_else(|| flightbook_orm::Error::invalid_argument("user was never saved"))?;
        match db.model::<User>().equals(user_fields::ID, id).delete().await? {
            0 => Err(flightbook_orm::Error::NotFound.into()),
            _ => Ok(()),
        }
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub async fn find(db: &Database, id: i64) -> Result<Option<Self>, Error> {
        Ok(db.model::<User>().equals(user_fields::ID, id).first_or_none().await?)
    }

    pub async fn find_by_uid(db: &Database, uid: &str) -> Result<Option<Self>, Error> {
        Ok(db.model::<User>().equals(user_fields::UID, uid.to_string()).first_or_none().await?)
    }

    /// Every user, ordered by id; one page of them when `page` is given.
    pub async fn all(db: &Database, page: Option<Pagination>) -> Result<Vec<Self>, Error> {
        let query = db.model::<User>().order_by(user_fields::ID, true);
        let query = match page {
            Some(page) => page.apply(query),
            None => query,
        };
        Ok(query.scan().await?)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.snapshot()).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(dob: NaiveDate) -> User {
        User::new("Thomas Edison", "toby", "123toby", dob, 4).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_counts_the_birthday() {
        let u = user(date(1847, 2, 11));
        assert_eq!(u.age_on(date(2024, 2, 10)), 176);
        assert_eq!(u.age_on(date(2024, 2, 11)), 177);
        assert_eq!(u.age_on(date(2024, 12, 31)), 177);
    }

    #[test]
    fn password_is_hashed_and_truncated() {
        let u = user(date(1847, 2, 11));
        assert!(u.is_password("123toby"));
        assert!(!u.is_password("123niko"));

        let shown = u.password();
        assert_eq!(shown.len(), 13);
        assert!(shown.ends_with("..."));
        assert!(!shown.contains("123toby"));
    }

    #[test]
    fn malformed_hash_never_matches() {
        let mut u = user(date(1847, 2, 11));
        u.password = "not-a-hash".to_string();
        assert!(!u.is_password("not-a-hash"));
    }

    #[test]
    fn display_renders_snapshot_json() {
        let u = user(date(1847, 2, 11));
        let value: serde_json::Value = serde_json::from_str(&u.to_string()).unwrap();
        assert_eq!(value["uid"], "toby");
        assert_eq!(value["dob"], "02-11-1847");
        assert_eq!(value["posts"], serde_json::json!([]));
        assert!(value.get("password").is_none());
    }
}
