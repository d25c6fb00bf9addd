//! # Seed Module
//!
//! Sample data for development: five users, each with one to three notes and
//! one booking per note.
//!
//! Each user is inserted with its notes and bookings in a single transaction,
//! so a failure never leaves a user half-populated.

use chrono::NaiveDate;
use flightbook_orm::Database;
use rand::Rng;

use crate::Error;
use crate::database::{self, Booking, Post, User, today};

/// Image attached to every sample note.
pub const SAMPLE_IMAGE: &str = "ncs_logo.png";

struct SampleUser {
    name: &'static str,
    uid: &'static str,
    password: Option<&'static str>,
    dob: Option<(i32, u32, u32)>,
}

const SAMPLE_USERS: [SampleUser; 5] = [
    SampleUser { name: "Thomas Edison", uid: "toby", password: Some("123toby"), dob: Some((1847, 2, 11)) },
    SampleUser { name: "Nicholas Teslo", uid: "niko", password: Some("123niko"), dob: None },
    SampleUser { name: "Alexander Graham Bell", uid: "lex", password: Some("123lex"), dob: None },
    SampleUser { name: "Eli Whitney", uid: "whit", password: Some("123whit"), dob: None },
    SampleUser { name: "John Mortensen", uid: "jm1021", password: None, dob: Some((1959, 10, 21)) },
];

/// Text of the `n`th sample note of `name`.
pub fn sample_note(name: &str, n: usize) -> String {
    format!("#### {} note {}. \n Generated by test data.", name, n)
}

/// Drops and recreates the tables, then inserts the sample users.
///
/// Returns how many users were created. Users rejected by a constraint are
/// logged and skipped.
pub async fn init_users(db: &Database, cost: u32) -> Result<usize, Error> {
    database::reset(db).await?;

    let mut next_booking_id = 1;
    let mut created = 0;

    for sample in &SAMPLE_USERS {
        let dob = match sample.dob {
            Some((y, m, d)) => NaiveDate::from_ymd_opt(y, m, d).unwrap_or_else(today),
            None => today(),
        };
        let user = User::new(sample.name, sample.uid, sample.password.unwrap_or(User::DEFAULT_PASSWORD), dob, cost)?;
        let notes = rand::thread_rng().gen_range(1..=3);
        let first_booking_id = next_booking_id;
        next_booking_id += notes;

        match insert_user(db, user, notes, first_booking_id).await {
            Ok(()) => created += 1,
            Err(e) if e.is_constraint_violation() => {
                log::warn!("Records exist, duplicate uid, or error: {} ({})", sample.uid, e);
            }
            Err(e) => return Err(e),
        }
    }

    log::info!("seeded {} user(s)", created);
    Ok(created)
}

async fn insert_user(db: &Database, user: User, notes: usize, first_booking_id: usize) -> Result<(), Error> {
    let mut tx = db.begin().await?;

    let user = user.create_with(tx.model::<User>()).await?;
    let user_id = user.id().ok_or_else(|| flightbook_orm::Error::invalid_data("no id generated for user"))?;

    for n in 0..notes {
        Post::new(user_id, &sample_note(user.name(), n), Some(SAMPLE_IMAGE)).create_with(tx.model::<Post>()).await?;
        Booking::new(&(first_booking_id + n).to_string(), user.name(), user.uid())
            .with_user(user_id)
            .create_with(tx.model::<Booking>())
            .await?;
    }

    tx.commit().await?;
    log::debug!("seeded {} with {} note(s)", user.uid(), notes);
    Ok(())
}
