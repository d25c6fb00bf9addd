//! # Transaction Module
//!
//! Groups several statements into one unit of work.
//!
//! ```rust,ignore
//! let mut tx = db.begin().await?;
//! let user_id = tx.model::<User>().insert(&user).await?;
//! tx.model::<Post>().insert(&post).await?;
//! tx.commit().await?;
//! ```
//!
//! A `Transaction` dropped without `commit` is rolled back.

use sqlx::AnyConnection;

use crate::{Error, Model, QueryBuilder, database::Drivers};

/// A wrapper around a SQLx transaction.
#[derive(Debug)]
pub struct Transaction<'a> {
    pub(crate) tx: sqlx::Transaction<'a, sqlx::Any>,
    pub(crate) driver: Drivers,
}

impl<'a> Transaction<'a> {
    /// Starts building a query that runs inside this transaction.
    pub fn model<T: Model + Send + Sync + Unpin>(&mut self) -> QueryBuilder<'_, T, &mut AnyConnection> {
        let driver = self.driver;
        QueryBuilder::new(&mut *self.tx, driver)
    }

    /// Commits the transaction, persisting every statement run through it.
    pub async fn commit(self) -> Result<(), Error> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Rolls back the transaction explicitly.
    pub async fn rollback(self) -> Result<(), Error> {
        self.tx.rollback().await?;
        Ok(())
    }
}
