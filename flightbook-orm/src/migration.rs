//! # Migration Module
//!
//! Creates the tables of registered models.
//!
//! Foreign keys are declared inline in each CREATE TABLE (SQLite cannot add
//! them afterwards), so models must be registered parents first. Every
//! statement uses `IF NOT EXISTS`, making `run()` safe to repeat.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! let db = Database::connect("sqlite://flightbook.db?mode=rwc").await?;
//!
//! db.migrator()
//!     .register::<User>()
//!     .register::<Post>()
//!     .register::<Booking>()
//!     .run()
//!     .await?;
//! ```

// ============================================================================
// External Crate Imports
// ============================================================================

use futures::future::BoxFuture;

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::{Error, database::Database, model::Model};

// ============================================================================
// Type Aliases
// ============================================================================

/// A migration step: an async closure receiving a clone of the `Database`.
pub type MigrationTask = Box<dyn Fn(Database) -> BoxFuture<'static, Result<(), Error>> + Send + Sync>;

// ============================================================================
// Migrator Struct
// ============================================================================

/// Schema migration manager.
///
/// # Lifecycle
///
/// 1. Create migrator via `Database::migrator()`
/// 2. Register models via `register::<T>()`, referenced tables first
/// 3. Execute all migrations via `run()`
pub struct Migrator<'a> {
    pub(crate) db: &'a Database,
    pub(crate) tasks: Vec<MigrationTask>,
    pub(crate) tables: Vec<&'static str>,
}

// ============================================================================
// Migrator Implementation
// ============================================================================

impl<'a> Migrator<'a> {
    /// Creates an empty migrator bound to `db`.
    pub fn new(db: &'a Database) -> Self {
        Self { db, tasks: Vec::new(), tables: Vec::new() }
    }

    /// Queues the CREATE TABLE (and CREATE INDEX) statements of model `T`.
    pub fn register<T>(mut self) -> Self
    where
        T: Model + 'static + Send + Sync,
    {
        let task: MigrationTask = Box::new(|db: Database| -> BoxFuture<'static, Result<(), Error>> {
            Box::pin(async move {
                db.create_table::<T>().await?;
                Ok(())
            })
        });

        self.tasks.push(task);
        self.tables.push(T::table_name());
        self
    }

    /// Table names in the order they will be created.
    pub fn tables(&self) -> &[&'static str] {
        &self.tables
    }

    /// Runs every queued task in registration order.
    ///
    /// Returns a clone of the database for continued use.
    pub async fn run(self) -> Result<Database, Error> {
        for (task, table) in self.tasks.iter().zip(&self.tables) {
            log::debug!("migrating table {}", table);
            (task)(self.db.clone()).await?;
        }
        log::info!("migrated {} table(s)", self.tasks.len());
        Ok(self.db.clone())
    }
}
