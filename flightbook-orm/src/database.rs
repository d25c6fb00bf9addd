use heck::ToSnakeCase;
use sqlx::{AnyPool, any::AnyPoolOptions};

use crate::{
    Error, Transaction,
    migration::Migrator,
    model::{ColumnInfo, Model},
    query_builder::QueryBuilder,
};

/// Supported database driver types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Drivers {
    /// PostgreSQL driver.
    Postgres,
    /// SQLite driver.
    SQLite,
    /// MySQL driver.
    MySQL,
}

impl Drivers {
    /// Identifies the driver from the scheme of a database URL.
    pub fn from_url(url: &str) -> Self {
        let (scheme, _) = url.split_once(':').unwrap_or(("sqlite", ""));
        match scheme {
            "postgresql" | "postgres" => Drivers::Postgres,
            "mysql" | "mariadb" => Drivers::MySQL,
            _ => Drivers::SQLite,
        }
    }
}

/// Run on every MySQL connection so `"identifier"` quoting is accepted.
const MYSQL_ANSI_QUOTES: &str = "SET SESSION sql_mode = CONCAT(@@SESSION.sql_mode, ',ANSI_QUOTES')";

/// Connection pool settings applied by [`DatabaseBuilder::connect`].
#[derive(Clone, Debug)]
pub struct DatabaseBuilder {
    max_connections: u32,
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        Self { max_connections: 5 }
    }
}

impl DatabaseBuilder {
    /// Maximum number of pooled connections.
    ///
    /// Use `1` with `sqlite::memory:` so every query sees the same database.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Opens the pool and detects the driver from the URL.
    pub async fn connect(self, url: &str) -> Result<Database, Error> {
        sqlx::any::install_default_drivers();
        let driver = Drivers::from_url(url);

        // sqlx turns SQLite foreign key enforcement on for every connection,
        // which the ON DELETE CASCADE clauses rely on.
        let mut options = AnyPoolOptions::new().max_connections(self.max_connections);
        if driver == Drivers::MySQL {
            // Generated SQL quotes identifiers with double quotes
            options = options.after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query(MYSQL_ANSI_QUOTES).execute(conn).await?;
                    Ok(())
                })
            });
        }
        let pool = options.connect(url).await?;
        log::debug!("connected to {:?} database (max_connections = {})", driver, self.max_connections);
        Ok(Database { pool, driver })
    }
}

/// The main entry point for database connection and management.
///
/// Cloning is cheap: clones share the same pool. Every model operation takes
/// a `&Database` explicitly.
#[derive(Clone, Debug)]
pub struct Database {
    pub(crate) pool: AnyPool,
    pub(crate) driver: Drivers,
}

impl Database {
    /// Connects with default pool settings.
    ///
    /// ```rust,ignore
    /// let db = Database::connect("sqlite://flightbook.db?mode=rwc").await?;
    /// ```
    pub async fn connect(url: &str) -> Result<Self, Error> {
        Self::builder().connect(url).await
    }

    /// Starts configuring a connection pool.
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::default()
    }

    /// The driver detected at connect time.
    pub fn driver(&self) -> Drivers {
        self.driver
    }

    /// Creates a `Migrator` instance to manage schema migrations.
    pub fn migrator(&self) -> Migrator<'_> {
        Migrator::new(self)
    }

    /// Starts building a query for a specific Model.
    ///
    /// ```rust,ignore
    /// let bookings: Vec<Booking> = db.model::<Booking>().scan().await?;
    /// ```
    pub fn model<T: Model + Send + Sync + Unpin>(&self) -> QueryBuilder<'_, T, &AnyPool> {
        QueryBuilder::new(&self.pool, self.driver)
    }

    /// Begins a transaction; it rolls back when dropped without `commit`.
    pub async fn begin(&self) -> Result<Transaction<'static>, Error> {
        let tx = self.pool.begin().await?;
        Ok(Transaction { tx, driver: self.driver })
    }

    /// Creates the table for model `T` if it does not exist.
    ///
    /// Foreign keys are declared inline, so referenced tables must be created
    /// first (the `Migrator` runs in registration order).
    pub async fn create_table<T: Model>(&self) -> Result<&Self, Error> {
        let table_name = T::table_name().to_snake_case();
        let (create_table_query, index_statements) = create_table_sql(&table_name, &T::columns(), self.driver);

        log::debug!("{}", create_table_query);
        sqlx::query(&create_table_query).execute(&self.pool).await?;
        for idx_stmt in index_statements {
            log::debug!("{}", idx_stmt);
            sqlx::query(&idx_stmt).execute(&self.pool).await?;
        }
        Ok(self)
    }

    /// Drops the table for model `T` if it exists.
    pub async fn drop_table<T: Model>(&self) -> Result<&Self, Error> {
        let table_name = T::table_name().to_snake_case();
        let query = match self.driver {
            Drivers::Postgres => format!("DROP TABLE IF EXISTS \"{}\" CASCADE", table_name),
            _ => format!("DROP TABLE IF EXISTS \"{}\"", table_name),
        };
        log::debug!("{}", query);
        sqlx::query(&query).execute(&self.pool).await?;
        Ok(self)
    }
}

/// Renders the CREATE TABLE statement and the CREATE INDEX statements for a model.
pub(crate) fn create_table_sql(table_name: &str, columns: &[ColumnInfo], driver: Drivers) -> (String, Vec<String>) {
    let mut column_defs = Vec::new();
    let mut constraints = Vec::new();
    let mut index_statements = Vec::new();

    for col in columns {
        let col_name = col.sql_name();

        let def = if col.auto_increment {
            match driver {
                Drivers::SQLite => format!("\"{}\" INTEGER PRIMARY KEY AUTOINCREMENT", col_name),
                Drivers::Postgres => format!("\"{}\" BIGSERIAL PRIMARY KEY", col_name),
                Drivers::MySQL => format!("\"{}\" BIGINT AUTO_INCREMENT PRIMARY KEY", col_name),
            }
        } else {
            let mut def = format!("\"{}\" {}", col_name, col.sql_type);
            if col.is_primary_key {
                def.push_str(" PRIMARY KEY");
            }
            if !col.is_nullable && !col.is_primary_key {
                def.push_str(" NOT NULL");
            }
            if col.unique && !col.is_primary_key {
                def.push_str(" UNIQUE");
            }
            def
        };
        column_defs.push(def);

        if let (Some(f_table), Some(f_key)) = (col.foreign_table, col.foreign_key) {
            let mut fk = format!(
                "CONSTRAINT \"fk_{}_{}\" FOREIGN KEY (\"{}\") REFERENCES \"{}\" (\"{}\")",
                table_name,
                col_name,
                col_name,
                f_table.to_snake_case(),
                f_key.to_snake_case()
            );
            if let Some(action) = col.on_delete {
                fk.push_str(" ON DELETE ");
                fk.push_str(action);
            }
            constraints.push(fk);
        }

        if col.index {
            let index_type = if col.unique { "UNIQUE INDEX" } else { "INDEX" };
            let index_name = format!("idx_{}_{}", table_name, col_name);
            index_statements.push(format!(
                "CREATE {} IF NOT EXISTS \"{}\" ON \"{}\" (\"{}\")",
                index_type, index_name, table_name, col_name,
            ));
        }
    }

    column_defs.extend(constraints);
    let create_table_query =
        format!("CREATE TABLE IF NOT EXISTS \"{}\" ({})", table_name, column_defs.join(", "));

    (create_table_query, index_statements)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &'static str, sql_type: &'static str) -> ColumnInfo {
        ColumnInfo {
            name,
            sql_type,
            is_primary_key: false,
            auto_increment: false,
            is_nullable: false,
            unique: false,
            index: false,
            foreign_table: None,
            foreign_key: None,
            on_delete: None,
        }
    }

    #[test]
    fn detects_driver_from_url() {
        assert_eq!(Drivers::from_url("postgres://u:p@localhost/db"), Drivers::Postgres);
        assert_eq!(Drivers::from_url("mysql://localhost/db"), Drivers::MySQL);
        assert_eq!(Drivers::from_url("sqlite::memory:"), Drivers::SQLite);
    }

    #[test]
    fn renders_auto_increment_per_driver() {
        let cols = vec![ColumnInfo { is_primary_key: true, auto_increment: true, is_nullable: true, ..column("id", "BIGINT") }];

        let (sqlite, _) = create_table_sql("users", &cols, Drivers::SQLite);
        assert_eq!(sqlite, "CREATE TABLE IF NOT EXISTS \"users\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT)");

        let (pg, _) = create_table_sql("users", &cols, Drivers::Postgres);
        assert_eq!(pg, "CREATE TABLE IF NOT EXISTS \"users\" (\"id\" BIGSERIAL PRIMARY KEY)");
    }

    #[test]
    fn renders_cascading_foreign_key_and_index() {
        let cols = vec![
            ColumnInfo { is_primary_key: true, ..column("bookingid", "VARCHAR(255)") },
            ColumnInfo {
                is_nullable: true,
                index: true,
                foreign_table: Some("users"),
                foreign_key: Some("id"),
                on_delete: Some("CASCADE"),
                ..column("user_id", "BIGINT")
            },
        ];

        let (sql, indexes) = create_table_sql("bookings", &cols, Drivers::SQLite);
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"bookings\" (\"bookingid\" VARCHAR(255) PRIMARY KEY, \"user_id\" BIGINT, \
             CONSTRAINT \"fk_bookings_user_id\" FOREIGN KEY (\"user_id\") REFERENCES \"users\" (\"id\") ON DELETE CASCADE)"
        );
        assert_eq!(
            indexes,
            vec!["CREATE INDEX IF NOT EXISTS \"idx_bookings_user_id\" ON \"bookings\" (\"user_id\")".to_string()]
        );
    }
}
