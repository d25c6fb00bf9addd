use std::marker::PhantomData;

use heck::ToSnakeCase;
use sqlx::{Any, Encode, Executor, Row, Type, any::AnyArguments};

use crate::{
    Error,
    any_struct::FromAnyRow,
    database::Drivers,
    model::{ColumnInfo, Model},
    temporal,
    value_binding::ValueBinder,
};

/// A type alias for filter closures that support manual SQL construction and argument binding.
///
/// It receives:
/// 1. `&mut String`: The SQL query buffer being built.
/// 2. `&mut AnyArguments`: The argument container for binding values.
/// 3. `&Drivers`: The current database driver (to decide between `$n` or `?`).
/// 4. `&mut usize`: The argument counter (for PostgreSQL `$n` placeholders).
pub type FilterFn = Box<dyn Fn(&mut String, &mut AnyArguments<'_>, &Drivers, &mut usize) -> Result<(), Error> + Send + Sync>;

/// Comparison operators accepted by [`QueryBuilder::filter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `LIKE`
    Like,
}

impl Op {
    /// The SQL spelling of the operator.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Like => "LIKE",
        }
    }
}

/// Appends the next bind placeholder for the driver.
fn push_placeholder(query: &mut String, driver: &Drivers, arg_counter: &mut usize, sql_type: &str) {
    match driver {
        Drivers::Postgres => {
            query.push_str(&format!("${}{}", arg_counter, temporal::get_postgres_type_cast(sql_type)));
            *arg_counter += 1;
        }
        _ => query.push('?'),
    }
}

/// A fluent Query Builder for constructing SQL queries.
///
/// Handles SELECT, INSERT, UPDATE, DELETE, filtering (WHERE), pagination
/// (LIMIT/OFFSET), and ordering. `E` is where the statement runs: the pool
/// (`db.model::<T>()`) or an open transaction (`tx.model::<T>()`). Every
/// terminal method consumes the builder.
pub struct QueryBuilder<'a, T, E> {
    pub(crate) executor: E,
    pub(crate) driver: Drivers,
    pub(crate) table_name: String,
    pub(crate) columns_info: Vec<ColumnInfo>,
    pub(crate) where_clauses: Vec<FilterFn>,
    pub(crate) order_clauses: Vec<String>,
    pub(crate) limit: Option<usize>,
    pub(crate) offset: Option<usize>,
    pub(crate) _marker: PhantomData<(&'a (), fn() -> T)>,
}

impl<'a, T, E> QueryBuilder<'a, T, E>
where
    T: Model + Send + Sync + Unpin,
    E: Executor<'a, Database = Any>,
{
    /// Creates a new QueryBuilder instance.
    ///
    /// Usually called via `db.model::<T>()` or `tx.model::<T>()`.
    pub fn new(executor: E, driver: Drivers) -> Self {
        Self {
            executor,
            driver,
            table_name: T::table_name().to_snake_case(),
            columns_info: T::columns(),
            where_clauses: Vec::new(),
            order_clauses: Vec::new(),
            limit: None,
            offset: None,
            _marker: PhantomData,
        }
    }

    /// Adds a WHERE clause to the query.
    ///
    /// ```rust,ignore
    /// db.model::<Booking>().filter(booking_fields::DESTINATION, Op::Eq, "LAX".to_string()).scan().await?;
    /// ```
    pub fn filter<V>(mut self, col: &'static str, op: Op, value: V) -> Self
    where
        V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync + Clone,
    {
        let clause: FilterFn = Box::new(move |query, args, driver, arg_counter| {
            query.push_str(" AND \"");
            query.push_str(col);
            query.push_str("\" ");
            query.push_str(op.as_sql());
            query.push(' ');
            push_placeholder(query, driver, arg_counter, "");
            args.bind_typed(value.clone())
        });
        self.where_clauses.push(clause);
        self
    }

    /// Shorthand for `filter(col, Op::Eq, value)`.
    pub fn equals<V>(self, col: &'static str, value: V) -> Self
    where
        V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync + Clone,
    {
        self.filter(col, Op::Eq, value)
    }

    /// Adds an ORDER BY column, ascending or descending.
    pub fn order_by(mut self, col: &str, ascending: bool) -> Self {
        let direction = if ascending { "ASC" } else { "DESC" };
        self.order_clauses.push(format!("\"{}\" {}", col, direction));
        self
    }

    /// Sets the query offset (pagination).
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets the maximum number of records to return.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn select_list(&self) -> String {
        self.columns_info
            .iter()
            .map(|col| {
                let name = col.sql_name();
                if col.is_date() { temporal::select_as_text(&name, &self.driver) } else { format!("\"{}\"", name) }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn push_where(&self, query: &mut String, args: &mut AnyArguments<'_>, arg_counter: &mut usize) -> Result<(), Error> {
        query.push_str(" WHERE 1=1");
        for clause in &self.where_clauses {
            clause(query, args, &self.driver, arg_counter)?;
        }
        Ok(())
    }

    fn build_select(&self, args: &mut AnyArguments<'_>) -> Result<String, Error> {
        let mut query = format!("SELECT {} FROM \"{}\"", self.select_list(), self.table_name);
        let mut arg_counter = 1;
        self.push_where(&mut query, args, &mut arg_counter)?;

        if !self.order_clauses.is_empty() {
            query.push_str(" ORDER BY ");
            query.push_str(&self.order_clauses.join(", "));
        }

        if let Some(limit) = self.limit {
            query.push_str(" LIMIT ");
            push_placeholder(&mut query, &self.driver, &mut arg_counter, "");
            args.bind_typed(limit as i64)?;
        }

        if let Some(offset) = self.offset {
            // OFFSET needs a LIMIT outside PostgreSQL
            if self.limit.is_none() {
                match self.driver {
                    Drivers::SQLite => query.push_str(" LIMIT -1"),
                    Drivers::MySQL => query.push_str(" LIMIT 18446744073709551615"),
                    Drivers::Postgres => {}
                }
            }
            query.push_str(" OFFSET ");
            push_placeholder(&mut query, &self.driver, &mut arg_counter, "");
            args.bind_typed(offset as i64)?;
        }

        Ok(query)
    }

    /// Returns the generated SELECT (for debugging purposes, without arguments).
    pub fn to_sql(&self) -> String {
        let mut dummy_args = AnyArguments::default();
        self.build_select(&mut dummy_args).unwrap_or_default()
    }

    /// Inserts a new record into the database based on the model instance.
    ///
    /// Returns the store-generated key when the model has an
    /// `auto_increment` primary key, `None` otherwise.
    pub async fn insert(self, model: &T) -> Result<Option<i64>, Error> {
        let data_map = model.to_map();

        let mut target_columns = Vec::new();
        let mut placeholders = String::new();
        let mut args = AnyArguments::default();
        let mut arg_counter = 1;

        for col in &self.columns_info {
            let Some(value) = data_map.get(col.name) else {
                continue;
            };
            if !target_columns.is_empty() {
                placeholders.push_str(", ");
            }
            target_columns.push(format!("\"{}\"", col.sql_name()));
            push_placeholder(&mut placeholders, &self.driver, &mut arg_counter, col.sql_type);
            args.bind_value(value, col.sql_type)?;
        }

        let mut query_str = if target_columns.is_empty() {
            format!("INSERT INTO \"{}\" DEFAULT VALUES", self.table_name)
        } else {
            format!("INSERT INTO \"{}\" ({}) VALUES ({})", self.table_name, target_columns.join(", "), placeholders)
        };

        let generated = self.columns_info.iter().find(|c| c.auto_increment).map(ColumnInfo::sql_name);

        match (generated, self.driver) {
            // The Any driver reports no last_insert_id for SQLite; RETURNING needs SQLite 3.35+
            (Some(pk), Drivers::Postgres | Drivers::SQLite) => {
                query_str.push_str(&format!(" RETURNING \"{}\"", pk));
                log::debug!("{}", query_str);
                let row = sqlx::query_with(&query_str, args).fetch_one(self.executor).await?;
                let id: i64 = row.try_get(0)?;
                Ok(Some(id))
            }
            (Some(_), _) => {
                log::debug!("{}", query_str);
                let result = sqlx::query_with(&query_str, args).execute(self.executor).await?;
                Ok(result.last_insert_id())
            }
            (None, _) => {
                log::debug!("{}", query_str);
                sqlx::query_with(&query_str, args).execute(self.executor).await?;
                Ok(None)
            }
        }
    }

    /// Writes every non-key column of `model` to the row with the same primary key.
    ///
    /// `None` fields are written as NULL. Fails with `Error::NotFound` when no
    /// row has that key.
    pub async fn save(self, model: &T) -> Result<u64, Error> {
        let data_map = model.to_map();

        let pk = self
            .columns_info
            .iter()
            .find(|c| c.is_primary_key)
            .ok_or_else(|| Error::invalid_argument("model has no primary key"))?;
        let pk_value = data_map
            .get(pk.name)
            .ok_or_else(|| Error::invalid_argument("primary key is not set; insert the model first"))?;

        let mut query_str = format!("UPDATE \"{}\" SET ", self.table_name);
        let mut args = AnyArguments::default();
        let mut arg_counter = 1;
        let mut first = true;

        for col in self.columns_info.iter().filter(|c| !c.is_primary_key) {
            if !first {
                query_str.push_str(", ");
            }
            first = false;
            query_str.push_str(&format!("\"{}\" = ", col.sql_name()));
            match data_map.get(col.name) {
                Some(value) => {
                    push_placeholder(&mut query_str, &self.driver, &mut arg_counter, col.sql_type);
                    args.bind_value(value, col.sql_type)?;
                }
                None => query_str.push_str("NULL"),
            }
        }

        if first {
            // Only a key column: nothing to write
            return Ok(0);
        }

        query_str.push_str(&format!(" WHERE \"{}\" = ", pk.sql_name()));
        push_placeholder(&mut query_str, &self.driver, &mut arg_counter, pk.sql_type);
        args.bind_value(pk_value, pk.sql_type)?;

        log::debug!("{}", query_str);
        let result = sqlx::query_with(&query_str, args).execute(self.executor).await?;
        match result.rows_affected() {
            0 => Err(Error::NotFound),
            n => Ok(n),
        }
    }

    /// Deletes every row matching the filters; returns the number removed.
    pub async fn delete(self) -> Result<u64, Error> {
        let mut query_str = format!("DELETE FROM \"{}\"", self.table_name);
        let mut args = AnyArguments::default();
        let mut arg_counter = 1;
        self.push_where(&mut query_str, &mut args, &mut arg_counter)?;

        log::debug!("{}", query_str);
        let result = sqlx::query_with(&query_str, args).execute(self.executor).await?;
        Ok(result.rows_affected())
    }

    /// Sets one column on every row matching the filters; returns the number changed.
    ///
    /// ```rust,ignore
    /// db.model::<Booking>()
    ///     .equals(booking_fields::USER_ID, user_id)
    ///     .set(booking_fields::UID, "tom2".to_string())
    ///     .await?;
    /// ```
    pub async fn set<V>(self, col: &'static str, value: V) -> Result<u64, Error>
    where
        V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync,
    {
        let sql_type = self.columns_info.iter().find(|c| c.sql_name() == col).map(|c| c.sql_type).unwrap_or("");

        let mut query_str = format!("UPDATE \"{}\" SET \"{}\" = ", self.table_name, col);
        let mut args = AnyArguments::default();
        let mut arg_counter = 1;
        push_placeholder(&mut query_str, &self.driver, &mut arg_counter, sql_type);
        args.bind_typed(value)?;
        self.push_where(&mut query_str, &mut args, &mut arg_counter)?;

        log::debug!("{}", query_str);
        let result = sqlx::query_with(&query_str, args).execute(self.executor).await?;
        Ok(result.rows_affected())
    }

    /// Counts the rows matching the filters.
    pub async fn count(self) -> Result<i64, Error> {
        let mut query_str = format!("SELECT COUNT(*) FROM \"{}\"", self.table_name);
        let mut args = AnyArguments::default();
        let mut arg_counter = 1;
        self.push_where(&mut query_str, &mut args, &mut arg_counter)?;

        log::debug!("{}", query_str);
        let row = sqlx::query_with(&query_str, args).fetch_one(self.executor).await?;
        Ok(i64::from_any_row(&row)?)
    }

    /// Executes the query and returns a list of results.
    ///
    /// ```rust,ignore
    /// let bookings: Vec<Booking> = db.model::<Booking>().scan().await?;
    /// ```
    pub async fn scan<R>(self) -> Result<Vec<R>, Error>
    where
        R: FromAnyRow + Send + Unpin,
    {
        let mut args = AnyArguments::default();
        let query_str = self.build_select(&mut args)?;

        log::debug!("{}", query_str);
        let rows = sqlx::query_with(&query_str, args).fetch_all(self.executor).await?;
        rows.iter().map(|row| R::from_any_row(row).map_err(Error::from)).collect()
    }

    /// Executes the query and returns the first result, or `None`.
    ///
    /// Orders by Primary Key if no order was given.
    pub async fn first_or_none<R>(mut self) -> Result<Option<R>, Error>
    where
        R: FromAnyRow + Send + Unpin,
    {
        if self.order_clauses.is_empty()
            && let Some(pk) = self.columns_info.iter().find(|c| c.is_primary_key)
        {
            self.order_clauses.push(format!("\"{}\" ASC", pk.sql_name()));
        }
        self.limit = Some(1);

        let mut args = AnyArguments::default();
        let query_str = self.build_select(&mut args)?;

        log::debug!("{}", query_str);
        let row = sqlx::query_with(&query_str, args).fetch_optional(self.executor).await?;
        row.map(|row| R::from_any_row(&row).map_err(Error::from)).transpose()
    }

    /// Executes the query and returns only the first result.
    ///
    /// Fails with `Error::NotFound` when nothing matches.
    ///
    /// ```rust,ignore
    /// let user: User = db.model::<User>().equals(user_fields::UID, "toby".to_string()).first().await?;
    /// ```
    pub async fn first<R>(self) -> Result<R, Error>
    where
        R: FromAnyRow + Send + Unpin,
    {
        self.first_or_none().await?.ok_or(Error::NotFound)
    }
}
