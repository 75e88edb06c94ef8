//! Fluent builder that creates one table, batches rows into it and reads it back.
//!
//! ```ignore
//! use pgtable::{AdmissionGate, TableBuilder};
//!
//! let gate = AdmissionGate::new(8);
//! let mut users = TableBuilder::new(&client, gate)
//!     .table_name("users")
//!     .add_columns(["name varchar(50)", "age int"])?;
//!
//! users.create().await?;
//! users.add_row(["alice", "30"]).add_row(["bob", "41"]);
//! users.update().await?;
//!
//! let rows = users.select_all().await?;
//! ```
//!
//! A builder is driven by one caller at a time. `create`, `add_row` and
//! `update` take `&mut self`; sharing one instance between tasks needs an
//! external lock, and statement order is then whatever that lock yields.

use crate::client::GenericClient;
use crate::column::ColumnDef;
use crate::dialect::Dialect;
use crate::error::{TableError, TableResult};
use crate::gate::AdmissionGate;
use crate::render;
use std::time::Duration;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// How `update()` puts row values into the INSERT statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueMode {
    /// Values are sent as bind parameters.
    #[default]
    Bind,
    /// Values are inlined as escaped string literals.
    Inline,
}

/// Log target for executed statements.
const SQL_TARGET: &str = "pgtable.sql";

/// Longest SQL (in bytes) written to a log event.
const MAX_LOGGED_SQL: usize = 200;

/// Stateful table builder bound to one table.
pub struct TableBuilder<C> {
    client: C,
    gate: AdmissionGate,
    dialect: Dialect,
    value_mode: ValueMode,
    timeout: Option<Duration>,
    table: String,
    columns: Vec<ColumnDef>,
    rows: Vec<Vec<String>>,
    custom_primary_key: bool,
    last_sql: String,
}

impl<C: GenericClient> TableBuilder<C> {
    /// Create a builder running statements on `client`, admitted through `gate`.
    pub fn new(client: C, gate: AdmissionGate) -> Self {
        Self {
            client,
            gate,
            dialect: Dialect::default(),
            value_mode: ValueMode::default(),
            timeout: None,
            table: String::new(),
            columns: Vec::new(),
            rows: Vec::new(),
            custom_primary_key: false,
            last_sql: String::new(),
        }
    }

    /// Set the table name. It is used verbatim, so it must be a valid unquoted identifier.
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table = name.into();
        self
    }

    /// Append one column from a `"name type-and-constraints"` definition.
    pub fn add_column(mut self, def: &str) -> TableResult<Self> {
        self.columns.push(ColumnDef::parse(def)?);
        Ok(self)
    }

    /// Append several columns in order. Nothing is appended if any definition is malformed.
    pub fn add_columns<I, S>(mut self, defs: I) -> TableResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = defs
            .into_iter()
            .map(|d| ColumnDef::parse(d.as_ref()))
            .collect::<TableResult<Vec<_>>>()?;
        self.columns.extend(parsed);
        Ok(self)
    }

    /// Append a column that carries the table's own primary key.
    ///
    /// `create()` then leaves out the synthetic `id` column.
    pub fn custom_primary_key(mut self, def: &str) -> TableResult<Self> {
        self.columns.push(ColumnDef::parse(def)?);
        self.custom_primary_key = true;
        Ok(self)
    }

    /// Set the SQL dialect used for rendering.
    ///
    /// `create()` and `update()` only run statements in the dialect the client
    /// speaks (see [`GenericClient::dialect`]); the bundled clients all speak
    /// Postgres. With another dialect the builder can still render text via
    /// [`to_create_sql`](Self::to_create_sql) and friends.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Choose between bound and inlined INSERT values.
    ///
    /// Bound values fall back to inlined literals when the column types are
    /// unknown, see [`render::bindable`].
    pub fn values(mut self, mode: ValueMode) -> Self {
        self.value_mode = mode;
        self
    }

    /// Deadline covering gate admission, prepare and execute of each statement.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Queue one row. Values line up with the declared columns by position.
    pub fn add_row<I, S>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(values.into_iter().map(Into::into).collect());
        self
    }

    /// Create the table if it does not exist yet.
    ///
    /// Without declared columns this is a no-op. Errors from the database are
    /// returned as-is; the builder stays usable.
    pub async fn create(&mut self) -> TableResult<&mut Self> {
        self.require_table_name()?;
        if self.columns.is_empty() {
            return Ok(self);
        }
        self.require_executable_dialect()?;

        let sql = self.to_create_sql();
        self.last_sql.clone_from(&sql);
        self.run_admitted(&sql, &[]).await?;
        Ok(self)
    }

    /// Insert every pending row with a single statement.
    ///
    /// Pending rows are cleared only when the statement succeeds, so a failed
    /// update can be retried. Returns the number of rows the database reports.
    pub async fn update(&mut self) -> TableResult<u64> {
        if self.rows.is_empty() {
            return Err(TableError::empty_input(format!(
                "no pending rows for table {:?}",
                self.table
            )));
        }
        self.require_table_name()?;
        render::check_rows(&self.columns, &self.rows)?;
        self.require_executable_dialect()?;

        let affected = match self.effective_value_mode() {
            ValueMode::Inline => {
                let sql = self.to_inline_insert_sql();
                self.last_sql.clone_from(&sql);
                self.run_admitted(&sql, &[]).await?
            }
            ValueMode::Bind => {
                let sql = self.to_insert_sql()?;
                self.last_sql.clone_from(&sql);
                let params: Vec<&(dyn ToSql + Sync)> = self
                    .rows
                    .iter()
                    .flatten()
                    .map(|v| v as &(dyn ToSql + Sync))
                    .collect();
                self.run_admitted(&sql, &params).await?
            }
        };

        tracing::debug!(
            target: SQL_TARGET,
            table = %self.table,
            rows = self.rows.len(),
            affected,
            "pending rows written"
        );
        self.rows.clear();
        Ok(affected)
    }

    /// Read every row of the table.
    ///
    /// Reads are not admitted through the gate.
    pub async fn select_all(&self) -> TableResult<Vec<Row>> {
        self.require_table_name()?;
        let sql = render::select_all(&self.table);
        log_sql(&self.table, &sql, 0);
        self.with_timeout(self.client.query(&sql, &[])).await
    }

    /// Table name, empty until set.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Declared columns in order.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Rows queued since the last successful `update()`.
    pub fn pending_rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// The last statement `create()` or `update()` rendered, empty before the first.
    pub fn last_sql(&self) -> &str {
        &self.last_sql
    }

    /// Render the CREATE statement without running it.
    pub fn to_create_sql(&self) -> String {
        render::create_table(
            self.dialect,
            &self.table,
            &self.columns,
            self.custom_primary_key,
        )
    }

    /// Render the bound INSERT for the pending rows without running it.
    pub fn to_insert_sql(&self) -> TableResult<String> {
        render::insert_bound(self.dialect, &self.table, &self.columns, &self.rows)
    }

    /// Render the pending rows as an INSERT with inlined literals.
    pub fn to_inline_insert_sql(&self) -> String {
        render::insert_inline(self.dialect, &self.table, &self.columns, &self.rows)
    }

    fn require_table_name(&self) -> TableResult<()> {
        if self.table.is_empty() {
            return Err(TableError::configuration("table name is not set"));
        }
        Ok(())
    }

    fn require_executable_dialect(&self) -> TableResult<()> {
        let client_dialect = self.client.dialect();
        if self.dialect != client_dialect {
            return Err(TableError::configuration(format!(
                "table {:?} renders {:?} SQL but the client executes {:?}",
                self.table, self.dialect, client_dialect
            )));
        }
        Ok(())
    }

    fn effective_value_mode(&self) -> ValueMode {
        match self.value_mode {
            ValueMode::Bind if !render::bindable(self.dialect, &self.columns) => ValueMode::Inline,
            mode => mode,
        }
    }

    /// Take a gate slot, then prepare and execute. The slot is released on
    /// every exit, including timeout and cancellation.
    async fn run_admitted(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<u64> {
        self.with_timeout(async {
            let _permit = self.gate.acquire().await?;
            log_sql(&self.table, sql, params.len());

            if self.client.supports_prepared_statements() {
                let stmt = self.client.prepare_statement(sql).await?;
                self.client.execute_prepared(&stmt, params).await
            } else {
                self.client.execute(sql, params).await
            }
        })
        .await
    }

    async fn with_timeout<T>(
        &self,
        fut: impl std::future::Future<Output = TableResult<T>>,
    ) -> TableResult<T> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| TableError::Timeout(limit))?,
            None => fut.await,
        }
    }
}

fn log_sql(table: &str, sql: &str, param_count: usize) {
    tracing::debug!(
        target: SQL_TARGET,
        table,
        param_count,
        sql = %truncate_sql(sql, MAX_LOGGED_SQL),
        "executing"
    );
}

fn truncate_sql(sql: &str, max_bytes: usize) -> String {
    if sql.len() <= max_bytes {
        return sql.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &sql[..end])
}
