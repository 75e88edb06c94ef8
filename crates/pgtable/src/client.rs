//! Generic client trait for unified database access.

use crate::dialect::Dialect;
use crate::error::{TableError, TableResult};
use tokio_postgres::Row;
use tokio_postgres::Statement;
use tokio_postgres::types::ToSql;

/// A trait that unifies database clients, transactions and pools.
///
/// [`TableBuilder`](crate::TableBuilder) is generic over this trait, so a
/// builder can run against a single connection, inside a transaction, or
/// against the shared pool handed out by
/// [`ConnectionProvider`](crate::ConnectionProvider).
pub trait GenericClient: Send + Sync {
    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = TableResult<Vec<Row>>> + Send;

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = TableResult<u64>> + Send;

    /// SQL dialect this client can execute.
    ///
    /// Every bundled implementation wraps `tokio-postgres`, so the default is
    /// [`Dialect::Postgres`]. Builders refuse to run statements rendered for
    /// any other dialect on this client.
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    /// Whether this client supports prepared statement APIs.
    ///
    /// The default implementation returns `false`, and prepared APIs will error if called.
    fn supports_prepared_statements(&self) -> bool {
        false
    }

    /// Prepare a statement on this connection.
    ///
    /// Prepared statements are **per-connection** and must not be used across connections.
    fn prepare_statement(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = TableResult<Statement>> + Send {
        let _ = sql;
        async {
            Err(TableError::Other(
                "prepared statements are not supported by this client".to_string(),
            ))
        }
    }

    /// Execute a prepared statement and return affected row count.
    fn execute_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = TableResult<u64>> + Send {
        let _ = stmt;
        let _ = params;
        async {
            Err(TableError::Other(
                "prepared statements are not supported by this client".to_string(),
            ))
        }
    }
}

impl<T: GenericClient> GenericClient for &T {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<Vec<Row>> {
        T::query(*self, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<u64> {
        T::execute(*self, sql, params).await
    }

    fn dialect(&self) -> Dialect {
        T::dialect(*self)
    }

    fn supports_prepared_statements(&self) -> bool {
        T::supports_prepared_statements(*self)
    }

    async fn prepare_statement(&self, sql: &str) -> TableResult<Statement> {
        T::prepare_statement(*self, sql).await
    }

    async fn execute_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> TableResult<u64> {
        T::execute_prepared(*self, stmt, params).await
    }
}

impl GenericClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<Vec<Row>> {
        Ok(tokio_postgres::Client::query(self, sql, params).await?)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<u64> {
        Ok(tokio_postgres::Client::execute(self, sql, params).await?)
    }

    fn supports_prepared_statements(&self) -> bool {
        true
    }

    async fn prepare_statement(&self, sql: &str) -> TableResult<Statement> {
        Ok(tokio_postgres::Client::prepare(self, sql).await?)
    }

    async fn execute_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> TableResult<u64> {
        Ok(tokio_postgres::Client::execute(self, stmt, params).await?)
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<Vec<Row>> {
        Ok(tokio_postgres::Transaction::query(self, sql, params).await?)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<u64> {
        Ok(tokio_postgres::Transaction::execute(self, sql, params).await?)
    }

    fn supports_prepared_statements(&self) -> bool {
        true
    }

    async fn prepare_statement(&self, sql: &str) -> TableResult<Statement> {
        Ok(tokio_postgres::Transaction::prepare(self, sql).await?)
    }

    async fn execute_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> TableResult<u64> {
        Ok(tokio_postgres::Transaction::execute(self, stmt, params).await?)
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<Vec<Row>> {
        // Delegate to the deref target (ClientWrapper -> tokio_postgres::Client).
        let inner: &tokio_postgres::Client = self;
        GenericClient::query(inner, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<u64> {
        let inner: &tokio_postgres::Client = self;
        GenericClient::execute(inner, sql, params).await
    }

    fn supports_prepared_statements(&self) -> bool {
        true
    }

    async fn prepare_statement(&self, sql: &str) -> TableResult<Statement> {
        let inner: &tokio_postgres::Client = self;
        GenericClient::prepare_statement(inner, sql).await
    }

    async fn execute_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> TableResult<u64> {
        let inner: &tokio_postgres::Client = self;
        GenericClient::execute_prepared(inner, stmt, params).await
    }
}

/// A pool checks out one connection per call.
///
/// Prepared statements are per-connection, so the pool reports no prepared
/// statement support and every call goes through the unnamed statement path.
#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Pool {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<Vec<Row>> {
        let client = self.get().await?;
        GenericClient::query(&client, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<u64> {
        let client = self.get().await?;
        GenericClient::execute(&client, sql, params).await
    }
}
