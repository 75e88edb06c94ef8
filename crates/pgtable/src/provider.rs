//! Shared connection provider: one pool, its last init error, and the admission gate.

use crate::config::DbConfig;
use crate::error::{TableError, TableResult};
use crate::gate::AdmissionGate;
use crate::pool::create_pool;
use crate::table::TableBuilder;
use deadpool_postgres::Pool;
use std::sync::{Arc, RwLock};

const POOL_TARGET: &str = "pgtable.pool";

#[derive(Default)]
struct ProviderState {
    pool: Option<Pool>,
    last_error: Option<Arc<TableError>>,
}

/// Hands out the shared database handle to every [`TableBuilder`].
///
/// Reading the handle never reconnects; callers decide when to
/// [`refresh`](Self::refresh), e.g. once at startup and again after a
/// connectivity failure.
///
/// ```ignore
/// let provider = ConnectionProvider::new(DbConfig::from_env()?);
/// provider.refresh().await?;
///
/// let mut pages = provider.table("pages")?.add_columns(["url text", "title text"])?;
/// pages.create().await?;
/// ```
pub struct ConnectionProvider {
    config: DbConfig,
    gate: AdmissionGate,
    state: RwLock<ProviderState>,
}

impl ConnectionProvider {
    /// Create a provider with no pool yet. The gate is sized from the config.
    pub fn new(config: DbConfig) -> Self {
        let gate = AdmissionGate::new(config.gate_capacity());
        Self {
            config,
            gate,
            state: RwLock::new(ProviderState::default()),
        }
    }

    /// The configuration this provider connects with.
    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// The admission gate shared by every builder this provider creates.
    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Open a new pool and ping it, replacing the previous pool.
    ///
    /// - If the pool cannot be built, the previous pool stays in place.
    /// - If the ping fails, the new pool is installed anyway.
    ///
    /// Either failure is logged, recorded as the last error (see
    /// [`handle`](Self::handle)) and returned.
    pub async fn refresh(&self) -> TableResult<()> {
        let pool = match create_pool(&self.config) {
            Ok(pool) => pool,
            Err(err) => {
                tracing::error!(
                    target: POOL_TARGET,
                    database = %self.config.database,
                    error = %err,
                    "failed to open pool"
                );
                return Err(self.record(None, err));
            }
        };

        if let Err(err) = ping(&pool).await {
            tracing::error!(
                target: POOL_TARGET,
                database = %self.config.database,
                error = %err,
                "pool ping failed"
            );
            return Err(self.record(Some(pool), err));
        }

        tracing::info!(
            target: POOL_TARGET,
            database = %self.config.database,
            max_conns = self.config.max_conns,
            gate_capacity = self.gate.capacity(),
            "pool ready"
        );
        let mut state = self.state.write().expect("provider state poisoned");
        state.pool = Some(pool);
        state.last_error = None;
        Ok(())
    }

    /// Current pool and the error from the last `refresh`, without reconnecting.
    pub fn handle(&self) -> (Option<Pool>, Option<Arc<TableError>>) {
        let state = self.state.read().expect("provider state poisoned");
        (state.pool.clone(), state.last_error.clone())
    }

    /// Current pool, or [`TableError::Connection`] if none was ever installed.
    pub fn pool(&self) -> TableResult<Pool> {
        let (pool, last_error) = self.handle();
        pool.ok_or_else(|| match last_error {
            Some(err) => TableError::Connection(format!("no pool available: {err}")),
            None => TableError::Connection("no pool available: refresh() was never called".into()),
        })
    }

    /// A builder for `name` bound to the current pool and the shared gate.
    pub fn table(&self, name: impl Into<String>) -> TableResult<TableBuilder<Pool>> {
        Ok(TableBuilder::new(self.pool()?, self.gate.clone()).table_name(name))
    }

    /// Store the outcome of a failed refresh and return an error for the caller.
    fn record(&self, pool: Option<Pool>, err: TableError) -> TableError {
        let message = err.to_string();
        let mut state = self.state.write().expect("provider state poisoned");
        if pool.is_some() {
            state.pool = pool;
        }
        state.last_error = Some(Arc::new(err));
        TableError::Connection(message)
    }
}

async fn ping(pool: &Pool) -> TableResult<()> {
    let client = pool.get().await?;
    client.simple_query("SELECT 1").await?;
    Ok(())
}
