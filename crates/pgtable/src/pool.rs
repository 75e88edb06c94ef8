//! Connection pool utilities

use crate::config::DbConfig;
use crate::error::{TableError, TableResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, PoolBuilder, RecyclingMethod};
use tokio_postgres::NoTls;
use tokio_postgres::Socket;
use tokio_postgres::tls::{MakeTlsConnect, TlsConnect};

/// Create a connection pool from a [`DbConfig`] using `NoTls`.
///
/// The pool holds at most `max_conns` connections and keeps idle ones open
/// up to that count; nothing is connected until the first checkout.
pub fn create_pool(config: &DbConfig) -> TableResult<Pool> {
    let max_size = config.max_conns;
    create_pool_with_manager_config(
        config.pg_config()?,
        NoTls,
        default_manager_config(),
        |builder| builder.max_size(max_size),
    )
}

/// Create a connection pool with injected `deadpool_postgres::ManagerConfig` and `PoolBuilder`.
///
/// Use this when you need TLS or want to tune pool settings (timeouts,
/// recycling strategy, max size, etc.) from your application configuration.
pub fn create_pool_with_manager_config<T>(
    pg_config: tokio_postgres::Config,
    tls: T,
    manager_config: ManagerConfig,
    configure_pool: impl FnOnce(PoolBuilder) -> PoolBuilder,
) -> TableResult<Pool>
where
    T: MakeTlsConnect<Socket> + Clone + Sync + Send + 'static,
    T::Stream: Sync + Send,
    T::TlsConnect: Sync + Send,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    let mgr = Manager::from_config(pg_config, tls, manager_config);
    configure_pool(Pool::builder(mgr))
        .build()
        .map_err(|e| TableError::Pool(e.to_string()))
}

fn default_manager_config() -> ManagerConfig {
    ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    }
}
