//! # pgtable
//!
//! A small fluent helper for persisting rows collected in memory (scraped
//! pages, crawled records) into PostgreSQL.
//!
//! ## Features
//!
//! - **Create if missing**: `create table if not exists` with a synthetic `id`
//!   column unless a custom primary key is declared
//! - **One round trip per batch**: every pending row goes out in a single
//!   multi-row INSERT, values bound as parameters
//! - **Bounded preparation**: an [`AdmissionGate`] caps how many statements are
//!   being prepared/executed at once across all builders sharing it
//! - **Retry friendly**: a failed `update()` keeps its pending rows
//! - **Any client**: pass a connection, a transaction, a pooled client or the
//!   pool itself anywhere a [`GenericClient`] is expected
//!
//! ```ignore
//! use pgtable::{ConnectionProvider, DbConfig};
//!
//! let provider = ConnectionProvider::new(DbConfig::from_env()?);
//! provider.refresh().await?;
//!
//! let mut books = provider
//!     .table("books")?
//!     .add_columns(["title varchar(255) not null", "price numeric(10, 2)"])?;
//! books.create().await?;
//!
//! for (title, price) in scraped {
//!     books.add_row([title, price]);
//! }
//! books.update().await?;
//! ```
//!
//! SQL is logged through `tracing` at debug level on the `pgtable.sql` target;
//! pool lifecycle events go to `pgtable.pool`.

pub mod client;
pub mod column;
pub mod config;
pub mod dialect;
pub mod error;
pub mod gate;
pub mod render;
pub mod table;

pub use client::GenericClient;
pub use column::ColumnDef;
pub use config::DbConfig;
pub use dialect::Dialect;
pub use error::{TableError, TableResult};
pub use gate::{AdmissionGate, GatePermit};
pub use table::{TableBuilder, ValueMode};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub mod provider;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_manager_config};

#[cfg(feature = "pool")]
pub use provider::ConnectionProvider;

// Re-export the driver so callers can name `Row` and friends without a direct dependency.
pub use tokio_postgres;

#[cfg(feature = "pool")]
pub use deadpool_postgres;
