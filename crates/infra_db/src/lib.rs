//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the retail backend, implemented with SQLx
//! repositories that mirror the domain operations transactionally.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: each repository encapsulates
//! the SQL for one domain module and keeps the same validation order as the
//! in-memory aggregates, so an operation fails before any row changes.
//! FIFO batch consumption and funds checks take `FOR UPDATE` row locks, and
//! every business operation runs inside a single transaction.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool_from_url, repositories::SalesRepository, MIGRATOR};
//!
//! let pool = create_pool_from_url("postgres://localhost/retail").await?;
//! MIGRATOR.run(&pool).await?;
//! let sales = SalesRepository::new(pool);
//! ```

pub mod audit;
pub mod error;
pub mod pool;
pub mod repositories;

pub use audit::PgAuditSink;
pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool, MIGRATOR};
