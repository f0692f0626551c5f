//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL storage of the association billing
//! system using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. Repositories hold the SQL for one
//! aggregate and run it on whatever connection they are handed; the
//! [`PostgresAssociationStore`] adapter owns the pool, opens one database
//! transaction per unit of work and implements the billing domain's ports on
//! top of the repositories.
//!
//! # Concurrency
//!
//! Every transaction touching a (family, season) pair takes a transaction
//! scoped advisory lock on that pair, so payment writes and the membership
//! reconciliation they trigger never interleave.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresAssociationStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/association")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresAssociationStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use adapters::PostgresAssociationStore;
