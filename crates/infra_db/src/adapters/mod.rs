//! Domain Adapters
//!
//! Adapter implementations of the billing domain's ports on PostgreSQL.
//!
//! # Architecture
//!
//! The adapter:
//! - Implements `AssociationStore` / `AssociationTransaction`
//! - Translates between domain models and database row types (`convert`)
//! - Uses the repository layer for the SQL
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresAssociationStore;
//! use domain_billing::AssociationStore;
//!
//! let store = PostgresAssociationStore::new(pool);
//! let mut tx = store.begin().await?;
//! ```

pub mod association;
mod convert;

pub use association::PostgresAssociationStore;
