//! Store adapters that live next to the domain
//!
//! - **InMemoryAssociationStore**: the whole association in memory, with
//!   copy-on-commit transactions. Used by tests and by the API when no
//!   database is configured.
//!
//! The PostgreSQL adapter lives in `infra_db`.

pub mod memory;

pub use memory::{AssociationState, InMemoryAssociationStore};
