//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! association billing test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built families, members, seasons and a fixed clock
//! - `builders`: Scenario and payment builders, seedable into either store
//! - `database`: PostgreSQL test containers with the schema migrated
//! - `assertions`: Custom assertion helpers for money, stats and error codes
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
