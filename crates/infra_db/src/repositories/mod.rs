//! Repository implementations for the association aggregates
//!
//! Each repository holds the SQL for one aggregate and maps it to row types.
//! Repositories never open transactions themselves: every function runs on
//! the connection it is handed, which is usually the open transaction of a
//! unit of work.

pub mod families;
pub mod seasons;
pub mod workshops;
pub mod enrollment;
pub mod payments;
pub mod invoices;

pub use families::FamilyRepository;
pub use seasons::SeasonRepository;
pub use workshops::WorkshopRepository;
pub use enrollment::{MembershipRepository, RegistrationRepository};
pub use payments::PaymentRepository;
pub use invoices::InvoiceRepository;

use sqlx::PgConnection;

use crate::error::DatabaseError;

/// Takes a transaction scoped advisory lock on an arbitrary key
///
/// The lock is released when the surrounding transaction commits or rolls
/// back. Taking it twice in the same transaction does not block.
pub async fn advisory_xact_lock(conn: &mut PgConnection, key: &str) -> Result<(), DatabaseError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(key)
        .execute(conn)
        .await?;
    Ok(())
}
