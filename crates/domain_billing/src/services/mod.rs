//! Billing application services
//!
//! Each public operation runs as one unit of work on the association store:
//! lock the (family, season) it touches, validate, write, reconcile the
//! family's membership statuses, then commit. Any error before the commit
//! drops the transaction and nothing is persisted.

pub mod payments;
pub mod invoices;
pub mod enrollment;
pub mod seasons;

pub use payments::{FamilyPaymentService, RecordedPayment};
pub use invoices::InvoiceService;
pub use enrollment::{EnrollmentService, RegistrationChange};
pub use seasons::{NewSeason, SeasonService};

use core_kernel::{FamilyId, MemberId, PortError, SeasonId};

use crate::error::BillingError;
use crate::ports::AssociationTransaction;
use crate::reconciliation::{update_membership_statuses_for_family, ReconciliationOutcome};

/// Maps a store conflict to a domain error, other failures pass through
pub(crate) fn conflict_as(err: PortError, domain: impl FnOnce() -> BillingError) -> BillingError {
    if err.is_conflict() {
        domain()
    } else {
        BillingError::Port(err)
    }
}

/// Locks and reconciles a family for a season
pub(crate) async fn reconcile_family(
    tx: &mut dyn AssociationTransaction,
    family_id: FamilyId,
    season_id: SeasonId,
) -> Result<ReconciliationOutcome, BillingError> {
    tx.lock_family_season(family_id, season_id).await?;
    Ok(update_membership_statuses_for_family(tx, family_id, season_id).await?)
}

/// Reconciles the family of a member, if it has one
pub(crate) async fn reconcile_member_family(
    tx: &mut dyn AssociationTransaction,
    member_id: MemberId,
    season_id: SeasonId,
) -> Result<Option<ReconciliationOutcome>, BillingError> {
    let member = tx
        .find_member(member_id)
        .await?
        .ok_or(domain_membership::MembershipError::MemberNotFound(member_id))?;

    match member.family_id {
        Some(family_id) => Ok(Some(reconcile_family(tx, family_id, season_id).await?)),
        None => Ok(None),
    }
}
