//! Membership status reconciliation
//!
//! After anything that changes what a family owes or has paid for a season,
//! every membership of the family for that season is flipped as a block:
//! all `pending` ones become `completed` once the balance is covered, and all
//! `completed` ones go back to `pending` when it no longer is. Cancelled
//! memberships are never touched.

use serde::Serialize;
use tracing::{debug, info, instrument};

use core_kernel::{FamilyId, MemberId, PortError, SeasonId};
use domain_membership::MembershipStatus;

use crate::ports::AssociationTransaction;
use crate::stats::{compute_financial_stats, FinancialStats, StatsSource};

/// A bulk move between two membership statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusTransition {
    pub from: MembershipStatus,
    pub to: MembershipStatus,
}

/// The transition a family's memberships should undergo given its stats
pub fn target_transition(stats: &FinancialStats) -> StatusTransition {
    if stats.is_settled() {
        StatusTransition {
            from: MembershipStatus::Pending,
            to: MembershipStatus::Completed,
        }
    } else {
        StatusTransition {
            from: MembershipStatus::Completed,
            to: MembershipStatus::Pending,
        }
    }
}

/// What a reconciliation found and did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReconciliationOutcome {
    pub family_id: FamilyId,
    pub season_id: SeasonId,
    pub stats: FinancialStats,
    pub transition: StatusTransition,
    /// Memberships whose status changed
    pub updated: u64,
}

/// Recomputes a family's balance for a season and realigns its memberships
///
/// Runs inside the caller's unit of work, so it sees the caller's
/// uncommitted writes. Any storage failure is returned as is and the caller
/// must not commit.
#[instrument(skip(tx), fields(family_id = %family_id, season_id = %season_id))]
pub async fn update_membership_statuses_for_family(
    tx: &mut dyn AssociationTransaction,
    family_id: FamilyId,
    season_id: SeasonId,
) -> Result<ReconciliationOutcome, PortError> {
    let member_ids: Vec<MemberId> = tx
        .members_by_family(family_id)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();

    let payments = tx.payments(family_id, season_id).await?;
    let memberships = tx.memberships(&member_ids, season_id).await?;
    let registrations = tx.registrations(&member_ids, season_id).await?;

    let stats = compute_financial_stats(
        &[StatsSource::new(&memberships, &registrations)],
        Some(&payments),
        season_id,
    );
    let transition = target_transition(&stats);

    debug!(
        total_due = %stats.total_due,
        total_paid = %stats.total_paid,
        balance = %stats.balance,
        "Computed family balance"
    );

    let updated = if member_ids.is_empty() {
        0
    } else {
        tx.update_membership_statuses(&member_ids, season_id, transition.from, transition.to)
            .await?
    };

    if updated > 0 {
        info!(
            from = %transition.from,
            to = %transition.to,
            updated,
            "Membership statuses reconciled"
        );
    }

    Ok(ReconciliationOutcome {
        family_id,
        season_id,
        stats,
        transition,
        updated,
    })
}
