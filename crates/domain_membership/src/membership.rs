//! Season memberships
//!
//! A membership is one member's enrollment in one season. Its status is not
//! user-editable: it reads `completed` exactly when the member's family has
//! settled the season, and is recomputed by the billing reconciler after
//! every payment mutation. `cancelled` is set elsewhere and is absorbing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{MemberId, MembershipId, Money, SeasonId};

use crate::season::Season;

/// Membership status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// Family still owes money for the season
    Pending,
    /// Family's season balance is covered
    #[serde(alias = "paid")]
    Completed,
    /// Terminal, never touched by reconciliation
    Cancelled,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Pending => "pending",
            MembershipStatus::Completed => "completed",
            MembershipStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MembershipStatus::Cancelled)
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for enrolling a member in a season
#[derive(Debug, Clone)]
pub struct NewMembership {
    pub member_id: MemberId,
    pub season_id: SeasonId,
    /// Explicit rank within the family; computed when absent
    pub family_order: Option<u32>,
    /// Fee override; the season's base fee when absent
    pub amount: Option<Money>,
}

/// One member's enrollment in one season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub member_id: MemberId,
    pub season_id: SeasonId,
    /// 1 for the first family member enrolled in the season, 2 for the second, ...
    pub family_order: u32,
    /// Fee actually charged
    pub amount: Money,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
}

impl Membership {
    /// Enrolls a member given how many of the family's members already hold
    /// a membership for the same season
    pub fn enroll(input: NewMembership, season: &Season, existing_family_memberships: usize) -> Self {
        Self {
            id: MembershipId::new_v7(),
            member_id: input.member_id,
            season_id: input.season_id,
            family_order: input
                .family_order
                .unwrap_or_else(|| next_family_order(existing_family_memberships)),
            amount: input.amount.unwrap_or(season.membership_amount),
            status: MembershipStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Eligible for the season's family discount (2nd member onward)
    pub fn is_discount_eligible(&self) -> bool {
        self.family_order >= 2
    }
}

/// Rank of the next family member enrolled in a season
pub fn next_family_order(existing_family_memberships: usize) -> u32 {
    u32::try_from(existing_family_memberships)
        .unwrap_or(u32::MAX - 1)
        .saturating_add(1)
}
