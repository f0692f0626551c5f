//! Seasons (membership years)
//!
//! A season fixes the base membership fee and the family discount. At most
//! one season is active at a time; [`activate_exclusively`] expresses that
//! rule over an in-memory set of seasons, and storage adapters reproduce it
//! inside a single transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, Percentage, SeasonId};

use crate::error::MembershipError;

/// Season status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonStatus {
    Active,
    Inactive,
}

/// A membership year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub id: SeasonId,
    pub start_year: i32,
    pub end_year: i32,
    /// Base membership fee
    pub membership_amount: Money,
    /// Discount applied to the 2nd and following members of a family
    pub discount_percent: Percentage,
    pub status: SeasonStatus,
    pub created_at: DateTime<Utc>,
}

impl Season {
    /// Creates an inactive season
    ///
    /// # Errors
    ///
    /// - `MembershipError::InvalidSeasonYears` unless `start_year < end_year`
    /// - `MembershipError::InvalidAmount` unless the fee is chargeable
    pub fn new(
        start_year: i32,
        end_year: i32,
        membership_amount: Money,
        discount_percent: Percentage,
    ) -> Result<Self, MembershipError> {
        if start_year >= end_year {
            return Err(MembershipError::InvalidSeasonYears { start_year, end_year });
        }
        let membership_amount = Money::chargeable(membership_amount.amount())?;

        Ok(Self {
            id: SeasonId::new_v7(),
            start_year,
            end_year,
            membership_amount,
            discount_percent,
            status: SeasonStatus::Inactive,
            created_at: Utc::now(),
        })
    }

    /// "2024-2025"
    pub fn label(&self) -> String {
        format!("{}-{}", self.start_year, self.end_year)
    }

    pub fn is_active(&self) -> bool {
        self.status == SeasonStatus::Active
    }

    /// Rejects the season if another one covers the same years
    pub fn ensure_unique(&self, existing: &[Season]) -> Result<(), MembershipError> {
        let duplicate = existing.iter().any(|s| {
            s.id != self.id && s.start_year == self.start_year && s.end_year == self.end_year
        });

        if duplicate {
            return Err(MembershipError::SeasonAlreadyExists {
                start_year: self.start_year,
                end_year: self.end_year,
            });
        }
        Ok(())
    }
}

/// Activates one season and deactivates every other, in one pass
///
/// Nothing is modified when the season is unknown.
pub fn activate_exclusively(seasons: &mut [Season], season_id: SeasonId) -> Result<(), MembershipError> {
    if !seasons.iter().any(|s| s.id == season_id) {
        return Err(MembershipError::SeasonNotFound(season_id));
    }

    for season in seasons.iter_mut() {
        season.status = if season.id == season_id {
            SeasonStatus::Active
        } else {
            SeasonStatus::Inactive
        };
    }
    Ok(())
}
