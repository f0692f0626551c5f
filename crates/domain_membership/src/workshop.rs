//! Workshops and their per-season prices

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, SeasonId, WorkshopId, WorkshopPriceId};

use crate::error::MembershipError;

/// Workshop status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkshopStatus {
    Active,
    Inactive,
}

/// An activity members register to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workshop {
    pub id: WorkshopId,
    pub name: String,
    pub status: WorkshopStatus,
    /// Whether a member may take several units of this workshop
    pub allow_multiple: bool,
    /// Cap on units per member, only meaningful with `allow_multiple`
    pub max_per_member: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl Workshop {
    /// Creates an active workshop
    ///
    /// `max_per_member` is required and positive when `allow_multiple` is set,
    /// and discarded otherwise.
    pub fn new(
        name: impl Into<String>,
        allow_multiple: bool,
        max_per_member: Option<u32>,
    ) -> Result<Self, MembershipError> {
        let max_per_member = if allow_multiple {
            match max_per_member {
                Some(max) if max > 0 => Some(max),
                _ => return Err(MembershipError::InvalidWorkshopMultiplicity),
            }
        } else {
            None
        };

        Ok(Self {
            id: WorkshopId::new_v7(),
            name: name.into(),
            status: WorkshopStatus::Active,
            allow_multiple,
            max_per_member,
            created_at: Utc::now(),
        })
    }

    /// Checks a requested quantity against the workshop's multiplicity rules
    pub fn check_quantity(&self, quantity: u32) -> Result<(), MembershipError> {
        if quantity == 0 {
            return Err(MembershipError::InvalidQuantity(quantity));
        }

        if !self.allow_multiple {
            if quantity > 1 {
                return Err(MembershipError::MultipleNotAllowed { requested: quantity });
            }
            return Ok(());
        }

        match self.max_per_member {
            Some(max) if quantity > max => Err(MembershipError::MaxPerMemberExceeded {
                requested: quantity,
                max,
            }),
            _ => Ok(()),
        }
    }
}

/// Price of one workshop for one season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkshopPrice {
    pub id: WorkshopPriceId,
    pub workshop_id: WorkshopId,
    pub season_id: SeasonId,
    /// Price of a single unit
    pub amount: Money,
}

impl WorkshopPrice {
    pub fn new(workshop_id: WorkshopId, season_id: SeasonId, amount: Money) -> Self {
        Self {
            id: WorkshopPriceId::new_v7(),
            workshop_id,
            season_id,
            amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_requires_positive_cap() {
        assert_eq!(
            Workshop::new("Pottery", true, None).unwrap_err(),
            MembershipError::InvalidWorkshopMultiplicity
        );
        assert!(Workshop::new("Pottery", true, Some(0)).is_err());
        assert_eq!(Workshop::new("Pottery", true, Some(3)).unwrap().max_per_member, Some(3));
    }

    #[test]
    fn test_cap_ignored_for_single_workshops() {
        let workshop = Workshop::new("Choir", false, Some(4)).unwrap();
        assert_eq!(workshop.max_per_member, None);
    }

    #[test]
    fn test_single_workshop_quantities() {
        let workshop = Workshop::new("Choir", false, None).unwrap();
        assert!(workshop.check_quantity(1).is_ok());
        assert_eq!(
            workshop.check_quantity(2),
            Err(MembershipError::MultipleNotAllowed { requested: 2 })
        );
        assert_eq!(workshop.check_quantity(0), Err(MembershipError::InvalidQuantity(0)));
    }

    #[test]
    fn test_capped_workshop_quantities() {
        let workshop = Workshop::new("Tennis", true, Some(2)).unwrap();
        assert!(workshop.check_quantity(2).is_ok());
        assert_eq!(
            workshop.check_quantity(3),
            Err(MembershipError::MaxPerMemberExceeded { requested: 3, max: 2 })
        );
    }
}
