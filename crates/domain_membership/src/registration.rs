//! Workshop registrations
//!
//! A registration records how many units of a workshop a member takes for a
//! season, and what that costs after the family discount. Before a
//! registration is created or resized it must pass admission:
//!
//! 1. the member holds a membership for the season
//! 2. the workshop exists
//! 3. the quantity respects the workshop's multiplicity rules
//!
//! Uniqueness of (member, workshop, season) is enforced by the store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{MemberId, Money, Percentage, RegistrationId, SeasonId, WorkshopId};

use crate::error::MembershipError;
use crate::membership::Membership;
use crate::season::Season;
use crate::workshop::{Workshop, WorkshopPrice};

/// A request to register (or resize a registration) to a workshop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionRequest {
    pub member_id: MemberId,
    pub workshop_id: WorkshopId,
    pub season_id: SeasonId,
    pub quantity: u32,
}

/// The entities an admitted request was checked against
#[derive(Debug, Clone, Copy)]
pub struct Admission<'a> {
    pub membership: &'a Membership,
    pub workshop: &'a Workshop,
}

/// Runs the admission checks in order
///
/// A missing membership or workshop short-circuits before the quantity is
/// looked at.
pub fn validate_admission<'a>(
    request: &AdmissionRequest,
    membership: Option<&'a Membership>,
    workshop: Option<&'a Workshop>,
) -> Result<Admission<'a>, MembershipError> {
    let membership = membership
        .filter(|m| m.member_id == request.member_id && m.season_id == request.season_id)
        .ok_or(MembershipError::MembershipRequired {
            member_id: request.member_id,
            season_id: request.season_id,
        })?;

    let workshop = workshop
        .filter(|w| w.id == request.workshop_id)
        .ok_or(MembershipError::WorkshopNotFound(request.workshop_id))?;

    workshop.check_quantity(request.quantity)?;

    Ok(Admission { membership, workshop })
}

/// Rejects a create when the member already has a registration to the workshop
pub fn ensure_not_registered(
    request: &AdmissionRequest,
    existing: Option<&Registration>,
) -> Result<(), MembershipError> {
    match existing {
        Some(_) => Err(MembershipError::RegistrationAlreadyExists {
            member_id: request.member_id,
            workshop_id: request.workshop_id,
            season_id: request.season_id,
        }),
        None => Ok(()),
    }
}

/// Price of a registration after the family discount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationQuote {
    pub unit_price: Money,
    pub discount_percent: Percentage,
    pub total_price: Money,
}

/// Prices `quantity` units of a workshop for a member
///
/// The season's discount applies from the second family member onward. A
/// workshop with no price for the season is free.
pub fn quote_registration(
    price: Option<&WorkshopPrice>,
    membership: &Membership,
    season: &Season,
    quantity: u32,
) -> RegistrationQuote {
    let unit_price = price.map(|p| p.amount).unwrap_or_else(Money::zero);
    let discount_percent = if membership.is_discount_eligible() {
        season.discount_percent
    } else {
        Percentage::zero()
    };

    let gross = unit_price.multiply(Decimal::from(quantity));
    let total_price = discount_percent.deduct_from(gross).round_to_cents();

    RegistrationQuote {
        unit_price,
        discount_percent,
        total_price,
    }
}

/// One member's registration to one workshop for one season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub member_id: MemberId,
    pub workshop_id: WorkshopId,
    pub season_id: SeasonId,
    pub quantity: u32,
    /// Discount-applied total
    pub total_price: Money,
    /// Discount rate actually applied
    pub discount_percent: Percentage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// Creates a registration from an admitted request and its quote
    pub fn new(request: &AdmissionRequest, quote: RegistrationQuote) -> Self {
        let now = Utc::now();
        Self {
            id: RegistrationId::new_v7(),
            member_id: request.member_id,
            workshop_id: request.workshop_id,
            season_id: request.season_id,
            quantity: request.quantity,
            total_price: quote.total_price,
            discount_percent: quote.discount_percent,
            created_at: now,
            updated_at: now,
        }
    }

    /// Admission request for changing this registration's quantity
    pub fn resize_request(&self, quantity: u32) -> AdmissionRequest {
        AdmissionRequest {
            member_id: self.member_id,
            workshop_id: self.workshop_id,
            season_id: self.season_id,
            quantity,
        }
    }

    /// Applies a new quantity and its quote
    pub fn resize(&mut self, quantity: u32, quote: RegistrationQuote) {
        self.quantity = quantity;
        self.total_price = quote.total_price;
        self.discount_percent = quote.discount_percent;
        self.updated_at = Utc::now();
    }
}
