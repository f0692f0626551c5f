//! Membership and registration DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{MemberId, Money, SeasonId, WorkshopId};
use domain_billing::{ReconciliationOutcome, RegistrationChange};
use domain_membership::{AdmissionRequest, NewMembership, Registration};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMembershipRequest {
    pub member_id: MemberId,
    pub season_id: SeasonId,
    #[validate(range(min = 1))]
    pub family_order: Option<u32>,
    pub amount: Option<Decimal>,
}

impl From<CreateMembershipRequest> for NewMembership {
    fn from(request: CreateMembershipRequest) -> Self {
        NewMembership {
            member_id: request.member_id,
            season_id: request.season_id,
            family_order: request.family_order,
            amount: request.amount.map(Money::new),
        }
    }
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct CreateRegistrationRequest {
    pub member_id: MemberId,
    pub workshop_id: WorkshopId,
    pub season_id: SeasonId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl From<CreateRegistrationRequest> for AdmissionRequest {
    fn from(request: CreateRegistrationRequest) -> Self {
        AdmissionRequest {
            member_id: request.member_id,
            workshop_id: request.workshop_id,
            season_id: request.season_id,
            quantity: request.quantity,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRegistrationRequest {
    pub quantity: u32,
}

/// A registration write and the reconciliation it triggered
#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub registration: Registration,
    pub reconciliation: Option<ReconciliationOutcome>,
}

impl From<RegistrationChange> for RegistrationResponse {
    fn from(change: RegistrationChange) -> Self {
        Self {
            registration: change.registration,
            reconciliation: change.reconciliation,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegistrationDeletedResponse {
    pub reconciliation: Option<ReconciliationOutcome>,
}
