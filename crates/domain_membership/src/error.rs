//! Membership domain errors
//!
//! Every variant maps to a stable [`ErrorCode`]; callers branch on the code.

use core_kernel::{ErrorCode, FamilyId, MemberId, MembershipId, MoneyError, RegistrationId, SeasonId, WorkshopId};
use thiserror::Error;

/// Errors that can occur in the membership domain
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MembershipError {
    /// Registration attempted without a membership for the season
    #[error("Member {member_id} has no membership for season {season_id}")]
    MembershipRequired {
        member_id: MemberId,
        season_id: SeasonId,
    },

    /// Workshop not found
    #[error("Workshop not found: {0}")]
    WorkshopNotFound(WorkshopId),

    /// Quantity above 1 for a single-registration workshop
    #[error("Workshop does not allow multiple registrations (requested {requested})")]
    MultipleNotAllowed {
        requested: u32,
    },

    /// Quantity above the workshop's per-member cap
    #[error("Requested quantity {requested} exceeds the maximum of {max} per member")]
    MaxPerMemberExceeded {
        requested: u32,
        max: u32,
    },

    /// Member already registered to the workshop for the season
    #[error("Member {member_id} is already registered to workshop {workshop_id} for season {season_id}")]
    RegistrationAlreadyExists {
        member_id: MemberId,
        workshop_id: WorkshopId,
        season_id: SeasonId,
    },

    /// Quantity must be at least 1
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// Family not found
    #[error("Family not found: {0}")]
    FamilyNotFound(FamilyId),

    /// Member not found
    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    /// Membership not found
    #[error("Membership not found: {0}")]
    MembershipNotFound(MembershipId),

    /// Registration not found
    #[error("Registration not found: {0}")]
    RegistrationNotFound(RegistrationId),

    /// Season not found
    #[error("Season not found: {0}")]
    SeasonNotFound(SeasonId),

    /// Member already enrolled in the season
    #[error("Member {member_id} already has a membership for season {season_id}")]
    MembershipAlreadyExists {
        member_id: MemberId,
        season_id: SeasonId,
    },

    /// A season with the same years exists
    #[error("Season {start_year}-{end_year} already exists")]
    SeasonAlreadyExists {
        start_year: i32,
        end_year: i32,
    },

    /// Season years out of order
    #[error("Season start year {start_year} must be before end year {end_year}")]
    InvalidSeasonYears {
        start_year: i32,
        end_year: i32,
    },

    /// Minor without guardian names
    #[error("A minor member requires the guardian's last and first name")]
    GuardianRequired,

    /// Multiple-registration workshop without a positive cap
    #[error("Workshop allowing multiple registrations needs a maximum per member greater than zero")]
    InvalidWorkshopMultiplicity,

    /// Amount or percentage out of range
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] MoneyError),
}

impl MembershipError {
    /// Returns the stable code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            MembershipError::MembershipRequired { .. } => ErrorCode::MembershipRequired,
            MembershipError::WorkshopNotFound(_) => ErrorCode::WorkshopNotFound,
            MembershipError::MultipleNotAllowed { .. } => ErrorCode::MultipleNotAllowed,
            MembershipError::MaxPerMemberExceeded { .. } => ErrorCode::MaxPerMemberExceeded,
            MembershipError::RegistrationAlreadyExists { .. } => ErrorCode::WorkshopRegistrationAlreadyExists,
            MembershipError::InvalidQuantity(_) => ErrorCode::InvalidQuantity,
            MembershipError::FamilyNotFound(_) => ErrorCode::FamilyNotFound,
            MembershipError::MemberNotFound(_) => ErrorCode::MemberNotFound,
            MembershipError::MembershipNotFound(_) => ErrorCode::MembershipNotFound,
            MembershipError::RegistrationNotFound(_) => ErrorCode::RegistrationNotFound,
            MembershipError::SeasonNotFound(_) => ErrorCode::SeasonNotFound,
            MembershipError::MembershipAlreadyExists { .. } => ErrorCode::MembershipAlreadyExists,
            MembershipError::SeasonAlreadyExists { .. } => ErrorCode::SeasonAlreadyExists,
            MembershipError::InvalidSeasonYears { .. } => ErrorCode::InvalidSeasonStartyearEndyear,
            MembershipError::GuardianRequired => ErrorCode::GuardianRequired,
            MembershipError::InvalidWorkshopMultiplicity => ErrorCode::InvalidWorkshopMultiplicity,
            MembershipError::InvalidAmount(_) => ErrorCode::InvalidAmount,
        }
    }
}
