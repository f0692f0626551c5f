//! Core error types used across the system

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::money::MoneyError;

/// Core error type for the kernel
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        CoreError::InvalidStateTransition(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CoreError::NotFound(message.into())
    }
}

/// Stable discriminator for domain errors
///
/// Callers branch on the code, never on the message text. Codes serialize in
/// SCREAMING_SNAKE_CASE and must not be renamed once published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Registration admission
    MembershipRequired,
    WorkshopNotFound,
    MultipleNotAllowed,
    MaxPerMemberExceeded,
    WorkshopRegistrationAlreadyExists,
    InvalidQuantity,

    // Related entities
    FamilyNotFound,
    MemberNotFound,
    PaymentNotFound,
    MembershipNotFound,
    SeasonNotFound,
    RegistrationNotFound,
    MembershipAlreadyExists,
    SeasonAlreadyExists,
    #[serde(rename = "INVALID_SEASON_STARTYEAR_ENDYEAR")]
    InvalidSeasonStartyearEndyear,
    GuardianRequired,
    InvalidWorkshopMultiplicity,

    // Billing
    InvalidAmount,
    InvoiceAlreadyIssued,
    EmptyInvoice,
}

impl ErrorCode {
    /// Returns the wire representation of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MembershipRequired => "MEMBERSHIP_REQUIRED",
            ErrorCode::WorkshopNotFound => "WORKSHOP_NOT_FOUND",
            ErrorCode::MultipleNotAllowed => "MULTIPLE_NOT_ALLOWED",
            ErrorCode::MaxPerMemberExceeded => "MAX_PER_MEMBER_EXCEEDED",
            ErrorCode::WorkshopRegistrationAlreadyExists => "WORKSHOP_REGISTRATION_ALREADY_EXISTS",
            ErrorCode::InvalidQuantity => "INVALID_QUANTITY",
            ErrorCode::FamilyNotFound => "FAMILY_NOT_FOUND",
            ErrorCode::MemberNotFound => "MEMBER_NOT_FOUND",
            ErrorCode::PaymentNotFound => "PAYMENT_NOT_FOUND",
            ErrorCode::MembershipNotFound => "MEMBERSHIP_NOT_FOUND",
            ErrorCode::SeasonNotFound => "SEASON_NOT_FOUND",
            ErrorCode::RegistrationNotFound => "REGISTRATION_NOT_FOUND",
            ErrorCode::MembershipAlreadyExists => "MEMBERSHIP_ALREADY_EXISTS",
            ErrorCode::SeasonAlreadyExists => "SEASON_ALREADY_EXISTS",
            ErrorCode::InvalidSeasonStartyearEndyear => "INVALID_SEASON_STARTYEAR_ENDYEAR",
            ErrorCode::GuardianRequired => "GUARDIAN_REQUIRED",
            ErrorCode::InvalidWorkshopMultiplicity => "INVALID_WORKSHOP_MULTIPLICITY",
            ErrorCode::InvalidAmount => "INVALID_AMOUNT",
            ErrorCode::InvoiceAlreadyIssued => "INVOICE_ALREADY_ISSUED",
            ErrorCode::EmptyInvoice => "EMPTY_INVOICE",
        }
    }

    /// Returns true for codes describing a missing entity
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ErrorCode::WorkshopNotFound
                | ErrorCode::FamilyNotFound
                | ErrorCode::MemberNotFound
                | ErrorCode::PaymentNotFound
                | ErrorCode::MembershipNotFound
                | ErrorCode::SeasonNotFound
                | ErrorCode::RegistrationNotFound
        )
    }

    /// Returns true for codes describing a uniqueness conflict
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ErrorCode::WorkshopRegistrationAlreadyExists
                | ErrorCode::MembershipAlreadyExists
                | ErrorCode::SeasonAlreadyExists
                | ErrorCode::InvoiceAlreadyIssued
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
