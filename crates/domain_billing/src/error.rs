//! Billing domain errors

use thiserror::Error;

use core_kernel::{ErrorCode, FamilyId, MoneyError, PaymentId, PortError, SeasonId};
use domain_membership::MembershipError;

/// Errors that can occur in the billing domain
///
/// Business rule violations carry a stable [`ErrorCode`]. Storage failures
/// travel unmodified in [`BillingError::Port`] and have no code.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Membership/registration rule violated
    #[error(transparent)]
    Membership(#[from] MembershipError),

    /// Family not found
    #[error("Family not found: {0}")]
    FamilyNotFound(FamilyId),

    /// Season not found
    #[error("Season not found: {0}")]
    SeasonNotFound(SeasonId),

    /// Payment not found
    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    /// Invalid payment amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] MoneyError),

    /// Invoice already issued for the family and season
    #[error("Invoice {invoice_number} already issued for family {family_id} and season {season_id}")]
    InvoiceAlreadyIssued {
        family_id: FamilyId,
        season_id: SeasonId,
        invoice_number: String,
    },

    /// Nothing to invoice
    #[error("Nothing to invoice for family {family_id} and season {season_id}")]
    EmptyInvoice {
        family_id: FamilyId,
        season_id: SeasonId,
    },

    /// Infrastructure failure
    #[error(transparent)]
    Port(#[from] PortError),
}

impl BillingError {
    /// Returns the stable code, or `None` for infrastructure failures
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            BillingError::Membership(e) => Some(e.code()),
            BillingError::FamilyNotFound(_) => Some(ErrorCode::FamilyNotFound),
            BillingError::SeasonNotFound(_) => Some(ErrorCode::SeasonNotFound),
            BillingError::PaymentNotFound(_) => Some(ErrorCode::PaymentNotFound),
            BillingError::InvalidAmount(_) => Some(ErrorCode::InvalidAmount),
            BillingError::InvoiceAlreadyIssued { .. } => Some(ErrorCode::InvoiceAlreadyIssued),
            BillingError::EmptyInvoice { .. } => Some(ErrorCode::EmptyInvoice),
            BillingError::Port(_) => None,
        }
    }

    /// Returns true for infrastructure failures
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, BillingError::Port(_))
    }
}
