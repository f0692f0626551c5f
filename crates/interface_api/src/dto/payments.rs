//! Payment DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{FamilyId, Money, SeasonId};
use domain_billing::{NewPayment, Payment, PaymentType, PaymentUpdate, ReconciliationOutcome, RecordedPayment};

use crate::dto::double_option;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    pub family_id: FamilyId,
    pub season_id: SeasonId,
    pub amount: Decimal,
    pub payment_type: PaymentType,
    pub payment_date: DateTime<Utc>,
    pub cashing_date: Option<DateTime<Utc>>,
    #[validate(length(max = 255))]
    pub reference: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl From<CreatePaymentRequest> for NewPayment {
    fn from(request: CreatePaymentRequest) -> Self {
        NewPayment {
            family_id: request.family_id,
            season_id: request.season_id,
            amount: Money::new(request.amount),
            payment_type: request.payment_type,
            payment_date: request.payment_date,
            cashing_date: request.cashing_date,
            reference: request.reference,
            notes: request.notes,
        }
    }
}

/// Partial update; `null` clears an optional field, an absent field keeps it
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePaymentRequest {
    pub season_id: Option<SeasonId>,
    pub amount: Option<Decimal>,
    pub payment_type: Option<PaymentType>,
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cashing_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub reference: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl From<UpdatePaymentRequest> for PaymentUpdate {
    fn from(request: UpdatePaymentRequest) -> Self {
        PaymentUpdate {
            season_id: request.season_id,
            amount: request.amount.map(Money::new),
            payment_type: request.payment_type,
            payment_date: request.payment_date,
            cashing_date: request.cashing_date,
            reference: request.reference,
            notes: request.notes,
        }
    }
}

/// A payment write and the membership reconciliations it triggered
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub payment: Payment,
    pub reconciliations: Vec<ReconciliationOutcome>,
}

impl From<RecordedPayment> for PaymentResponse {
    fn from(recorded: RecordedPayment) -> Self {
        Self {
            payment: recorded.payment,
            reconciliations: recorded.reconciliations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_tells_null_from_absent() {
        let cleared: UpdatePaymentRequest =
            serde_json::from_str(r#"{"cashing_date": null}"#).expect("valid body");
        assert_eq!(cleared.cashing_date, Some(None));
        assert_eq!(cleared.reference, None);

        let untouched: UpdatePaymentRequest = serde_json::from_str("{}").expect("valid body");
        assert_eq!(untouched.cashing_date, None);
    }

    #[test]
    fn test_reference_length_is_validated() {
        let request: CreatePaymentRequest = serde_json::from_value(serde_json::json!({
            "family_id": uuid::Uuid::new_v4(),
            "season_id": uuid::Uuid::new_v4(),
            "amount": "10.00",
            "payment_type": "check",
            "payment_date": "2024-10-01T10:00:00Z",
            "reference": "x".repeat(300),
        }))
        .expect("valid body");

        assert!(request.validate().is_err());
    }
}
