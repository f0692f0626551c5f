//! Family payments and their settlement status
//!
//! A payment's status is never set by hand. It is derived from the optional
//! cashing date when the payment is recorded, and again only when an update
//! explicitly supplies a new cashing date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Clock, FamilyId, Money, PaymentId, SeasonId, Timezone};

/// How the family paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Cash,
    Check,
    Transfer,
    Card,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::Check => "check",
            PaymentType::Transfer => "transfer",
            PaymentType::Card => "card",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Not cashed yet (future cashing date)
    Pending,
    /// Counts toward the family's total paid
    Completed,
    /// Voided elsewhere
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Cancelled => "cancelled",
        }
    }
}

/// Classifies a payment from its cashing date alone
///
/// - no cashing date: settled immediately
/// - cashing date on or before `today`: settled
/// - cashing date after `today`: pending
///
/// The boundary is local midnight in `timezone`: anything before the first
/// instant of tomorrow is settled, time of day ignored.
pub fn determine_payment_status(
    cashing_date: Option<DateTime<Utc>>,
    today: NaiveDate,
    timezone: Timezone,
) -> PaymentStatus {
    let Some(date) = cashing_date else {
        return PaymentStatus::Completed;
    };

    let cashed = match today.succ_opt().and_then(|tomorrow| timezone.start_of_day(tomorrow)) {
        Some(tomorrow_starts) => date < tomorrow_starts,
        // no local midnight tomorrow (DST gap)
        None => timezone.local_date(date) <= today,
    };

    if cashed {
        PaymentStatus::Completed
    } else {
        PaymentStatus::Pending
    }
}

/// [`determine_payment_status`] with "today" taken from a clock
pub fn resolve_payment_status(cashing_date: Option<DateTime<Utc>>, clock: &dyn Clock) -> PaymentStatus {
    determine_payment_status(cashing_date, clock.today(), clock.timezone())
}

/// Input for recording a payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub family_id: FamilyId,
    pub season_id: SeasonId,
    pub amount: Money,
    pub payment_type: PaymentType,
    pub payment_date: DateTime<Utc>,
    pub cashing_date: Option<DateTime<Utc>>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

/// Partial update of a payment
///
/// `cashing_date` is doubly optional: `None` leaves it (and the status)
/// untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentUpdate {
    pub season_id: Option<SeasonId>,
    pub amount: Option<Money>,
    pub payment_type: Option<PaymentType>,
    pub payment_date: Option<DateTime<Utc>>,
    pub cashing_date: Option<Option<DateTime<Utc>>>,
    pub reference: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

/// A family's payment toward one season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub family_id: FamilyId,
    pub season_id: SeasonId,
    pub amount: Money,
    pub payment_type: PaymentType,
    pub payment_date: DateTime<Utc>,
    pub cashing_date: Option<DateTime<Utc>>,
    pub status: PaymentStatus,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Records a payment, deriving its status from the cashing date
    pub fn record(input: NewPayment, clock: &dyn Clock) -> Self {
        let now = clock.now();
        Self {
            id: PaymentId::new_v7(),
            family_id: input.family_id,
            season_id: input.season_id,
            amount: input.amount,
            payment_type: input.payment_type,
            payment_date: input.payment_date,
            cashing_date: input.cashing_date,
            status: resolve_payment_status(input.cashing_date, clock),
            reference: input.reference,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies an update
    ///
    /// The status is re-derived only when the update carries a cashing date.
    pub fn apply(&mut self, update: PaymentUpdate, clock: &dyn Clock) {
        if let Some(season_id) = update.season_id {
            self.season_id = season_id;
        }
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(payment_type) = update.payment_type {
            self.payment_type = payment_type;
        }
        if let Some(payment_date) = update.payment_date {
            self.payment_date = payment_date;
        }
        if let Some(reference) = update.reference {
            self.reference = reference;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
        if let Some(cashing_date) = update.cashing_date {
            self.cashing_date = cashing_date;
            self.status = resolve_payment_status(cashing_date, clock);
        }
        self.updated_at = clock.now();
    }

    /// Returns true if the payment counts toward the amount paid
    pub fn is_settled(&self) -> bool {
        self.status == PaymentStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use core_kernel::FixedClock;
    use rust_decimal_macros::dec;

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 10, 15, 14, 0, 0).unwrap())
    }

    fn new_check(cashing_date: Option<DateTime<Utc>>) -> NewPayment {
        NewPayment {
            family_id: FamilyId::new(),
            season_id: SeasonId::new(),
            amount: Money::new(dec!(150)),
            payment_type: PaymentType::Check,
            payment_date: Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap(),
            cashing_date,
            reference: Some("CHK-0042".to_string()),
            notes: None,
        }
    }

    #[test]
    fn test_no_cashing_date_is_completed() {
        let clock = clock();
        assert_eq!(resolve_payment_status(None, &clock), PaymentStatus::Completed);
    }

    #[test]
    fn test_today_late_in_the_day_is_completed() {
        let clock = clock();
        let tonight = Utc.with_ymd_and_hms(2024, 10, 15, 23, 59, 59).unwrap();
        assert_eq!(resolve_payment_status(Some(tonight), &clock), PaymentStatus::Completed);
    }

    #[test]
    fn test_midnight_today_is_completed() {
        let clock = clock();
        let midnight = Timezone::default().start_of_day(clock.today()).unwrap();
        assert_eq!(midnight, Utc.with_ymd_and_hms(2024, 10, 15, 0, 0, 0).unwrap());
        assert_eq!(resolve_payment_status(Some(midnight), &clock), PaymentStatus::Completed);
    }

    #[test]
    fn test_local_midnight_boundaries_in_paris() {
        let paris: Timezone = "Europe/Paris".parse().unwrap();
        let clock = clock().with_timezone(paris);
        let today = clock.today();

        // 22:00 UTC on the 14th, CEST
        let midnight_today = paris.start_of_day(today).unwrap();
        assert_eq!(midnight_today, Utc.with_ymd_and_hms(2024, 10, 14, 22, 0, 0).unwrap());
        assert_eq!(resolve_payment_status(Some(midnight_today), &clock), PaymentStatus::Completed);

        let midnight_tomorrow = paris.start_of_day(today.succ_opt().unwrap()).unwrap();
        let last_second = midnight_tomorrow - Duration::seconds(1);
        assert_eq!(resolve_payment_status(Some(last_second), &clock), PaymentStatus::Completed);
        assert_eq!(resolve_payment_status(Some(midnight_tomorrow), &clock), PaymentStatus::Pending);
    }

    #[test]
    fn test_tomorrow_midnight_is_pending() {
        let clock = clock();
        let tomorrow = Utc.with_ymd_and_hms(2024, 10, 16, 0, 0, 0).unwrap();
        assert_eq!(resolve_payment_status(Some(tomorrow), &clock), PaymentStatus::Pending);
    }

    #[test]
    fn test_timezone_shifts_the_calendar_day() {
        let today = NaiveDate::from_ymd_opt(2024, 10, 15).unwrap();
        // 22:30 UTC on the 15th is already the 16th in Paris
        let late = Utc.with_ymd_and_hms(2024, 10, 15, 22, 30, 0).unwrap();

        assert_eq!(determine_payment_status(Some(late), today, Timezone::default()), PaymentStatus::Completed);
        assert_eq!(
            determine_payment_status(Some(late), today, "Europe/Paris".parse().unwrap()),
            PaymentStatus::Pending
        );
    }

    #[test]
    fn test_record_derives_status() {
        let clock = clock();
        let payment = Payment::record(new_check(Some(clock.now() + Duration::days(30))), &clock);
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert!(!payment.is_settled());
    }

    #[test]
    fn test_update_without_cashing_date_keeps_status() {
        let clock = clock();
        let mut payment = Payment::record(new_check(Some(clock.now() + Duration::days(30))), &clock);

        payment.apply(
            PaymentUpdate {
                amount: Some(Money::new(dec!(200))),
                ..Default::default()
            },
            &clock,
        );

        assert_eq!(payment.amount, Money::new(dec!(200)));
        assert_eq!(payment.status, PaymentStatus::Pending);
    }

    #[test]
    fn test_clearing_cashing_date_completes() {
        let clock = clock();
        let mut payment = Payment::record(new_check(Some(clock.now() + Duration::days(30))), &clock);

        payment.apply(
            PaymentUpdate {
                cashing_date: Some(None),
                ..Default::default()
            },
            &clock,
        );

        assert_eq!(payment.cashing_date, None);
        assert_eq!(payment.status, PaymentStatus::Completed);
    }
}
