//! Family financial stats for one season
//!
//! What a family owes is the sum of its memberships' fees and its workshop
//! registrations' discounted totals. What it has paid only counts payments
//! that are completed. Everything is filtered to one season first.

use serde::{Deserialize, Serialize};

use core_kernel::{Money, SeasonId};
use domain_membership::{Membership, Registration};

use crate::payment::Payment;

/// Obligations gathered from one or more members
#[derive(Debug, Clone, Copy)]
pub struct StatsSource<'a> {
    pub memberships: &'a [Membership],
    pub registrations: &'a [Registration],
}

impl<'a> StatsSource<'a> {
    pub fn new(memberships: &'a [Membership], registrations: &'a [Registration]) -> Self {
        Self {
            memberships,
            registrations,
        }
    }
}

/// Total due, total paid and the difference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialStats {
    pub total_paid: Money,
    pub total_due: Money,
    /// `total_due - total_paid`; negative when the family overpaid
    pub balance: Money,
}

impl FinancialStats {
    pub fn zero() -> Self {
        Self {
            total_paid: Money::zero(),
            total_due: Money::zero(),
            balance: Money::zero(),
        }
    }

    /// Returns true if nothing is left to pay
    pub fn is_settled(&self) -> bool {
        !self.balance.is_positive()
    }
}

/// Computes the stats of `season_id` over all sources
///
/// Cancelled memberships still count toward the amount due. A missing
/// payment list counts as no payment.
pub fn compute_financial_stats(
    sources: &[StatsSource<'_>],
    payments: Option<&[Payment]>,
    season_id: SeasonId,
) -> FinancialStats {
    let membership_due: Money = sources
        .iter()
        .flat_map(|s| s.memberships.iter())
        .filter(|m| m.season_id == season_id)
        .map(|m| m.amount)
        .sum();

    let registration_due: Money = sources
        .iter()
        .flat_map(|s| s.registrations.iter())
        .filter(|r| r.season_id == season_id)
        .map(|r| r.total_price)
        .sum();

    let total_paid: Money = payments
        .unwrap_or_default()
        .iter()
        .filter(|p| p.season_id == season_id && p.is_settled())
        .map(|p| p.amount)
        .sum();

    let total_due = membership_due + registration_due;

    FinancialStats {
        total_paid,
        total_due,
        balance: total_due - total_paid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_kernel::{Clock, FamilyId, FixedClock, MemberId, Percentage};
    use domain_membership::{
        quote_registration, AdmissionRequest, MembershipStatus, NewMembership, Season, Workshop,
        WorkshopPrice,
    };
    use rust_decimal_macros::dec;

    use crate::payment::{NewPayment, PaymentType};

    fn season() -> Season {
        Season::new(2024, 2025, Money::new(dec!(100)), Percentage::zero()).unwrap()
    }

    fn membership(season: &Season) -> Membership {
        Membership::enroll(
            NewMembership {
                member_id: MemberId::new(),
                season_id: season.id,
                family_order: None,
                amount: None,
            },
            season,
            0,
        )
    }

    fn payment(season_id: SeasonId, amount: rust_decimal::Decimal, cashed_later: bool) -> Payment {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap());
        let cashing_date = cashed_later.then(|| Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
        Payment::record(
            NewPayment {
                family_id: FamilyId::new(),
                season_id,
                amount: Money::new(amount),
                payment_type: PaymentType::Check,
                payment_date: clock.now(),
                cashing_date,
                reference: None,
                notes: None,
            },
            &clock,
        )
    }

    #[test]
    fn test_membership_plus_registrations_minus_completed_payments() {
        let season = season();
        let m = membership(&season);
        let workshop = Workshop::new("Pottery", true, Some(4)).unwrap();
        let price = WorkshopPrice::new(workshop.id, season.id, Money::new(dec!(25)));
        let req = AdmissionRequest {
            member_id: m.member_id,
            workshop_id: workshop.id,
            season_id: season.id,
            quantity: 2,
        };
        let r = Registration::new(&req, quote_registration(Some(&price), &m, &season, 2));
        let memberships = vec![m];
        let registrations = vec![r];
        let payments = vec![
            payment(season.id, dec!(120), false),
            payment(season.id, dec!(30), true),
        ];

        let stats = compute_financial_stats(
            &[StatsSource::new(&memberships, &registrations)],
            Some(&payments),
            season.id,
        );

        assert_eq!(stats.total_due, Money::new(dec!(150)));
        assert_eq!(stats.total_paid, Money::new(dec!(120)));
        assert_eq!(stats.balance, Money::new(dec!(30)));
        assert!(!stats.is_settled());
    }

    #[test]
    fn test_other_seasons_are_ignored() {
        let season = season();
        let other = Season::new(2023, 2024, Money::new(dec!(80)), Percentage::zero()).unwrap();
        let memberships = vec![membership(&season), membership(&other)];
        let payments = vec![payment(other.id, dec!(500), false)];

        let stats = compute_financial_stats(&[StatsSource::new(&memberships, &[])], Some(&payments), season.id);

        assert_eq!(stats.total_due, Money::new(dec!(100)));
        assert!(stats.total_paid.is_zero());
    }

    #[test]
    fn test_cancelled_membership_still_due() {
        let season = season();
        let mut m = membership(&season);
        m.status = MembershipStatus::Cancelled;
        let memberships = vec![m];

        let stats = compute_financial_stats(&[StatsSource::new(&memberships, &[])], None, season.id);
        assert_eq!(stats.total_due, Money::new(dec!(100)));
    }

    #[test]
    fn test_empty_inputs_are_settled() {
        let stats = compute_financial_stats(&[], None, SeasonId::new());
        assert_eq!(stats, FinancialStats::zero());
        assert!(stats.is_settled());
    }

    #[test]
    fn test_overpayment_gives_negative_balance() {
        let season = season();
        let memberships = vec![membership(&season)];
        let payments = vec![payment(season.id, dec!(130), false)];

        let stats = compute_financial_stats(&[StatsSource::new(&memberships, &[])], Some(&payments), season.id);
        assert_eq!(stats.balance, Money::new(dec!(-30)));
        assert!(stats.is_settled());
    }
}
