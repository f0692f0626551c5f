//! Property-Based Test Generators
//!
//! Proptest strategies for the association billing domain, plus fake-data
//! helpers for realistic families and members.

use chrono::{DateTime, Duration, TimeZone, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{FamilyId, Money, Percentage, SeasonId};
use domain_billing::{NewPayment, PaymentType};
use domain_membership::{Family, Member, MembershipStatus, NewMember, Season};

/// Generates an amount in cents between 0.01 and 10 000.00
pub fn positive_cents_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000i64
}

/// Generates positive money with two decimal places
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    positive_cents_strategy().prop_map(Money::from_minor)
}

/// Generates money between 0.00 and 10 000.00
pub fn money_strategy() -> impl Strategy<Value = Money> {
    (0i64..1_000_000i64).prop_map(Money::from_minor)
}

/// Generates a discount rate between 0% and 100%, with two decimals
pub fn percentage_strategy() -> impl Strategy<Value = Percentage> {
    (0i64..=10_000i64)
        .prop_map(|basis| Percentage::new(Decimal::new(basis, 2)).unwrap_or_else(|_| Percentage::zero()))
}

/// Generates a payment type
pub fn payment_type_strategy() -> impl Strategy<Value = PaymentType> {
    prop_oneof![
        Just(PaymentType::Cash),
        Just(PaymentType::Check),
        Just(PaymentType::Transfer),
        Just(PaymentType::Card),
    ]
}

/// Generates a membership status
pub fn membership_status_strategy() -> impl Strategy<Value = MembershipStatus> {
    prop_oneof![
        Just(MembershipStatus::Pending),
        Just(MembershipStatus::Completed),
        Just(MembershipStatus::Cancelled),
    ]
}

/// Generates a timestamp within the 2024-2025 season
pub fn season_timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    let start = Utc
        .with_ymd_and_hms(2024, 9, 1, 0, 0, 0)
        .single()
        .map(|dt| dt.timestamp())
        .unwrap_or_default();
    let end = start + Duration::days(365).num_seconds();
    (start..end).prop_map(|secs| Utc.timestamp_opt(secs, 0).single().unwrap_or_default())
}

/// Generates a cashing date, absent for a third of the payments
pub fn cashing_date_strategy() -> impl Strategy<Value = Option<DateTime<Utc>>> {
    prop_oneof![
        1 => Just(None),
        2 => season_timestamp_strategy().prop_map(Some),
    ]
}

/// Generates a season between 2000 and 2099 with a random fee and discount
pub fn season_strategy() -> impl Strategy<Value = Season> {
    (2000i32..2099i32, money_strategy(), percentage_strategy()).prop_filter_map(
        "season years must be ordered",
        |(start, fee, discount)| Season::new(start, start + 1, fee, discount).ok(),
    )
}

/// Generates a new payment for the given family and season
pub fn new_payment_strategy(family_id: FamilyId, season_id: SeasonId) -> impl Strategy<Value = NewPayment> {
    (
        positive_money_strategy(),
        payment_type_strategy(),
        season_timestamp_strategy(),
        cashing_date_strategy(),
    )
        .prop_map(move |(amount, payment_type, payment_date, cashing_date)| NewPayment {
            family_id,
            season_id,
            amount,
            payment_type,
            payment_date,
            cashing_date,
            reference: None,
            notes: None,
        })
}

/// Generates a list of membership amounts for one family
pub fn membership_amounts_strategy(max_members: usize) -> impl Strategy<Value = Vec<Money>> {
    prop::collection::vec(money_strategy(), 0..=max_members)
}

/// Generates a registration quantity
pub fn quantity_strategy() -> impl Strategy<Value = u32> {
    1u32..=5u32
}

/// Generates a family with a realistic name and email
pub fn fake_family() -> Family {
    let name: String = LastName().fake();
    let email: String = SafeEmail().fake();
    Family::new(name).with_email(email)
}

/// Generates an adult member of `family` with a realistic first name
pub fn fake_member(family: &Family) -> Member {
    let first_name: String = FirstName().fake();
    Member::create(NewMember {
        family_id: Some(family.id),
        first_name,
        last_name: family.name.clone(),
        ..Default::default()
    })
    .expect("adult members need no guardian")
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_positive_money_is_positive(money in positive_money_strategy()) {
            prop_assert!(money.is_positive());
        }

        #[test]
        fn test_percentage_stays_in_range(pct in percentage_strategy()) {
            prop_assert!(pct.value() >= Decimal::ZERO);
            prop_assert!(pct.value() <= Decimal::ONE_HUNDRED);
        }

        #[test]
        fn test_seasons_span_one_year(season in season_strategy()) {
            prop_assert_eq!(season.end_year, season.start_year + 1);
        }
    }

    #[test]
    fn test_fake_member_joins_family() {
        let family = fake_family();
        let member = fake_member(&family);

        assert_eq!(member.family_id, Some(family.id));
        assert_eq!(member.last_name, family.name);
        assert!(!member.first_name.is_empty());
    }
}
