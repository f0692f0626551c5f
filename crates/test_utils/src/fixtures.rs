//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the association billing domain.
//! These fixtures are consistent and predictable for unit tests: the
//! reference instant is mid-October of the 2024-2025 season, in Paris.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;
use uuid::Uuid;

use core_kernel::{FamilyId, FixedClock, Money, Percentage, SeasonId, Timezone};
use domain_membership::{Family, Member, NewMember, Season, Workshop};

/// The instant every fixed clock in the test suite reads
pub static REFERENCE_NOW: Lazy<DateTime<Utc>> = Lazy::new(|| {
    Utc.with_ymd_and_hms(2024, 10, 15, 12, 0, 0)
        .single()
        .expect("valid reference instant")
});

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Standard yearly membership fee
    pub fn membership_fee() -> Money {
        Money::new(dec!(30.00))
    }

    /// Standard workshop price for one season
    pub fn workshop_price() -> Money {
        Money::new(dec!(120.00))
    }

    /// Amount of a typical check payment
    pub fn check_50() -> Money {
        Money::new(dec!(50.00))
    }

    /// A zero amount
    pub fn zero() -> Money {
        Money::zero()
    }

    /// Sibling discount applied from the second membership of a family
    pub fn sibling_discount() -> Percentage {
        Percentage::new(dec!(10)).expect("valid percentage")
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// The reference "now" of the suite (2024-10-15 12:00 UTC)
    pub fn now() -> DateTime<Utc> {
        *REFERENCE_NOW
    }

    /// Timezone the association works in
    pub fn paris() -> Timezone {
        "Europe/Paris".parse().expect("valid timezone")
    }

    /// Clock frozen at the reference instant, in Paris time
    pub fn clock() -> FixedClock {
        FixedClock::new(Self::now()).with_timezone(Self::paris())
    }

    /// Clock frozen at an arbitrary instant, in Paris time
    pub fn clock_at(instant: DateTime<Utc>) -> FixedClock {
        FixedClock::new(instant).with_timezone(Self::paris())
    }

    /// A cashing date one week after the reference instant
    pub fn next_week() -> DateTime<Utc> {
        Self::now() + Duration::days(7)
    }

    /// A cashing date one week before the reference instant
    pub fn last_week() -> DateTime<Utc> {
        Self::now() - Duration::days(7)
    }

    /// Birth date of a minor member
    pub fn child_birth_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2014, 3, 12).expect("valid date")
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// A family id with a fixed UUID
    pub fn family_id() -> FamilyId {
        FamilyId::from_uuid(
            Uuid::parse_str("018f8a4e-0000-7000-8000-000000000001").expect("valid uuid"),
        )
    }

    /// A season id with a fixed UUID
    pub fn season_id() -> SeasonId {
        SeasonId::from_uuid(
            Uuid::parse_str("018f8a4e-0000-7000-8000-000000000002").expect("valid uuid"),
        )
    }
}

/// Fixture for association entities
pub struct EntityFixtures;

impl EntityFixtures {
    /// The Martin family
    pub fn family() -> Family {
        Family::new("Martin")
            .with_email("martin@example.org")
            .with_phone("+33 1 23 45 67 89")
    }

    /// An adult member of `family`
    pub fn adult(family: &Family, first_name: &str) -> Member {
        Member::create(NewMember {
            family_id: Some(family.id),
            first_name: first_name.to_string(),
            last_name: family.name.clone(),
            ..Default::default()
        })
        .expect("valid adult member")
    }

    /// A minor member of `family` with a guardian
    pub fn child(family: &Family, first_name: &str) -> Member {
        Member::create(NewMember {
            family_id: Some(family.id),
            first_name: first_name.to_string(),
            last_name: family.name.clone(),
            birth_date: Some(TemporalFixtures::child_birth_date()),
            is_minor: true,
            guardian_last_name: Some(family.name.clone()),
            guardian_first_name: Some("Claire".to_string()),
        })
        .expect("valid minor member")
    }

    /// The 2024-2025 season, 30.00 membership fee, 10% sibling discount
    pub fn season() -> Season {
        Season::new(
            2024,
            2025,
            MoneyFixtures::membership_fee(),
            MoneyFixtures::sibling_discount(),
        )
        .expect("valid season")
    }

    /// A workshop taken at most once per member
    pub fn pottery() -> Workshop {
        Workshop::new("Pottery", false, None).expect("valid workshop")
    }

    /// A workshop a member may take up to three times
    pub fn swimming() -> Workshop {
        Workshop::new("Swimming", true, Some(3)).expect("valid workshop")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Clock;

    #[test]
    fn test_clock_reads_reference_instant_in_paris() {
        let clock = TemporalFixtures::clock();
        assert_eq!(clock.now(), TemporalFixtures::now());
        assert_eq!(
            clock.timezone().local_date(clock.now()),
            NaiveDate::from_ymd_opt(2024, 10, 15).unwrap()
        );
    }

    #[test]
    fn test_entities_belong_together() {
        let family = EntityFixtures::family();
        let child = EntityFixtures::child(&family, "Léa");

        assert_eq!(child.family_id, Some(family.id));
        assert!(child.is_minor);
        assert_eq!(EntityFixtures::season().start_year, 2024);
    }
}
