//! Test Data Builders
//!
//! Builders for constructing test data with sensible defaults. A
//! [`ScenarioBuilder`] produces a family enrolled in a season, which can then
//! be seeded into either store implementation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use core_kernel::{FamilyId, Money, Percentage, PortError, SeasonId};
use domain_billing::{AssociationStore, InMemoryAssociationStore, NewPayment, PaymentType};
use domain_membership::{
    Family, Member, Membership, NewMember, NewMembership, Season, SeasonStatus, Workshop,
    WorkshopPrice,
};
use infra_db::PostgresAssociationStore;

use crate::fixtures::{EntityFixtures, TemporalFixtures};

/// A family enrolled in one season, with the workshops it can register to
#[derive(Debug, Clone)]
pub struct Scenario {
    pub family: Family,
    pub members: Vec<Member>,
    pub season: Season,
    /// One membership per member, in member order
    pub memberships: Vec<Membership>,
    pub workshops: Vec<Workshop>,
    pub prices: Vec<WorkshopPrice>,
}

impl Scenario {
    pub fn family_id(&self) -> FamilyId {
        self.family.id
    }

    pub fn season_id(&self) -> SeasonId {
        self.season.id
    }

    /// Sum of the membership amounts of the scenario
    pub fn memberships_total(&self) -> Money {
        self.memberships
            .iter()
            .fold(Money::zero(), |acc, m| acc + m.amount)
    }

    /// Seeds every entity into the in-memory store
    pub async fn seed_memory(&self, store: &InMemoryAssociationStore) {
        store.seed_family(self.family.clone()).await;
        store.seed_season(self.season.clone()).await;
        for member in &self.members {
            store.seed_member(member.clone()).await;
        }
        for membership in &self.memberships {
            store.seed_membership(membership.clone()).await;
        }
        for workshop in &self.workshops {
            store.seed_workshop(workshop.clone()).await;
        }
        for price in &self.prices {
            store.seed_workshop_price(price.clone()).await;
        }
    }

    /// Seeds every entity into PostgreSQL
    ///
    /// Reference data goes through the store's direct inserts; the season and
    /// its memberships are written in one unit of work.
    pub async fn seed_postgres(&self, store: &PostgresAssociationStore) -> Result<(), PortError> {
        store.insert_family(&self.family).await?;
        for member in &self.members {
            store.insert_member(member).await?;
        }
        for workshop in &self.workshops {
            store.insert_workshop(workshop).await?;
        }

        let mut tx = store.begin().await?;
        tx.insert_season(&self.season).await?;
        for membership in &self.memberships {
            tx.insert_membership(membership).await?;
        }
        tx.commit().await?;

        // Prices reference the season row
        for price in &self.prices {
            store.insert_workshop_price(price).await?;
        }
        Ok(())
    }
}

/// Builder for [`Scenario`]
#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
    family: Family,
    member_count: usize,
    membership_fee: Money,
    discount: Percentage,
    start_year: i32,
    active: bool,
    workshops: Vec<(Workshop, Money)>,
}

impl ScenarioBuilder {
    /// Creates a builder for the Martin family with no member
    pub fn new() -> Self {
        let season = EntityFixtures::season();
        Self {
            family: EntityFixtures::family(),
            member_count: 0,
            membership_fee: season.membership_amount,
            discount: season.discount_percent,
            start_year: season.start_year,
            active: false,
            workshops: Vec::new(),
        }
    }

    pub fn with_family(mut self, family: Family) -> Self {
        self.family = family;
        self
    }

    /// Number of members, each holding a membership for the season
    pub fn with_members(mut self, count: usize) -> Self {
        self.member_count = count;
        self
    }

    pub fn with_membership_fee(mut self, fee: Decimal) -> Self {
        self.membership_fee = Money::new(fee);
        self
    }

    /// Sibling discount rate, in percent
    pub fn with_discount(mut self, percent: Decimal) -> Self {
        self.discount = Percentage::new(percent).unwrap_or_else(|_| Percentage::zero());
        self
    }

    /// Season running from `start_year` to the following year
    pub fn with_start_year(mut self, start_year: i32) -> Self {
        self.start_year = start_year;
        self
    }

    pub fn active(mut self) -> Self {
        self.active = true;
        self
    }

    /// Adds a workshop priced at `price` for the season
    pub fn with_workshop(mut self, workshop: Workshop, price: Decimal) -> Self {
        self.workshops.push((workshop, Money::new(price)));
        self
    }

    pub fn build(self) -> Scenario {
        let mut season = Season::new(
            self.start_year,
            self.start_year + 1,
            self.membership_fee,
            self.discount,
        )
        .expect("start year precedes end year");
        if self.active {
            season.status = SeasonStatus::Active;
        }

        let members: Vec<Member> = (0..self.member_count)
            .map(|i| {
                Member::create(NewMember {
                    family_id: Some(self.family.id),
                    first_name: format!("Child{}", i + 1),
                    last_name: self.family.name.clone(),
                    ..Default::default()
                })
                .expect("valid member")
            })
            .collect();

        let memberships = members
            .iter()
            .enumerate()
            .map(|(i, member)| {
                Membership::enroll(
                    NewMembership {
                        member_id: member.id,
                        season_id: season.id,
                        family_order: None,
                        amount: None,
                    },
                    &season,
                    i,
                )
            })
            .collect();

        let (workshops, prices) = self
            .workshops
            .into_iter()
            .map(|(workshop, amount)| {
                let price = WorkshopPrice::new(workshop.id, season.id, amount);
                (workshop, price)
            })
            .unzip();

        Scenario {
            family: self.family,
            members,
            season,
            memberships,
            workshops,
            prices,
        }
    }
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`NewPayment`]
#[derive(Debug, Clone)]
pub struct PaymentBuilder {
    family_id: FamilyId,
    season_id: SeasonId,
    amount: Money,
    payment_type: PaymentType,
    payment_date: DateTime<Utc>,
    cashing_date: Option<DateTime<Utc>>,
    reference: Option<String>,
    notes: Option<String>,
}

impl PaymentBuilder {
    /// A 50.00 cash payment made at the reference instant
    pub fn new(family_id: FamilyId, season_id: SeasonId) -> Self {
        Self {
            family_id,
            season_id,
            amount: Money::new(rust_decimal_macros::dec!(50.00)),
            payment_type: PaymentType::Cash,
            payment_date: TemporalFixtures::now(),
            cashing_date: None,
            reference: None,
            notes: None,
        }
    }

    /// Shortcut for a payment towards a scenario's family and season
    pub fn for_scenario(scenario: &Scenario) -> Self {
        Self::new(scenario.family_id(), scenario.season_id())
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Money::new(amount);
        self
    }

    pub fn with_type(mut self, payment_type: PaymentType) -> Self {
        self.payment_type = payment_type;
        self
    }

    /// A check deposited on `cashing_date`
    pub fn check_cashed_on(mut self, cashing_date: DateTime<Utc>) -> Self {
        self.payment_type = PaymentType::Check;
        self.cashing_date = Some(cashing_date);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> NewPayment {
        NewPayment {
            family_id: self.family_id,
            season_id: self.season_id,
            amount: self.amount,
            payment_type: self.payment_type,
            payment_date: self.payment_date,
            cashing_date: self.cashing_date,
            reference: self.reference,
            notes: self.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_scenario_ranks_memberships_in_member_order() {
        let scenario = ScenarioBuilder::new().with_members(3).build();

        let orders: Vec<u32> = scenario.memberships.iter().map(|m| m.family_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(scenario.memberships_total(), Money::new(dec!(90.00)));
    }

    #[test]
    fn test_scenario_prices_workshops_for_its_season() {
        let scenario = ScenarioBuilder::new()
            .with_workshop(EntityFixtures::pottery(), dec!(120))
            .build();

        assert_eq!(scenario.prices.len(), 1);
        assert_eq!(scenario.prices[0].season_id, scenario.season_id());
        assert_eq!(scenario.prices[0].workshop_id, scenario.workshops[0].id);
    }

    #[test]
    fn test_payment_builder_defaults() {
        let scenario = ScenarioBuilder::new().build();
        let payment = PaymentBuilder::for_scenario(&scenario)
            .check_cashed_on(TemporalFixtures::next_week())
            .build();

        assert_eq!(payment.payment_type, PaymentType::Check);
        assert_eq!(payment.cashing_date, Some(TemporalFixtures::next_week()));
        assert_eq!(payment.amount, Money::new(dec!(50.00)));
    }
}
