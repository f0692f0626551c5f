//! In-memory association store
//!
//! Transactions are serialized by a single async mutex held for their whole
//! lifetime. Each transaction works on a copy of the state, written back on
//! commit; a transaction dropped without commit leaves the state untouched.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use core_kernel::{
    AdapterHealth, DomainPort, FamilyId, HealthCheckResult, HealthCheckable, MemberId,
    MembershipId, PaymentId, PortError, RegistrationId, SeasonId, WorkshopId,
};
use domain_membership::{
    activate_exclusively, Family, Member, Membership, MembershipStatus, Registration, Season,
    Workshop, WorkshopPrice,
};

use crate::invoice::Invoice;
use crate::payment::Payment;
use crate::ports::{AssociationStore, AssociationTransaction};

/// Everything the store holds
#[derive(Debug, Clone, Default)]
pub struct AssociationState {
    pub families: HashMap<FamilyId, Family>,
    pub members: HashMap<MemberId, Member>,
    pub seasons: HashMap<SeasonId, Season>,
    pub workshops: HashMap<WorkshopId, Workshop>,
    pub workshop_prices: Vec<WorkshopPrice>,
    pub memberships: HashMap<MembershipId, Membership>,
    pub registrations: HashMap<RegistrationId, Registration>,
    pub payments: HashMap<PaymentId, Payment>,
    pub invoices: Vec<Invoice>,
}

impl AssociationState {
    /// Memberships of the given members for a season, in family order
    pub fn memberships_of(&self, member_ids: &[MemberId], season_id: SeasonId) -> Vec<Membership> {
        let mut found: Vec<Membership> = self
            .memberships
            .values()
            .filter(|m| m.season_id == season_id && member_ids.contains(&m.member_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.family_order.cmp(&b.family_order).then(a.created_at.cmp(&b.created_at)));
        found
    }

    pub fn active_seasons(&self) -> Vec<&Season> {
        self.seasons.values().filter(|s| s.is_active()).collect()
    }
}

/// In-memory implementation of [`AssociationStore`]
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssociationStore {
    state: Arc<Mutex<AssociationState>>,
    fail_status_updates: Arc<AtomicBool>,
}

impl InMemoryAssociationStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given state
    pub fn with_state(state: AssociationState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            fail_status_updates: Arc::default(),
        }
    }

    /// Copy of the committed state
    pub async fn snapshot(&self) -> AssociationState {
        self.state.lock().await.clone()
    }

    /// Makes every membership status update fail, to exercise rollbacks
    pub fn fail_membership_status_updates(&self, fail: bool) {
        self.fail_status_updates.store(fail, Ordering::SeqCst);
    }

    pub async fn seed_family(&self, family: Family) {
        self.state.lock().await.families.insert(family.id, family);
    }

    pub async fn seed_member(&self, member: Member) {
        self.state.lock().await.members.insert(member.id, member);
    }

    pub async fn seed_season(&self, season: Season) {
        self.state.lock().await.seasons.insert(season.id, season);
    }

    pub async fn seed_workshop(&self, workshop: Workshop) {
        self.state.lock().await.workshops.insert(workshop.id, workshop);
    }

    pub async fn seed_workshop_price(&self, price: WorkshopPrice) {
        let mut state = self.state.lock().await;
        state
            .workshop_prices
            .retain(|p| !(p.workshop_id == price.workshop_id && p.season_id == price.season_id));
        state.workshop_prices.push(price);
    }

    pub async fn seed_membership(&self, membership: Membership) {
        self.state.lock().await.memberships.insert(membership.id, membership);
    }

    pub async fn seed_registration(&self, registration: Registration) {
        self.state.lock().await.registrations.insert(registration.id, registration);
    }

    pub async fn seed_payment(&self, payment: Payment) {
        self.state.lock().await.payments.insert(payment.id, payment);
    }
}

impl DomainPort for InMemoryAssociationStore {}

#[async_trait]
impl HealthCheckable for InMemoryAssociationStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: "in-memory-association-store".to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: Some("In-memory store always healthy".to_string()),
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl AssociationStore for InMemoryAssociationStore {
    async fn begin(&self) -> Result<Box<dyn AssociationTransaction>, PortError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTransaction {
            guard,
            working,
            fail_status_updates: self.fail_status_updates.load(Ordering::SeqCst),
        }))
    }
}

struct InMemoryTransaction {
    guard: OwnedMutexGuard<AssociationState>,
    working: AssociationState,
    fail_status_updates: bool,
}

#[async_trait]
impl AssociationTransaction for InMemoryTransaction {
    async fn lock_family_season(&mut self, _family_id: FamilyId, _season_id: SeasonId) -> Result<(), PortError> {
        // the whole store is already held by this transaction
        Ok(())
    }

    async fn find_family(&mut self, id: FamilyId) -> Result<Option<Family>, PortError> {
        Ok(self.working.families.get(&id).cloned())
    }

    async fn find_member(&mut self, id: MemberId) -> Result<Option<Member>, PortError> {
        Ok(self.working.members.get(&id).cloned())
    }

    async fn members_by_family(&mut self, family_id: FamilyId) -> Result<Vec<Member>, PortError> {
        let mut members: Vec<Member> = self
            .working
            .members
            .values()
            .filter(|m| m.belongs_to(family_id))
            .cloned()
            .collect();
        members.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(members)
    }

    async fn find_season(&mut self, id: SeasonId) -> Result<Option<Season>, PortError> {
        Ok(self.working.seasons.get(&id).cloned())
    }

    async fn list_seasons(&mut self) -> Result<Vec<Season>, PortError> {
        let mut seasons: Vec<Season> = self.working.seasons.values().cloned().collect();
        seasons.sort_by_key(|s| (s.start_year, s.end_year));
        Ok(seasons)
    }

    async fn insert_season(&mut self, season: &Season) -> Result<(), PortError> {
        let duplicate = self
            .working
            .seasons
            .values()
            .any(|s| s.start_year == season.start_year && s.end_year == season.end_year);
        if duplicate {
            return Err(PortError::conflict(format!("season {} already exists", season.label())));
        }
        self.working.seasons.insert(season.id, season.clone());
        Ok(())
    }

    async fn activate_season(&mut self, id: SeasonId) -> Result<(), PortError> {
        let mut seasons: Vec<Season> = self.working.seasons.values().cloned().collect();
        activate_exclusively(&mut seasons, id).map_err(|_| PortError::not_found("Season", id))?;
        self.working.seasons = seasons.into_iter().map(|s| (s.id, s)).collect();
        Ok(())
    }

    async fn find_workshop(&mut self, id: WorkshopId) -> Result<Option<Workshop>, PortError> {
        Ok(self.working.workshops.get(&id).cloned())
    }

    async fn workshops_by_ids(&mut self, ids: &[WorkshopId]) -> Result<Vec<Workshop>, PortError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.working.workshops.get(id).cloned())
            .collect())
    }

    async fn find_workshop_price(
        &mut self,
        workshop_id: WorkshopId,
        season_id: SeasonId,
    ) -> Result<Option<WorkshopPrice>, PortError> {
        Ok(self
            .working
            .workshop_prices
            .iter()
            .find(|p| p.workshop_id == workshop_id && p.season_id == season_id)
            .cloned())
    }

    async fn memberships(&mut self, member_ids: &[MemberId], season_id: SeasonId) -> Result<Vec<Membership>, PortError> {
        Ok(self.working.memberships_of(member_ids, season_id))
    }

    async fn find_membership_for(
        &mut self,
        member_id: MemberId,
        season_id: SeasonId,
    ) -> Result<Option<Membership>, PortError> {
        Ok(self
            .working
            .memberships
            .values()
            .find(|m| m.member_id == member_id && m.season_id == season_id)
            .cloned())
    }

    async fn insert_membership(&mut self, membership: &Membership) -> Result<(), PortError> {
        let duplicate = self
            .working
            .memberships
            .values()
            .any(|m| m.member_id == membership.member_id && m.season_id == membership.season_id);
        if duplicate {
            return Err(PortError::conflict("membership already exists for member and season"));
        }
        self.working.memberships.insert(membership.id, membership.clone());
        Ok(())
    }

    async fn update_membership_statuses(
        &mut self,
        member_ids: &[MemberId],
        season_id: SeasonId,
        from: MembershipStatus,
        to: MembershipStatus,
    ) -> Result<u64, PortError> {
        if self.fail_status_updates {
            return Err(PortError::internal("membership status update failed"));
        }

        let mut updated = 0;
        for membership in self.working.memberships.values_mut() {
            if membership.season_id == season_id
                && membership.status == from
                && member_ids.contains(&membership.member_id)
            {
                membership.status = to;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn registrations(&mut self, member_ids: &[MemberId], season_id: SeasonId) -> Result<Vec<Registration>, PortError> {
        let mut found: Vec<Registration> = self
            .working
            .registrations
            .values()
            .filter(|r| r.season_id == season_id && member_ids.contains(&r.member_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn find_registration(&mut self, id: RegistrationId) -> Result<Option<Registration>, PortError> {
        Ok(self.working.registrations.get(&id).cloned())
    }

    async fn find_registration_for(
        &mut self,
        member_id: MemberId,
        workshop_id: WorkshopId,
        season_id: SeasonId,
    ) -> Result<Option<Registration>, PortError> {
        Ok(self
            .working
            .registrations
            .values()
            .find(|r| r.member_id == member_id && r.workshop_id == workshop_id && r.season_id == season_id)
            .cloned())
    }

    async fn insert_registration(&mut self, registration: &Registration) -> Result<(), PortError> {
        let duplicate = self.working.registrations.values().any(|r| {
            r.member_id == registration.member_id
                && r.workshop_id == registration.workshop_id
                && r.season_id == registration.season_id
        });
        if duplicate {
            return Err(PortError::conflict("registration already exists for member, workshop and season"));
        }
        self.working.registrations.insert(registration.id, registration.clone());
        Ok(())
    }

    async fn update_registration(&mut self, registration: &Registration) -> Result<(), PortError> {
        match self.working.registrations.get_mut(&registration.id) {
            Some(existing) => {
                *existing = registration.clone();
                Ok(())
            }
            None => Err(PortError::not_found("Registration", registration.id)),
        }
    }

    async fn delete_registration(&mut self, id: RegistrationId) -> Result<(), PortError> {
        self.working
            .registrations
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PortError::not_found("Registration", id))
    }

    async fn payments(&mut self, family_id: FamilyId, season_id: SeasonId) -> Result<Vec<Payment>, PortError> {
        let mut found: Vec<Payment> = self
            .working
            .payments
            .values()
            .filter(|p| p.family_id == family_id && p.season_id == season_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.payment_date.cmp(&b.payment_date).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn find_payment(&mut self, id: PaymentId) -> Result<Option<Payment>, PortError> {
        Ok(self.working.payments.get(&id).cloned())
    }

    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), PortError> {
        self.working.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn update_payment(&mut self, payment: &Payment) -> Result<(), PortError> {
        match self.working.payments.get_mut(&payment.id) {
            Some(existing) => {
                *existing = payment.clone();
                Ok(())
            }
            None => Err(PortError::not_found("Payment", payment.id)),
        }
    }

    async fn delete_payment(&mut self, id: PaymentId) -> Result<(), PortError> {
        self.working
            .payments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PortError::not_found("Payment", id))
    }

    async fn find_invoice(&mut self, family_id: FamilyId, season_id: SeasonId) -> Result<Option<Invoice>, PortError> {
        Ok(self
            .working
            .invoices
            .iter()
            .find(|i| i.family_id == family_id && i.season_id == season_id)
            .cloned())
    }

    async fn count_issued_invoices(&mut self, start_year: i32) -> Result<u64, PortError> {
        let seasons = &self.working.seasons;
        let count = self
            .working
            .invoices
            .iter()
            .filter(|i| seasons.get(&i.season_id).is_some_and(|s| s.start_year == start_year))
            .count();
        Ok(count as u64)
    }

    async fn insert_invoice(&mut self, invoice: &Invoice) -> Result<(), PortError> {
        let duplicate = self
            .working
            .invoices
            .iter()
            .any(|i| i.family_id == invoice.family_id && i.season_id == invoice.season_id);
        if duplicate {
            return Err(PortError::conflict("invoice already issued for family and season"));
        }
        self.working.invoices.push(invoice.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        let InMemoryTransaction { mut guard, working, .. } = *self;
        *guard = working;
        Ok(())
    }
}
