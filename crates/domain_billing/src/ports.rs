//! Association Store Ports
//!
//! The billing services read and write through a unit of work: every use case
//! opens an [`AssociationTransaction`] with [`AssociationStore::begin`], does
//! all its reads and writes on it, and commits. Dropping a transaction without
//! committing discards its writes.
//!
//! # Adapters
//!
//! - **PostgreSQL** (`infra_db::PostgresAssociationStore`): one database
//!   transaction, serialized per (family, season) with an advisory lock
//! - **In-memory** ([`crate::adapters::InMemoryAssociationStore`]): for tests
//!   and local runs
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut tx = store.begin().await?;
//! tx.lock_family_season(family_id, season_id).await?;
//! tx.insert_payment(&payment).await?;
//! update_membership_statuses_for_family(tx.as_mut(), family_id, season_id).await?;
//! tx.commit().await?;
//! ```
//!
//! Lookups return `Ok(None)` for missing rows; writes targeting a missing row
//! return `PortError::NotFound`, and writes breaking a uniqueness rule return
//! `PortError::Conflict`.

use async_trait::async_trait;

use core_kernel::{
    DomainPort, FamilyId, HealthCheckable, MemberId, PaymentId, PortError, RegistrationId,
    SeasonId, WorkshopId,
};
use domain_membership::{
    Family, Member, Membership, MembershipStatus, Registration, Season, Workshop, WorkshopPrice,
};

use crate::invoice::Invoice;
use crate::payment::Payment;

/// Entry point of the association storage
#[async_trait]
pub trait AssociationStore: DomainPort + HealthCheckable {
    /// Opens a unit of work
    async fn begin(&self) -> Result<Box<dyn AssociationTransaction>, PortError>;
}

/// A unit of work over the association data
#[async_trait]
pub trait AssociationTransaction: Send {
    /// Serializes every other transaction touching the same family and season
    /// until this one ends
    async fn lock_family_season(&mut self, family_id: FamilyId, season_id: SeasonId) -> Result<(), PortError>;

    // ========================================================================
    // Families and members
    // ========================================================================

    async fn find_family(&mut self, id: FamilyId) -> Result<Option<Family>, PortError>;

    async fn find_member(&mut self, id: MemberId) -> Result<Option<Member>, PortError>;

    async fn members_by_family(&mut self, family_id: FamilyId) -> Result<Vec<Member>, PortError>;

    // ========================================================================
    // Seasons
    // ========================================================================

    async fn find_season(&mut self, id: SeasonId) -> Result<Option<Season>, PortError>;

    async fn list_seasons(&mut self) -> Result<Vec<Season>, PortError>;

    /// Fails with `Conflict` when a season covers the same years
    async fn insert_season(&mut self, season: &Season) -> Result<(), PortError>;

    /// Activates one season and deactivates all others
    async fn activate_season(&mut self, id: SeasonId) -> Result<(), PortError>;

    // ========================================================================
    // Workshops
    // ========================================================================

    async fn find_workshop(&mut self, id: WorkshopId) -> Result<Option<Workshop>, PortError>;

    async fn workshops_by_ids(&mut self, ids: &[WorkshopId]) -> Result<Vec<Workshop>, PortError>;

    async fn find_workshop_price(
        &mut self,
        workshop_id: WorkshopId,
        season_id: SeasonId,
    ) -> Result<Option<WorkshopPrice>, PortError>;

    // ========================================================================
    // Memberships
    // ========================================================================

    /// Memberships of the given members for a season
    async fn memberships(&mut self, member_ids: &[MemberId], season_id: SeasonId) -> Result<Vec<Membership>, PortError>;

    async fn find_membership_for(
        &mut self,
        member_id: MemberId,
        season_id: SeasonId,
    ) -> Result<Option<Membership>, PortError>;

    /// Fails with `Conflict` when the member already has one for the season
    async fn insert_membership(&mut self, membership: &Membership) -> Result<(), PortError>;

    /// Moves every membership of the given members for a season from one
    /// status to another, returning the number of rows changed
    async fn update_membership_statuses(
        &mut self,
        member_ids: &[MemberId],
        season_id: SeasonId,
        from: MembershipStatus,
        to: MembershipStatus,
    ) -> Result<u64, PortError>;

    // ========================================================================
    // Registrations
    // ========================================================================

    /// Registrations of the given members for a season
    async fn registrations(&mut self, member_ids: &[MemberId], season_id: SeasonId) -> Result<Vec<Registration>, PortError>;

    async fn find_registration(&mut self, id: RegistrationId) -> Result<Option<Registration>, PortError>;

    async fn find_registration_for(
        &mut self,
        member_id: MemberId,
        workshop_id: WorkshopId,
        season_id: SeasonId,
    ) -> Result<Option<Registration>, PortError>;

    /// Fails with `Conflict` on a duplicate (member, workshop, season)
    async fn insert_registration(&mut self, registration: &Registration) -> Result<(), PortError>;

    async fn update_registration(&mut self, registration: &Registration) -> Result<(), PortError>;

    async fn delete_registration(&mut self, id: RegistrationId) -> Result<(), PortError>;

    // ========================================================================
    // Payments
    // ========================================================================

    async fn payments(&mut self, family_id: FamilyId, season_id: SeasonId) -> Result<Vec<Payment>, PortError>;

    async fn find_payment(&mut self, id: PaymentId) -> Result<Option<Payment>, PortError>;

    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), PortError>;

    async fn update_payment(&mut self, payment: &Payment) -> Result<(), PortError>;

    async fn delete_payment(&mut self, id: PaymentId) -> Result<(), PortError>;

    // ========================================================================
    // Invoices
    // ========================================================================

    /// The issued invoice of a family for a season, if any
    async fn find_invoice(&mut self, family_id: FamilyId, season_id: SeasonId) -> Result<Option<Invoice>, PortError>;

    /// Number of invoices issued so far in seasons starting in `start_year`
    ///
    /// Invoice numbers carry only the start year, so this is the sequence
    /// they are drawn from.
    async fn count_issued_invoices(&mut self, start_year: i32) -> Result<u64, PortError>;

    /// Fails with `Conflict` when the family already has one for the season
    async fn insert_invoice(&mut self, invoice: &Invoice) -> Result<(), PortError>;

    /// Makes every write of this unit of work visible
    async fn commit(self: Box<Self>) -> Result<(), PortError>;
}
