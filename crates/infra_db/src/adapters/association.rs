//! PostgreSQL Association Store
//!
//! This module implements the billing domain's unit of work on PostgreSQL.
//! Each [`AssociationStore::begin`] opens one database transaction; every
//! read and write of the unit of work goes through it, and dropping it
//! without commit rolls everything back.
//!
//! # Locking
//!
//! - `lock_family_season` takes a transaction scoped advisory lock keyed on
//!   the (family, season) pair and locks the family row
//! - invoice numbering takes an advisory lock per season start year before
//!   counting
//! - season activation serializes on its own advisory lock (see
//!   [`SeasonRepository::activate`])
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::PostgresAssociationStore;
//! use domain_billing::FamilyPaymentService;
//! use std::sync::Arc;
//!
//! let store = Arc::new(PostgresAssociationStore::new(pool));
//! let payments = FamilyPaymentService::new(store, clock);
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    AdapterHealth, DomainPort, FamilyId, HealthCheckResult, HealthCheckable, MemberId, PaymentId,
    PortError, RegistrationId, SeasonId, WorkshopId,
};
use domain_billing::{AssociationStore, AssociationTransaction, Invoice, Payment};
use domain_membership::{
    Family, Member, Membership, MembershipStatus, Registration, Season, Workshop, WorkshopPrice,
};

use crate::adapters::convert::{
    family_from_row, family_to_row, invoice_from_rows, invoice_to_rows, member_from_row,
    member_to_row, membership_from_row, membership_status_to_db, membership_to_row,
    payment_from_row, payment_to_row, price_from_row, price_to_row, registration_from_row,
    registration_to_row, season_from_row, season_to_row, workshop_from_row, workshop_to_row,
};
use crate::error::DatabaseError;
use crate::repositories::{
    advisory_xact_lock, FamilyRepository, InvoiceRepository, MembershipRepository,
    PaymentRepository, RegistrationRepository, SeasonRepository, WorkshopRepository,
};

const ADAPTER_ID: &str = "postgres-association-store";

/// PostgreSQL-backed implementation of the association store
///
/// # Error Handling
///
/// Database errors are translated to `PortError` variants:
/// - unique violations -> `PortError::Conflict`
/// - writes targeting a missing row -> `PortError::NotFound`
/// - connection failures -> `PortError::Connection`
/// - other errors -> `PortError::Internal`
#[derive(Debug, Clone)]
pub struct PostgresAssociationStore {
    pool: PgPool,
}

impl PostgresAssociationStore {
    /// Creates a new store on a connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Inserts a family outside of any unit of work
    ///
    /// Families and members are maintained by the CRUD screens; this is used
    /// for imports and tests.
    pub async fn insert_family(&self, family: &Family) -> Result<(), PortError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        FamilyRepository::insert(&mut conn, &family_to_row(family)).await?;
        Ok(())
    }

    /// Inserts a member outside of any unit of work
    pub async fn insert_member(&self, member: &Member) -> Result<(), PortError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        FamilyRepository::insert_member(&mut conn, &member_to_row(member)).await?;
        Ok(())
    }

    /// Inserts a workshop outside of any unit of work
    pub async fn insert_workshop(&self, workshop: &Workshop) -> Result<(), PortError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        WorkshopRepository::insert(&mut conn, &workshop_to_row(workshop)?).await?;
        Ok(())
    }

    /// Inserts a workshop price outside of any unit of work
    pub async fn insert_workshop_price(&self, price: &WorkshopPrice) -> Result<(), PortError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        WorkshopRepository::insert_price(&mut conn, &price_to_row(price)).await?;
        Ok(())
    }
}

// Mark as a domain port
impl DomainPort for PostgresAssociationStore {}

#[async_trait]
impl HealthCheckable for PostgresAssociationStore {
    /// Checks database connectivity
    ///
    /// Performs a simple SELECT 1 query to verify the connection pool
    /// is operational and the database is responsive.
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl AssociationStore for PostgresAssociationStore {
    async fn begin(&self) -> Result<Box<dyn AssociationTransaction>, PortError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        Ok(Box::new(PgAssociationTransaction { tx }))
    }
}

/// One database transaction seen through the billing ports
struct PgAssociationTransaction {
    tx: Transaction<'static, Postgres>,
}

fn uuids<T: Copy + Into<Uuid>>(ids: &[T]) -> Vec<Uuid> {
    ids.iter().map(|&id| id.into()).collect()
}

#[async_trait]
impl AssociationTransaction for PgAssociationTransaction {
    #[instrument(skip(self))]
    async fn lock_family_season(&mut self, family_id: FamilyId, season_id: SeasonId) -> Result<(), PortError> {
        let key = format!("{}:{}", family_id.as_uuid(), season_id.as_uuid());
        advisory_xact_lock(&mut self.tx, &key).await?;
        FamilyRepository::lock(&mut self.tx, family_id.into()).await?;
        debug!("Family season lock acquired");
        Ok(())
    }

    // ========================================================================
    // Families and members
    // ========================================================================

    async fn find_family(&mut self, id: FamilyId) -> Result<Option<Family>, PortError> {
        let row = FamilyRepository::find(&mut self.tx, id.into()).await?;
        Ok(row.map(family_from_row))
    }

    async fn find_member(&mut self, id: MemberId) -> Result<Option<Member>, PortError> {
        let row = FamilyRepository::find_member(&mut self.tx, id.into()).await?;
        Ok(row.map(member_from_row))
    }

    async fn members_by_family(&mut self, family_id: FamilyId) -> Result<Vec<Member>, PortError> {
        let rows = FamilyRepository::members_by_family(&mut self.tx, family_id.into()).await?;
        Ok(rows.into_iter().map(member_from_row).collect())
    }

    // ========================================================================
    // Seasons
    // ========================================================================

    async fn find_season(&mut self, id: SeasonId) -> Result<Option<Season>, PortError> {
        let row = SeasonRepository::find(&mut self.tx, id.into()).await?;
        Ok(row.map(season_from_row).transpose()?)
    }

    async fn list_seasons(&mut self) -> Result<Vec<Season>, PortError> {
        let rows = SeasonRepository::list(&mut self.tx).await?;
        let seasons = rows
            .into_iter()
            .map(season_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(seasons)
    }

    #[instrument(skip(self, season), fields(season_id = %season.id))]
    async fn insert_season(&mut self, season: &Season) -> Result<(), PortError> {
        SeasonRepository::insert(&mut self.tx, &season_to_row(season)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn activate_season(&mut self, id: SeasonId) -> Result<(), PortError> {
        if !SeasonRepository::activate(&mut self.tx, id.into()).await? {
            return Err(PortError::not_found("Season", id));
        }
        Ok(())
    }

    // ========================================================================
    // Workshops
    // ========================================================================

    async fn find_workshop(&mut self, id: WorkshopId) -> Result<Option<Workshop>, PortError> {
        let row = WorkshopRepository::find(&mut self.tx, id.into()).await?;
        Ok(row.map(workshop_from_row).transpose()?)
    }

    async fn workshops_by_ids(&mut self, ids: &[WorkshopId]) -> Result<Vec<Workshop>, PortError> {
        let rows = WorkshopRepository::find_many(&mut self.tx, &uuids(ids)).await?;
        let workshops = rows
            .into_iter()
            .map(workshop_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(workshops)
    }

    async fn find_workshop_price(
        &mut self,
        workshop_id: WorkshopId,
        season_id: SeasonId,
    ) -> Result<Option<WorkshopPrice>, PortError> {
        let row = WorkshopRepository::find_price(&mut self.tx, workshop_id.into(), season_id.into()).await?;
        Ok(row.map(price_from_row))
    }

    // ========================================================================
    // Memberships
    // ========================================================================

    async fn memberships(&mut self, member_ids: &[MemberId], season_id: SeasonId) -> Result<Vec<Membership>, PortError> {
        let rows = MembershipRepository::for_members(&mut self.tx, &uuids(member_ids), season_id.into()).await?;
        let memberships = rows
            .into_iter()
            .map(membership_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(memberships)
    }

    async fn find_membership_for(
        &mut self,
        member_id: MemberId,
        season_id: SeasonId,
    ) -> Result<Option<Membership>, PortError> {
        let row = MembershipRepository::find_for(&mut self.tx, member_id.into(), season_id.into()).await?;
        Ok(row.map(membership_from_row).transpose()?)
    }

    #[instrument(skip(self, membership), fields(membership_id = %membership.id))]
    async fn insert_membership(&mut self, membership: &Membership) -> Result<(), PortError> {
        MembershipRepository::insert(&mut self.tx, &membership_to_row(membership)?).await?;
        Ok(())
    }

    #[instrument(skip(self, member_ids), fields(members = member_ids.len()))]
    async fn update_membership_statuses(
        &mut self,
        member_ids: &[MemberId],
        season_id: SeasonId,
        from: MembershipStatus,
        to: MembershipStatus,
    ) -> Result<u64, PortError> {
        let updated = MembershipRepository::transition_statuses(
            &mut self.tx,
            &uuids(member_ids),
            season_id.into(),
            membership_status_to_db(from),
            membership_status_to_db(to),
        )
        .await?;

        debug!(updated, "Membership statuses transitioned");
        Ok(updated)
    }

    // ========================================================================
    // Registrations
    // ========================================================================

    async fn registrations(&mut self, member_ids: &[MemberId], season_id: SeasonId) -> Result<Vec<Registration>, PortError> {
        let rows = RegistrationRepository::for_members(&mut self.tx, &uuids(member_ids), season_id.into()).await?;
        let registrations = rows
            .into_iter()
            .map(registration_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(registrations)
    }

    async fn find_registration(&mut self, id: RegistrationId) -> Result<Option<Registration>, PortError> {
        let row = RegistrationRepository::find(&mut self.tx, id.into()).await?;
        Ok(row.map(registration_from_row).transpose()?)
    }

    async fn find_registration_for(
        &mut self,
        member_id: MemberId,
        workshop_id: WorkshopId,
        season_id: SeasonId,
    ) -> Result<Option<Registration>, PortError> {
        let row = RegistrationRepository::find_for(
            &mut self.tx,
            member_id.into(),
            workshop_id.into(),
            season_id.into(),
        )
        .await?;
        Ok(row.map(registration_from_row).transpose()?)
    }

    #[instrument(skip(self, registration), fields(registration_id = %registration.id))]
    async fn insert_registration(&mut self, registration: &Registration) -> Result<(), PortError> {
        RegistrationRepository::insert(&mut self.tx, &registration_to_row(registration)?).await?;
        Ok(())
    }

    #[instrument(skip(self, registration), fields(registration_id = %registration.id))]
    async fn update_registration(&mut self, registration: &Registration) -> Result<(), PortError> {
        let updated = RegistrationRepository::update(&mut self.tx, &registration_to_row(registration)?).await?;
        if updated == 0 {
            return Err(PortError::not_found("Registration", registration.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_registration(&mut self, id: RegistrationId) -> Result<(), PortError> {
        if RegistrationRepository::delete(&mut self.tx, id.into()).await? == 0 {
            return Err(PortError::not_found("Registration", id));
        }
        Ok(())
    }

    // ========================================================================
    // Payments
    // ========================================================================

    async fn payments(&mut self, family_id: FamilyId, season_id: SeasonId) -> Result<Vec<Payment>, PortError> {
        let rows = PaymentRepository::for_family_season(&mut self.tx, family_id.into(), season_id.into()).await?;
        Ok(rows.into_iter().map(payment_from_row).collect())
    }

    async fn find_payment(&mut self, id: PaymentId) -> Result<Option<Payment>, PortError> {
        let row = PaymentRepository::find(&mut self.tx, id.into()).await?;
        Ok(row.map(payment_from_row))
    }

    #[instrument(skip(self, payment), fields(payment_id = %payment.id))]
    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), PortError> {
        PaymentRepository::insert(&mut self.tx, &payment_to_row(payment)).await?;
        Ok(())
    }

    #[instrument(skip(self, payment), fields(payment_id = %payment.id))]
    async fn update_payment(&mut self, payment: &Payment) -> Result<(), PortError> {
        if PaymentRepository::update(&mut self.tx, &payment_to_row(payment)).await? == 0 {
            return Err(PortError::not_found("Payment", payment.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_payment(&mut self, id: PaymentId) -> Result<(), PortError> {
        if PaymentRepository::delete(&mut self.tx, id.into()).await? == 0 {
            return Err(PortError::not_found("Payment", id));
        }
        Ok(())
    }

    // ========================================================================
    // Invoices
    // ========================================================================

    async fn find_invoice(&mut self, family_id: FamilyId, season_id: SeasonId) -> Result<Option<Invoice>, PortError> {
        let found = InvoiceRepository::find_for(&mut self.tx, family_id.into(), season_id.into()).await?;
        let invoice = found
            .map(|(row, items)| invoice_from_rows(row, items))
            .transpose()?;
        Ok(invoice)
    }

    /// Counts under a per-start-year lock, held until commit, so two families
    /// issuing at once never draw the same number
    async fn count_issued_invoices(&mut self, start_year: i32) -> Result<u64, PortError> {
        advisory_xact_lock(&mut self.tx, &format!("invoices:{start_year}")).await?;
        let count = InvoiceRepository::count_for_start_year(&mut self.tx, start_year).await?;
        u64::try_from(count)
            .map_err(|_| DatabaseError::SerializationError(format!("negative invoice count: {count}")).into())
    }

    #[instrument(skip(self, invoice), fields(family_id = %invoice.family_id, season_id = %invoice.season_id))]
    async fn insert_invoice(&mut self, invoice: &Invoice) -> Result<(), PortError> {
        let (row, items) = invoice_to_rows(invoice)?;
        InvoiceRepository::insert(&mut self.tx, &row, &items).await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        self.tx
            .commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        Ok(())
    }
}
