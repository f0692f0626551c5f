//! Family payment use cases

use std::sync::Arc;
use tracing::{info, instrument};

use core_kernel::{Clock, FamilyId, Money, PaymentId, SeasonId};

use crate::error::BillingError;
use crate::payment::{NewPayment, Payment, PaymentUpdate};
use crate::ports::{AssociationStore, AssociationTransaction};
use crate::reconciliation::ReconciliationOutcome;
use crate::services::reconcile_family;
use crate::stats::{compute_financial_stats, FinancialStats, StatsSource};

/// A payment write and the reconciliations it triggered
#[derive(Debug, Clone)]
pub struct RecordedPayment {
    pub payment: Payment,
    /// One per season touched, the payment's current season first
    pub reconciliations: Vec<ReconciliationOutcome>,
}

/// Records, edits and removes family payments
///
/// Every mutation re-derives the payment's status where needed and
/// reconciles the family's memberships in the same transaction.
pub struct FamilyPaymentService {
    store: Arc<dyn AssociationStore>,
    clock: Arc<dyn Clock>,
}

impl FamilyPaymentService {
    pub fn new(store: Arc<dyn AssociationStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Records a payment for a family and season
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` unless the amount is positive
    /// - `FamilyNotFound` / `SeasonNotFound`
    /// - `Port` on storage failure, in which case nothing is recorded
    #[instrument(skip(self, input), fields(family_id = %input.family_id, season_id = %input.season_id))]
    pub async fn add_family_payment(&self, input: NewPayment) -> Result<RecordedPayment, BillingError> {
        Money::positive(input.amount.amount())?;

        let mut tx = self.store.begin().await?;
        tx.lock_family_season(input.family_id, input.season_id).await?;
        ensure_family_and_season(tx.as_mut(), input.family_id, input.season_id).await?;

        let payment = Payment::record(input, self.clock.as_ref());
        tx.insert_payment(&payment).await?;

        let outcome = reconcile_family(tx.as_mut(), payment.family_id, payment.season_id).await?;
        tx.commit().await?;

        info!(payment_id = %payment.id, status = payment.status.as_str(), "Payment recorded");
        Ok(RecordedPayment {
            payment,
            reconciliations: vec![outcome],
        })
    }

    /// Applies a partial update to a payment
    ///
    /// Moving the payment to another season reconciles both seasons.
    #[instrument(skip(self, update), fields(payment_id = %id))]
    pub async fn update_family_payment(
        &self,
        id: PaymentId,
        update: PaymentUpdate,
    ) -> Result<RecordedPayment, BillingError> {
        if let Some(amount) = update.amount {
            Money::positive(amount.amount())?;
        }

        let mut tx = self.store.begin().await?;
        let current = tx.find_payment(id).await?.ok_or(BillingError::PaymentNotFound(id))?;

        let previous_season = current.season_id;
        let target_season = update.season_id.unwrap_or(previous_season);
        if target_season != previous_season && tx.find_season(target_season).await?.is_none() {
            return Err(BillingError::SeasonNotFound(target_season));
        }

        let mut seasons = vec![previous_season, target_season];
        seasons.sort();
        seasons.dedup();
        for season_id in &seasons {
            tx.lock_family_season(current.family_id, *season_id).await?;
        }

        // re-read under the lock
        let mut payment = tx.find_payment(id).await?.ok_or(BillingError::PaymentNotFound(id))?;
        payment.apply(update, self.clock.as_ref());
        tx.update_payment(&payment).await?;

        let mut reconciliations = vec![reconcile_family(tx.as_mut(), payment.family_id, payment.season_id).await?];
        if previous_season != payment.season_id {
            reconciliations.push(reconcile_family(tx.as_mut(), payment.family_id, previous_season).await?);
        }
        tx.commit().await?;

        info!(status = payment.status.as_str(), "Payment updated");
        Ok(RecordedPayment {
            payment,
            reconciliations,
        })
    }

    /// Removes a payment and reconciles what it was paying for
    #[instrument(skip(self), fields(payment_id = %id))]
    pub async fn delete_family_payment(&self, id: PaymentId) -> Result<ReconciliationOutcome, BillingError> {
        let mut tx = self.store.begin().await?;
        let seen = tx.find_payment(id).await?.ok_or(BillingError::PaymentNotFound(id))?;
        tx.lock_family_season(seen.family_id, seen.season_id).await?;

        // re-read under the lock; a concurrent delete may have won
        let payment = tx.find_payment(id).await?.ok_or(BillingError::PaymentNotFound(id))?;
        tx.delete_payment(id).await?;

        let outcome = reconcile_family(tx.as_mut(), payment.family_id, payment.season_id).await?;
        tx.commit().await?;

        info!("Payment deleted");
        Ok(outcome)
    }

    /// Current financial stats of a family for a season
    #[instrument(skip(self))]
    pub async fn family_balance(&self, family_id: FamilyId, season_id: SeasonId) -> Result<FinancialStats, BillingError> {
        let mut tx = self.store.begin().await?;
        ensure_family_and_season(tx.as_mut(), family_id, season_id).await?;

        let member_ids: Vec<_> = tx.members_by_family(family_id).await?.into_iter().map(|m| m.id).collect();
        let memberships = tx.memberships(&member_ids, season_id).await?;
        let registrations = tx.registrations(&member_ids, season_id).await?;
        let payments = tx.payments(family_id, season_id).await?;

        Ok(compute_financial_stats(
            &[StatsSource::new(&memberships, &registrations)],
            Some(&payments),
            season_id,
        ))
    }
}

async fn ensure_family_and_season(
    tx: &mut dyn AssociationTransaction,
    family_id: FamilyId,
    season_id: SeasonId,
) -> Result<(), BillingError> {
    if tx.find_family(family_id).await?.is_none() {
        return Err(BillingError::FamilyNotFound(family_id));
    }
    if tx.find_season(season_id).await?.is_none() {
        return Err(BillingError::SeasonNotFound(season_id));
    }
    Ok(())
}
