//! Invoice use cases

use std::sync::Arc;
use tracing::{info, instrument};

use core_kernel::{Clock, FamilyId, SeasonId, WorkshopId};

use crate::error::BillingError;
use crate::invoice::{build_draft_invoice, invoice_number, Invoice};
use crate::ports::{AssociationStore, AssociationTransaction};
use crate::services::conflict_as;

/// Reads and issues family invoices
pub struct InvoiceService {
    store: Arc<dyn AssociationStore>,
    clock: Arc<dyn Clock>,
}

impl InvoiceService {
    pub fn new(store: Arc<dyn AssociationStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The issued invoice if there is one, else a draft of current obligations
    #[instrument(skip(self))]
    pub async fn get_invoice_for_family_and_season(
        &self,
        family_id: FamilyId,
        season_id: SeasonId,
    ) -> Result<Invoice, BillingError> {
        let mut tx = self.store.begin().await?;

        if let Some(invoice) = tx.find_invoice(family_id, season_id).await? {
            return Ok(invoice);
        }
        draft_for(tx.as_mut(), family_id, season_id).await
    }

    /// Stores the current draft as a numbered, immutable invoice
    ///
    /// # Errors
    ///
    /// - `InvoiceAlreadyIssued` if the family already has one for the season
    /// - `EmptyInvoice` if there is nothing to bill
    #[instrument(skip(self))]
    pub async fn issue_invoice(&self, family_id: FamilyId, season_id: SeasonId) -> Result<Invoice, BillingError> {
        let mut tx = self.store.begin().await?;
        tx.lock_family_season(family_id, season_id).await?;

        if let Some(existing) = tx.find_invoice(family_id, season_id).await? {
            return Err(BillingError::InvoiceAlreadyIssued {
                family_id,
                season_id,
                invoice_number: existing.invoice_number.unwrap_or_default(),
            });
        }

        let draft = draft_for(tx.as_mut(), family_id, season_id).await?;
        let season = tx
            .find_season(season_id)
            .await?
            .ok_or(BillingError::SeasonNotFound(season_id))?;
        let issued_so_far = tx.count_issued_invoices(season.start_year).await?;

        let invoice = draft.issue(invoice_number(&season, issued_so_far), self.clock.now())?;
        let number = invoice.invoice_number.clone().unwrap_or_default();

        tx.insert_invoice(&invoice).await.map_err(|e| {
            conflict_as(e, || BillingError::InvoiceAlreadyIssued {
                family_id,
                season_id,
                invoice_number: number.clone(),
            })
        })?;
        tx.commit().await?;

        info!(invoice_number = %number, total = %invoice.total_amount, "Invoice issued");
        Ok(invoice)
    }
}

async fn draft_for(
    tx: &mut dyn AssociationTransaction,
    family_id: FamilyId,
    season_id: SeasonId,
) -> Result<Invoice, BillingError> {
    if tx.find_family(family_id).await?.is_none() {
        return Err(BillingError::FamilyNotFound(family_id));
    }
    let season = tx
        .find_season(season_id)
        .await?
        .ok_or(BillingError::SeasonNotFound(season_id))?;

    let members = tx.members_by_family(family_id).await?;
    let member_ids: Vec<_> = members.iter().map(|m| m.id).collect();
    let memberships = tx.memberships(&member_ids, season_id).await?;
    let registrations = tx.registrations(&member_ids, season_id).await?;

    let mut workshop_ids: Vec<WorkshopId> = registrations.iter().map(|r| r.workshop_id).collect();
    workshop_ids.sort();
    workshop_ids.dedup();
    let workshops = tx.workshops_by_ids(&workshop_ids).await?;

    Ok(build_draft_invoice(
        family_id,
        &season,
        &members,
        &memberships,
        &registrations,
        &workshops,
    ))
}
