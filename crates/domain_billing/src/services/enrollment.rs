//! Membership and workshop registration use cases
//!
//! Both change what a family owes, so each write is followed by a
//! reconciliation of the member's family for the season.

use std::sync::Arc;
use tracing::{info, instrument};

use core_kernel::{Money, RegistrationId};
use domain_membership::{
    ensure_not_registered, quote_registration, validate_admission, AdmissionRequest, Membership,
    MembershipError, NewMembership, Registration,
};

use crate::error::BillingError;
use crate::ports::{AssociationStore, AssociationTransaction};
use crate::reconciliation::ReconciliationOutcome;
use crate::services::{conflict_as, reconcile_member_family};

/// A registration write and the reconciliation it triggered
#[derive(Debug, Clone)]
pub struct RegistrationChange {
    pub registration: Registration,
    /// `None` when the member has no family
    pub reconciliation: Option<ReconciliationOutcome>,
}

/// Enrolls members in seasons and registers them to workshops
pub struct EnrollmentService {
    store: Arc<dyn AssociationStore>,
}

impl EnrollmentService {
    pub fn new(store: Arc<dyn AssociationStore>) -> Self {
        Self { store }
    }

    /// Creates a membership for a member and season
    ///
    /// The family order defaults to the number of the family's memberships
    /// for the season plus one; the amount defaults to the season's fee.
    #[instrument(skip(self, input), fields(member_id = %input.member_id, season_id = %input.season_id))]
    pub async fn enroll_member(&self, input: NewMembership) -> Result<Membership, BillingError> {
        if let Some(amount) = input.amount {
            Money::chargeable(amount.amount())?;
        }

        let mut tx = self.store.begin().await?;

        let member = tx
            .find_member(input.member_id)
            .await?
            .ok_or(MembershipError::MemberNotFound(input.member_id))?;
        let season = tx
            .find_season(input.season_id)
            .await?
            .ok_or(BillingError::SeasonNotFound(input.season_id))?;

        if let Some(family_id) = member.family_id {
            tx.lock_family_season(family_id, season.id).await?;
        }

        let already = MembershipError::MembershipAlreadyExists {
            member_id: member.id,
            season_id: season.id,
        };
        if tx.find_membership_for(member.id, season.id).await?.is_some() {
            return Err(already.into());
        }

        let siblings = match member.family_id {
            Some(family_id) => {
                let member_ids: Vec<_> = tx.members_by_family(family_id).await?.into_iter().map(|m| m.id).collect();
                tx.memberships(&member_ids, season.id).await?.len()
            }
            None => 0,
        };

        let membership = Membership::enroll(input, &season, siblings);
        tx.insert_membership(&membership)
            .await
            .map_err(|e| conflict_as(e, || already.into()))?;

        reconcile_member_family(tx.as_mut(), membership.member_id, membership.season_id).await?;
        tx.commit().await?;

        info!(membership_id = %membership.id, family_order = membership.family_order, "Member enrolled");
        Ok(membership)
    }

    /// Registers a member to a workshop
    ///
    /// # Errors
    ///
    /// In order: `MembershipRequired`, `WorkshopNotFound`, `InvalidQuantity`,
    /// `MultipleNotAllowed`, `MaxPerMemberExceeded`,
    /// `RegistrationAlreadyExists`. Nothing is written on error.
    #[instrument(skip(self), fields(member_id = %request.member_id, workshop_id = %request.workshop_id))]
    pub async fn create_registration(&self, request: AdmissionRequest) -> Result<RegistrationChange, BillingError> {
        let mut tx = self.store.begin().await?;

        let registration = {
            let (membership, workshop) = admission_inputs(tx.as_mut(), &request).await?;
            let admission = validate_admission(&request, membership.as_ref(), workshop.as_ref())?;

            let existing = tx
                .find_registration_for(request.member_id, request.workshop_id, request.season_id)
                .await?;
            ensure_not_registered(&request, existing.as_ref())?;

            let season = tx
                .find_season(request.season_id)
                .await?
                .ok_or(BillingError::SeasonNotFound(request.season_id))?;
            let price = tx.find_workshop_price(request.workshop_id, request.season_id).await?;

            Registration::new(
                &request,
                quote_registration(price.as_ref(), admission.membership, &season, request.quantity),
            )
        };

        tx.insert_registration(&registration).await.map_err(|e| {
            conflict_as(e, || {
                MembershipError::RegistrationAlreadyExists {
                    member_id: request.member_id,
                    workshop_id: request.workshop_id,
                    season_id: request.season_id,
                }
                .into()
            })
        })?;

        let reconciliation = reconcile_member_family(tx.as_mut(), registration.member_id, registration.season_id).await?;
        tx.commit().await?;

        info!(
            registration_id = %registration.id,
            quantity = registration.quantity,
            total_price = %registration.total_price,
            "Registration created"
        );
        Ok(RegistrationChange {
            registration,
            reconciliation,
        })
    }

    /// Changes the quantity of a registration and reprices it
    #[instrument(skip(self), fields(registration_id = %id))]
    pub async fn update_registration_quantity(
        &self,
        id: RegistrationId,
        quantity: u32,
    ) -> Result<RegistrationChange, BillingError> {
        let mut tx = self.store.begin().await?;
        let mut registration = tx
            .find_registration(id)
            .await?
            .ok_or(MembershipError::RegistrationNotFound(id))?;

        if registration.quantity == quantity {
            return Ok(RegistrationChange {
                registration,
                reconciliation: None,
            });
        }

        let request = registration.resize_request(quantity);
        let (membership, workshop) = admission_inputs(tx.as_mut(), &request).await?;
        let admission = validate_admission(&request, membership.as_ref(), workshop.as_ref())?;

        let season = tx
            .find_season(request.season_id)
            .await?
            .ok_or(BillingError::SeasonNotFound(request.season_id))?;
        let price = tx.find_workshop_price(request.workshop_id, request.season_id).await?;
        let quote = quote_registration(price.as_ref(), admission.membership, &season, quantity);

        registration.resize(quantity, quote);
        tx.update_registration(&registration).await?;

        let reconciliation = reconcile_member_family(tx.as_mut(), registration.member_id, registration.season_id).await?;
        tx.commit().await?;

        info!(quantity, total_price = %registration.total_price, "Registration resized");
        Ok(RegistrationChange {
            registration,
            reconciliation,
        })
    }

    /// Deletes a registration
    #[instrument(skip(self), fields(registration_id = %id))]
    pub async fn delete_registration(&self, id: RegistrationId) -> Result<Option<ReconciliationOutcome>, BillingError> {
        let mut tx = self.store.begin().await?;
        let registration = tx
            .find_registration(id)
            .await?
            .ok_or(MembershipError::RegistrationNotFound(id))?;

        tx.delete_registration(id).await?;
        let reconciliation = reconcile_member_family(tx.as_mut(), registration.member_id, registration.season_id).await?;
        tx.commit().await?;

        info!("Registration deleted");
        Ok(reconciliation)
    }
}

async fn admission_inputs(
    tx: &mut dyn AssociationTransaction,
    request: &AdmissionRequest,
) -> Result<(Option<Membership>, Option<domain_membership::Workshop>), BillingError> {
    let membership = tx.find_membership_for(request.member_id, request.season_id).await?;
    let workshop = tx.find_workshop(request.workshop_id).await?;
    Ok((membership, workshop))
}
