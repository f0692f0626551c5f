//! Season use cases

use std::sync::Arc;
use tracing::{info, instrument};

use core_kernel::{Money, Percentage, SeasonId};
use domain_membership::{MembershipError, Season};

use crate::error::BillingError;
use crate::ports::AssociationStore;
use crate::services::conflict_as;

/// Input for creating a season
#[derive(Debug, Clone, Copy)]
pub struct NewSeason {
    pub start_year: i32,
    pub end_year: i32,
    pub membership_amount: Money,
    pub discount_percent: Percentage,
}

/// Creates and activates seasons
pub struct SeasonService {
    store: Arc<dyn AssociationStore>,
}

impl SeasonService {
    pub fn new(store: Arc<dyn AssociationStore>) -> Self {
        Self { store }
    }

    /// Creates an inactive season
    ///
    /// # Errors
    ///
    /// - `InvalidSeasonYears` unless `start_year < end_year`
    /// - `SeasonAlreadyExists` when another season covers the same years
    #[instrument(skip(self))]
    pub async fn create_season(&self, input: NewSeason) -> Result<Season, BillingError> {
        let season = Season::new(
            input.start_year,
            input.end_year,
            input.membership_amount,
            input.discount_percent,
        )?;

        let mut tx = self.store.begin().await?;
        season.ensure_unique(&tx.list_seasons().await?)?;
        tx.insert_season(&season).await.map_err(|e| {
            conflict_as(e, || {
                MembershipError::SeasonAlreadyExists {
                    start_year: season.start_year,
                    end_year: season.end_year,
                }
                .into()
            })
        })?;
        tx.commit().await?;

        info!(season_id = %season.id, label = %season.label(), "Season created");
        Ok(season)
    }

    /// Makes a season the only active one
    #[instrument(skip(self))]
    pub async fn activate_season(&self, id: SeasonId) -> Result<Season, BillingError> {
        let mut tx = self.store.begin().await?;
        tx.activate_season(id).await.map_err(|e| {
            if e.is_not_found() {
                BillingError::SeasonNotFound(id)
            } else {
                BillingError::Port(e)
            }
        })?;
        let season = tx.find_season(id).await?.ok_or(BillingError::SeasonNotFound(id))?;
        tx.commit().await?;

        info!(label = %season.label(), "Season activated");
        Ok(season)
    }
}
