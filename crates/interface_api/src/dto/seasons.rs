//! Season DTOs

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use core_kernel::{Money, Percentage};
use domain_billing::NewSeason;

use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSeasonRequest {
    #[validate(range(min = 1900, max = 2999))]
    pub start_year: i32,
    #[validate(range(min = 1900, max = 2999))]
    pub end_year: i32,
    pub membership_amount: Decimal,
    #[serde(default)]
    pub discount_percent: Decimal,
}

impl TryFrom<CreateSeasonRequest> for NewSeason {
    type Error = ApiError;

    fn try_from(request: CreateSeasonRequest) -> Result<Self, Self::Error> {
        let discount_percent = Percentage::new(request.discount_percent)
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        Ok(NewSeason {
            start_year: request.start_year,
            end_year: request.end_year,
            membership_amount: Money::new(request.membership_amount),
            discount_percent,
        })
    }
}
