//! API error handling
//!
//! Domain errors carry a stable [`ErrorCode`]; the HTTP status follows from
//! it: `*_NOT_FOUND` is 404, `*_ALREADY_*` is 409 and every other rule
//! violation is 422. Infrastructure failures have no code and map to 500, or
//! 503 when they are transient.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::{ErrorCode, PortError};
use domain_billing::BillingError;
use domain_membership::MembershipError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Billing(#[from] BillingError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

fn status_for_code(code: ErrorCode) -> (StatusCode, &'static str) {
    if code.is_not_found() {
        (StatusCode::NOT_FOUND, "not_found")
    } else if code.is_conflict() {
        (StatusCode::CONFLICT, "conflict")
    } else {
        (StatusCode::UNPROCESSABLE_ENTITY, "validation_error")
    }
}

fn status_for_port(error: &PortError) -> (StatusCode, &'static str) {
    if error.is_transient() {
        (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code) = match &self {
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", None),
            ApiError::Billing(e) => match (e.code(), e) {
                (Some(code), _) => {
                    let (status, error_type) = status_for_code(code);
                    (status, error_type, Some(code))
                }
                (None, BillingError::Port(port)) => {
                    let (status, error_type) = status_for_port(port);
                    (status, error_type, None)
                }
                (None, _) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None),
            },
        };

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: error_type.to_string(),
            code,
            message: self.to_string(),
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<MembershipError> for ApiError {
    fn from(err: MembershipError) -> Self {
        ApiError::Billing(BillingError::from(err))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}
