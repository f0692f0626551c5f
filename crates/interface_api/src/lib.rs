//! HTTP API Layer
//!
//! This crate provides the REST API of the association billing system using
//! Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for payments, invoices, enrollment and seasons
//! - **Middleware**: Request ids, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses carrying the domain error code
//!
//! Authentication and role checks are handled in front of this service.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(store, clock, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
    middleware as axum_middleware,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use core_kernel::Clock;
use domain_billing::{
    AssociationStore, EnrollmentService, FamilyPaymentService, InvoiceService, SeasonService,
};

use crate::config::ApiConfig;
use crate::middleware::audit_middleware;
use crate::handlers::{enrollment, health, invoices, payments, seasons};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AssociationStore>,
    pub payments: Arc<FamilyPaymentService>,
    pub invoices: Arc<InvoiceService>,
    pub enrollment: Arc<EnrollmentService>,
    pub seasons: Arc<SeasonService>,
    pub config: ApiConfig,
}

impl AppState {
    /// Wires the services on a store and a clock
    pub fn new(store: Arc<dyn AssociationStore>, clock: Arc<dyn Clock>, config: ApiConfig) -> Self {
        Self {
            payments: Arc::new(FamilyPaymentService::new(store.clone(), clock.clone())),
            invoices: Arc::new(InvoiceService::new(store.clone(), clock)),
            enrollment: Arc::new(EnrollmentService::new(store.clone())),
            seasons: Arc::new(SeasonService::new(store.clone())),
            store,
            config,
        }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `store` - Association store the services work on
/// * `clock` - Clock deciding whether a cashing date is in the future
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(store: Arc<dyn AssociationStore>, clock: Arc<dyn Clock>, config: ApiConfig) -> Router {
    let state = AppState::new(store, clock, config);

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Payment routes
    let payment_routes = Router::new()
        .route("/", post(payments::create_payment))
        .route("/:id", put(payments::update_payment).delete(payments::delete_payment));

    // Family routes
    let family_routes = Router::new()
        .route("/:family_id/seasons/:season_id/invoice", get(invoices::get_invoice))
        .route("/:family_id/seasons/:season_id/invoice/issue", post(invoices::issue_invoice))
        .route("/:family_id/seasons/:season_id/balance", get(invoices::get_balance));

    // Enrollment routes
    let membership_routes = Router::new()
        .route("/", post(enrollment::create_membership));

    let registration_routes = Router::new()
        .route("/", post(enrollment::create_registration))
        .route(
            "/:id",
            put(enrollment::update_registration).delete(enrollment::delete_registration),
        );

    // Season routes
    let season_routes = Router::new()
        .route("/", post(seasons::create_season))
        .route("/:id/activate", post(seasons::activate_season));

    let api_routes = Router::new()
        .nest("/payments", payment_routes)
        .nest("/families", family_routes)
        .nest("/memberships", membership_routes)
        .nest("/registrations", registration_routes)
        .nest("/seasons", season_routes)
        .layer(axum_middleware::from_fn(audit_middleware));

    // Outermost first: ids are assigned before the request is traced
    let layers = ServiceBuilder::new()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .map_response(|res: axum::http::Response<_>| res.map(axum::body::Body::new))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http());

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(layers)
        .with_state(state)
}
