//! Billing Domain - Family Balances, Payments and Invoices
//!
//! This crate decides, from recorded payments, whether a family has settled
//! a season, and keeps its members' memberships in line with that answer.
//!
//! # Flow
//!
//! ```text
//! payment create/update/delete
//!     -> payment status from cashing date   (payment)
//!     -> family obligations and payments    (ports)
//!     -> total due / total paid / balance   (stats)
//!     -> bulk membership status transition  (reconciliation)
//! ```
//!
//! Invoices are projected independently from the same obligations
//! (`invoice`), either as an unsaved draft or as the issued snapshot.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{FamilyPaymentService, InMemoryAssociationStore, NewPayment};
//!
//! let store = Arc::new(InMemoryAssociationStore::new());
//! let service = FamilyPaymentService::new(store, Arc::new(SystemClock::default()));
//!
//! let recorded = service.add_family_payment(new_payment).await?;
//! assert!(recorded.reconciliations[0].stats.is_settled());
//! ```

pub mod payment;
pub mod stats;
pub mod reconciliation;
pub mod invoice;
pub mod ports;
pub mod adapters;
pub mod services;
pub mod error;

pub use payment::{
    determine_payment_status, resolve_payment_status, NewPayment, Payment, PaymentStatus,
    PaymentType, PaymentUpdate,
};
pub use stats::{compute_financial_stats, FinancialStats, StatsSource};
pub use reconciliation::{
    target_transition, update_membership_statuses_for_family, ReconciliationOutcome,
    StatusTransition,
};
pub use invoice::{build_draft_invoice, invoice_number, Invoice, InvoiceItem, InvoiceStatus};
pub use ports::{AssociationStore, AssociationTransaction};
pub use adapters::{AssociationState, InMemoryAssociationStore};
pub use services::{
    EnrollmentService, FamilyPaymentService, InvoiceService, NewSeason, RecordedPayment,
    RegistrationChange, SeasonService,
};
pub use error::BillingError;
