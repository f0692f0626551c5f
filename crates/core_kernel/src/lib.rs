//! Core Kernel - Foundational types for the association billing system
//!
//! This crate provides the building blocks shared by every domain crate:
//! - Money and percentages with precise decimal arithmetic
//! - Clocks and timezone-aware calendar dates
//! - Typed identifiers
//! - Stable error codes and the port error type used by adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use money::{Money, MoneyError, Percentage, MAX_AMOUNT};
pub use temporal::{Clock, FixedClock, SystemClock, Timezone};
pub use identifiers::{
    FamilyId, MemberId, SeasonId, WorkshopId, WorkshopPriceId,
    MembershipId, RegistrationId, PaymentId, InvoiceId,
};
pub use error::{CoreError, ErrorCode};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
