//! Membership Domain
//!
//! Families, members, seasons, workshops, and the two kinds of obligations a
//! member takes on for a season:
//!
//! - **Membership**: the season fee, ranked within the family so the 2nd and
//!   following members get the season's family discount on workshops
//! - **Registration**: units of a workshop, admitted only for members holding
//!   a membership and within the workshop's multiplicity rules
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_membership::{validate_admission, quote_registration, AdmissionRequest, Registration};
//!
//! let admission = validate_admission(&request, membership.as_ref(), workshop.as_ref())?;
//! let quote = quote_registration(price.as_ref(), admission.membership, &season, request.quantity);
//! let registration = Registration::new(&request, quote);
//! ```

pub mod family;
pub mod season;
pub mod workshop;
pub mod membership;
pub mod registration;
pub mod error;

pub use family::{Family, Guardian, Member, NewMember};
pub use season::{activate_exclusively, Season, SeasonStatus};
pub use workshop::{Workshop, WorkshopPrice, WorkshopStatus};
pub use membership::{next_family_order, Membership, MembershipStatus, NewMembership};
pub use registration::{
    ensure_not_registered, quote_registration, validate_admission,
    Admission, AdmissionRequest, Registration, RegistrationQuote,
};
pub use error::MembershipError;
