//! Request handlers

pub mod payments;
pub mod invoices;
pub mod enrollment;
pub mod seasons;
pub mod health;
