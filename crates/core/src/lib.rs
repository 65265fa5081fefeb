//! # Salon Core
//!
//! Domain types and pure rules for the salon booking service: the entities
//! exchanged with clients, the error taxonomy shared by every layer, input
//! validation, and the rules that turn a weekly template into bookable times.
//!
//! Nothing in this crate performs I/O. Persistence lives in `salon-db` and the
//! HTTP boundary in `salon-api`.

pub mod availability;
pub mod clock;
pub mod errors;
pub mod models;
pub mod validation;
