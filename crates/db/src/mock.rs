//! Test doubles for [`BookingStore`](crate::store::BookingStore).
//!
//! `MockBookingStore` is generated by mockall for expectation-driven tests;
//! [`InMemoryStore`] keeps real state and mirrors the uniqueness rules and
//! conditional updates the Postgres schema enforces.

pub mod memory;

pub use crate::store::MockBookingStore;
pub use memory::InMemoryStore;
