pub mod admin;
pub mod appointments;
pub mod auth;
pub mod health;
pub mod services;
pub mod slots;
