pub mod appointment;
pub mod password_reset;
pub mod response;
pub mod service;
pub mod slot;
pub mod user;
