//! HTTP access to the admin API.
//!
//! DESIGN
//! ======
//! `client` owns transport and response classification; `envelope` owns
//! body parsing; `api`, `company` and `dashboard` are thin typed wrappers
//! that only name a path, a body and an `Operation` for error fallbacks.

pub mod api;
pub mod client;
pub mod company;
pub mod dashboard;
pub mod envelope;
pub mod types;
