//! Core business logic for token-pulse.

pub mod services;

pub use services::*;
