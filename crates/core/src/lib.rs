//! Fintrack Core - Domain entities, services, and traits.
//!
//! This crate contains the business logic for Fintrack: savings goals and
//! their contributions, income/expense transactions, and user preferences.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod errors;
pub mod goals;
pub mod settings;
pub mod transactions;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
