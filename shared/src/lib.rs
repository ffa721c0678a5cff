//! Shared types and models for the Stock Ledger
//!
//! This crate contains the records and pure rules shared between the backend,
//! the browser client (via WASM), and the tests.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
