//! HTTP handlers for the Stock Ledger API

pub mod categories;
pub mod dashboard;
pub mod fuels;
pub mod health;
pub mod movements;
pub mod products;
pub mod suppliers;

pub use categories::*;
pub use dashboard::*;
pub use fuels::*;
pub use health::*;
pub use movements::*;
pub use products::*;
pub use suppliers::*;
