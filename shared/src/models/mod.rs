//! Domain models for the Stock Ledger

mod category;
mod fuel;
mod movement;
mod product;
mod stats;
mod supplier;

pub use category::*;
pub use fuel::*;
pub use movement::*;
pub use product::*;
pub use stats::*;
pub use supplier::*;
