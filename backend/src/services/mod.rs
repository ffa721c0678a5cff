//! Business logic services for the Stock Ledger

pub mod alerts;
pub mod catalog;
pub mod ledger;

pub use alerts::LowStockMonitor;
pub use catalog::CatalogService;
pub use ledger::StockLedger;
