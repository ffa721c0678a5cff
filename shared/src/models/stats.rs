//! Dashboard statistics

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate figures shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_movements: i64,
    pub total_suppliers: i64,
    /// Sum of unit price times on-hand quantity over all products
    pub stock_value: Decimal,
}
