//! Common types used across the platform

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Products at or below this on-hand quantity are reported as low stock
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Body returned when a record is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// Low-stock query parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LowStockQuery {
    pub threshold: Option<i64>,
}

/// Export format for list endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}
