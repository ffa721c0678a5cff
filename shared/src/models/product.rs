//! Product models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::non_negative_decimal;

/// A stocked product.
///
/// `quantity` is owned by the stock ledger and only changes through a
/// recorded movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i64,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Value of the on-hand stock at the current unit price, `None` when it
    /// does not fit in a `Decimal`
    pub fn stock_value(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Product joined with its category name for listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
}

/// Input for creating a product.
///
/// `initial_quantity` is booked as an incoming movement, never written
/// straight into the product row.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom = "non_negative_decimal")]
    pub unit_price: Decimal,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub initial_quantity: i64,
    pub category_id: Option<Uuid>,
}

/// Editable product attributes; quantity is not one of them.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom = "non_negative_decimal")]
    pub unit_price: Decimal,
    pub category_id: Option<Uuid>,
}
