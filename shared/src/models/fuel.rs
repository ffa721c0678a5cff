//! Fuel type models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::positive_decimal;

/// A fuel grade with its density, used for litre/kilogram conversions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelType {
    pub id: Uuid,
    pub name: String,
    /// Kilograms per litre
    pub density_per_litre: Decimal,
    pub created_at: DateTime<Utc>,
}

impl FuelType {
    pub fn litres_to_kg(&self, litres: Decimal) -> Decimal {
        litres * self.density_per_litre
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FuelTypeInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(custom = "positive_decimal")]
    pub density_per_litre: Decimal,
}
