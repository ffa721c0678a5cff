//! Stock movement models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

/// Direction of a stock movement.
///
/// The set is closed: the two rows of the `movement_types` table are seeded
/// once and users never create new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Goods received, adds to on-hand quantity
    Incoming,
    /// Goods issued, removes from on-hand quantity
    Outgoing,
}

impl MovementType {
    pub const ALL: [MovementType; 2] = [MovementType::Incoming, MovementType::Outgoing];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Incoming => "incoming",
            MovementType::Outgoing => "outgoing",
        }
    }

    /// Human readable label, as stored in `movement_types.label`
    pub fn label(&self) -> &'static str {
        match self {
            MovementType::Incoming => "Incoming",
            MovementType::Outgoing => "Outgoing",
        }
    }

    /// Primary key of the seeded `movement_types` row
    pub fn id(&self) -> i16 {
        match self {
            MovementType::Incoming => 1,
            MovementType::Outgoing => 2,
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(MovementType::Incoming),
            2 => Some(MovementType::Outgoing),
            _ => None,
        }
    }

    /// Signed effect of `quantity` units of this movement on the on-hand quantity
    pub fn signed(&self, quantity: i64) -> i64 {
        match self {
            MovementType::Incoming => quantity,
            MovementType::Outgoing => -quantity,
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a movement type code is not one of the known variants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown movement type: {0}")]
pub struct ParseMovementTypeError(pub String);

impl FromStr for MovementType {
    type Err = ParseMovementTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incoming" => Ok(MovementType::Incoming),
            "outgoing" => Ok(MovementType::Outgoing),
            other => Err(ParseMovementTypeError(other.to_string())),
        }
    }
}

/// An immutable entry of the stock ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub movement_type: MovementType,
    /// Always strictly positive; the direction is carried by `movement_type`
    pub quantity: i64,
    /// Assigned by the server when the movement is recorded
    pub recorded_at: DateTime<Utc>,
}

impl Movement {
    pub fn new(product_id: Uuid, movement_type: MovementType, quantity: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            movement_type,
            quantity,
            recorded_at: Utc::now(),
        }
    }

    pub fn signed_quantity(&self) -> i64 {
        self.movement_type.signed(self.quantity)
    }
}

/// A movement joined with its product name and type label for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub movement_type: MovementType,
    pub movement_type_label: String,
    pub quantity: i64,
    pub recorded_at: DateTime<Utc>,
}

/// Input for recording a stock movement
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordMovementInput {
    pub product_id: Uuid,
    pub movement_type: MovementType,
    #[validate(range(min = 1))]
    pub quantity: i64,
}

/// Result of replaying a product's movements against its stored quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAudit {
    pub product_id: Uuid,
    pub recorded_quantity: i64,
    pub incoming_total: i64,
    pub outgoing_total: i64,
    pub consistent: bool,
}
