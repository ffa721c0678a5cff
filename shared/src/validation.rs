//! Validation utilities and pure stock rules for the Stock Ledger
//!
//! Everything here is side-effect free so the same rules run on the server
//! and in the browser client.

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::models::{Movement, MovementType, Product};

// ============================================================================
// Stock Rules
// ============================================================================

/// Validate that a movement quantity is strictly positive
pub fn validate_movement_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Movement quantity must be a positive integer");
    }
    Ok(())
}

/// Check an outgoing movement against the on-hand quantity.
///
/// Returns the quantity left after the movement, or an error when it would
/// drive stock below zero.
pub fn apply_movement(
    on_hand: i64,
    movement_type: MovementType,
    quantity: i64,
) -> Result<i64, &'static str> {
    validate_movement_quantity(quantity)?;
    match movement_type {
        MovementType::Incoming => on_hand
            .checked_add(quantity)
            .ok_or("Quantity overflow"),
        MovementType::Outgoing if quantity > on_hand => Err("Insufficient stock"),
        MovementType::Outgoing => Ok(on_hand - quantity),
    }
}

/// Net on-hand quantity obtained by replaying movements in any order
pub fn replay_quantity<'a, I>(movements: I) -> Result<i64, &'static str>
where
    I: IntoIterator<Item = &'a Movement>,
{
    movements
        .into_iter()
        .try_fold(0i64, |acc, m| acc.checked_add(m.signed_quantity()))
        .ok_or("Quantity overflow")
}

/// Total incoming and outgoing units of a movement log
pub fn movement_totals<'a, I>(movements: I) -> Result<(i64, i64), &'static str>
where
    I: IntoIterator<Item = &'a Movement>,
{
    movements
        .into_iter()
        .try_fold((0i64, 0i64), |(incoming, outgoing), m| match m.movement_type {
            MovementType::Incoming => Some((incoming.checked_add(m.quantity)?, outgoing)),
            MovementType::Outgoing => Some((incoming, outgoing.checked_add(m.quantity)?)),
        })
        .ok_or("Quantity overflow")
}

/// Sum of unit price times quantity; zero for an empty set
pub fn stock_value<'a, I>(products: I) -> Result<Decimal, &'static str>
where
    I: IntoIterator<Item = &'a Product>,
{
    products
        .into_iter()
        .try_fold(Decimal::ZERO, |total, p| total.checked_add(p.stock_value()?))
        .ok_or("Stock value overflow")
}

/// Whether a quantity is at or below the low-stock threshold
pub fn is_low_stock(quantity: i64, threshold: i64) -> bool {
    quantity <= threshold
}

// ============================================================================
// Record Validations
// ============================================================================

/// Validate that a display name is present and reasonably short
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name is required");
    }
    if trimmed.chars().count() > 255 {
        return Err("Name must be at most 255 characters");
    }
    Ok(())
}

/// Validate a unit price (zero is allowed for free items)
pub fn validate_unit_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Unit price cannot be negative");
    }
    Ok(())
}

/// Validate a fuel density in kilograms per litre
pub fn validate_fuel_density(density: Decimal) -> Result<(), &'static str> {
    if density <= Decimal::ZERO {
        return Err("Density per litre must be positive");
    }
    Ok(())
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate a phone number: 6 to 15 digits, separators and a leading `+` allowed
/// Accepts: 0612345678, 06 12 34 56 78, +33612345678
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | '(' | ')');
    let rest = phone.strip_prefix('+').unwrap_or(phone);
    if !rest.chars().all(allowed) {
        return Err("Phone number contains invalid characters");
    }

    let digits = rest.chars().filter(|c| c.is_ascii_digit()).count();
    if !(6..=15).contains(&digits) {
        return Err("Phone number must have between 6 and 15 digits");
    }
    Ok(())
}

// ============================================================================
// `validator` adapters
// ============================================================================

/// `#[validate(custom = "non_negative_decimal")]`
pub fn non_negative_decimal(value: &Decimal) -> Result<(), ValidationError> {
    validate_unit_price(*value).map_err(|msg| {
        let mut err = ValidationError::new("non_negative");
        err.message = Some(msg.into());
        err
    })
}

/// `#[validate(custom = "positive_decimal")]`
pub fn positive_decimal(value: &Decimal) -> Result<(), ValidationError> {
    validate_fuel_density(*value).map_err(|msg| {
        let mut err = ValidationError::new("positive");
        err.message = Some(msg.into());
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn product(price: &str, quantity: i64) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Widget".to_string(),
            description: None,
            unit_price: dec(price),
            quantity,
            category_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    // ========================================================================
    // Stock Rule Tests
    // ========================================================================

    #[test]
    fn test_apply_incoming() {
        assert_eq!(apply_movement(10, MovementType::Incoming, 5), Ok(15));
    }

    #[test]
    fn test_apply_outgoing_to_zero() {
        assert_eq!(apply_movement(15, MovementType::Outgoing, 15), Ok(0));
    }

    #[test]
    fn test_apply_outgoing_insufficient() {
        assert!(apply_movement(15, MovementType::Outgoing, 20).is_err());
    }

    #[test]
    fn test_apply_rejects_non_positive() {
        assert!(apply_movement(10, MovementType::Incoming, 0).is_err());
        assert!(apply_movement(10, MovementType::Outgoing, -3).is_err());
    }

    #[test]
    fn test_apply_incoming_overflow() {
        assert!(apply_movement(i64::MAX, MovementType::Incoming, 1).is_err());
    }

    #[test]
    fn test_replay_and_totals() {
        let product_id = Uuid::new_v4();
        let log = vec![
            Movement::new(product_id, MovementType::Incoming, 10),
            Movement::new(product_id, MovementType::Outgoing, 4),
            Movement::new(product_id, MovementType::Incoming, 3),
        ];

        assert_eq!(replay_quantity(&log), Ok(9));
        assert_eq!(movement_totals(&log), Ok((13, 4)));
    }

    #[test]
    fn test_totals_overflow_is_an_error() {
        let product_id = Uuid::new_v4();
        let log = vec![
            Movement::new(product_id, MovementType::Incoming, i64::MAX),
            Movement::new(product_id, MovementType::Incoming, 1),
        ];

        assert!(movement_totals(&log).is_err());
        assert!(replay_quantity(&log).is_err());
    }

    #[test]
    fn test_stock_value_empty_is_zero() {
        let products: Vec<Product> = vec![];
        assert_eq!(stock_value(&products), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_stock_value() {
        let products = vec![product("2.50", 15), product("10", 3)];
        assert_eq!(stock_value(&products), Ok(dec("67.50")));
    }

    #[test]
    fn test_stock_value_overflow_is_an_error() {
        let huge = product("9999999999", 9_000_000_000_000_000_000);
        assert_eq!(huge.stock_value(), None);
        assert!(stock_value(&[huge]).is_err());

        // Each fits on its own, the sum does not
        let half = product("9999999999", 5_000_000_000_000_000_000);
        assert!(half.stock_value().is_some());
        assert_eq!(stock_value(&[half.clone(), half]), Err("Stock value overflow"));
    }

    #[test]
    fn test_low_stock_threshold_inclusive() {
        assert!(is_low_stock(5, 5));
        assert!(is_low_stock(0, 5));
        assert!(!is_low_stock(6, 5));
    }

    // ========================================================================
    // Record Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Diesel").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_validate_unit_price() {
        assert!(validate_unit_price(Decimal::ZERO).is_ok());
        assert!(validate_unit_price(dec("-0.01")).is_err());
    }

    #[test]
    fn test_validate_fuel_density() {
        assert!(validate_fuel_density(dec("0.832")).is_ok());
        assert!(validate_fuel_density(Decimal::ZERO).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("depot@example.fr").is_ok());
        assert!(validate_email("invalid").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("0612345678").is_ok());
        assert!(validate_phone("06 12 34 56 78").is_ok());
        assert!(validate_phone("+33612345678").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("06-ABC-5678").is_err());
    }

    proptest! {
        /// Applying any accepted sequence never goes negative and matches replay
        #[test]
        fn prop_apply_matches_replay(
            steps in prop::collection::vec((any::<bool>(), 1i64..50), 0..40)
        ) {
            let product_id = Uuid::new_v4();
            let mut on_hand = 0i64;
            let mut log = Vec::new();

            for (incoming, qty) in steps {
                let kind = if incoming { MovementType::Incoming } else { MovementType::Outgoing };
                if let Ok(next) = apply_movement(on_hand, kind, qty) {
                    on_hand = next;
                    log.push(Movement::new(product_id, kind, qty));
                }
                prop_assert!(on_hand >= 0);
            }

            prop_assert_eq!(replay_quantity(&log), Ok(on_hand));
        }
    }
}
