//! WebAssembly module for the Stock Ledger client
//!
//! Client-side helpers only. The server ledger is the single source of truth;
//! nothing computed here is ever written back. Provides:
//! - Movement input pre-validation
//! - Derived stock value and low-stock filtering of fetched products
//! - A snapshot cache that is dropped on every mutation

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

fn js_err(msg: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&msg.to_string())
}

fn parse_products(products_json: &str) -> Result<Vec<ProductView>, JsValue> {
    serde_json::from_str(products_json)
        .map_err(|e| js_err(format!("Invalid products JSON: {}", e)))
}

/// Check a movement form before it is submitted.
/// `on_hand` is the quantity last fetched from the server.
#[wasm_bindgen]
pub fn validate_movement_input(movement_type: &str, quantity: i64, on_hand: i64) -> Result<(), JsValue> {
    let movement_type: MovementType = movement_type.parse().map_err(js_err)?;
    apply_movement(on_hand, movement_type, quantity)
        .map(|_| ())
        .map_err(js_err)
}

/// Quantity the product would have after the movement
#[wasm_bindgen]
pub fn preview_quantity(movement_type: &str, quantity: i64, on_hand: i64) -> Result<i64, JsValue> {
    let movement_type: MovementType = movement_type.parse().map_err(js_err)?;
    apply_movement(on_hand, movement_type, quantity).map_err(js_err)
}

/// Total stock value of a product list, as a decimal string
#[wasm_bindgen]
pub fn calculate_stock_value(products_json: &str) -> Result<String, JsValue> {
    let products = parse_products(products_json)?;
    let value: Decimal = stock_value(products.iter().map(|v| &v.product)).map_err(js_err)?;
    Ok(value.to_string())
}

/// Products at or below `threshold`, lowest quantity first, as JSON
#[wasm_bindgen]
pub fn filter_low_stock(products_json: &str, threshold: i64) -> Result<String, JsValue> {
    let mut low: Vec<ProductView> = parse_products(products_json)?
        .into_iter()
        .filter(|v| is_low_stock(v.product.quantity, threshold))
        .collect();
    low.sort_by(|a, b| {
        a.product
            .quantity
            .cmp(&b.product.quantity)
            .then_with(|| a.product.name.cmp(&b.product.name))
    });
    serde_json::to_string(&low).map_err(js_err)
}

/// Log one console warning per low-stock product
#[wasm_bindgen]
pub fn report_low_stock(products_json: &str, threshold: i64) -> Result<u32, JsValue> {
    let products = parse_products(products_json)?;
    let mut count = 0;
    for view in products
        .iter()
        .filter(|v| is_low_stock(v.product.quantity, threshold))
    {
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "Low stock: {} ({} left)",
            view.product.name, view.product.quantity
        )));
        count += 1;
    }
    Ok(count)
}

/// Last product and movement lists fetched from the server.
///
/// Any mutation sent to the server must call [`StockCache::invalidate`];
/// reads after that return `None` until fresh data is stored.
#[wasm_bindgen]
#[derive(Debug, Default)]
pub struct StockCache {
    products: Option<String>,
    movements: Option<String>,
    generation: u32,
}

#[wasm_bindgen]
impl StockCache {
    #[wasm_bindgen(constructor)]
    pub fn new() -> StockCache {
        StockCache::default()
    }

    /// Store a product list snapshot; rejects payloads that do not parse
    pub fn store_products(&mut self, products_json: &str) -> Result<(), JsValue> {
        parse_products(products_json)?;
        self.products = Some(products_json.to_string());
        Ok(())
    }

    pub fn store_movements(&mut self, movements_json: &str) -> Result<(), JsValue> {
        serde_json::from_str::<Vec<MovementView>>(movements_json)
            .map_err(|e| js_err(format!("Invalid movements JSON: {}", e)))?;
        self.movements = Some(movements_json.to_string());
        Ok(())
    }

    pub fn products(&self) -> Option<String> {
        self.products.clone()
    }

    pub fn movements(&self) -> Option<String> {
        self.movements.clone()
    }

    /// Drop every snapshot
    pub fn invalidate(&mut self) {
        self.products = None;
        self.movements = None;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Bumped on each invalidation so stale in-flight fetches can be ignored
    #[wasm_bindgen(getter)]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}
