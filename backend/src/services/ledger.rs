//! Stock ledger service
//!
//! The single authority for product quantities. Every change to
//! `Product.quantity` is paired with an immutable [`Movement`] written in the
//! same store transaction, so at rest each product satisfies
//! `quantity == sum(incoming) - sum(outgoing)` and `quantity >= 0`.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{
    CreateProductInput, DashboardStats, LedgerAudit, Movement, MovementType, MovementView,
    Product, RecordMovementInput, UpdateProductInput,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::{RecordStore, StoreTransaction};

/// Stock ledger over an injected record store
#[derive(Clone)]
pub struct StockLedger {
    store: Arc<dyn RecordStore>,
}

impl StockLedger {
    /// Create a new StockLedger instance
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Record a validated movement request
    pub async fn record(&self, input: RecordMovementInput) -> AppResult<Movement> {
        self.record_movement(input.product_id, input.movement_type, input.quantity)
            .await
    }

    /// Record a stock movement and apply it to the product quantity atomically.
    ///
    /// Outgoing movements larger than the on-hand quantity are rejected with
    /// [`AppError::InsufficientStock`] and leave no trace.
    pub async fn record_movement(
        &self,
        product_id: Uuid,
        movement_type: MovementType,
        quantity: i64,
    ) -> AppResult<Movement> {
        shared::validate_movement_quantity(quantity)
            .map_err(|msg| AppError::InvalidArgument(msg.to_string()))?;

        let mut tx = self.store.begin().await?;

        let product = tx
            .lock_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let movement = apply(tx.as_mut(), &product, movement_type, quantity).await?;
        tx.commit().await?;

        Ok(movement)
    }

    /// List every movement, newest first
    pub async fn list_movements(&self) -> AppResult<Vec<MovementView>> {
        Ok(self.store.list_movements().await?)
    }

    pub async fn get_movement(&self, movement_id: Uuid) -> AppResult<MovementView> {
        self.store
            .get_movement(movement_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Movement".to_string()))
    }

    /// Whole movement log as CSV, newest first
    pub async fn export_movements_csv(&self) -> AppResult<String> {
        let movements = self.list_movements().await?;
        export_to_csv(&movements)
    }

    /// Movements of one product, newest first
    pub async fn list_product_movements(&self, product_id: Uuid) -> AppResult<Vec<Movement>> {
        if self.store.get_product(product_id).await?.is_none() {
            return Err(AppError::NotFound("Product".to_string()));
        }
        Ok(self.store.list_product_movements(product_id).await?)
    }

    /// Sum of unit price times quantity over all products
    pub async fn current_stock_value(&self) -> AppResult<Decimal> {
        let products = self.store.list_products().await?;
        shared::stock_value(products.iter().map(|v| &v.product))
            .map_err(|msg| AppError::Internal(msg.to_string()))
    }

    /// Dashboard figures; all zero for an empty data set
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let counts = self.store.record_counts().await?;
        let stock_value = self.current_stock_value().await?;

        Ok(DashboardStats {
            total_products: counts.products,
            total_movements: counts.movements,
            total_suppliers: counts.suppliers,
            stock_value,
        })
    }

    /// Create a product. A non-zero initial quantity is booked as an incoming
    /// movement in the same transaction.
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        input.validate()?;
        shared::validate_name(&input.name)
            .map_err(|msg| AppError::field("name", msg, "Le nom est obligatoire"))?;

        let mut tx = self.store.begin().await?;

        if let Some(category_id) = input.category_id {
            if !tx.category_exists(category_id).await? {
                return Err(AppError::NotFound("Category".to_string()));
            }
        }

        let now = Utc::now();
        let mut product = Product {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            description: input.description,
            unit_price: input.unit_price,
            quantity: 0,
            category_id: input.category_id,
            created_at: now,
            updated_at: now,
        };
        tx.insert_product(&product).await?;

        if input.initial_quantity > 0 {
            let opening = apply(
                tx.as_mut(),
                &product,
                MovementType::Incoming,
                input.initial_quantity,
            )
            .await?;
            product.quantity = opening.quantity;
        }

        tx.commit().await?;

        tracing::info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Update product attributes. Quantity is not editable here.
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<Product> {
        input.validate()?;
        shared::validate_name(&input.name)
            .map_err(|msg| AppError::field("name", msg, "Le nom est obligatoire"))?;
        let input = UpdateProductInput {
            name: input.name.trim().to_string(),
            ..input
        };

        if let Some(category_id) = input.category_id {
            if self.store.get_category(category_id).await?.is_none() {
                return Err(AppError::NotFound("Category".to_string()));
            }
        }

        let current = self
            .store
            .get_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        check_stock_value(input.unit_price, current.product.quantity)?;

        self.store
            .update_product_details(product_id, &input)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Whether any movement references the product
    pub async fn is_product_referenced(&self, product_id: Uuid) -> AppResult<bool> {
        let mut tx = self.store.begin().await?;
        Ok(tx.count_product_movements(product_id).await? > 0)
    }

    /// Whether any product references the category
    pub async fn is_category_referenced(&self, category_id: Uuid) -> AppResult<bool> {
        let mut tx = self.store.begin().await?;
        Ok(tx.count_category_products(category_id).await? > 0)
    }

    /// Delete a product that has no recorded movements
    pub async fn delete_product(&self, product_id: Uuid) -> AppResult<()> {
        let mut tx = self.store.begin().await?;

        if tx.lock_product(product_id).await?.is_none() {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let movements = tx.count_product_movements(product_id).await?;
        if movements > 0 {
            return Err(AppError::ReferentialConflict(format!(
                "product is referenced by {} stock movement(s)",
                movements
            )));
        }

        tx.delete_product(product_id).await?;
        tx.commit().await?;

        tracing::info!(%product_id, "Product deleted");
        Ok(())
    }

    /// Delete a category that no product references
    pub async fn delete_category(&self, category_id: Uuid) -> AppResult<()> {
        let mut tx = self.store.begin().await?;

        if tx.lock_category(category_id).await?.is_none() {
            return Err(AppError::NotFound("Category".to_string()));
        }

        let products = tx.count_category_products(category_id).await?;
        if products > 0 {
            return Err(AppError::ReferentialConflict(format!(
                "category is referenced by {} product(s)",
                products
            )));
        }

        tx.delete_category(category_id).await?;
        tx.commit().await?;

        tracing::info!(%category_id, "Category deleted");
        Ok(())
    }

    /// Replay a product's movements and compare with its stored quantity
    pub async fn verify_product(&self, product_id: Uuid) -> AppResult<LedgerAudit> {
        let mut tx = self.store.begin().await?;

        let product = tx
            .lock_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        let movements = tx.product_movements(product_id).await?;

        let (incoming_total, outgoing_total) = shared::movement_totals(&movements)
            .map_err(|msg| AppError::Internal(format!("{} replaying product {}", msg, product_id)))?;
        let consistent =
            product.quantity >= 0 && product.quantity == incoming_total - outgoing_total;

        if !consistent {
            tracing::error!(
                %product_id,
                recorded = product.quantity,
                incoming_total,
                outgoing_total,
                "Stock ledger inconsistency detected"
            );
        }

        Ok(LedgerAudit {
            product_id,
            recorded_quantity: product.quantity,
            incoming_total,
            outgoing_total,
            consistent,
        })
    }
}

/// Serialize records as CSV with a header row taken from the field names
pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in data {
        wtr.serialize(record)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
}

/// Write one movement and the matching quantity change inside `tx`.
///
/// `product` must have been locked or inserted by the same transaction.
async fn apply(
    tx: &mut dyn StoreTransaction,
    product: &Product,
    movement_type: MovementType,
    quantity: i64,
) -> AppResult<Movement> {
    let new_quantity = match shared::apply_movement(product.quantity, movement_type, quantity) {
        Ok(q) => q,
        Err(_) if movement_type == MovementType::Outgoing && quantity > product.quantity => {
            tracing::warn!(
                product_id = %product.id,
                requested = quantity,
                available = product.quantity,
                "Outgoing movement rejected: insufficient stock"
            );
            return Err(AppError::InsufficientStock {
                requested: quantity,
                available: product.quantity,
            });
        }
        Err(msg) => return Err(AppError::InvalidArgument(msg.to_string())),
    };
    check_stock_value(product.unit_price, new_quantity)?;

    let movement = Movement::new(product.id, movement_type, quantity);
    tx.insert_movement(&movement).await?;
    tx.set_product_quantity(product.id, new_quantity).await?;

    tracing::info!(
        movement_id = %movement.id,
        product_id = %product.id,
        movement_type = %movement_type,
        quantity,
        new_quantity,
        "Stock movement recorded"
    );

    Ok(movement)
}

/// Reject a price and quantity pair whose stock value does not fit in a `Decimal`
fn check_stock_value(unit_price: Decimal, quantity: i64) -> AppResult<()> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .map(|_| ())
        .ok_or_else(|| AppError::InvalidArgument("Stock value overflow".to_string()))
}
