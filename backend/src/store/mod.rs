//! Record store abstraction
//!
//! The ledger and catalog services talk to persistence only through
//! [`RecordStore`] and [`StoreTransaction`]. Two implementations exist:
//! [`PgStore`] for PostgreSQL and [`MemoryStore`] for local runs and tests.
//!
//! A [`StoreTransaction`] is all-or-nothing: writes become visible on
//! [`StoreTransaction::commit`] and are discarded when the transaction is
//! dropped, including when the owning request future is cancelled.

use async_trait::async_trait;
use shared::models::{
    Category, CategoryInput, FuelType, FuelTypeInput, Movement, MovementView, Product,
    ProductView, Supplier, SupplierInput, UpdateProductInput,
};
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// PostgreSQL SQLSTATE for foreign key violations
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("foreign key violation: {0}")]
    ForeignKey(String),

    #[error("connection pool timed out")]
    PoolTimedOut,

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StoreError::PoolTimedOut,
            sqlx::Error::Database(ref db_err)
                if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) =>
            {
                StoreError::ForeignKey(db_err.message().to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Row counts shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordCounts {
    pub products: i64,
    pub movements: i64,
    pub suppliers: i64,
}

/// Persistence for every record collection.
///
/// Product quantities are read-only here; the only way to change one is a
/// [`StoreTransaction`] driven by the stock ledger.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Open an all-or-nothing unit of work
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>>;

    /// Cheap connectivity check for health endpoints
    async fn ping(&self) -> StoreResult<()>;

    // Products

    /// All products ordered by name, joined with their category name
    async fn list_products(&self) -> StoreResult<Vec<ProductView>>;

    async fn get_product(&self, id: Uuid) -> StoreResult<Option<ProductView>>;

    /// Update every product attribute except quantity
    async fn update_product_details(
        &self,
        id: Uuid,
        input: &UpdateProductInput,
    ) -> StoreResult<Option<Product>>;

    /// Products with quantity at or below `threshold`, lowest first
    async fn list_low_stock(&self, threshold: i64) -> StoreResult<Vec<ProductView>>;

    // Categories

    async fn list_categories(&self) -> StoreResult<Vec<Category>>;

    async fn get_category(&self, id: Uuid) -> StoreResult<Option<Category>>;

    async fn insert_category(&self, category: &Category) -> StoreResult<()>;

    async fn update_category(
        &self,
        id: Uuid,
        input: &CategoryInput,
    ) -> StoreResult<Option<Category>>;

    // Suppliers

    async fn list_suppliers(&self) -> StoreResult<Vec<Supplier>>;

    async fn get_supplier(&self, id: Uuid) -> StoreResult<Option<Supplier>>;

    async fn insert_supplier(&self, supplier: &Supplier) -> StoreResult<()>;

    async fn update_supplier(
        &self,
        id: Uuid,
        input: &SupplierInput,
    ) -> StoreResult<Option<Supplier>>;

    /// Returns false when no row matched
    async fn delete_supplier(&self, id: Uuid) -> StoreResult<bool>;

    // Fuel types

    async fn list_fuel_types(&self) -> StoreResult<Vec<FuelType>>;

    async fn get_fuel_type(&self, id: Uuid) -> StoreResult<Option<FuelType>>;

    async fn insert_fuel_type(&self, fuel: &FuelType) -> StoreResult<()>;

    async fn update_fuel_type(
        &self,
        id: Uuid,
        input: &FuelTypeInput,
    ) -> StoreResult<Option<FuelType>>;

    async fn delete_fuel_type(&self, id: Uuid) -> StoreResult<bool>;

    // Movements (append-only, no update or delete)

    /// Whole log, newest first, joined with product name and type label
    async fn list_movements(&self) -> StoreResult<Vec<MovementView>>;

    async fn get_movement(&self, id: Uuid) -> StoreResult<Option<MovementView>>;

    /// Log of a single product, newest first
    async fn list_product_movements(&self, product_id: Uuid) -> StoreResult<Vec<Movement>>;

    async fn record_counts(&self) -> StoreResult<RecordCounts>;
}

/// A unit of work over the record store.
///
/// Rows returned by the `lock_*` methods stay exclusively locked until the
/// transaction commits or is dropped.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn lock_product(&mut self, id: Uuid) -> StoreResult<Option<Product>>;

    async fn insert_product(&mut self, product: &Product) -> StoreResult<()>;

    async fn set_product_quantity(&mut self, id: Uuid, quantity: i64) -> StoreResult<()>;

    async fn insert_movement(&mut self, movement: &Movement) -> StoreResult<()>;

    async fn count_product_movements(&mut self, product_id: Uuid) -> StoreResult<i64>;

    /// Log of a single product as seen by this transaction
    async fn product_movements(&mut self, product_id: Uuid) -> StoreResult<Vec<Movement>>;

    async fn delete_product(&mut self, id: Uuid) -> StoreResult<()>;

    async fn lock_category(&mut self, id: Uuid) -> StoreResult<Option<Category>>;

    /// Existence check that also keeps the category from being deleted
    /// until this transaction ends
    async fn category_exists(&mut self, id: Uuid) -> StoreResult<bool>;

    async fn count_category_products(&mut self, category_id: Uuid) -> StoreResult<i64>;

    async fn delete_category(&mut self, id: Uuid) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
