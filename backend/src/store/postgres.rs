//! PostgreSQL record store
//!
//! Per-product serialization comes from `SELECT ... FOR UPDATE` row locks
//! taken inside a sqlx transaction; an uncommitted transaction rolls back
//! when dropped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::{
    Category, CategoryInput, FuelType, FuelTypeInput, Movement, MovementType, MovementView,
    Product, ProductView, Supplier, SupplierInput, UpdateProductInput,
};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{RecordCounts, RecordStore, StoreError, StoreResult, StoreTransaction};

const PRODUCT_COLUMNS: &str =
    "p.id, p.name, p.description, p.unit_price, p.quantity, p.category_id, p.created_at, p.updated_at";

const MOVEMENT_VIEW_SELECT: &str = r#"
    SELECT m.id, m.product_id, p.name AS product_name, m.type_id, t.label AS type_label,
           m.quantity, m.recorded_at
    FROM stock_movements m
    JOIN products p ON m.product_id = p.id
    JOIN movement_types t ON m.type_id = t.id
"#;

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    /// Create a new PgStore instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

/// Row for product queries
#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    unit_price: Decimal,
    quantity: i64,
    category_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            unit_price: row.unit_price,
            quantity: row.quantity,
            category_id: row.category_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Row for product listings joined with categories
#[derive(Debug, FromRow)]
struct ProductViewRow {
    #[sqlx(flatten)]
    product: ProductRow,
    category_name: Option<String>,
}

impl From<ProductViewRow> for ProductView {
    fn from(row: ProductViewRow) -> Self {
        ProductView {
            product: row.product.into(),
            category_name: row.category_name,
        }
    }
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct SupplierRow {
    id: Uuid,
    name: String,
    address: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: row.id,
            name: row.name,
            address: row.address,
            phone: row.phone,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct FuelTypeRow {
    id: Uuid,
    name: String,
    density_per_litre: Decimal,
    created_at: DateTime<Utc>,
}

impl From<FuelTypeRow> for FuelType {
    fn from(row: FuelTypeRow) -> Self {
        FuelType {
            id: row.id,
            name: row.name,
            density_per_litre: row.density_per_litre,
            created_at: row.created_at,
        }
    }
}

fn movement_type(type_id: i16) -> StoreResult<MovementType> {
    MovementType::from_id(type_id)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown movement type id {}", type_id)))
}

#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    product_id: Uuid,
    type_id: i16,
    quantity: i64,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for Movement {
    type Error = StoreError;

    fn try_from(row: MovementRow) -> StoreResult<Self> {
        Ok(Movement {
            id: row.id,
            product_id: row.product_id,
            movement_type: movement_type(row.type_id)?,
            quantity: row.quantity,
            recorded_at: row.recorded_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct MovementViewRow {
    id: Uuid,
    product_id: Uuid,
    product_name: String,
    type_id: i16,
    type_label: String,
    quantity: i64,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<MovementViewRow> for MovementView {
    type Error = StoreError;

    fn try_from(row: MovementViewRow) -> StoreResult<Self> {
        Ok(MovementView {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            movement_type: movement_type(row.type_id)?,
            movement_type_label: row.type_label,
            quantity: row.quantity,
            recorded_at: row.recorded_at,
        })
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        let tx = self.db.begin().await?;
        Ok(Box::new(PgTransaction { tx }))
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn list_products(&self) -> StoreResult<Vec<ProductView>> {
        let rows = sqlx::query_as::<_, ProductViewRow>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}, c.name AS category_name
            FROM products p
            LEFT JOIN categories c ON p.category_id = c.id
            ORDER BY p.name
            "#
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_product(&self, id: Uuid) -> StoreResult<Option<ProductView>> {
        let row = sqlx::query_as::<_, ProductViewRow>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}, c.name AS category_name
            FROM products p
            LEFT JOIN categories c ON p.category_id = c.id
            WHERE p.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn update_product_details(
        &self,
        id: Uuid,
        input: &UpdateProductInput,
    ) -> StoreResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products p
            SET name = $1, description = $2, unit_price = $3, category_id = $4, updated_at = NOW()
            WHERE p.id = $5
            RETURNING p.id, p.name, p.description, p.unit_price, p.quantity, p.category_id,
                      p.created_at, p.updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.unit_price)
        .bind(input.category_id)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_low_stock(&self, threshold: i64) -> StoreResult<Vec<ProductView>> {
        let rows = sqlx::query_as::<_, ProductViewRow>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}, c.name AS category_name
            FROM products p
            LEFT JOIN categories c ON p.category_id = c.id
            WHERE p.quantity <= $1
            ORDER BY p.quantity ASC, p.name
            "#
        ))
        .bind(threshold)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description, created_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description, created_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn insert_category(&self, category: &Category) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO categories (id, name, description, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn update_category(
        &self,
        id: Uuid,
        input: &CategoryInput,
    ) -> StoreResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            UPDATE categories SET name = $1, description = $2
            WHERE id = $3
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_suppliers(&self) -> StoreResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, SupplierRow>(
            "SELECT id, name, address, phone, email, created_at FROM suppliers ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_supplier(&self, id: Uuid) -> StoreResult<Option<Supplier>> {
        let row = sqlx::query_as::<_, SupplierRow>(
            "SELECT id, name, address, phone, email, created_at FROM suppliers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn insert_supplier(&self, supplier: &Supplier) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, address, phone, email, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.address)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(supplier.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn update_supplier(
        &self,
        id: Uuid,
        input: &SupplierInput,
    ) -> StoreResult<Option<Supplier>> {
        let row = sqlx::query_as::<_, SupplierRow>(
            r#"
            UPDATE suppliers SET name = $1, address = $2, phone = $3, email = $4
            WHERE id = $5
            RETURNING id, name, address, phone, email, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete_supplier(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_fuel_types(&self) -> StoreResult<Vec<FuelType>> {
        let rows = sqlx::query_as::<_, FuelTypeRow>(
            "SELECT id, name, density_per_litre, created_at FROM fuel_types ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_fuel_type(&self, id: Uuid) -> StoreResult<Option<FuelType>> {
        let row = sqlx::query_as::<_, FuelTypeRow>(
            "SELECT id, name, density_per_litre, created_at FROM fuel_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn insert_fuel_type(&self, fuel: &FuelType) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO fuel_types (id, name, density_per_litre, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(fuel.id)
        .bind(&fuel.name)
        .bind(fuel.density_per_litre)
        .bind(fuel.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn update_fuel_type(
        &self,
        id: Uuid,
        input: &FuelTypeInput,
    ) -> StoreResult<Option<FuelType>> {
        let row = sqlx::query_as::<_, FuelTypeRow>(
            r#"
            UPDATE fuel_types SET name = $1, density_per_litre = $2
            WHERE id = $3
            RETURNING id, name, density_per_litre, created_at
            "#,
        )
        .bind(&input.name)
        .bind(input.density_per_litre)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete_fuel_type(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM fuel_types WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_movements(&self) -> StoreResult<Vec<MovementView>> {
        let rows = sqlx::query_as::<_, MovementViewRow>(&format!(
            "{MOVEMENT_VIEW_SELECT} ORDER BY m.recorded_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get_movement(&self, id: Uuid) -> StoreResult<Option<MovementView>> {
        let row = sqlx::query_as::<_, MovementViewRow>(&format!(
            "{MOVEMENT_VIEW_SELECT} WHERE m.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_product_movements(&self, product_id: Uuid) -> StoreResult<Vec<Movement>> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, product_id, type_id, quantity, recorded_at
            FROM stock_movements
            WHERE product_id = $1
            ORDER BY recorded_at DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn record_counts(&self) -> StoreResult<RecordCounts> {
        let (products, movements, suppliers) = sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM products),
                (SELECT COUNT(*) FROM stock_movements),
                (SELECT COUNT(*) FROM suppliers)
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        Ok(RecordCounts {
            products,
            movements,
            suppliers,
        })
    }
}

/// Unit of work backed by a PostgreSQL transaction
pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgTransaction {
    async fn lock_product(&mut self, id: Uuid) -> StoreResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn insert_product(&mut self, product: &Product) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, unit_price, quantity, category_id,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.unit_price)
        .bind(product.quantity)
        .bind(product.category_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn set_product_quantity(&mut self, id: Uuid, quantity: i64) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE products SET quantity = $1, updated_at = NOW() WHERE id = $2")
                .bind(quantity)
                .bind(id)
                .execute(&mut *self.tx)
                .await?;

        if result.rows_affected() != 1 {
            return Err(StoreError::Corrupt(format!("product {} vanished", id)));
        }
        Ok(())
    }

    async fn insert_movement(&mut self, movement: &Movement) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_movements (id, product_id, type_id, quantity, recorded_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(movement.id)
        .bind(movement.product_id)
        .bind(movement.movement_type.id())
        .bind(movement.quantity)
        .bind(movement.recorded_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn count_product_movements(&mut self, product_id: Uuid) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stock_movements WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(count)
    }

    async fn product_movements(&mut self, product_id: Uuid) -> StoreResult<Vec<Movement>> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, product_id, type_id, quantity, recorded_at
            FROM stock_movements
            WHERE product_id = $1
            ORDER BY recorded_at
            "#,
        )
        .bind(product_id)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete_product(&mut self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn lock_category(&mut self, id: Uuid) -> StoreResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description, created_at FROM categories WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn category_exists(&mut self, id: Uuid) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, i32>(
            "SELECT 1 FROM categories WHERE id = $1 FOR KEY SHARE",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(exists.is_some())
    }

    async fn count_category_products(&mut self, category_id: Uuid) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE category_id = $1",
        )
        .bind(category_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(count)
    }

    async fn delete_category(&mut self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
