//! In-memory record store
//!
//! Intended for tests and local runs. All tables sit behind one async mutex;
//! a transaction holds that mutex for its whole lifetime and works on a copy
//! of the tables that replaces the originals on commit.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use shared::models::{
    Category, CategoryInput, FuelType, FuelTypeInput, Movement, MovementView, Product,
    ProductView, Supplier, SupplierInput, UpdateProductInput,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{RecordCounts, RecordStore, StoreError, StoreResult, StoreTransaction};

#[derive(Debug, Clone, Default)]
struct Tables {
    products: HashMap<Uuid, Product>,
    categories: HashMap<Uuid, Category>,
    suppliers: HashMap<Uuid, Supplier>,
    fuel_types: HashMap<Uuid, FuelType>,
    /// Append order doubles as storage order for timestamp ties
    movements: Vec<Movement>,
}

impl Tables {
    fn product_view(&self, product: &Product) -> ProductView {
        ProductView {
            product: product.clone(),
            category_name: product
                .category_id
                .and_then(|id| self.categories.get(&id))
                .map(|c| c.name.clone()),
        }
    }

    fn movement_view(&self, movement: &Movement) -> StoreResult<MovementView> {
        let product = self.products.get(&movement.product_id).ok_or_else(|| {
            StoreError::Corrupt(format!(
                "movement {} references missing product {}",
                movement.id, movement.product_id
            ))
        })?;

        Ok(MovementView {
            id: movement.id,
            product_id: movement.product_id,
            product_name: product.name.clone(),
            movement_type: movement.movement_type,
            movement_type_label: movement.movement_type.label().to_string(),
            quantity: movement.quantity,
            recorded_at: movement.recorded_at,
        })
    }

    fn check_category_ref(&self, category_id: Option<Uuid>) -> StoreResult<()> {
        match category_id {
            Some(id) if !self.categories.contains_key(&id) => Err(StoreError::ForeignKey(
                format!("category {} does not exist", id),
            )),
            _ => Ok(()),
        }
    }
}

fn sorted_by_name<T>(rows: impl Iterator<Item = T>, name: impl Fn(&T) -> &str) -> Vec<T> {
    let mut rows: Vec<T> = rows.collect();
    rows.sort_by(|a, b| name(a).cmp(name(b)));
    rows
}

/// Volatile store sharing its tables between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_products(&self) -> StoreResult<Vec<ProductView>> {
        let tables = self.tables.lock().await;
        let views = tables.products.values().map(|p| tables.product_view(p));
        Ok(sorted_by_name(views, |v| v.product.name.as_str()))
    }

    async fn get_product(&self, id: Uuid) -> StoreResult<Option<ProductView>> {
        let tables = self.tables.lock().await;
        Ok(tables.products.get(&id).map(|p| tables.product_view(p)))
    }

    async fn update_product_details(
        &self,
        id: Uuid,
        input: &UpdateProductInput,
    ) -> StoreResult<Option<Product>> {
        let mut tables = self.tables.lock().await;
        tables.check_category_ref(input.category_id)?;

        let Some(product) = tables.products.get_mut(&id) else {
            return Ok(None);
        };
        product.name = input.name.clone();
        product.description = input.description.clone();
        product.unit_price = input.unit_price;
        product.category_id = input.category_id;
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn list_low_stock(&self, threshold: i64) -> StoreResult<Vec<ProductView>> {
        let tables = self.tables.lock().await;
        let mut views: Vec<ProductView> = tables
            .products
            .values()
            .filter(|p| shared::is_low_stock(p.quantity, threshold))
            .map(|p| tables.product_view(p))
            .collect();
        views.sort_by(|a, b| {
            a.product
                .quantity
                .cmp(&b.product.quantity)
                .then_with(|| a.product.name.cmp(&b.product.name))
        });
        Ok(views)
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let tables = self.tables.lock().await;
        Ok(sorted_by_name(tables.categories.values().cloned(), |c| c.name.as_str()))
    }

    async fn get_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(self.tables.lock().await.categories.get(&id).cloned())
    }

    async fn insert_category(&self, category: &Category) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        tables.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn update_category(
        &self,
        id: Uuid,
        input: &CategoryInput,
    ) -> StoreResult<Option<Category>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.categories.get_mut(&id).map(|category| {
            category.name = input.name.clone();
            category.description = input.description.clone();
            category.clone()
        }))
    }

    async fn list_suppliers(&self) -> StoreResult<Vec<Supplier>> {
        let tables = self.tables.lock().await;
        Ok(sorted_by_name(tables.suppliers.values().cloned(), |s| s.name.as_str()))
    }

    async fn get_supplier(&self, id: Uuid) -> StoreResult<Option<Supplier>> {
        Ok(self.tables.lock().await.suppliers.get(&id).cloned())
    }

    async fn insert_supplier(&self, supplier: &Supplier) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        tables.suppliers.insert(supplier.id, supplier.clone());
        Ok(())
    }

    async fn update_supplier(
        &self,
        id: Uuid,
        input: &SupplierInput,
    ) -> StoreResult<Option<Supplier>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.suppliers.get_mut(&id).map(|supplier| {
            supplier.name = input.name.clone();
            supplier.address = input.address.clone();
            supplier.phone = input.phone.clone();
            supplier.email = input.email.clone();
            supplier.clone()
        }))
    }

    async fn delete_supplier(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.lock().await.suppliers.remove(&id).is_some())
    }

    async fn list_fuel_types(&self) -> StoreResult<Vec<FuelType>> {
        let tables = self.tables.lock().await;
        Ok(sorted_by_name(tables.fuel_types.values().cloned(), |f| f.name.as_str()))
    }

    async fn get_fuel_type(&self, id: Uuid) -> StoreResult<Option<FuelType>> {
        Ok(self.tables.lock().await.fuel_types.get(&id).cloned())
    }

    async fn insert_fuel_type(&self, fuel: &FuelType) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        tables.fuel_types.insert(fuel.id, fuel.clone());
        Ok(())
    }

    async fn update_fuel_type(
        &self,
        id: Uuid,
        input: &FuelTypeInput,
    ) -> StoreResult<Option<FuelType>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.fuel_types.get_mut(&id).map(|fuel| {
            fuel.name = input.name.clone();
            fuel.density_per_litre = input.density_per_litre;
            fuel.clone()
        }))
    }

    async fn delete_fuel_type(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.lock().await.fuel_types.remove(&id).is_some())
    }

    async fn list_movements(&self) -> StoreResult<Vec<MovementView>> {
        let tables = self.tables.lock().await;
        let mut views = tables
            .movements
            .iter()
            .rev()
            .map(|m| tables.movement_view(m))
            .collect::<StoreResult<Vec<_>>>()?;
        // Stable sort: equal timestamps stay latest-appended first
        views.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(views)
    }

    async fn get_movement(&self, id: Uuid) -> StoreResult<Option<MovementView>> {
        let tables = self.tables.lock().await;
        tables
            .movements
            .iter()
            .find(|m| m.id == id)
            .map(|m| tables.movement_view(m))
            .transpose()
    }

    async fn list_product_movements(&self, product_id: Uuid) -> StoreResult<Vec<Movement>> {
        let tables = self.tables.lock().await;
        let mut movements: Vec<Movement> = tables
            .movements
            .iter()
            .rev()
            .filter(|m| m.product_id == product_id)
            .cloned()
            .collect();
        movements.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(movements)
    }

    async fn record_counts(&self) -> StoreResult<RecordCounts> {
        let tables = self.tables.lock().await;
        Ok(RecordCounts {
            products: tables.products.len() as i64,
            movements: tables.movements.len() as i64,
            suppliers: tables.suppliers.len() as i64,
        })
    }
}

/// Exclusive unit of work over a [`MemoryStore`]
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn lock_product(&mut self, id: Uuid) -> StoreResult<Option<Product>> {
        Ok(self.working.products.get(&id).cloned())
    }

    async fn insert_product(&mut self, product: &Product) -> StoreResult<()> {
        self.working.check_category_ref(product.category_id)?;
        self.working.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn set_product_quantity(&mut self, id: Uuid, quantity: i64) -> StoreResult<()> {
        let product = self
            .working
            .products
            .get_mut(&id)
            .ok_or_else(|| StoreError::Corrupt(format!("product {} vanished", id)))?;
        product.quantity = quantity;
        product.updated_at = Utc::now();
        Ok(())
    }

    async fn insert_movement(&mut self, movement: &Movement) -> StoreResult<()> {
        if !self.working.products.contains_key(&movement.product_id) {
            return Err(StoreError::ForeignKey(format!(
                "product {} does not exist",
                movement.product_id
            )));
        }
        self.working.movements.push(movement.clone());
        Ok(())
    }

    async fn count_product_movements(&mut self, product_id: Uuid) -> StoreResult<i64> {
        Ok(self
            .working
            .movements
            .iter()
            .filter(|m| m.product_id == product_id)
            .count() as i64)
    }

    async fn product_movements(&mut self, product_id: Uuid) -> StoreResult<Vec<Movement>> {
        Ok(self
            .working
            .movements
            .iter()
            .filter(|m| m.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn delete_product(&mut self, id: Uuid) -> StoreResult<()> {
        self.working.products.remove(&id);
        Ok(())
    }

    async fn lock_category(&mut self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(self.working.categories.get(&id).cloned())
    }

    async fn category_exists(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(self.working.categories.contains_key(&id))
    }

    async fn count_category_products(&mut self, category_id: Uuid) -> StoreResult<i64> {
        Ok(self
            .working
            .products
            .values()
            .filter(|p| p.category_id == Some(category_id))
            .count() as i64)
    }

    async fn delete_category(&mut self, id: Uuid) -> StoreResult<()> {
        self.working.categories.remove(&id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
