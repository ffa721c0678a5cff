//! Catalog service: categories, suppliers, fuel types and product reads
//!
//! Product quantities and every delete that must respect the movement log
//! go through [`crate::services::StockLedger`] instead.

use std::sync::Arc;

use chrono::Utc;
use shared::models::{
    Category, CategoryInput, FuelType, FuelTypeInput, ProductView, Supplier, SupplierInput,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::RecordStore;

/// Catalog service for reference data
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn RecordStore>,
}

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    // ========================================================================
    // Products (read side)
    // ========================================================================

    /// All products ordered by name, with their category name
    pub async fn list_products(&self) -> AppResult<Vec<ProductView>> {
        Ok(self.store.list_products().await?)
    }

    pub async fn get_product(&self, product_id: Uuid) -> AppResult<ProductView> {
        self.store
            .get_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Products at or below `threshold`, lowest quantity first
    pub async fn low_stock_products(&self, threshold: i64) -> AppResult<Vec<ProductView>> {
        if threshold < 0 {
            return Err(AppError::field(
                "threshold",
                "Threshold cannot be negative",
                "Le seuil ne peut pas être négatif",
            ));
        }
        Ok(self.store.list_low_stock(threshold).await?)
    }

    // ========================================================================
    // Categories
    // ========================================================================

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(self.store.list_categories().await?)
    }

    pub async fn get_category(&self, category_id: Uuid) -> AppResult<Category> {
        self.store
            .get_category(category_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category".to_string()))
    }

    pub async fn create_category(&self, input: CategoryInput) -> AppResult<Category> {
        input.validate()?;
        check_name(&input.name)?;

        let category = Category {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            description: input.description,
            created_at: Utc::now(),
        };
        self.store.insert_category(&category).await?;

        tracing::info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn update_category(
        &self,
        category_id: Uuid,
        input: CategoryInput,
    ) -> AppResult<Category> {
        input.validate()?;
        check_name(&input.name)?;

        self.store
            .update_category(category_id, &input)
            .await?
            .ok_or_else(|| AppError::NotFound("Category".to_string()))
    }

    // ========================================================================
    // Suppliers
    // ========================================================================

    pub async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        Ok(self.store.list_suppliers().await?)
    }

    pub async fn get_supplier(&self, supplier_id: Uuid) -> AppResult<Supplier> {
        self.store
            .get_supplier(supplier_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    pub async fn create_supplier(&self, input: SupplierInput) -> AppResult<Supplier> {
        validate_supplier(&input)?;

        let supplier = Supplier {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            address: input.address,
            phone: input.phone,
            email: input.email,
            created_at: Utc::now(),
        };
        self.store.insert_supplier(&supplier).await?;

        tracing::info!(supplier_id = %supplier.id, name = %supplier.name, "Supplier created");
        Ok(supplier)
    }

    pub async fn update_supplier(
        &self,
        supplier_id: Uuid,
        input: SupplierInput,
    ) -> AppResult<Supplier> {
        validate_supplier(&input)?;

        self.store
            .update_supplier(supplier_id, &input)
            .await?
            .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    pub async fn delete_supplier(&self, supplier_id: Uuid) -> AppResult<()> {
        if !self.store.delete_supplier(supplier_id).await? {
            return Err(AppError::NotFound("Supplier".to_string()));
        }
        tracing::info!(%supplier_id, "Supplier deleted");
        Ok(())
    }

    // ========================================================================
    // Fuel types
    // ========================================================================

    pub async fn list_fuel_types(&self) -> AppResult<Vec<FuelType>> {
        Ok(self.store.list_fuel_types().await?)
    }

    pub async fn get_fuel_type(&self, fuel_id: Uuid) -> AppResult<FuelType> {
        self.store
            .get_fuel_type(fuel_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Fuel type".to_string()))
    }

    pub async fn create_fuel_type(&self, input: FuelTypeInput) -> AppResult<FuelType> {
        input.validate()?;
        check_name(&input.name)?;

        let fuel = FuelType {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            density_per_litre: input.density_per_litre,
            created_at: Utc::now(),
        };
        self.store.insert_fuel_type(&fuel).await?;

        tracing::info!(fuel_id = %fuel.id, name = %fuel.name, "Fuel type created");
        Ok(fuel)
    }

    pub async fn update_fuel_type(
        &self,
        fuel_id: Uuid,
        input: FuelTypeInput,
    ) -> AppResult<FuelType> {
        input.validate()?;
        check_name(&input.name)?;

        self.store
            .update_fuel_type(fuel_id, &input)
            .await?
            .ok_or_else(|| AppError::NotFound("Fuel type".to_string()))
    }

    pub async fn delete_fuel_type(&self, fuel_id: Uuid) -> AppResult<()> {
        if !self.store.delete_fuel_type(fuel_id).await? {
            return Err(AppError::NotFound("Fuel type".to_string()));
        }
        tracing::info!(%fuel_id, "Fuel type deleted");
        Ok(())
    }
}

/// Rejects whitespace-only names, which pass the length rule
fn check_name(name: &str) -> AppResult<()> {
    shared::validate_name(name).map_err(|msg| AppError::field("name", msg, "Le nom est obligatoire"))
}

fn validate_supplier(input: &SupplierInput) -> AppResult<()> {
    input.validate()?;
    check_name(&input.name)?;

    if let Some(phone) = input.phone.as_deref().filter(|p| !p.trim().is_empty()) {
        shared::validate_phone(phone).map_err(|msg| {
            AppError::field("phone", msg, "Numéro de téléphone invalide")
        })?;
    }
    Ok(())
}
