//! Catalog and reporting tests
//!
//! Tests for reference data and derived figures including:
//! - Category, supplier and fuel type CRUD with validation
//! - Referential guards on delete
//! - Low-stock listing and the monitor scan
//! - Dashboard stats and stock value

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use shared::models::{
    CategoryInput, CreateProductInput, FuelTypeInput, MovementType, SupplierInput,
};
use stock_ledger::services::{CatalogService, LowStockMonitor, StockLedger};
use stock_ledger::store::MemoryStore;
use stock_ledger::AppError;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn services() -> (StockLedger, CatalogService) {
    let store = Arc::new(MemoryStore::new());
    (StockLedger::new(store.clone()), CatalogService::new(store))
}

fn category(name: &str) -> CategoryInput {
    CategoryInput {
        name: name.to_string(),
        description: None,
    }
}

fn product(name: &str, price: &str, qty: i64, category_id: Option<Uuid>) -> CreateProductInput {
    CreateProductInput {
        name: name.to_string(),
        description: None,
        unit_price: dec(price),
        initial_quantity: qty,
        category_id,
    }
}

fn supplier(name: &str, phone: Option<&str>, email: Option<&str>) -> SupplierInput {
    SupplierInput {
        name: name.to_string(),
        address: Some("12 rue du Port, Dakar".to_string()),
        phone: phone.map(str::to_string),
        email: email.map(str::to_string),
    }
}

// ============================================================================
// Categories
// ============================================================================

#[cfg(test)]
mod category_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_rename_category() {
        let (_ledger, catalog) = services();
        let created = catalog.create_category(category("Lubrifiants")).await.unwrap();

        let renamed = catalog
            .update_category(created.id, category("Huiles"))
            .await
            .unwrap();
        assert_eq!(renamed.name, "Huiles");
        assert_eq!(catalog.get_category(created.id).await.unwrap().name, "Huiles");
    }

    #[tokio::test]
    async fn test_blank_category_name_rejected() {
        let (_ledger, catalog) = services();
        let err = catalog.create_category(category("   ")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "name"));
        assert!(catalog.list_categories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_referenced_category_cannot_be_deleted() {
        let (ledger, catalog) = services();
        let cat = catalog.create_category(category("Carburants")).await.unwrap();
        let p = ledger
            .create_product(product("Gasoil", "1.20", 0, Some(cat.id)))
            .await
            .unwrap();

        assert!(ledger.is_category_referenced(cat.id).await.unwrap());
        let err = ledger.delete_category(cat.id).await.unwrap_err();
        assert!(matches!(err, AppError::ReferentialConflict(_)));
        assert!(catalog.get_category(cat.id).await.is_ok());

        // Product has no movements, so it can go, and then the category too
        ledger.delete_product(p.id).await.unwrap();
        assert!(!ledger.is_category_referenced(cat.id).await.unwrap());
        ledger.delete_category(cat.id).await.unwrap();
        assert!(matches!(
            catalog.get_category(cat.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_product_with_unknown_category_rejected() {
        let (ledger, catalog) = services();
        let err = ledger
            .create_product(product("Gasoil", "1.20", 5, Some(Uuid::new_v4())))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(catalog.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_products_listed_by_name_with_category() {
        let (ledger, catalog) = services();
        let cat = catalog.create_category(category("Carburants")).await.unwrap();
        ledger
            .create_product(product("Super", "1.50", 1, Some(cat.id)))
            .await
            .unwrap();
        ledger
            .create_product(product("Gasoil", "1.20", 1, None))
            .await
            .unwrap();

        let products = catalog.list_products().await.unwrap();
        assert_eq!(products[0].product.name, "Gasoil");
        assert_eq!(products[0].category_name, None);
        assert_eq!(products[1].product.name, "Super");
        assert_eq!(products[1].category_name.as_deref(), Some("Carburants"));
    }
}

// ============================================================================
// Products with movements
// ============================================================================

#[cfg(test)]
mod product_guard_tests {
    use super::*;

    #[tokio::test]
    async fn test_product_with_movements_cannot_be_deleted() {
        let (ledger, catalog) = services();
        let p = ledger
            .create_product(product("Gasoil", "1.20", 10, None))
            .await
            .unwrap();

        assert!(ledger.is_product_referenced(p.id).await.unwrap());
        let err = ledger.delete_product(p.id).await.unwrap_err();
        assert!(matches!(err, AppError::ReferentialConflict(_)));

        assert!(catalog.get_product(p.id).await.is_ok());
        assert_eq!(ledger.list_movements().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_product() {
        let (ledger, _catalog) = services();
        assert!(matches!(
            ledger.delete_product(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }
}

// ============================================================================
// Suppliers and fuel types
// ============================================================================

#[cfg(test)]
mod supplier_tests {
    use super::*;

    #[tokio::test]
    async fn test_supplier_crud() {
        let (_ledger, catalog) = services();
        let created = catalog
            .create_supplier(supplier(
                "Total Senegal",
                Some("+221 33 849 00 00"),
                Some("contact@total.sn"),
            ))
            .await
            .unwrap();

        let updated = catalog
            .update_supplier(created.id, supplier("Total Energies", None, None))
            .await
            .unwrap();
        assert_eq!(updated.name, "Total Energies");
        assert_eq!(updated.email, None);

        catalog.delete_supplier(created.id).await.unwrap();
        assert!(matches!(
            catalog.delete_supplier(created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_supplier_email_rejected() {
        let (_ledger, catalog) = services();
        let err = catalog
            .create_supplier(supplier("Shell", None, Some("not-an-email")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "email"));
    }

    #[tokio::test]
    async fn test_invalid_supplier_phone_rejected() {
        let (_ledger, catalog) = services();
        let err = catalog
            .create_supplier(supplier("Shell", Some("12ab"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "phone"));
    }

    #[tokio::test]
    async fn test_fuel_type_density() {
        let (_ledger, catalog) = services();
        let fuel = catalog
            .create_fuel_type(FuelTypeInput {
                name: "Gasoil".to_string(),
                density_per_litre: dec("0.845"),
            })
            .await
            .unwrap();
        assert_eq!(fuel.litres_to_kg(dec("1000")), dec("845.000"));

        let err = catalog
            .create_fuel_type(FuelTypeInput {
                name: "Eau".to_string(),
                density_per_litre: Decimal::ZERO,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        catalog.delete_fuel_type(fuel.id).await.unwrap();
        assert!(catalog.list_fuel_types().await.unwrap().is_empty());
    }
}

// ============================================================================
// Low stock and dashboard
// ============================================================================

#[cfg(test)]
mod reporting_tests {
    use super::*;

    #[tokio::test]
    async fn test_stats_on_empty_store() {
        let (ledger, _catalog) = services();
        let stats = ledger.stats().await.unwrap();

        assert_eq!(stats.total_products, 0);
        assert_eq!(stats.total_movements, 0);
        assert_eq!(stats.total_suppliers, 0);
        assert_eq!(stats.stock_value, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_stats_and_stock_value() {
        let (ledger, catalog) = services();
        let gasoil = ledger
            .create_product(product("Gasoil", "1.50", 10, None))
            .await
            .unwrap();
        ledger
            .create_product(product("Huile", "12.00", 2, None))
            .await
            .unwrap();
        ledger
            .record_movement(gasoil.id, MovementType::Outgoing, 4)
            .await
            .unwrap();
        catalog
            .create_supplier(supplier("Shell", None, None))
            .await
            .unwrap();

        let stats = ledger.stats().await.unwrap();
        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.total_movements, 3);
        assert_eq!(stats.total_suppliers, 1);
        // 6 * 1.50 + 2 * 12.00
        assert_eq!(stats.stock_value, dec("33.00"));
        assert_eq!(ledger.current_stock_value().await.unwrap(), dec("33.00"));
    }

    #[tokio::test]
    async fn test_low_stock_threshold_inclusive() {
        let (ledger, catalog) = services();
        ledger
            .create_product(product("A", "1.00", 5, None))
            .await
            .unwrap();
        ledger
            .create_product(product("B", "1.00", 6, None))
            .await
            .unwrap();
        ledger
            .create_product(product("C", "1.00", 0, None))
            .await
            .unwrap();

        let low = catalog.low_stock_products(5).await.unwrap();
        let names: Vec<&str> = low.iter().map(|v| v.product.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A"]);

        assert!(matches!(
            catalog.low_stock_products(-1).await,
            Err(AppError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_monitor_scan() {
        let (ledger, catalog) = services();
        ledger
            .create_product(product("Gasoil", "1.00", 2, None))
            .await
            .unwrap();
        ledger
            .create_product(product("Huile", "1.00", 50, None))
            .await
            .unwrap();

        let monitor = LowStockMonitor::new(catalog, 5);
        let low = monitor.scan().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].product.name, "Gasoil");
    }
}
