//! Route definitions for the Stock Ledger API

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/suppliers", supplier_routes())
        .nest("/fuels", fuel_routes())
        .nest("/movements", movement_routes())
        .route("/dashboard/stats", get(handlers::get_stats))
}

/// Product routes; quantities change only through movements
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route("/low-stock", get(handlers::list_low_stock))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/:product_id/movements", get(handlers::list_product_movements))
        .route("/:product_id/audit", get(handlers::audit_product))
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_categories).post(handlers::create_category))
        .route(
            "/:category_id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
}

fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_suppliers).post(handlers::create_supplier))
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
}

fn fuel_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_fuel_types).post(handlers::create_fuel_type))
        .route(
            "/:fuel_id",
            get(handlers::get_fuel_type)
                .put(handlers::update_fuel_type)
                .delete(handlers::delete_fuel_type),
        )
}

/// Movement routes (append-only: no update or delete)
fn movement_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_movements).post(handlers::record_movement))
        .route("/export", get(handlers::export_movements))
        .route("/:movement_id", get(handlers::get_movement))
}
