//! HTTP handlers for product endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::models::{
    CreateProductInput, LedgerAudit, Movement, Product, ProductView, UpdateProductInput,
};
use shared::types::LowStockQuery;
use uuid::Uuid;

use crate::error::AppResult;
use crate::AppState;

/// List all products ordered by name
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<ProductView>>> {
    let products = state.catalog.list_products().await?;
    Ok(Json(products))
}

/// Create a product, booking any initial quantity as an incoming movement
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<CreateProductInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let Json(input) = payload?;
    let product = state.ledger.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductView>> {
    let product = state.catalog.get_product(product_id).await?;
    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    payload: Result<Json<UpdateProductInput>, JsonRejection>,
) -> AppResult<Json<Product>> {
    let Json(input) = payload?;
    let product = state.ledger.update_product(product_id, input).await?;
    Ok(Json(product))
}

/// Delete a product; refused while stock movements reference it
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.ledger.delete_product(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Products at or below the threshold (configured default when omitted)
pub async fn list_low_stock(
    State(state): State<AppState>,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<Vec<ProductView>>> {
    let threshold = query
        .threshold
        .unwrap_or(state.config.stock.low_stock_threshold);
    let products = state.catalog.low_stock_products(threshold).await?;
    Ok(Json(products))
}

pub async fn list_product_movements(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Vec<Movement>>> {
    let movements = state.ledger.list_product_movements(product_id).await?;
    Ok(Json(movements))
}

/// Replay the movement log of a product against its stored quantity
pub async fn audit_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<LedgerAudit>> {
    let audit = state.ledger.verify_product(product_id).await?;
    Ok(Json(audit))
}
