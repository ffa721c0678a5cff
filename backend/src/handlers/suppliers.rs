//! HTTP handlers for supplier endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use shared::models::{Supplier, SupplierInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::AppState;

pub async fn list_suppliers(State(state): State<AppState>) -> AppResult<Json<Vec<Supplier>>> {
    let suppliers = state.catalog.list_suppliers().await?;
    Ok(Json(suppliers))
}

pub async fn create_supplier(
    State(state): State<AppState>,
    payload: Result<Json<SupplierInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    let Json(input) = payload?;
    let supplier = state.catalog.create_supplier(input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<Json<Supplier>> {
    let supplier = state.catalog.get_supplier(supplier_id).await?;
    Ok(Json(supplier))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
    payload: Result<Json<SupplierInput>, JsonRejection>,
) -> AppResult<Json<Supplier>> {
    let Json(input) = payload?;
    let supplier = state.catalog.update_supplier(supplier_id, input).await?;
    Ok(Json(supplier))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.catalog.delete_supplier(supplier_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
