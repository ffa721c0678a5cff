//! HTTP handlers for fuel type endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use shared::models::{FuelType, FuelTypeInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::AppState;

pub async fn list_fuel_types(State(state): State<AppState>) -> AppResult<Json<Vec<FuelType>>> {
    let fuels = state.catalog.list_fuel_types().await?;
    Ok(Json(fuels))
}

pub async fn create_fuel_type(
    State(state): State<AppState>,
    payload: Result<Json<FuelTypeInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<FuelType>)> {
    let Json(input) = payload?;
    let fuel = state.catalog.create_fuel_type(input).await?;
    Ok((StatusCode::CREATED, Json(fuel)))
}

pub async fn get_fuel_type(
    State(state): State<AppState>,
    Path(fuel_id): Path<Uuid>,
) -> AppResult<Json<FuelType>> {
    let fuel = state.catalog.get_fuel_type(fuel_id).await?;
    Ok(Json(fuel))
}

pub async fn update_fuel_type(
    State(state): State<AppState>,
    Path(fuel_id): Path<Uuid>,
    payload: Result<Json<FuelTypeInput>, JsonRejection>,
) -> AppResult<Json<FuelType>> {
    let Json(input) = payload?;
    let fuel = state.catalog.update_fuel_type(fuel_id, input).await?;
    Ok(Json(fuel))
}

pub async fn delete_fuel_type(
    State(state): State<AppState>,
    Path(fuel_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.catalog.delete_fuel_type(fuel_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
