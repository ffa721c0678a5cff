//! HTTP handlers for category endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use shared::models::{Category, CategoryInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::AppState;

pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let categories = state.catalog.list_categories().await?;
    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<CategoryInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let Json(input) = payload?;
    let category = state.catalog.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<Category>> {
    let category = state.catalog.get_category(category_id).await?;
    Ok(Json(category))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
    payload: Result<Json<CategoryInput>, JsonRejection>,
) -> AppResult<Json<Category>> {
    let Json(input) = payload?;
    let category = state.catalog.update_category(category_id, input).await?;
    Ok(Json(category))
}

/// Delete a category; refused while products reference it
pub async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.ledger.delete_category(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
