//! Dashboard handlers

use axum::{extract::State, Json};
use shared::models::DashboardStats;

use crate::error::AppResult;
use crate::AppState;

/// Product, movement and supplier counts plus total stock value
pub async fn get_stats(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    let stats = state.ledger.stats().await?;
    Ok(Json(stats))
}
