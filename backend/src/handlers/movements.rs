//! HTTP handlers for stock movement endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::models::{Movement, MovementView, RecordMovementInput};
use shared::types::ExportFormat;
use uuid::Uuid;

use crate::error::AppResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

/// Body returned after a movement is recorded
#[derive(Debug, Serialize)]
pub struct RecordedMovement {
    pub id: Uuid,
    pub movement: Movement,
}

/// Record an incoming or outgoing movement
pub async fn record_movement(
    State(state): State<AppState>,
    payload: Result<Json<RecordMovementInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RecordedMovement>)> {
    let Json(input) = payload?;
    let movement = state.ledger.record(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(RecordedMovement {
            id: movement.id,
            movement,
        }),
    ))
}

/// Whole movement log, newest first
pub async fn list_movements(State(state): State<AppState>) -> AppResult<Json<Vec<MovementView>>> {
    let movements = state.ledger.list_movements().await?;
    Ok(Json(movements))
}

pub async fn get_movement(
    State(state): State<AppState>,
    Path(movement_id): Path<Uuid>,
) -> AppResult<Json<MovementView>> {
    let movement = state.ledger.get_movement(movement_id).await?;
    Ok(Json(movement))
}

/// Export the movement log as JSON or CSV
pub async fn export_movements(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    match query.format {
        ExportFormat::Csv => {
            let csv = state.ledger.export_movements_csv().await?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"stock_movements.csv\"",
                    ),
                ],
                csv,
            )
                .into_response())
        }
        ExportFormat::Json => {
            let movements = state.ledger.list_movements().await?;
            Ok(Json(movements).into_response())
        }
    }
}
