//! Error handling for the Stock Ledger
//!
//! Provides consistent error responses in English and French

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Input errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_fr: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Ledger rule violations
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("Referential conflict: {0}")]
    ReferentialConflict(String),

    // Storage errors
    #[error("Storage failure: {0}")]
    StorageFailure(#[source] StoreError),

    #[error("Storage unavailable")]
    StorageUnavailable,

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ForeignKey(detail) => AppError::ReferentialConflict(detail),
            StoreError::PoolTimedOut => AppError::StorageUnavailable,
            other => AppError::StorageFailure(other),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::from(err).into()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let (field, message) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                (field.to_string(), message)
            })
            .unwrap_or_else(|| ("input".to_string(), "Invalid input".to_string()));

        AppError::Validation {
            message_fr: format!("Valeur invalide pour {}", field),
            field,
            message,
        }
    }
}

impl AppError {
    /// Validation error for a single field
    pub fn field(field: &str, message: &str, message_fr: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
            message_fr: message_fr.to_string(),
        }
    }

    /// Stable machine-readable code, also used in logs
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            AppError::ReferentialConflict(_) => "REFERENTIAL_CONFLICT",
            AppError::StorageFailure(_) => "STORAGE_FAILURE",
            AppError::StorageUnavailable => "STORAGE_UNAVAILABLE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientStock { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ReferentialConflict(_) => StatusCode::CONFLICT,
            AppError::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::StorageFailure(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_fr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (message_en, message_fr, field) = match &self {
            AppError::Validation {
                field,
                message,
                message_fr,
            } => (message.clone(), message_fr.clone(), Some(field.clone())),
            AppError::InvalidArgument(msg) => (
                msg.clone(),
                format!("Argument invalide : {}", msg),
                None,
            ),
            AppError::NotFound(resource) => (
                format!("{} not found", resource),
                format!("{} introuvable", resource),
                None,
            ),
            AppError::InsufficientStock {
                requested,
                available,
            } => (
                format!(
                    "Insufficient stock: requested {}, available {}",
                    requested, available
                ),
                format!(
                    "Stock insuffisant : demandé {}, disponible {}",
                    requested, available
                ),
                Some("quantity".to_string()),
            ),
            AppError::ReferentialConflict(msg) => (
                msg.clone(),
                format!("Suppression impossible, l'élément est référencé : {}", msg),
                None,
            ),
            AppError::StorageFailure(_) => (
                "A storage error occurred".to_string(),
                "Erreur de la base de données".to_string(),
                None,
            ),
            AppError::StorageUnavailable => (
                "Storage is temporarily unavailable".to_string(),
                "La base de données est temporairement indisponible".to_string(),
                None,
            ),
            AppError::Internal(_) => (
                "An internal server error occurred".to_string(),
                "Erreur interne du serveur".to_string(),
                None,
            ),
        };

        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "Error: {:?}", self);
        } else {
            tracing::debug!(code = self.code(), "Rejected: {}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message_en,
                message_fr,
                field,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
