use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::export::ExportError;
use crate::game::GameError;
use crate::scoring::ScoringError;
use crate::session::repository::{SnapshotStore, StoreError};
use crate::session::service::SessionService;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<SessionService>,
}

impl AppState {
    pub fn new(snapshot_store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            session_service: Arc::new(SessionService::new(snapshot_store)),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::InvalidSetup(_) | GameError::InvalidRound(_) => {
                AppError::BadRequest(err.to_string())
            }
            GameError::EmptyLedger | GameError::NotStarted => AppError::Conflict(err.to_string()),
            GameError::InvalidSnapshot(_) => AppError::Internal(err.to_string()),
            GameError::Scoring(scoring) => scoring.into(),
        }
    }
}

impl From<ScoringError> for AppError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::UnknownGameType(_) | ScoringError::InvalidDeclaration(_) => {
                AppError::BadRequest(err.to_string())
            }
            ScoringError::MalformedValue(_) | ScoringError::InternalInvariantViolation { .. } => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
