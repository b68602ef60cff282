use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, instrument};

use super::types::{GameTypeView, ManualRoundRequest, PlayerNamesRequest, SessionView};
use crate::{
    game::Round,
    scoring::{catalog, Declaration},
    shared::{AppError, AppState},
};

/// HTTP handler for the game table
///
/// GET /rules
#[instrument(name = "list_game_types")]
pub async fn list_game_types() -> Result<Json<Vec<GameTypeView>>, AppError> {
    let views = catalog::all()
        .iter()
        .map(|def| -> Result<GameTypeView, AppError> {
            Ok(GameTypeView::new(def, def.value()?))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(views))
}

/// HTTP handler for creating a new session
///
/// POST /sessions
/// Returns the started session with its generated id
#[instrument(name = "create_session", skip(state))]
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<PlayerNamesRequest>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let view = state.session_service.create_session(&request.names).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /sessions/:id
#[instrument(name = "get_session", skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.session_service.get_session(&session_id).await?))
}

/// HTTP handler for dropping a session for good
///
/// DELETE /sessions/:id
#[instrument(name = "delete_session", skip(state))]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.session_service.delete_session(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /sessions/:id/start
#[instrument(name = "start_session", skip(state))]
pub async fn start_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<PlayerNamesRequest>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .session_service
        .start_session(&session_id, &request.names)
        .await?;
    Ok(Json(view))
}

/// HTTP handler for committing a declared round
///
/// POST /sessions/:id/rounds
#[instrument(name = "commit_round", skip(state))]
pub async fn commit_round(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(declaration): Json<Declaration>,
) -> Result<(StatusCode, Json<Round>), AppError> {
    let round = state
        .session_service
        .commit_declaration(&session_id, &declaration)
        .await?;
    Ok((StatusCode::CREATED, Json(round)))
}

/// POST /sessions/:id/rounds/manual
#[instrument(name = "commit_manual_round", skip(state, request))]
pub async fn commit_manual_round(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ManualRoundRequest>,
) -> Result<(StatusCode, Json<Round>), AppError> {
    let round = state
        .session_service
        .commit_manual(&session_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(round)))
}

/// HTTP handler for taking back the latest round
///
/// DELETE /sessions/:id/rounds/last
/// Returns the removed round
#[instrument(name = "undo_round", skip(state))]
pub async fn undo_round(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Round>, AppError> {
    Ok(Json(state.session_service.undo_last(&session_id).await?))
}

/// POST /sessions/:id/reset
#[instrument(name = "reset_session", skip(state))]
pub async fn reset_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.session_service.reset(&session_id).await?))
}

/// HTTP handler for downloading the score sheet
///
/// GET /sessions/:id/export
/// Returns the history as a CSV attachment
#[instrument(name = "export_session", skip(state))]
pub async fn export_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Response, AppError> {
    let csv = state.session_service.export_csv(&session_id).await?;
    let filename = format!(
        "ulti-{}.csv",
        chrono::Utc::now().format("%Y-%m-%d")
    );

    info!(bytes = csv.len(), "Session exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response())
}
