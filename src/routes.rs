use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::{session, shared::AppState};

/// Builds the HTTP API around the scoring sessions.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/rules", get(session::list_game_types))
        .route("/sessions", post(session::create_session))
        .route(
            "/sessions/:id",
            get(session::get_session).delete(session::delete_session),
        )
        .route("/sessions/:id/start", post(session::start_session))
        .route("/sessions/:id/reset", post(session::reset_session))
        .route("/sessions/:id/rounds", post(session::commit_round))
        .route(
            "/sessions/:id/rounds/manual",
            post(session::commit_manual_round),
        )
        .route("/sessions/:id/rounds/last", delete(session::undo_round))
        .route("/sessions/:id/export", get(session::export_session))
        .with_state(state)
}
