// Public API - what other modules can use
pub use handlers::{
    commit_manual_round, commit_round, create_session, delete_session, export_session, get_session,
    list_game_types, reset_session, start_session, undo_round,
};
pub use cleanup_task::{start_cleanup_task, CleanupConfig};
pub use service::SessionService;
pub use types::{GameTypeView, LossSplit, ManualRoundRequest, PlayerNamesRequest, SessionView};

// Internal modules
pub mod cleanup_task;
mod handlers;
pub mod repository;
pub mod service;
mod types;
