use thiserror::Error;

use crate::scoring::ScoringError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Invalid setup: {0}")]
    InvalidSetup(String),

    #[error("Invalid round: {0}")]
    InvalidRound(String),

    #[error("No rounds to undo")]
    EmptyLedger,

    #[error("The game has not been started")]
    NotStarted,

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}
