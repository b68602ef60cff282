use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("Unknown game type: {0}")]
    UnknownGameType(u32),

    #[error("Malformed point value: {0:?}")]
    MalformedValue(String),

    #[error("Invalid declaration: {0}")]
    InvalidDeclaration(String),

    #[error("Round deltas sum to {sum} instead of zero")]
    InternalInvariantViolation { sum: i64 },
}
