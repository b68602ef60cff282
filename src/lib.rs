// Library crate for the Ulti score keeper
// The scoring engine lives in `scoring` and `game`; `session` hosts it over HTTP

pub mod config;
pub mod export;
pub mod game;
pub mod routes;
pub mod scoring;
pub mod session;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use game::{GameError, GameState, Player, Round, RoundMetadata, SessionSnapshot};
pub use scoring::{Declaration, DeltaMap, PlayerId, ScoringError};
pub use shared::{AppError, AppState};
