// Public API
pub use errors::GameError;
pub use ledger::RoundLedger;
pub use models::{Player, Round, RoundMetadata};
pub use snapshot::SessionSnapshot;
pub use state::GameState;

// Internal modules
mod errors;
pub mod leaderboard;
mod ledger;
mod models;
mod snapshot;
mod state;
