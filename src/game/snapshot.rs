use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{
    state::{MAX_PLAYERS, MIN_PLAYERS},
    GameError, GameState, Player, Round, RoundLedger,
};

/// Everything needed to bring a session back: treated as a single value by
/// the stores, and either restored whole or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub started: bool,
    pub players: Vec<Player>,
    pub rounds: Vec<Round>,
}

impl GameState {
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            started: self.is_started(),
            players: self.players().to_vec(),
            rounds: self.rounds().to_vec(),
        }
    }

    /// Rebuilds a session by replaying the stored rounds against the stored
    /// table. The stored scores must match the replayed ones.
    pub fn restore(snapshot: SessionSnapshot) -> Result<Self, GameError> {
        let invalid = |reason: String| Err(GameError::InvalidSnapshot(reason));

        if !snapshot.started {
            if !snapshot.players.is_empty() || !snapshot.rounds.is_empty() {
                return invalid("a session that never started has no players or rounds".to_string());
            }
            return Ok(GameState::default());
        }

        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&snapshot.players.len()) {
            return invalid(format!("{} players stored", snapshot.players.len()));
        }

        let mut ids = BTreeSet::new();
        for player in &snapshot.players {
            if player.name.trim().is_empty() {
                return invalid(format!("player {} has no name", player.id));
            }
            if player.name != player.name.trim() {
                return invalid(format!("player {} has an untrimmed name", player.id));
            }
            if !ids.insert(player.id) {
                return invalid(format!("player id {} is used twice", player.id));
            }
        }

        let table: Vec<Player> = snapshot
            .players
            .iter()
            .map(|p| Player::new(p.id, p.name.clone()))
            .collect();
        let mut state = GameState::from_parts(table, RoundLedger::new());

        for (index, round) in snapshot.rounds.into_iter().enumerate() {
            let expected = index as u32 + 1;
            if round.round_number != expected {
                return invalid(format!(
                    "round {} stored where round {expected} belongs",
                    round.round_number
                ));
            }
            let metadata = round.metadata();
            state
                .commit_round(round.deltas, metadata)
                .map_err(|e| GameError::InvalidSnapshot(format!("round {expected}: {e}")))?;
        }

        for (stored, replayed) in snapshot.players.iter().zip(state.players()) {
            if stored.score != replayed.score {
                return invalid(format!(
                    "{} has {} points stored but the rounds add up to {}",
                    stored.name, stored.score, replayed.score
                ));
            }
        }

        Ok(state)
    }
}
