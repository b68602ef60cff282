use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::game::{leaderboard, GameState, Player, Round, RoundMetadata};
use crate::scoring::{DeltaMap, GameTypeDef, PlayerId};

/// Request payload for creating or (re)starting a session
#[derive(Debug, Deserialize)]
pub struct PlayerNamesRequest {
    pub names: Vec<String>,
}

/// A loss to spread over the other players, as entered on the score sheet
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LossSplit {
    pub loser_id: PlayerId,
    pub amount: i32,
}

/// Request payload for a round whose points were entered by hand.
/// Exactly one of `deltas` or `loss` must be present.
#[derive(Debug, Default, Deserialize)]
pub struct ManualRoundRequest {
    #[serde(default)]
    pub deltas: Option<DeltaMap>,
    #[serde(default)]
    pub loss: Option<LossSplit>,
    #[serde(default)]
    pub declarer_id: Option<PlayerId>,
    #[serde(default)]
    pub game_type_id: Option<u32>,
    #[serde(default)]
    pub kontra_ids: Option<BTreeSet<PlayerId>>,
    #[serde(default)]
    pub sitting_out_id: Option<PlayerId>,
}

impl ManualRoundRequest {
    pub fn metadata(&self) -> RoundMetadata {
        RoundMetadata {
            declarer_id: self.declarer_id,
            game_type_id: self.game_type_id,
            kontra_ids: self.kontra_ids.clone(),
            sitting_out_id: self.sitting_out_id,
        }
    }
}

/// Response for session creation and session information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: String,
    pub started: bool,
    pub players: Vec<Player>,
    pub rounds: Vec<Round>,
    pub leader_id: Option<PlayerId>,
    /// Player ids from highest to lowest score
    pub standings: Vec<PlayerId>,
}

impl SessionView {
    pub fn new(session_id: &str, state: &GameState) -> Self {
        Self {
            session_id: session_id.to_string(),
            started: state.is_started(),
            players: state.players().to_vec(),
            rounds: state.rounds().to_vec(),
            leader_id: state.leader(),
            standings: leaderboard::standings(state.players())
                .iter()
                .map(|p| p.id)
                .collect(),
        }
    }
}

/// One row of the game table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameTypeView {
    pub id: u32,
    pub name: String,
    pub value: String,
    pub points: i32,
    pub colorless: bool,
}

impl GameTypeView {
    pub fn new(def: &GameTypeDef, points: i32) -> Self {
        Self {
            id: def.id,
            name: def.name.to_string(),
            value: def.base_value.to_string(),
            points,
            colorless: def.colorless,
        }
    }
}
