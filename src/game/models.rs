use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::scoring::{DeltaMap, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: i32,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
        }
    }
}

/// What the caller knows about a round besides its deltas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundMetadata {
    #[serde(default)]
    pub declarer_id: Option<PlayerId>,
    #[serde(default)]
    pub game_type_id: Option<u32>,
    #[serde(default)]
    pub kontra_ids: Option<BTreeSet<PlayerId>>,
    #[serde(default)]
    pub sitting_out_id: Option<PlayerId>,
}

/// A committed round. Never mutated once it is in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub round_number: u32,
    pub deltas: DeltaMap,
    #[serde(default)]
    pub declarer_id: Option<PlayerId>,
    #[serde(default)]
    pub game_type_id: Option<u32>,
    #[serde(default)]
    pub kontra_ids: Option<BTreeSet<PlayerId>>,
    #[serde(default)]
    pub sitting_out_id: Option<PlayerId>,
}

impl Round {
    pub fn new(round_number: u32, deltas: DeltaMap, metadata: RoundMetadata) -> Self {
        Self {
            round_number,
            deltas,
            declarer_id: metadata.declarer_id,
            game_type_id: metadata.game_type_id,
            kontra_ids: metadata.kontra_ids,
            sitting_out_id: metadata.sitting_out_id,
        }
    }

    pub fn metadata(&self) -> RoundMetadata {
        RoundMetadata {
            declarer_id: self.declarer_id,
            game_type_id: self.game_type_id,
            kontra_ids: self.kontra_ids.clone(),
            sitting_out_id: self.sitting_out_id,
        }
    }

    pub fn delta_for(&self, player_id: PlayerId) -> i32 {
        self.deltas.get(&player_id).copied().unwrap_or_default()
    }
}
