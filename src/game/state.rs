use std::collections::BTreeSet;

use tracing::debug;

use crate::scoring::{calculate_round, catalog, Declaration, DeltaMap, PlayerId, ScoringError};

use super::{leaderboard, GameError, Player, Round, RoundLedger, RoundMetadata};

pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 4;

/// A scoring session: the players at the table, their running scores, and
/// the rounds that produced them.
///
/// `GameState::default()` is a session that has not been started yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    players: Vec<Player>,
    ledger: RoundLedger,
}

impl GameState {
    /// Seats the named players with ids assigned in order and zero scores.
    /// Names are trimmed; duplicate names are allowed.
    pub fn start<S: AsRef<str>>(names: &[S]) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&names.len()) {
            return Err(GameError::InvalidSetup(format!(
                "Ulti needs {MIN_PLAYERS} or {MAX_PLAYERS} players, got {}",
                names.len()
            )));
        }

        let mut players = Vec::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(GameError::InvalidSetup(format!(
                    "player {} has no name",
                    index + 1
                )));
            }
            players.push(Player::new(index as PlayerId, name));
        }

        Ok(Self {
            players,
            ledger: RoundLedger::new(),
        })
    }

    pub(super) fn from_parts(players: Vec<Player>, ledger: RoundLedger) -> Self {
        Self { players, ledger }
    }

    pub fn is_started(&self) -> bool {
        !self.players.is_empty()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn rounds(&self) -> &[Round] {
        self.ledger.history()
    }

    pub fn leader(&self) -> Option<PlayerId> {
        leaderboard::leader(&self.players)
    }

    /// Records a round and applies its deltas to the running scores.
    ///
    /// The round is checked against the table and handed to the ledger
    /// before any score changes, so a rejected round leaves the session
    /// exactly as it was.
    pub fn commit_round(
        &mut self,
        deltas: DeltaMap,
        metadata: RoundMetadata,
    ) -> Result<&Round, GameError> {
        if !self.is_started() {
            return Err(GameError::NotStarted);
        }
        self.validate_round(&deltas, &metadata)?;

        let round = self.ledger.append(deltas, metadata)?;
        for player in &mut self.players {
            player.score += round.delta_for(player.id);
        }

        debug!(round_number = round.round_number, "Round committed");
        Ok(round)
    }

    /// Scores a declaration with the game table and commits the result.
    pub fn commit_declaration(&mut self, declaration: &Declaration) -> Result<&Round, GameError> {
        if !self.is_started() {
            return Err(GameError::NotStarted);
        }

        let game_type = catalog::lookup(declaration.game_type_id)?;
        let deltas =
            calculate_round(&self.player_ids(), declaration, game_type).map_err(|e| match e {
                ScoringError::InvalidDeclaration(reason) => GameError::InvalidRound(reason),
                other => GameError::Scoring(other),
            })?;

        let metadata = RoundMetadata {
            declarer_id: declaration.declarer_id,
            game_type_id: Some(declaration.game_type_id),
            kontra_ids: Some(declaration.kontra_ids.clone()),
            sitting_out_id: declaration.sitting_out_id,
        };
        self.commit_round(deltas, metadata)
    }

    /// Removes the most recent round and takes its deltas back off the scores.
    pub fn undo_last(&mut self) -> Result<Round, GameError> {
        let last = self.ledger.last().ok_or(GameError::EmptyLedger)?;
        for player in &self.players {
            if player.score.checked_sub(last.delta_for(player.id)).is_none() {
                return Err(GameError::InvalidRound(format!(
                    "taking round {} back would overflow {}'s score",
                    last.round_number, player.name
                )));
            }
        }

        let round = self.ledger.undo_last()?;
        for player in &mut self.players {
            player.score -= round.delta_for(player.id);
        }

        debug!(round_number = round.round_number, "Round undone");
        Ok(round)
    }

    /// Drops every player and round; the session is no longer started.
    pub fn reset(&mut self) {
        self.players.clear();
        self.ledger.clear();
    }

    pub(super) fn validate_round(
        &self,
        deltas: &DeltaMap,
        metadata: &RoundMetadata,
    ) -> Result<(), GameError> {
        let invalid = |reason: String| Err(GameError::InvalidRound(reason));

        let roster: BTreeSet<PlayerId> = self.players.iter().map(|p| p.id).collect();
        let delta_keys: BTreeSet<PlayerId> = deltas.keys().copied().collect();
        if delta_keys != roster {
            return invalid("every player needs exactly one delta".to_string());
        }

        if let Some(declarer_id) = metadata.declarer_id {
            if !roster.contains(&declarer_id) {
                return invalid(format!("declarer {declarer_id} is not playing"));
            }
        }

        if let Some(sitting_out_id) = metadata.sitting_out_id {
            if self.players.len() != MAX_PLAYERS {
                return invalid("only a four player table has someone sitting out".to_string());
            }
            if !roster.contains(&sitting_out_id) {
                return invalid(format!("sitting-out player {sitting_out_id} is not playing"));
            }
            if metadata.declarer_id == Some(sitting_out_id) {
                return invalid("the declarer cannot sit out".to_string());
            }
            if deltas.get(&sitting_out_id).copied().unwrap_or_default() != 0 {
                return invalid("the sitting-out player cannot score".to_string());
            }
        }

        if let Some(kontra_ids) = &metadata.kontra_ids {
            for id in kontra_ids {
                if !roster.contains(id) {
                    return invalid(format!("kontra caller {id} is not playing"));
                }
                if metadata.declarer_id == Some(*id) {
                    return invalid("the declarer cannot call kontra".to_string());
                }
                if metadata.sitting_out_id == Some(*id) {
                    return invalid("the sitting-out player cannot call kontra".to_string());
                }
            }
        }

        if let Some(game_type_id) = metadata.game_type_id {
            if catalog::lookup(game_type_id).is_err() {
                return invalid(format!("unknown game type {game_type_id}"));
            }
        }

        for player in &self.players {
            let delta = deltas.get(&player.id).copied().unwrap_or_default();
            if player.score.checked_add(delta).is_none() {
                return invalid(format!("{}'s score would overflow", player.name));
            }
        }

        Ok(())
    }
}
