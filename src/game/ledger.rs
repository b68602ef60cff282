use crate::scoring::{delta_sum, DeltaMap};

use super::{GameError, Round, RoundMetadata};

/// Append-only history of committed rounds. Only the most recent round can
/// be taken back out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundLedger {
    rounds: Vec<Round>,
}

impl RoundLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from stored rounds, checking numbering and sums.
    pub fn from_rounds(rounds: Vec<Round>) -> Result<Self, GameError> {
        for (index, round) in rounds.iter().enumerate() {
            let expected = index as u32 + 1;
            if round.round_number != expected {
                return Err(GameError::InvalidRound(format!(
                    "round {} found where round {} was expected",
                    round.round_number, expected
                )));
            }
            check_zero_sum(&round.deltas)?;
        }
        Ok(Self { rounds })
    }

    pub fn append(&mut self, deltas: DeltaMap, metadata: RoundMetadata) -> Result<&Round, GameError> {
        check_zero_sum(&deltas)?;

        let round_number = self.last_round_number() + 1;
        self.rounds.push(Round::new(round_number, deltas, metadata));
        Ok(&self.rounds[self.rounds.len() - 1])
    }

    pub fn undo_last(&mut self) -> Result<Round, GameError> {
        self.rounds.pop().ok_or(GameError::EmptyLedger)
    }

    pub fn history(&self) -> &[Round] {
        &self.rounds
    }

    pub fn last(&self) -> Option<&Round> {
        self.rounds.last()
    }

    pub fn last_round_number(&self) -> u32 {
        self.rounds.last().map(|r| r.round_number).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn clear(&mut self) {
        self.rounds.clear();
    }
}

fn check_zero_sum(deltas: &DeltaMap) -> Result<(), GameError> {
    let sum = delta_sum(deltas);
    if sum != 0 {
        return Err(GameError::InvalidRound(format!(
            "points must sum to zero, got {sum}"
        )));
    }
    Ok(())
}
