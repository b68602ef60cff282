use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{delta_sum, DeltaMap, GameTypeDef, KontraRule, PlayerId, ScoringError};

/// A declared round as gathered from the table: who declared which game,
/// whether it was won, and who raised it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    #[serde(default)]
    pub declarer_id: Option<PlayerId>,
    pub game_type_id: u32,
    pub won: bool,
    #[serde(default)]
    pub kontra_ids: BTreeSet<PlayerId>,
    #[serde(default)]
    pub sitting_out_id: Option<PlayerId>,
}

fn kontra_multiplier(raised: bool) -> i32 {
    if raised {
        2
    } else {
        1
    }
}

/// Turns a declaration into the per-player deltas of the round.
///
/// `roster` lists every player of the session. The declarer plays against
/// every active opponent; a sitting-out player (four player tables only)
/// receives a zero delta. The result always sums to zero.
pub fn calculate_round(
    roster: &[PlayerId],
    declaration: &Declaration,
    game_type: &GameTypeDef,
) -> Result<DeltaMap, ScoringError> {
    let declarer_id = validate_declaration(roster, declaration, game_type)?;

    let base = game_type.value()?;
    let sign = if declaration.won { 1 } else { -1 };

    let opponents: Vec<PlayerId> = roster
        .iter()
        .copied()
        .filter(|id| *id != declarer_id && Some(*id) != declaration.sitting_out_id)
        .collect();

    let mut deltas = DeltaMap::new();
    let declarer_delta = match game_type.kontra_rule() {
        KontraRule::PerOpponent => {
            let mut total = 0;
            for id in &opponents {
                let stake = base * kontra_multiplier(declaration.kontra_ids.contains(id)) * sign;
                deltas.insert(*id, -stake);
                total += stake;
            }
            total
        }
        KontraRule::Uniform => {
            let stake = base * kontra_multiplier(!declaration.kontra_ids.is_empty()) * sign;
            for id in &opponents {
                deltas.insert(*id, -stake);
            }
            stake * opponents.len() as i32
        }
    };
    deltas.insert(declarer_id, declarer_delta);

    if let Some(sitting_out_id) = declaration.sitting_out_id {
        deltas.insert(sitting_out_id, 0);
    }

    let sum = delta_sum(&deltas);
    if sum != 0 {
        return Err(ScoringError::InternalInvariantViolation { sum });
    }

    Ok(deltas)
}

fn validate_declaration(
    roster: &[PlayerId],
    declaration: &Declaration,
    game_type: &GameTypeDef,
) -> Result<PlayerId, ScoringError> {
    let invalid = |reason: String| Err(ScoringError::InvalidDeclaration(reason));

    if !(3..=4).contains(&roster.len()) {
        return invalid(format!("a round needs 3 or 4 players, got {}", roster.len()));
    }

    if declaration.game_type_id != game_type.id {
        return invalid(format!(
            "declared game type {} does not match game type {}",
            declaration.game_type_id, game_type.id
        ));
    }

    let Some(declarer_id) = declaration.declarer_id else {
        return invalid("no declarer selected".to_string());
    };
    if !roster.contains(&declarer_id) {
        return invalid(format!("declarer {declarer_id} is not playing"));
    }

    match (roster.len(), declaration.sitting_out_id) {
        (4, None) => return invalid("a four player round needs a sitting-out player".to_string()),
        (4, Some(id)) if !roster.contains(&id) => {
            return invalid(format!("sitting-out player {id} is not playing"));
        }
        (4, Some(id)) if id == declarer_id => {
            return invalid("the declarer cannot sit out".to_string());
        }
        (3, Some(_)) => {
            return invalid("nobody sits out of a three player round".to_string());
        }
        _ => {}
    }

    for id in &declaration.kontra_ids {
        if *id == declarer_id {
            return invalid("the declarer cannot call kontra".to_string());
        }
        if Some(*id) == declaration.sitting_out_id {
            return invalid("the sitting-out player cannot call kontra".to_string());
        }
        if !roster.contains(id) {
            return invalid(format!("kontra caller {id} is not playing"));
        }
    }

    Ok(declarer_id)
}

/// Spreads a loss of `amount` points from `loser_id` evenly over the other
/// active players. Points that do not divide evenly go one each to the
/// earliest players in roster order.
pub fn split_loss(
    roster: &[PlayerId],
    loser_id: PlayerId,
    amount: i32,
    sitting_out_id: Option<PlayerId>,
) -> Result<DeltaMap, ScoringError> {
    if amount <= 0 {
        return Err(ScoringError::InvalidDeclaration(
            "the lost amount must be positive".to_string(),
        ));
    }
    if !roster.contains(&loser_id) {
        return Err(ScoringError::InvalidDeclaration(format!(
            "player {loser_id} is not playing"
        )));
    }
    if sitting_out_id == Some(loser_id) {
        return Err(ScoringError::InvalidDeclaration(
            "the sitting-out player cannot lose points".to_string(),
        ));
    }

    let receivers: Vec<PlayerId> = roster
        .iter()
        .copied()
        .filter(|id| *id != loser_id && Some(*id) != sitting_out_id)
        .collect();
    if receivers.is_empty() {
        return Err(ScoringError::InvalidDeclaration(
            "nobody to receive the points".to_string(),
        ));
    }

    let share = amount / receivers.len() as i32;
    let remainder = (amount % receivers.len() as i32) as usize;

    let mut deltas: DeltaMap = roster.iter().map(|id| (*id, 0)).collect();
    deltas.insert(loser_id, -amount);
    for (index, id) in receivers.iter().enumerate() {
        let extra = if index < remainder { 1 } else { 0 };
        deltas.insert(*id, share + extra);
    }

    let sum = delta_sum(&deltas);
    if sum != 0 {
        return Err(ScoringError::InternalInvariantViolation { sum });
    }
    Ok(deltas)
}
