use crate::scoring::PlayerId;

use super::Player;

/// The player holding the highest score on their own. Ties and an empty
/// table have no leader.
pub fn leader(players: &[Player]) -> Option<PlayerId> {
    let top = players.iter().map(|p| p.score).max()?;
    let mut leaders = players.iter().filter(|p| p.score == top);

    match (leaders.next(), leaders.next()) {
        (Some(player), None) => Some(player.id),
        _ => None,
    }
}

/// Players ordered by score, highest first. Equal scores keep roster order.
pub fn standings(players: &[Player]) -> Vec<&Player> {
    let mut ranked: Vec<&Player> = players.iter().collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}
