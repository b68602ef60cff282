// The Ulti game table. Values are composite point strings ("4+1" is a four
// point bid played together with a one point parti).

use serde::Serialize;

use super::ScoringError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameTypeDef {
    pub id: u32,
    pub name: &'static str,
    pub base_value: &'static str,
    pub colorless: bool,
}

/// How a kontra call changes the stake of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KontraRule {
    /// Each opponent's kontra only doubles that opponent's own stake.
    PerOpponent,
    /// Any kontra doubles the stake for every opponent.
    Uniform,
}

impl GameTypeDef {
    pub fn value(&self) -> Result<i32, ScoringError> {
        parse_value(self.base_value)
    }

    pub fn kontra_rule(&self) -> KontraRule {
        if self.colorless {
            KontraRule::PerOpponent
        } else {
            KontraRule::Uniform
        }
    }
}

const fn game(id: u32, name: &'static str, base_value: &'static str, colorless: bool) -> GameTypeDef {
    GameTypeDef {
        id,
        name,
        base_value,
        colorless,
    }
}

static CATALOG: [GameTypeDef; 16] = [
    game(1, "parti (színjáték)", "1", false),
    game(2, "piros parti (piros színjáték)", "2", false),
    game(3, "40 -100", "4", false),
    game(4, "négy ász + parti", "4+1", false),
    game(5, "ultimó (ulti) + parti", "4+1", false),
    game(6, "betli", "5", true),
    game(7, "durchmars", "6", true),
    game(8, "piros 40-100", "8", false),
    game(9, "20 -100", "8", false),
    game(10, "piros négy ász + piros parti", "8+2", false),
    game(11, "piros ultimó (piros ulti) + piros parti", "8+2", false),
    game(12, "piros betli", "10", true),
    game(13, "piros durchmars vagy redurchmars", "12", true),
    game(14, "piros 20-100", "16", false),
    game(15, "terített betli", "20", true),
    game(16, "terített durchmars", "24", true),
];

/// All game types in id order.
pub fn all() -> &'static [GameTypeDef] {
    &CATALOG
}

pub fn lookup(game_type_id: u32) -> Result<&'static GameTypeDef, ScoringError> {
    CATALOG
        .iter()
        .find(|def| def.id == game_type_id)
        .ok_or(ScoringError::UnknownGameType(game_type_id))
}

/// Parses a composite point string such as `"8+2"` into its total.
pub fn parse_value(value: &str) -> Result<i32, ScoringError> {
    value.split('+').try_fold(0i32, |total, token| {
        let points = token
            .trim()
            .parse::<i32>()
            .map_err(|_| ScoringError::MalformedValue(value.to_string()))?;
        total
            .checked_add(points)
            .ok_or_else(|| ScoringError::MalformedValue(value.to_string()))
    })
}
