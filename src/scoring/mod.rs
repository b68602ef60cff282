pub mod calculator;
pub mod catalog;

mod errors;

pub use calculator::{calculate_round, split_loss, Declaration};
pub use catalog::{GameTypeDef, KontraRule};
pub use errors::ScoringError;

use std::collections::BTreeMap;

/// Stable per-session player identifier.
pub type PlayerId = u32;

/// Per-player point change for a single round, keyed by player id.
pub type DeltaMap = BTreeMap<PlayerId, i32>;

/// Sum of all deltas in a round. A valid round always sums to zero.
/// Summed in `i64` so large `i32` deltas cannot wrap to a false zero.
pub fn delta_sum(deltas: &DeltaMap) -> i64 {
    deltas.values().map(|delta| i64::from(*delta)).sum()
}
