use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::game::{GameState, Round};
use crate::scoring::{catalog, PlayerId};

use super::{format_delta, ExportError};

/// Columns that follow the per-player columns in the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum TrailingColumn {
    Declarer,
    Game,
    Kontra,
    #[strum(serialize = "Sitting out")]
    SittingOut,
}

const ROUND_HEADER: &str = "Round";
const TOTAL_LABEL: &str = "Total";

/// Writes the session history as CSV: one row per round, oldest first,
/// followed by a totals row with each player's running score.
pub fn to_csv(state: &GameState) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    let mut header = vec![ROUND_HEADER.to_string()];
    header.extend(state.players().iter().map(|p| p.name.clone()));
    header.extend(TrailingColumn::iter().map(|column| column.to_string()));
    writer.write_record(&header)?;

    for round in state.rounds() {
        writer.write_record(round_row(state, round))?;
    }

    let mut totals = vec![TOTAL_LABEL.to_string()];
    totals.extend(state.players().iter().map(|p| p.score.to_string()));
    totals.extend(TrailingColumn::iter().map(|_| String::new()));
    writer.write_record(&totals)?;

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

fn round_row(state: &GameState, round: &Round) -> Vec<String> {
    let name_of = |id: PlayerId| {
        state
            .player(id)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    };

    let mut row = vec![round.round_number.to_string()];
    row.extend(
        state
            .players()
            .iter()
            .map(|p| format_delta(round.delta_for(p.id))),
    );

    for column in TrailingColumn::iter() {
        let cell = match column {
            TrailingColumn::Declarer => round.declarer_id.map(name_of).unwrap_or_default(),
            TrailingColumn::Game => round
                .game_type_id
                .and_then(|id| catalog::lookup(id).ok())
                .map(|def| def.name.to_string())
                .unwrap_or_default(),
            TrailingColumn::Kontra => round
                .kontra_ids
                .iter()
                .flatten()
                .map(|id| name_of(*id))
                .collect::<Vec<_>>()
                .join(", "),
            TrailingColumn::SittingOut => round.sitting_out_id.map(name_of).unwrap_or_default(),
        };
        row.push(cell);
    }

    row
}
