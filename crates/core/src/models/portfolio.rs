use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::history::PositionHistoryEntry;
use super::position::Position;
use super::settings::Settings;

/// The main data container: what the storage collaborator loads and saves.
///
/// Contains: the current positions snapshot, the append-only history log,
/// realized P&L per symbol, and user settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    /// Currently held positions, in insertion order
    pub positions: Vec<Position>,

    /// Append-only log of lifecycle actions, in recording order
    pub history: Vec<PositionHistoryEntry>,

    /// Cumulative realized gain per symbol (kept after a full close)
    #[serde(default)]
    pub realized_pnl: HashMap<String, f64>,

    #[serde(default)]
    pub settings: Settings,
}

impl Portfolio {
    /// Build a portfolio from externally loaded records.
    pub fn from_parts(positions: Vec<Position>, history: Vec<PositionHistoryEntry>) -> Self {
        Self {
            positions,
            history,
            ..Self::default()
        }
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        let upper = symbol.to_uppercase();
        self.positions.iter().find(|p| p.symbol == upper)
    }
}
