use log::warn;

use crate::models::anomaly::{AnomalyKind, EventAnomaly};
use crate::models::history::{ActionType, PositionHistoryEntry};

/// History log after validation and chronological ordering.
#[derive(Debug, Clone, Default)]
pub struct NormalizedHistory {
    /// Valid entries, ascending by `date_of_action`
    pub entries: Vec<IndexedEntry>,

    /// Entries that were skipped
    pub anomalies: Vec<EventAnomaly>,
}

/// A valid history entry along with its position in the caller's log.
#[derive(Debug, Clone)]
pub struct IndexedEntry {
    pub index: usize,
    pub entry: PositionHistoryEntry,
}

/// Validates and orders the raw position history log.
///
/// Pure business logic, no I/O. The log itself is never modified.
pub struct HistoryService;

impl HistoryService {
    pub fn new() -> Self {
        Self
    }

    /// Sort the log ascending by `date_of_action`, skipping malformed entries.
    ///
    /// The sort is stable: entries sharing an instant keep their log order,
    /// so same-day replays are deterministic. Malformed entries are reported
    /// in `anomalies` and never abort the whole log.
    pub fn normalize(&self, history: &[PositionHistoryEntry]) -> NormalizedHistory {
        let mut normalized = NormalizedHistory::default();

        for (index, entry) in history.iter().enumerate() {
            match Self::check_entry(entry) {
                Some(kind) => {
                    warn!(
                        "Skipping history entry #{index} ({} {}): {kind}",
                        entry.action_type, entry.symbol
                    );
                    normalized.anomalies.push(EventAnomaly {
                        index,
                        symbol: entry.symbol.clone(),
                        kind,
                    });
                }
                None => normalized.entries.push(IndexedEntry {
                    index,
                    entry: entry.clone(),
                }),
            }
        }

        normalized.entries.sort_by_key(|e| e.entry.date_of_action);
        normalized
    }

    /// `true` when the entry passes the same checks [`normalize`](Self::normalize)
    /// applies: a known action type, a symbol, and positive finite shares and price.
    pub fn is_valid(entry: &PositionHistoryEntry) -> bool {
        Self::check_entry(entry).is_none()
    }

    /// First rule the entry breaks, if any.
    fn check_entry(entry: &PositionHistoryEntry) -> Option<AnomalyKind> {
        if entry.action_type == ActionType::Unknown {
            return Some(AnomalyKind::UnknownActionType);
        }
        if entry.symbol.trim().is_empty() {
            return Some(AnomalyKind::EmptySymbol);
        }
        if !is_positive(entry.shares) {
            return Some(AnomalyKind::NonPositiveShares);
        }
        if !is_positive(entry.price) {
            return Some(AnomalyKind::NonPositivePrice);
        }
        None
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl Default for HistoryService {
    fn default() -> Self {
        Self::new()
    }
}
