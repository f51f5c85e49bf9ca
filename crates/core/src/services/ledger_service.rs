use log::{debug, warn};
use std::collections::{BTreeSet, HashMap};

use crate::models::anomaly::{AnomalyKind, EventAnomaly};
use crate::models::history::{ActionType, PositionHistoryEntry};
use crate::models::ledger::{LedgerSnapshot, ShareMismatch};
use crate::models::position::Position;
use crate::services::history_service::{HistoryService, NormalizedHistory};

/// Share counts at or below this are treated as a closed position.
pub const SHARE_EPSILON: f64 = 1e-9;

/// Largest share difference tolerated when reconciling against the snapshot.
const RECONCILE_TOLERANCE: f64 = 1e-6;

/// Running totals for one open symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SymbolBook {
    pub shares: f64,
    /// Dollars committed to the open shares
    pub cost_basis: f64,
}

/// State of one replay. Created fresh per replay and never shared.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    books: HashMap<String, SymbolBook>,
    pub portfolio_value: f64,
    pub portfolio_cost: f64,
    pub realized_gain_loss: f64,
}

impl LedgerState {
    /// Open shares of `symbol` (0 when not tracked).
    pub fn shares(&self, symbol: &str) -> f64 {
        self.books.get(symbol).map_or(0.0, |b| b.shares)
    }

    /// Cost basis of `symbol` (0 when not tracked).
    pub fn cost_basis(&self, symbol: &str) -> f64 {
        self.books.get(symbol).map_or(0.0, |b| b.cost_basis)
    }

    pub fn book(&self, symbol: &str) -> Option<&SymbolBook> {
        self.books.get(symbol)
    }

    /// Symbols still open, sorted.
    pub fn open_symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.books.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }

    /// 100-based performance-to-date.
    ///
    /// Realized gains stay in `portfolio_value` while `portfolio_cost` only
    /// covers open shares, so a profitable close lifts the figure for good.
    pub fn performance(&self) -> f64 {
        if self.portfolio_cost.abs() <= f64::EPSILON {
            return 100.0;
        }
        100.0 + ((self.portfolio_value - self.portfolio_cost) / self.portfolio_cost) * 100.0
    }

    fn snapshot(&self, at: chrono::DateTime<chrono::Utc>) -> LedgerSnapshot {
        LedgerSnapshot {
            at,
            portfolio_value: self.portfolio_value,
            portfolio_cost: self.portfolio_cost,
            realized_gain_loss: self.realized_gain_loss,
            performance: self.performance(),
        }
    }
}

/// How a single action went through the replay.
enum Applied {
    Clean,
    /// Applied, but breaks a lifecycle rule
    Flagged(AnomalyKind),
    /// Left out of the replay
    Skipped(AnomalyKind),
}

/// Result of replaying a history log.
#[derive(Debug, Clone, Default)]
pub struct LedgerOutcome {
    /// Final state after the last action
    pub state: LedgerState,

    /// One snapshot per distinct `date_of_action`, ascending
    pub snapshots: Vec<LedgerSnapshot>,

    /// Entries skipped by normalization or flagged by the lifecycle rules, by log index
    pub anomalies: Vec<EventAnomaly>,
}

/// Replays the history log into cost-basis accounting.
///
/// Opening actions add shares at cost. Closing actions remove cost basis
/// pro rata to the shares closed and book the difference to the sale
/// proceeds as realized gain/loss.
pub struct LedgerService {
    history_service: HistoryService,
}

impl LedgerService {
    pub fn new() -> Self {
        Self {
            history_service: HistoryService::new(),
        }
    }

    /// Normalize then replay a raw log.
    pub fn replay(&self, history: &[PositionHistoryEntry]) -> LedgerOutcome {
        let normalized = self.history_service.normalize(history);
        self.replay_normalized(&normalized)
    }

    /// Replay an already normalized log.
    pub fn replay_normalized(&self, normalized: &NormalizedHistory) -> LedgerOutcome {
        let mut state = LedgerState::default();
        let mut snapshots = Vec::new();
        let mut anomalies = normalized.anomalies.clone();

        let mut entries = normalized.entries.iter().peekable();
        while let Some(indexed) = entries.next() {
            let entry = &indexed.entry;
            let flagged = match Self::apply(&mut state, entry) {
                Applied::Clean => None,
                Applied::Flagged(kind) => {
                    warn!(
                        "Applied history entry #{} ({} {}) despite: {kind}",
                        indexed.index, entry.action_type, entry.symbol
                    );
                    Some(kind)
                }
                Applied::Skipped(kind) => {
                    warn!(
                        "Skipping history entry #{} ({} {}): {kind}",
                        indexed.index, entry.action_type, entry.symbol
                    );
                    Some(kind)
                }
            };
            if let Some(kind) = flagged {
                anomalies.push(EventAnomaly {
                    index: indexed.index,
                    symbol: entry.symbol.clone(),
                    kind,
                });
            }

            // Emit once all actions of this instant are applied
            let instant_done = entries
                .peek()
                .map_or(true, |next| next.entry.date_of_action != entry.date_of_action);
            if instant_done {
                snapshots.push(state.snapshot(entry.date_of_action));
            }
        }

        anomalies.sort_by_key(|a| a.index);
        debug!(
            "Replayed {} history entries: {} open symbols, {} anomalies",
            normalized.entries.len(),
            state.books.len(),
            anomalies.len()
        );

        LedgerOutcome {
            state,
            snapshots,
            anomalies,
        }
    }

    /// Compare replayed share counts with the positions snapshot.
    ///
    /// Returns one entry per symbol that differs, sorted by symbol.
    pub fn reconcile(&self, outcome: &LedgerOutcome, positions: &[Position]) -> Vec<ShareMismatch> {
        let mut snapshot_shares: HashMap<&str, f64> = HashMap::new();
        for position in positions {
            *snapshot_shares.entry(position.symbol.as_str()).or_insert(0.0) += position.shares;
        }

        let symbols: BTreeSet<&str> = snapshot_shares
            .keys()
            .copied()
            .chain(outcome.state.books.keys().map(String::as_str))
            .collect();

        symbols
            .into_iter()
            .filter_map(|symbol| {
                let ledger_shares = outcome.state.shares(symbol);
                let held = snapshot_shares.get(symbol).copied().unwrap_or(0.0);
                if (ledger_shares - held).abs() > RECONCILE_TOLERANCE {
                    Some(ShareMismatch {
                        symbol: symbol.to_string(),
                        ledger_shares,
                        snapshot_shares: held,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// Apply one action and report the lifecycle rule it breaks, if any.
    ///
    /// A `NEW_POSITION` on an already open symbol still adds its shares at
    /// cost, like an increase, and is only flagged as `DuplicateOpen`.
    /// Increases and closes with nothing open are skipped.
    fn apply(state: &mut LedgerState, entry: &PositionHistoryEntry) -> Applied {
        match entry.action_type {
            ActionType::NewPosition => {
                let already_open = state.books.contains_key(&entry.symbol);
                Self::add_shares(state, entry);
                if already_open {
                    Applied::Flagged(AnomalyKind::DuplicateOpen)
                } else {
                    Applied::Clean
                }
            }
            ActionType::IncreasePosition => {
                if !state.books.contains_key(&entry.symbol) {
                    return Applied::Skipped(AnomalyKind::NoOpenPosition);
                }
                Self::add_shares(state, entry);
                Applied::Clean
            }
            ActionType::PartialClose | ActionType::ClosePosition => {
                match Self::remove_shares(state, entry) {
                    Ok(()) => Applied::Clean,
                    Err(kind) => Applied::Skipped(kind),
                }
            }
            ActionType::Unknown => Applied::Skipped(AnomalyKind::UnknownActionType),
        }
    }

    fn add_shares(state: &mut LedgerState, entry: &PositionHistoryEntry) {
        let cost = entry.notional();
        let book = state.books.entry(entry.symbol.clone()).or_default();
        book.shares += entry.shares;
        book.cost_basis += cost;
        state.portfolio_cost += cost;
        state.portfolio_value += cost;
    }

    fn remove_shares(state: &mut LedgerState, entry: &PositionHistoryEntry) -> Result<(), AnomalyKind> {
        let book = state
            .books
            .get_mut(&entry.symbol)
            .ok_or(AnomalyKind::NoOpenPosition)?;

        if entry.shares > book.shares + SHARE_EPSILON {
            warn!(
                "{} of {} closes {} shares but only {} are open; treating as a full close",
                entry.action_type, entry.symbol, entry.shares, book.shares
            );
        }

        let closed = entry.shares.min(book.shares);
        let fully_closed = book.shares - closed <= SHARE_EPSILON;
        let cost_removed = if fully_closed {
            book.cost_basis
        } else {
            book.cost_basis * (closed / book.shares)
        };
        let realized = closed * entry.price - cost_removed;

        state.portfolio_value += realized;
        state.portfolio_cost -= cost_removed;
        state.realized_gain_loss += realized;

        if fully_closed {
            state.books.remove(&entry.symbol);
        } else {
            book.shares -= closed;
            book.cost_basis -= cost_removed;
        }

        // Drop float residue once nothing is open
        if state.books.is_empty() {
            state.portfolio_cost = 0.0;
        }
        Ok(())
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
