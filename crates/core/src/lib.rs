pub mod errors;
pub mod models;
pub mod services;

use chrono::{DateTime, Utc};
use models::{
    analytics::PositionSummary,
    history::PositionHistoryEntry,
    performance::{PerformanceDataPoint, PerformanceMetrics, PerformanceReport, TimeRange},
    portfolio::Portfolio,
    position::Position,
    settings::Settings,
};
use services::{
    ledger_service::{LedgerOutcome, LedgerService},
    performance_service::PerformanceService,
    position_service::{CloseKind, PositionService},
};
use std::collections::HashMap;

use errors::CoreError;

/// Main entry point for the Stock Tracker core library.
/// Holds the portfolio state and all services needed to operate on it.
///
/// Storage and quotes are the caller's concern: records come in through
/// [`StockTracker::from_portfolio`] and live prices through
/// [`StockTracker::update_price`].
#[must_use]
pub struct StockTracker {
    portfolio: Portfolio,
    position_service: PositionService,
    ledger_service: LedgerService,
    performance_service: PerformanceService,
}

impl std::fmt::Debug for StockTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockTracker")
            .field("positions", &self.portfolio.positions.len())
            .field("history", &self.portfolio.history.len())
            .field("settings", &self.portfolio.settings)
            .finish()
    }
}

impl StockTracker {
    /// Create a brand new empty portfolio with default settings.
    pub fn create_new() -> Self {
        Self::build(Portfolio::default())
    }

    /// Wrap a portfolio loaded by the storage collaborator.
    pub fn from_portfolio(portfolio: Portfolio) -> Self {
        Self::build(portfolio)
    }

    /// Wrap positions and history loaded separately.
    pub fn from_parts(positions: Vec<Position>, history: Vec<PositionHistoryEntry>) -> Self {
        Self::build(Portfolio::from_parts(positions, history))
    }

    /// Borrow the underlying portfolio (e.g., to hand it to storage).
    #[must_use]
    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    // ── Position Management ─────────────────────────────────────────

    /// Buy shares: opens a new position or increases a held one.
    /// Returns the id of the appended history entry.
    pub fn open_position(
        &mut self,
        symbol: &str,
        shares: f64,
        purchase_price: f64,
        current_price: f64,
        date_of_action: DateTime<Utc>,
    ) -> Result<uuid::Uuid, CoreError> {
        self.position_service.open_position(
            &mut self.portfolio,
            symbol,
            shares,
            purchase_price,
            current_price,
            date_of_action,
            Utc::now(),
        )
    }

    /// Sell some or all shares of a held position. Returns the realized gain.
    pub fn close_position(
        &mut self,
        symbol: &str,
        kind: CloseKind,
        close_price: f64,
        at: DateTime<Utc>,
    ) -> Result<f64, CoreError> {
        self.position_service
            .close_position(&mut self.portfolio, symbol, kind, close_price, at)
    }

    /// Set the live price of a held position.
    pub fn update_price(&mut self, symbol: &str, price: f64) -> Result<(), CoreError> {
        self.position_service
            .update_price(&mut self.portfolio, symbol, price)
    }

    /// Set live prices for several symbols; symbols not held are ignored.
    /// Returns how many positions were updated.
    pub fn update_prices(&mut self, prices: &HashMap<String, f64>) -> usize {
        let mut updated = 0;
        for (symbol, price) in prices {
            if self
                .position_service
                .update_price(&mut self.portfolio, symbol, *price)
                .is_ok()
            {
                updated += 1;
            }
        }
        updated
    }

    /// Currently held positions.
    #[must_use]
    pub fn get_positions(&self) -> &[Position] {
        &self.portfolio.positions
    }

    /// A single held position by symbol (case-insensitive).
    #[must_use]
    pub fn get_position(&self, symbol: &str) -> Option<&Position> {
        self.portfolio.position(symbol)
    }

    /// Display figures for every held position, largest value first.
    #[must_use]
    pub fn position_summaries(&self) -> Vec<PositionSummary> {
        self.position_service.summaries(&self.portfolio)
    }

    /// Realized gain accumulated for one symbol.
    #[must_use]
    pub fn realized_pnl(&self, symbol: &str) -> f64 {
        self.portfolio
            .realized_pnl
            .get(&symbol.to_uppercase())
            .copied()
            .unwrap_or(0.0)
    }

    /// Realized gain accumulated across all symbols.
    #[must_use]
    pub fn total_realized_pnl(&self) -> f64 {
        self.portfolio.realized_pnl.values().sum()
    }

    // ── History ─────────────────────────────────────────────────────

    /// All history entries, newest action first.
    #[must_use]
    pub fn get_history(&self) -> Vec<&PositionHistoryEntry> {
        let mut entries: Vec<&PositionHistoryEntry> = self.portfolio.history.iter().collect();
        entries.sort_by(|a, b| b.date_of_action.cmp(&a.date_of_action));
        entries
    }

    /// History entries for one symbol (case-insensitive), newest action first.
    #[must_use]
    pub fn get_history_for_symbol(&self, symbol: &str) -> Vec<&PositionHistoryEntry> {
        let upper = symbol.to_uppercase();
        self.get_history()
            .into_iter()
            .filter(|e| e.symbol == upper)
            .collect()
    }

    /// Share counts per symbol from a forward tally of the history log.
    #[must_use]
    pub fn holdings_from_history(&self) -> HashMap<String, f64> {
        self.position_service
            .holdings_from_history(&self.portfolio.history)
    }

    /// Replay the history log through the cost-basis ledger.
    pub fn replay_ledger(&self) -> LedgerOutcome {
        self.ledger_service.replay(&self.portfolio.history)
    }

    // ── Performance ─────────────────────────────────────────────────

    /// Full performance report for `range`, pinned to `now`.
    pub fn performance(&self, range: TimeRange, now: DateTime<Utc>) -> PerformanceReport {
        self.performance_service.compute(
            &self.portfolio.positions,
            &self.portfolio.history,
            range,
            now,
        )
    }

    /// Full performance report for the configured default range, as of now.
    pub fn performance_now(&self) -> PerformanceReport {
        self.performance(self.portfolio.settings.default_range, Utc::now())
    }

    /// Chartable series for `range`, pinned to `now`. Empty until the
    /// history log has entries.
    #[must_use]
    pub fn performance_series(&self, range: TimeRange, now: DateTime<Utc>) -> Vec<PerformanceDataPoint> {
        if self.portfolio.history.is_empty() {
            return Vec::new();
        }
        self.performance_service
            .build_series(&self.portfolio.positions, range, now)
    }

    /// Week, month, year-to-date, year and all-time figures, pinned to `now`.
    /// Zeroed until the history log has entries.
    #[must_use]
    pub fn performance_metrics(&self, now: DateTime<Utc>) -> PerformanceMetrics {
        if self.portfolio.history.is_empty() {
            return PerformanceMetrics::default();
        }
        self.performance_service
            .metrics(&self.portfolio.positions, now)
    }

    // ── Settings ────────────────────────────────────────────────────

    /// Get current settings.
    #[must_use]
    pub fn get_settings(&self) -> &Settings {
        &self.portfolio.settings
    }

    /// Set the window used by [`StockTracker::performance_now`].
    pub fn set_default_range(&mut self, range: TimeRange) {
        self.portfolio.settings.default_range = range;
    }

    /// Choose whether weighted-average purchase prices are rounded to cents.
    pub fn set_round_average_price(&mut self, round: bool) {
        self.portfolio.settings.round_average_price = round;
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export the history log as a JSON string.
    pub fn export_history_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.portfolio.history)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize history to JSON: {e}")))
    }

    /// Append history entries from a JSON array.
    ///
    /// Entries are appended as-is; malformed ones are reported as anomalies
    /// by the next performance computation rather than rejected here.
    /// Returns the number of entries appended.
    pub fn import_history_from_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let entries: Vec<PositionHistoryEntry> = serde_json::from_str(json)?;
        let count = entries.len();
        self.portfolio.history.extend(entries);
        Ok(count)
    }

    /// Export the full portfolio as JSON (snapshot for debugging/display).
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.portfolio)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize portfolio: {e}")))
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(portfolio: Portfolio) -> Self {
        Self {
            portfolio,
            position_service: PositionService::new(),
            ledger_service: LedgerService::new(),
            performance_service: PerformanceService::new(),
        }
    }
}
