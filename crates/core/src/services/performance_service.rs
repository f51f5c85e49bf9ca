use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::models::history::PositionHistoryEntry;
use crate::models::performance::{
    GainSummary, PerformanceDataPoint, PerformanceMetrics, PerformanceReport, TimeRange,
};
use crate::models::position::Position;
use crate::services::ledger_service::LedgerService;
use crate::services::round_cents;
use crate::services::valuation_service::ValuationService;
use crate::services::window_service::WindowService;

/// Builds chart-ready performance series from positions and history.
///
/// Stateless: every call is a pure function of its inputs and of the single
/// `now` it is given, so two calls with the same arguments return the same
/// result. The ledger is rebuilt from scratch on each call.
pub struct PerformanceService {
    ledger_service: LedgerService,
    valuation_service: ValuationService,
    window_service: WindowService,
}

impl PerformanceService {
    pub fn new() -> Self {
        Self {
            ledger_service: LedgerService::new(),
            valuation_service: ValuationService::new(),
            window_service: WindowService::new(),
        }
    }

    /// Run the whole pipeline for one window.
    ///
    /// Replays `history` for realized gains and lifecycle anomalies, builds
    /// the series for `range` and the five-window metrics from `positions`.
    /// An empty `positions` or `history` yields an empty series and zeroed
    /// metrics; the ledger, gains and mismatches are still reported.
    pub fn compute(
        &self,
        positions: &[Position],
        history: &[PositionHistoryEntry],
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> PerformanceReport {
        let outcome = self.ledger_service.replay(history);
        let mismatches = self.ledger_service.reconcile(&outcome, positions);
        for mismatch in &mismatches {
            warn!(
                "Share count mismatch for {}: history replays to {}, snapshot holds {}",
                mismatch.symbol, mismatch.ledger_shares, mismatch.snapshot_shares
            );
        }

        let realized = outcome.state.realized_gain_loss;
        let unrealized: f64 = self
            .window_service
            .eligible_positions(positions, now)
            .iter()
            .map(|p| p.unrealized_gain_loss())
            .sum();

        // Without both a snapshot and a log there is nothing to chart
        let (series, metrics) = if positions.is_empty() || history.is_empty() {
            debug!(
                "Nothing to chart: {} positions, {} history entries",
                positions.len(),
                history.len()
            );
            (Vec::new(), PerformanceMetrics::default())
        } else {
            (
                self.build_series(positions, range, now),
                self.metrics(positions, now),
            )
        };

        debug!(
            "Computed {range} performance as of {now}: {} points, {} ledger snapshots, {} anomalies",
            series.len(),
            outcome.snapshots.len(),
            outcome.anomalies.len()
        );

        PerformanceReport {
            as_of: now,
            range,
            series,
            metrics,
            ledger: outcome.snapshots,
            gains: GainSummary {
                realized,
                unrealized,
                total: realized + unrealized,
            },
            anomalies: outcome.anomalies,
            mismatches,
        }
    }

    /// Evenly stepped series for `range`, ending exactly at `now`.
    ///
    /// Each point is a 100-based index against the cost of the positions
    /// already open at the window start. Empty when that cost is zero (no
    /// eligible positions, or none open at the start).
    pub fn build_series(
        &self,
        positions: &[Position],
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Vec<PerformanceDataPoint> {
        let Some(start) = self.window_service.window_start(positions, range, now) else {
            return Vec::new();
        };
        let eligible = self.window_service.eligible_positions(positions, now);

        let initial_investment: f64 = eligible
            .iter()
            .filter(|p| p.purchase_date <= start)
            .map(|p| p.cost_basis())
            .sum();
        if initial_investment.abs() <= f64::EPSILON {
            debug!("No investment at {range} window start {start}; empty series");
            return Vec::new();
        }

        let point_at = |at: DateTime<Utc>| {
            let value = self.valuation_service.portfolio_value_at(&eligible, at, now);
            PerformanceDataPoint {
                timestamp: at,
                percentage_change: round_cents(
                    100.0 + (value - initial_investment) / initial_investment * 100.0,
                ),
            }
        };

        let step = range.step();
        let mut series = Vec::new();
        let mut current = start;
        while current <= now {
            series.push(point_at(current));
            current = match current.checked_add_signed(step) {
                Some(next) => next,
                None => break,
            };
        }

        if series.last().map_or(true, |p| p.timestamp != now) {
            series.push(point_at(now));
        }

        series
    }

    /// Final value of the week, month, year-to-date, year and all-time
    /// series, each computed independently. `0.0` for an empty series.
    pub fn metrics(&self, positions: &[Position], now: DateTime<Utc>) -> PerformanceMetrics {
        let last = |range: TimeRange| {
            self.build_series(positions, range, now)
                .last()
                .map_or(0.0, |p| p.percentage_change)
        };

        PerformanceMetrics {
            week: last(TimeRange::OneWeek),
            month: last(TimeRange::OneMonth),
            ytd: last(TimeRange::YearToDate),
            year: last(TimeRange::OneYear),
            total: last(TimeRange::All),
        }
    }
}

impl Default for PerformanceService {
    fn default() -> Self {
        Self::new()
    }
}
