use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::anomaly::EventAnomaly;
use super::ledger::{LedgerSnapshot, ShareMismatch};
use crate::errors::CoreError;

/// Named lookback window for a performance series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[default]
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "YTD")]
    YearToDate,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "ALL")]
    All,
}

impl TimeRange {
    /// All tokens, shortest window first.
    pub const ALL_RANGES: [TimeRange; 6] = [
        TimeRange::OneDay,
        TimeRange::OneWeek,
        TimeRange::OneMonth,
        TimeRange::YearToDate,
        TimeRange::OneYear,
        TimeRange::All,
    ];

    /// Distance between two consecutive series points.
    pub fn step(&self) -> Duration {
        match self {
            TimeRange::OneDay => Duration::hours(1),
            _ => Duration::days(1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::OneDay => "1D",
            TimeRange::OneWeek => "1W",
            TimeRange::OneMonth => "1M",
            TimeRange::YearToDate => "YTD",
            TimeRange::OneYear => "1Y",
            TimeRange::All => "ALL",
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimeRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_uppercase();
        TimeRange::ALL_RANGES
            .into_iter()
            .find(|r| r.as_str() == token)
            .ok_or_else(|| {
                CoreError::ValidationError(format!(
                    "Unknown time range '{s}': expected one of 1D, 1W, 1M, YTD, 1Y, ALL"
                ))
            })
    }
}

/// A single chartable point.
///
/// `percentage_change` is a 100-based index: 100 means "worth exactly the
/// initial investment of the window".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceDataPoint {
    pub timestamp: DateTime<Utc>,
    pub percentage_change: f64,
}

/// Final value of each of the five standard windows.
///
/// A window with no meaningful baseline reports `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub week: f64,
    pub month: f64,
    pub ytd: f64,
    pub year: f64,
    pub total: f64,
}

/// Realized vs. unrealized split of the portfolio's gains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GainSummary {
    /// Locked in by closes, from the ledger replay
    pub realized: f64,

    /// Paper gain of held positions at their current prices
    pub unrealized: f64,

    /// realized + unrealized
    pub total: f64,
}

/// Everything one performance computation produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// The instant the computation was pinned to
    pub as_of: DateTime<Utc>,

    /// Window the series was built for
    pub range: TimeRange,

    /// Chartable series, ascending by timestamp
    pub series: Vec<PerformanceDataPoint>,

    /// Five-window summary
    pub metrics: PerformanceMetrics,

    /// One snapshot per distinct action instant of the replayed log
    pub ledger: Vec<LedgerSnapshot>,

    pub gains: GainSummary,

    /// Log entries skipped during normalization or replay
    pub anomalies: Vec<EventAnomaly>,

    /// Symbols whose replayed share count disagrees with the snapshot
    pub mismatches: Vec<ShareMismatch>,
}

impl PerformanceReport {
    /// Last point of the series, if any.
    pub fn latest(&self) -> Option<&PerformanceDataPoint> {
        self.series.last()
    }
}
