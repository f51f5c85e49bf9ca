use chrono::{DateTime, Datelike, Duration, Months, TimeZone, Utc};
use log::debug;

use crate::models::performance::TimeRange;
use crate::models::position::Position;

/// Maps a [`TimeRange`] to the instant its series starts.
pub struct WindowService;

impl WindowService {
    pub fn new() -> Self {
        Self
    }

    /// Positions that can take part in a computation pinned to `now`.
    ///
    /// A `purchase_date` after `now` (clock skew, bad data) excludes the
    /// position entirely.
    pub fn eligible_positions<'a>(
        &self,
        positions: &'a [Position],
        now: DateTime<Utc>,
    ) -> Vec<&'a Position> {
        positions
            .iter()
            .filter(|p| {
                let eligible = p.purchase_date <= now;
                if !eligible {
                    debug!(
                        "Excluding {}: purchase date {} is after {now}",
                        p.symbol, p.purchase_date
                    );
                }
                eligible
            })
            .collect()
    }

    /// Earliest `purchase_date` among eligible positions.
    pub fn earliest_purchase(&self, positions: &[Position], now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.eligible_positions(positions, now)
            .into_iter()
            .map(|p| p.purchase_date)
            .min()
    }

    /// Start instant of `range`, never earlier than the earliest eligible
    /// purchase. `None` when no position is eligible.
    pub fn window_start(
        &self,
        positions: &[Position],
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let earliest = self.earliest_purchase(positions, now)?;
        let nominal = Self::nominal_start(range, now).unwrap_or(earliest);
        Some(nominal.max(earliest))
    }

    /// Unclamped start of `range`; `None` for `ALL`, which has no fixed lookback.
    fn nominal_start(range: TimeRange, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match range {
            TimeRange::OneDay => now.checked_sub_signed(Duration::days(1)),
            TimeRange::OneWeek => now.checked_sub_signed(Duration::days(7)),
            TimeRange::OneMonth => now.checked_sub_months(Months::new(1)),
            TimeRange::YearToDate => Utc.with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0).single(),
            TimeRange::OneYear => now.checked_sub_months(Months::new(12)),
            TimeRange::All => None,
        }
    }
}

impl Default for WindowService {
    fn default() -> Self {
        Self::new()
    }
}
