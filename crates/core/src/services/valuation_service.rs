use chrono::{DateTime, Utc};

use crate::models::position::Position;

/// Estimates what a held position was worth at a past instant.
///
/// No historical quotes exist, so the price is interpolated linearly in time
/// between the purchase price (at `purchase_date`) and the live price (at
/// `now`). Charts are defined relative to this approximation.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Estimated price per share at `at`, or `None` when the position was
    /// not yet open.
    ///
    /// - `at < purchase_date` → `None`
    /// - `at >= now` → current price (no extrapolation)
    /// - `purchase_date == now` → current price
    pub fn interpolated_price(
        &self,
        position: &Position,
        at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<f64> {
        if at < position.purchase_date {
            return None;
        }
        if at >= now {
            return Some(position.price);
        }

        let progress = Self::progress_ratio(position.purchase_date, at, now);
        Some(position.purchase_price + (position.price - position.purchase_price) * progress)
    }

    /// Estimated market value of the whole position at `at` (zero before it opened).
    pub fn position_value_at(
        &self,
        position: &Position,
        at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> f64 {
        self.interpolated_price(position, at, now)
            .map_or(0.0, |price| price * position.shares)
    }

    /// Sum of [`position_value_at`](Self::position_value_at) over `positions`.
    pub fn portfolio_value_at(
        &self,
        positions: &[&Position],
        at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> f64 {
        positions
            .iter()
            .map(|p| self.position_value_at(p, at, now))
            .sum()
    }

    /// Fraction of the purchase→now span elapsed at `at`, in milliseconds.
    fn progress_ratio(purchase_date: DateTime<Utc>, at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let span = (now - purchase_date).num_milliseconds();
        if span <= 0 {
            return 1.0;
        }
        let elapsed = (at - purchase_date).num_milliseconds();
        (elapsed as f64 / span as f64).clamp(0.0, 1.0)
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
