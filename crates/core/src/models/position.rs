use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A currently held position.
///
/// The snapshot of positions is owned by the caller and refreshed out of band
/// (quotes arrive from the pricing service). A fully closed symbol never
/// appears in the snapshot, so `shares` is always positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Ticker symbol, uppercased (e.g., "AAPL", "MSFT")
    pub symbol: String,

    /// Number of shares currently held
    pub shares: f64,

    /// Current market price per share
    pub price: f64,

    /// Instant of the original opening event (not moved by later increases)
    pub purchase_date: DateTime<Utc>,

    /// Weighted-average cost per share for the shares currently held
    pub purchase_price: f64,
}

impl Position {
    pub fn new(
        symbol: impl Into<String>,
        shares: f64,
        price: f64,
        purchase_date: DateTime<Utc>,
        purchase_price: f64,
    ) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            shares,
            price,
            purchase_date,
            purchase_price,
        }
    }

    /// Market value at the current price.
    pub fn market_value(&self) -> f64 {
        self.shares * self.price
    }

    /// Dollars committed to the shares currently held.
    pub fn cost_basis(&self) -> f64 {
        self.shares * self.purchase_price
    }

    /// Paper profit/loss against the current price.
    pub fn unrealized_gain_loss(&self) -> f64 {
        self.market_value() - self.cost_basis()
    }
}
