use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display-ready figures for one held position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSummary {
    pub symbol: String,

    /// Shares held
    pub shares: f64,

    /// Weighted-average cost per share
    pub purchase_price: f64,

    pub current_price: f64,

    pub purchase_date: DateTime<Utc>,

    /// shares × current_price
    pub total_value: f64,

    /// (current_price − purchase_price) × shares
    pub profit_loss: f64,

    /// (current_price − purchase_price) / purchase_price × 100
    pub percentage_change: f64,

    /// Gain already locked in by closes of this symbol
    pub realized_pnl: f64,
}
