use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate ledger state after every action sharing one `date_of_action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub at: DateTime<Utc>,

    /// Cost of opened shares plus every realized gain/loss so far
    pub portfolio_value: f64,

    /// Cost basis of the shares still open
    pub portfolio_cost: f64,

    /// Cumulative realized gain/loss so far
    pub realized_gain_loss: f64,

    /// 100-based performance-to-date (100 when cost is zero)
    pub performance: f64,
}

/// A symbol whose replayed share count disagrees with the positions snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareMismatch {
    pub symbol: String,
    /// Shares left open after replaying the log (0 when not tracked)
    pub ledger_shares: f64,
    /// Shares in the snapshot (0 when absent)
    pub snapshot_shares: f64,
}
