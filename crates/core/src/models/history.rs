use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle step recorded in the position history log.
///
/// Serialized in the log's wire form (`NEW_POSITION`, ...). Any other string
/// deserializes to [`ActionType::Unknown`] so a single bad entry does not
/// reject the whole log; the normalizer reports it instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    /// First purchase of a symbol
    NewPosition,
    /// Additional purchase of an already held symbol
    IncreasePosition,
    /// Sale of part of the held shares
    PartialClose,
    /// Sale of all held shares
    ClosePosition,
    /// Unrecognized type string
    #[serde(other)]
    Unknown,
}

impl ActionType {
    /// `true` for the two actions that add shares.
    pub fn is_opening(&self) -> bool {
        matches!(self, ActionType::NewPosition | ActionType::IncreasePosition)
    }

    /// `true` for the two actions that remove shares.
    pub fn is_closing(&self) -> bool {
        matches!(self, ActionType::PartialClose | ActionType::ClosePosition)
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::NewPosition => write!(f, "NEW_POSITION"),
            ActionType::IncreasePosition => write!(f, "INCREASE_POSITION"),
            ActionType::PartialClose => write!(f, "PARTIAL_CLOSE"),
            ActionType::ClosePosition => write!(f, "CLOSE_POSITION"),
            ActionType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A single entry of the append-only position history log.
///
/// `timestamp` is when the entry was recorded; `date_of_action` is when the
/// trade economically happened and is the axis used for replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionHistoryEntry {
    /// Unique identifier
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    #[serde(rename = "type")]
    pub action_type: ActionType,

    pub symbol: String,

    /// Shares affected by this action (always positive)
    pub shares: f64,

    /// Execution price per share
    pub price: f64,

    /// Ingestion instant
    pub timestamp: DateTime<Utc>,

    /// Economic instant of the action
    pub date_of_action: DateTime<Utc>,

    /// Share count after an increase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_shares: Option<f64>,

    /// Weighted-average price after an increase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_average_price: Option<f64>,

    /// Gain locked in by a close
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realized_gain: Option<f64>,
}

impl PositionHistoryEntry {
    /// Create an entry recorded at the same instant it happened.
    pub fn new(
        action_type: ActionType,
        symbol: impl Into<String>,
        shares: f64,
        price: f64,
        date_of_action: DateTime<Utc>,
    ) -> Self {
        Self::recorded_at(action_type, symbol, shares, price, date_of_action, date_of_action)
    }

    /// Create an entry whose ingestion time differs from the action time
    /// (e.g., a trade logged after the fact).
    pub fn recorded_at(
        action_type: ActionType,
        symbol: impl Into<String>,
        shares: f64,
        price: f64,
        date_of_action: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action_type,
            symbol: symbol.into().to_uppercase(),
            shares,
            price,
            timestamp,
            date_of_action,
            total_shares: None,
            new_average_price: None,
            realized_gain: None,
        }
    }

    /// Notional of the action at its execution price.
    pub fn notional(&self) -> f64 {
        self.shares * self.price
    }
}
