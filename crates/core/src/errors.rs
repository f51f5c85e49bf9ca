use thiserror::Error;

/// Unified error type for the entire stock-tracker-core library.
///
/// Only the mutating position workflow and parsing can fail. The performance
/// engine never returns an error for data-shape problems; it degrades to
/// neutral results and reports anomalies instead.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Position not found: {0}")]
    PositionNotFound(String),

    #[error("Cannot close {requested} shares of {symbol} — only {held} held")]
    InsufficientShares {
        symbol: String,
        requested: f64,
        held: f64,
    },
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}
