use serde::{Deserialize, Serialize};

/// Why a history entry was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnomalyKind {
    /// `type` is not one of the four lifecycle actions
    UnknownActionType,
    EmptySymbol,
    /// Zero, negative or non-finite share count
    NonPositiveShares,
    /// Zero, negative or non-finite price
    NonPositivePrice,
    /// `NEW_POSITION` for a symbol that is already open
    DuplicateOpen,
    /// Increase or close for a symbol that is not open
    NoOpenPosition,
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalyKind::UnknownActionType => write!(f, "unknown action type"),
            AnomalyKind::EmptySymbol => write!(f, "empty symbol"),
            AnomalyKind::NonPositiveShares => write!(f, "non-positive shares"),
            AnomalyKind::NonPositivePrice => write!(f, "non-positive price"),
            AnomalyKind::DuplicateOpen => write!(f, "position already open"),
            AnomalyKind::NoOpenPosition => write!(f, "no open position"),
        }
    }
}

/// A malformed history entry, reported instead of failing the computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAnomaly {
    /// Position of the entry in the log as supplied by the caller
    pub index: usize,
    pub symbol: String,
    pub kind: AnomalyKind,
}
