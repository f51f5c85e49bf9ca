pub mod history_service;
pub mod ledger_service;
pub mod performance_service;
pub mod position_service;
pub mod valuation_service;
pub mod window_service;

/// Round to two decimal places (cents, or hundredths of a percent).
pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
