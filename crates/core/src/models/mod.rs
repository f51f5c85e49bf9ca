pub mod analytics;
pub mod anomaly;
pub mod history;
pub mod ledger;
pub mod performance;
pub mod portfolio;
pub mod position;
pub mod settings;
