use serde::{Deserialize, Serialize};

use super::performance::TimeRange;

/// User-configurable settings, stored alongside the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// The window shown when the caller does not pick one.
    #[serde(default)]
    pub default_range: TimeRange,

    /// Round the weighted-average purchase price to cents after an increase.
    #[serde(default = "default_round_average_price")]
    pub round_average_price: bool,
}

fn default_round_average_price() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_range: TimeRange::default(),
            round_average_price: default_round_average_price(),
        }
    }
}
