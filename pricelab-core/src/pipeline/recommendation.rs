//! Recommendation rule: percentage change → BUY / SELL / HOLD.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Changes strictly above this are BUY.
pub const BUY_THRESHOLD: f64 = 2.0;
/// Changes strictly below this are SELL.
pub const SELL_THRESHOLD: f64 = -2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl Recommendation {
    /// Classify a forecast change in percent. The dead zone `[-2, 2]` is
    /// closed: both boundary values are HOLD.
    pub fn from_change(change_percent: f64) -> Self {
        if change_percent > BUY_THRESHOLD {
            Recommendation::Buy
        } else if change_percent < SELL_THRESHOLD {
            Recommendation::Sell
        } else {
            Recommendation::Hold
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Buy => "BUY",
            Recommendation::Sell => "SELL",
            Recommendation::Hold => "HOLD",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
