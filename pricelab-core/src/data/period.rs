//! Lookback periods accepted by the market-data collaborator.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::provider::DataError;

/// Trailing window of history to fetch, in the provider's range vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LookbackPeriod {
    OneDay,
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    #[default]
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    YearToDate,
    Max,
}

impl LookbackPeriod {
    pub const ALL: [LookbackPeriod; 11] = [
        LookbackPeriod::OneDay,
        LookbackPeriod::FiveDays,
        LookbackPeriod::OneMonth,
        LookbackPeriod::ThreeMonths,
        LookbackPeriod::SixMonths,
        LookbackPeriod::OneYear,
        LookbackPeriod::TwoYears,
        LookbackPeriod::FiveYears,
        LookbackPeriod::TenYears,
        LookbackPeriod::YearToDate,
        LookbackPeriod::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LookbackPeriod::OneDay => "1d",
            LookbackPeriod::FiveDays => "5d",
            LookbackPeriod::OneMonth => "1mo",
            LookbackPeriod::ThreeMonths => "3mo",
            LookbackPeriod::SixMonths => "6mo",
            LookbackPeriod::OneYear => "1y",
            LookbackPeriod::TwoYears => "2y",
            LookbackPeriod::FiveYears => "5y",
            LookbackPeriod::TenYears => "10y",
            LookbackPeriod::YearToDate => "ytd",
            LookbackPeriod::Max => "max",
        }
    }

    /// First date (inclusive) of the window ending at `last`.
    ///
    /// `None` means unbounded. Calendar spans are approximate; `5d` covers a
    /// trading week plus its weekend.
    pub fn cutoff(&self, last: NaiveDate) -> Option<NaiveDate> {
        let days = match self {
            LookbackPeriod::OneDay => 0,
            LookbackPeriod::FiveDays => 6,
            LookbackPeriod::OneMonth => 30,
            LookbackPeriod::ThreeMonths => 91,
            LookbackPeriod::SixMonths => 182,
            LookbackPeriod::OneYear => 365,
            LookbackPeriod::TwoYears => 730,
            LookbackPeriod::FiveYears => 1826,
            LookbackPeriod::TenYears => 3652,
            LookbackPeriod::YearToDate => {
                return NaiveDate::from_ymd_opt(last.year(), 1, 1);
            }
            LookbackPeriod::Max => return None,
        };
        Some(last - chrono::Duration::days(days))
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookbackPeriod {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        LookbackPeriod::ALL
            .into_iter()
            .find(|p| p.as_str() == needle)
            .ok_or_else(|| DataError::InvalidPeriod(s.to_string()))
    }
}

impl TryFrom<String> for LookbackPeriod {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LookbackPeriod> for String {
    fn from(period: LookbackPeriod) -> Self {
        period.as_str().to_string()
    }
}
