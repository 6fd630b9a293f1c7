//! Monthly evolution domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One point of the monthly portfolio time series.
///
/// Derived, never persisted: a pure function of the operation set as of the
/// month's end. All monetary fields are integer minor currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEvolutionPoint {
    pub user_id: String,
    /// First day of the calendar month this point describes.
    pub month: NaiveDate,
    /// All positions valued at that month's end prices.
    pub portfolio_value: Decimal,
    /// Buy cash outflow during the month.
    pub contributions: Decimal,
    /// Sell cash inflow during the month.
    pub withdrawals: Decimal,
    /// Dividend + interest cash during the month.
    pub dividends: Decimal,
    /// Money-weighted month return: the value delta net of contributions and
    /// withdrawals, relative to the prior month's value. Zero when the prior
    /// value is not positive.
    pub returns: Decimal,
    /// Running sum of contributions since the first operation.
    pub cumulative_contributions: Decimal,
    /// Running sum of dividends since the first operation.
    pub cumulative_dividends: Decimal,
    /// True when at least one open position had no month-end price and was
    /// valued at cost basis instead.
    pub degraded: bool,
}
