//! Position view models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::AssetClass;
use crate::portfolio::replay::ReplayWarning;

/// Snapshot of one held asset at a cutoff date.
///
/// Derived, never persisted: a pure function of the operation set as of
/// `as_of`. All monetary fields are integer minor currency units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub user_id: String,
    pub asset: String,
    pub asset_class: AssetClass,
    pub currency: String,
    pub quantity: Decimal,
    /// Weighted average cost per unit.
    pub average_price: Decimal,
    /// Cost basis still held: `quantity * average_price`.
    pub total_invested: Decimal,
    /// `quantity * current price`; falls back to `total_invested` when the
    /// valuation provider cannot price the asset (see `valuation_degraded`).
    pub current_value: Decimal,
    pub profit: Decimal,
    /// Percent of `total_invested`; zero when nothing is invested.
    pub profit_percentage: Decimal,
    /// Share of total portfolio value, percent; zero when the portfolio
    /// values to zero.
    pub portfolio_percentage: Decimal,
    /// Quantity-weighted days since acquisition of the held units.
    /// Display-only estimate; does not feed cost basis.
    pub average_holding_days: Decimal,
    /// Realized profit accumulated by sells of this asset up to `as_of`.
    pub realized_profit: Decimal,
    /// True when `current_value` degraded to cost basis because no price was
    /// available.
    pub valuation_degraded: bool,
    /// Replay anomalies recovered for this asset (overdrawn sells, unknown
    /// operation types). Never empty silently: a degraded line is still
    /// returned, flagged.
    pub warnings: Vec<ReplayWarning>,
    pub as_of: NaiveDate,
}
