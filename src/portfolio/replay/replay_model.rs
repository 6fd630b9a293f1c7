//! Replay domain models: transient lot state and per-operation effects.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::QUANTITY_THRESHOLD;

pub use crate::utils::decimal_utils::round_minor;

/// Quantities below this threshold count as a closed position: fractional
/// sells routinely leave dust that must not resurrect a sold-out asset.
pub fn is_quantity_significant(quantity: &Decimal) -> bool {
    let threshold =
        Decimal::from_str_radix(QUANTITY_THRESHOLD, 10).unwrap_or_else(|_| Decimal::new(1, 8));
    quantity.abs() >= threshold
}

/// Running lot state for one `(user, asset)` immediately after applying one
/// operation. Derived and transient: computed during replay, never persisted.
///
/// This engine keeps a single merged lot per asset (quantity plus weighted
/// average cost), not per-purchase lot tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LotState {
    pub quantity: Decimal,
    /// Weighted average cost per unit, whole minor currency units.
    pub average_cost: Decimal,
}

impl LotState {
    /// Cost basis still held, in minor units.
    pub fn total_invested(&self) -> Decimal {
        round_minor(self.quantity * self.average_cost)
    }

    pub fn is_open(&self) -> bool {
        is_quantity_significant(&self.quantity)
    }
}

/// Kinds of non-fatal anomalies recovered during replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningKind {
    /// A sell asked for more than was held; its effect was rejected.
    OverdraftSell,
    /// An unmapped operation type was replayed as a cash-flow-only no-op.
    UnknownOperationType,
    /// Operation data made no sense (non-positive quantity, zero ratio, ...).
    InvalidOperation,
}

/// A non-fatal issue attached to the replay output. Replay continued past it;
/// nothing silently disappears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayWarning {
    pub operation_id: String,
    pub asset: String,
    pub date: NaiveDate,
    pub kind: WarningKind,
    pub message: String,
}

impl std::fmt::Display for ReplayWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Operation {} (asset: {}, date: {}): {}",
            self.operation_id, self.asset, self.date, self.message
        )
    }
}

/// Cash movement one operation caused, already classified for the monthly
/// aggregates.
#[derive(Debug, Clone, PartialEq)]
pub enum CashFlow {
    /// Buy outflow, minor units.
    Contribution(Decimal),
    /// Sell inflow, minor units.
    Withdrawal(Decimal),
    /// Dividend/interest (and priced unknown-type) inflow, minor units.
    Income(Decimal),
    None,
}

/// Outcome of applying one operation during replay.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationEffect {
    pub operation_id: String,
    pub date: NaiveDate,
    pub flow: CashFlow,
    /// False when the operation's effect was rejected (overdraft, invalid
    /// data): it then contributes neither state change nor cash flow.
    pub applied: bool,
}

/// One entry of the acquisition queue: a buy's date and its remaining
/// quantity, consumed oldest-first by sells.
///
/// Used only to estimate holding time; cost basis never reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionLot {
    pub date: NaiveDate,
    pub quantity: Decimal,
}
