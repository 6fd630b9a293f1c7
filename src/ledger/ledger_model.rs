//! Operation ledger domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ledger::ledger_constants::*;

/// Canonical operation types the replay engine understands.
///
/// This is a deliberately small closed set: UI-level operation labels map
/// onto it at the edge, and anything that does not map lands on `Unknown`
/// rather than failing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    Buy,
    Sell,
    Dividend,
    Interest,
    StockSplit,
    Unknown,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Buy => OPERATION_TYPE_BUY,
            OperationType::Sell => OPERATION_TYPE_SELL,
            OperationType::Dividend => OPERATION_TYPE_DIVIDEND,
            OperationType::Interest => OPERATION_TYPE_INTEREST,
            OperationType::StockSplit => OPERATION_TYPE_STOCK_SPLIT,
            OperationType::Unknown => OPERATION_TYPE_UNKNOWN,
        }
    }
}

impl FromStr for OperationType {
    type Err = std::convert::Infallible;

    /// Never fails: unmapped labels become `Unknown` so that one unexpected
    /// historical entry cannot null an entire portfolio view.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            s if s == OPERATION_TYPE_BUY => OperationType::Buy,
            s if s == OPERATION_TYPE_SELL => OperationType::Sell,
            s if s == OPERATION_TYPE_DIVIDEND => OperationType::Dividend,
            s if s == OPERATION_TYPE_INTEREST => OperationType::Interest,
            s if s == OPERATION_TYPE_STOCK_SPLIT => OperationType::StockSplit,
            _ => OperationType::Unknown,
        })
    }
}

/// Asset class carried on each operation.
///
/// Metadata only: the replay fold never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetClass {
    StockExchange,
    Treasury,
    FixedIncome,
    FixedIncomeUsa,
    Fund,
    Cryptocurrency,
    Account,
    #[default]
    Other,
}

/// An immutable investment operation, as stored in the append-only ledger.
///
/// Operations are never mutated or deleted once reporting has replayed them;
/// corrections are modeled as new operations. `(date, sequence)` is a total
/// order that breaks same-day ties deterministically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentOperation {
    pub id: String,
    pub user_id: String,
    /// Ticker or other asset identifier.
    pub asset: String,
    pub asset_class: AssetClass,
    pub operation_type: OperationType,
    /// Calendar date, no time component.
    pub date: NaiveDate,
    /// Units bought/sold, or the split ratio for `StockSplit`.
    pub quantity: Decimal,
    /// Per-unit price in integer minor currency units (e.g. cents).
    pub price: Decimal,
    /// ISO currency code.
    pub currency: String,
    pub broker: Option<String>,
    pub notes: Option<String>,
    /// Insertion sequence assigned by the ledger; monotonic per ledger.
    pub sequence: u64,
}

impl InvestmentOperation {
    /// Total order key: `(date, insertion sequence)`.
    pub fn sort_key(&self) -> (NaiveDate, u64) {
        (self.date, self.sequence)
    }

    /// Cash amount this operation moves, in minor units.
    ///
    /// Dividends and interest are commonly recorded as a bare amount with no
    /// unit count, so a zero quantity means `price` already is the total.
    pub fn cash_amount(&self) -> Decimal {
        if self.quantity.is_zero() {
            self.price
        } else {
            self.quantity * self.price
        }
    }
}

/// Input model for appending a new operation to the ledger.
///
/// The date arrives as a `YYYY-MM-DD` string and is parsed strictly; id and
/// sequence are assigned by the ledger on append.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOperation {
    pub user_id: String,
    pub asset: String,
    #[serde(default)]
    pub asset_class: AssetClass,
    pub operation_type: OperationType,
    pub date: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub currency: String,
    pub broker: Option<String>,
    pub notes: Option<String>,
}
