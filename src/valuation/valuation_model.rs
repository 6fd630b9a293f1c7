//! Valuation provider domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One historical price lookup: an asset priced in a currency on a date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuery {
    pub asset: String,
    pub currency: String,
    pub date: NaiveDate,
}

impl PriceQuery {
    pub fn new(asset: &str, currency: &str, date: NaiveDate) -> Self {
        Self {
            asset: asset.to_string(),
            currency: currency.to_string(),
            date,
        }
    }

    pub fn key(&self) -> (String, String, NaiveDate) {
        (self.asset.clone(), self.currency.clone(), self.date)
    }
}

/// Pre-fetched price cache for one reconstruction:
/// `(asset, currency, date) -> minor-unit price`.
/// A missing entry means the provider could not price that line.
pub type PriceMap = HashMap<(String, String, NaiveDate), Decimal>;
