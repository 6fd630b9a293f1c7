use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::positions_model::Position;
use crate::constants::DECIMAL_PRECISION;
use crate::ledger::{AssetClass, InvestmentOperation, OperationLedgerTrait};
use crate::portfolio::replay::{resolve_asset, round_minor, AssetReplay};
use crate::valuation::{PriceQuery, ValuationProviderTrait};
use crate::Result;

#[async_trait]
pub trait PositionServiceTrait: Send + Sync {
    /// Builds the current-position snapshot: one `Position` per asset with an
    /// open quantity at `as_of`, sorted by asset id. Assets fully sold out
    /// are omitted here but remain part of realized-profit history.
    async fn get_current_positions(
        &self,
        user_id: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<Position>>;

    /// Realized profit per asset up to `as_of`, including sold-out assets.
    async fn get_realized_profit(
        &self,
        user_id: &str,
        as_of: NaiveDate,
    ) -> Result<HashMap<String, Decimal>>;
}

/// Folds resolved lot states across all assets at a cutoff date into a
/// current-position snapshot.
#[derive(Clone)]
pub struct PositionService {
    ledger: Arc<dyn OperationLedgerTrait>,
    valuation: Arc<dyn ValuationProviderTrait>,
}

impl PositionService {
    pub fn new(
        ledger: Arc<dyn OperationLedgerTrait>,
        valuation: Arc<dyn ValuationProviderTrait>,
    ) -> Self {
        Self { ledger, valuation }
    }

    /// One ledger query, grouped per asset, resolved in parallel. Per-asset
    /// folds are independent; only cross-month state within one asset is
    /// sequential, and that stays inside each fold.
    async fn resolve_all(
        &self,
        user_id: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<(AssetClass, AssetReplay)>> {
        let operations = self
            .ledger
            .list_operations(user_id, None, Some(as_of))
            .await?;

        let mut grouped: BTreeMap<String, Vec<InvestmentOperation>> = BTreeMap::new();
        for operation in operations {
            grouped.entry(operation.asset.clone()).or_default().push(operation);
        }

        let groups: Vec<(String, Vec<InvestmentOperation>)> = grouped.into_iter().collect();
        Ok(groups
            .par_iter()
            .map(|(asset, ops)| {
                let asset_class = ops.first().map(|op| op.asset_class).unwrap_or_default();
                (asset_class, resolve_asset(asset, ops))
            })
            .collect())
    }
}

#[async_trait]
impl PositionServiceTrait for PositionService {
    async fn get_current_positions(
        &self,
        user_id: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<Position>> {
        let replays = self.resolve_all(user_id, as_of).await?;

        let open: Vec<(AssetClass, AssetReplay)> = replays
            .into_iter()
            .filter(|(_, replay)| replay.state.is_open())
            .collect();

        let queries: Vec<PriceQuery> = open
            .iter()
            .map(|(_, replay)| PriceQuery::new(&replay.asset, &replay.currency, as_of))
            .collect();
        let prices = self.valuation.prices_for(&queries).await?;

        let mut positions: Vec<Position> = Vec::with_capacity(open.len());
        for (asset_class, replay) in open {
            let total_invested = replay.state.total_invested();

            let price = prices
                .get(&(replay.asset.clone(), replay.currency.clone(), as_of))
                .copied();
            let (current_value, valuation_degraded) = match price {
                Some(price) => (round_minor(replay.state.quantity * price), false),
                None => {
                    debug!(
                        "Missing valuation for asset {} ({}) on {}. Degrading to cost basis.",
                        replay.asset, replay.currency, as_of
                    );
                    (total_invested, true)
                }
            };

            let profit = current_value - total_invested;
            let profit_percentage = if total_invested.is_zero() {
                Decimal::ZERO
            } else {
                (profit / total_invested * Decimal::ONE_HUNDRED).round_dp(DECIMAL_PRECISION)
            };

            positions.push(Position {
                user_id: user_id.to_string(),
                asset: replay.asset.clone(),
                asset_class,
                currency: replay.currency.clone(),
                quantity: replay.state.quantity,
                average_price: replay.state.average_cost,
                total_invested,
                current_value,
                profit,
                profit_percentage,
                portfolio_percentage: Decimal::ZERO, // set after all are built
                average_holding_days: replay.average_holding_days(as_of),
                realized_profit: replay.realized_profit,
                valuation_degraded,
                warnings: replay.warnings,
                as_of,
            });
        }

        // Portfolio share needs the total, so it is a post-pass. A zero-value
        // portfolio yields all-zero percentages, never NaN.
        let total_value: Decimal = positions.iter().map(|p| p.current_value).sum();
        if !total_value.is_zero() {
            for position in positions.iter_mut() {
                position.portfolio_percentage = (position.current_value / total_value
                    * Decimal::ONE_HUNDRED)
                    .round_dp(DECIMAL_PRECISION);
            }
        }

        Ok(positions)
    }

    async fn get_realized_profit(
        &self,
        user_id: &str,
        as_of: NaiveDate,
    ) -> Result<HashMap<String, Decimal>> {
        let replays = self.resolve_all(user_id, as_of).await?;
        Ok(replays
            .into_iter()
            .map(|(_, replay)| (replay.asset, replay.realized_profit))
            .collect())
    }
}
