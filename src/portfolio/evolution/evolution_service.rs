//! Monthly evolution reconstructor.
//!
//! Replays the ledger once across all month boundaries to produce a gap-free
//! time series of portfolio value and cash flows. The replay is incremental:
//! each month applies only that month's delta of operations to the per-asset
//! replayers, so the whole series costs O(operations), not
//! O(months x operations).

use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use super::evolution_model::MonthlyEvolutionPoint;
use crate::constants::DECIMAL_PRECISION;
use crate::ledger::OperationLedgerTrait;
use crate::portfolio::replay::{round_minor, AssetReplayer, CashFlow};
use crate::utils::time_utils;
use crate::valuation::{PriceMap, PriceQuery, ValuationProviderTrait};
use crate::Result;

#[async_trait]
pub trait EvolutionServiceTrait: Send + Sync {
    /// Produces one point per calendar month from the first operation's month
    /// (clamped by `from`) through `to` (default: the current month),
    /// inclusive, with no gaps. Months with zero activity still appear,
    /// carrying the portfolio value forward.
    async fn get_monthly_evolution(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<MonthlyEvolutionPoint>>;
}

#[derive(Clone)]
pub struct EvolutionService {
    ledger: Arc<dyn OperationLedgerTrait>,
    valuation: Arc<dyn ValuationProviderTrait>,
}

impl EvolutionService {
    pub fn new(
        ledger: Arc<dyn OperationLedgerTrait>,
        valuation: Arc<dyn ValuationProviderTrait>,
    ) -> Self {
        Self { ledger, valuation }
    }

    /// Values all open positions at a month end from the pre-fetched price
    /// map. A position the provider could not price is valued at its cost
    /// basis and flips the month's degraded flag.
    fn value_positions(
        replayers: &HashMap<String, AssetReplayer>,
        prices: &PriceMap,
        month_end: NaiveDate,
    ) -> (Decimal, bool) {
        let mut total = Decimal::ZERO;
        let mut degraded = false;
        for replayer in replayers.values() {
            let state = replayer.state();
            if !state.is_open() {
                continue;
            }
            let key = (
                replayer.asset().to_string(),
                replayer.currency().to_string(),
                month_end,
            );
            match prices.get(&key) {
                Some(price) => total += state.quantity * *price,
                None => {
                    debug!(
                        "Missing month-end price for asset {} on {}. Valuing at cost basis.",
                        replayer.asset(),
                        month_end
                    );
                    total += state.quantity * state.average_cost;
                    degraded = true;
                }
            }
        }
        (round_minor(total), degraded)
    }
}

#[async_trait]
impl EvolutionServiceTrait for EvolutionService {
    async fn get_monthly_evolution(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<MonthlyEvolutionPoint>> {
        let to_month = time_utils::month_start(to.unwrap_or_else(time_utils::today));
        let operations = self
            .ledger
            .list_operations(user_id, None, Some(time_utils::month_end(to_month)))
            .await?;
        if operations.is_empty() {
            return Ok(Vec::new());
        }

        // Replay always starts at the first operation so carry-forward state
        // is right even when the caller only wants a trailing window.
        let months = time_utils::get_months_between(operations[0].date, to_month);

        // First-seen currency per asset, for price lookups.
        let mut currencies: HashMap<String, String> = HashMap::new();
        for operation in &operations {
            currencies
                .entry(operation.asset.clone())
                .or_insert_with(|| operation.currency.clone());
        }

        // One batched valuation request for every (asset, month-end) pair the
        // reconstruction needs.
        let queries: Vec<PriceQuery> = months
            .iter()
            .flat_map(|month| {
                let boundary = time_utils::month_end(*month);
                currencies
                    .iter()
                    .map(move |(asset, currency)| PriceQuery::new(asset, currency, boundary))
            })
            .collect();
        let prices = self.valuation.prices_for(&queries).await?;

        let mut replayers: HashMap<String, AssetReplayer> = HashMap::new();
        let mut next_op = 0usize;
        let mut previous_value = Decimal::ZERO;
        let mut cumulative_contributions = Decimal::ZERO;
        let mut cumulative_dividends = Decimal::ZERO;
        let mut points = Vec::with_capacity(months.len());

        for month in months {
            let boundary = time_utils::month_end(month);
            let mut contributions = Decimal::ZERO;
            let mut withdrawals = Decimal::ZERO;
            let mut dividends = Decimal::ZERO;

            // Apply this month's delta of operations.
            while next_op < operations.len() && operations[next_op].date <= boundary {
                let operation = &operations[next_op];
                let replayer = replayers
                    .entry(operation.asset.clone())
                    .or_insert_with(|| AssetReplayer::new(&operation.asset));
                let effect = replayer.apply(operation);
                match effect.flow {
                    CashFlow::Contribution(amount) => contributions += amount,
                    CashFlow::Withdrawal(amount) => withdrawals += amount,
                    CashFlow::Income(amount) => dividends += amount,
                    CashFlow::None => {}
                }
                next_op += 1;
            }

            let (portfolio_value, degraded) =
                Self::value_positions(&replayers, &prices, boundary);

            // Money-weighted return: fresh deposits must not inflate it and
            // withdrawals must not deflate it.
            let returns = if previous_value.is_sign_positive() && !previous_value.is_zero() {
                ((portfolio_value - previous_value - contributions + withdrawals)
                    / previous_value)
                    .round_dp(DECIMAL_PRECISION)
            } else {
                Decimal::ZERO
            };

            cumulative_contributions += contributions;
            cumulative_dividends += dividends;

            points.push(MonthlyEvolutionPoint {
                user_id: user_id.to_string(),
                month,
                portfolio_value,
                contributions,
                withdrawals,
                dividends,
                returns,
                cumulative_contributions,
                cumulative_dividends,
                degraded,
            });
            previous_value = portfolio_value;
        }

        if let Some(from) = from {
            let from_month = time_utils::month_start(from);
            points.retain(|point| point.month >= from_month);
        }
        Ok(points)
    }
}
