use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::valuation_model::{PriceMap, PriceQuery};
use crate::Result;

/// Contract for the external valuation provider.
///
/// Must support historical lookups, not just the latest price, since the
/// monthly reconstructor values positions at past month-end dates. Prices are
/// integer minor currency units. An unpriceable line is `None`, not an error:
/// a market data gap must not break the whole response.
#[async_trait]
pub trait ValuationProviderTrait: Send + Sync {
    async fn price_at(
        &self,
        asset: &str,
        currency: &str,
        date: NaiveDate,
    ) -> Result<Option<Decimal>>;

    /// Batched lookup: one request for all `(asset, currency, date)` pairs a
    /// reconstruction needs, rather than one call per data point. Queries the
    /// provider cannot price are simply absent from the returned map.
    async fn prices_for(&self, queries: &[PriceQuery]) -> Result<PriceMap> {
        let mut prices = PriceMap::with_capacity(queries.len());
        for query in queries {
            if let Some(price) = self
                .price_at(&query.asset, &query.currency, query.date)
                .await?
            {
                prices.insert(query.key(), price);
            }
        }
        Ok(prices)
    }
}
