//! Valuation module - the price provider seam the engine depends on.

mod valuation_model;
mod valuation_traits;

pub use valuation_model::{PriceMap, PriceQuery};
pub use valuation_traits::ValuationProviderTrait;
