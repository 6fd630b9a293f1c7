//! Investment ledger and portfolio reconstruction engine.
//!
//! Everything a portfolio view shows is derived, never stored: the append-only
//! operation ledger is the single source of truth, and positions, realized
//! profit, and the monthly evolution series are all deterministic replays of
//! it. Replaying the same operations always yields the same state.

pub mod constants;
pub mod errors;
pub mod ledger;
pub mod portfolio;
pub mod utils;
pub mod valuation;

pub use errors::{Error, Result};
pub use ledger::{
    AssetClass, InvestmentOperation, LedgerError, MemoryOperationLedger, NewOperation,
    OperationLedgerTrait, OperationType,
};
pub use portfolio::evolution::{EvolutionService, EvolutionServiceTrait, MonthlyEvolutionPoint};
pub use portfolio::positions::{Position, PositionService, PositionServiceTrait};
pub use portfolio::replay::{
    resolve_asset, AssetReplay, AssetReplayer, CashFlow, LotState, ReplayWarning, WarningKind,
};
pub use portfolio::{PortfolioService, PortfolioServiceTrait};
pub use valuation::{PriceMap, PriceQuery, ValuationProviderTrait};
