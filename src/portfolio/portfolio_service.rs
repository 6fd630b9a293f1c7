//! Portfolio facade wiring the ledger, the replay engine, and the valuation
//! seam behind one entry point.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use super::evolution::{EvolutionService, EvolutionServiceTrait, MonthlyEvolutionPoint};
use super::positions::{Position, PositionService, PositionServiceTrait};
use crate::ledger::{InvestmentOperation, NewOperation, OperationLedgerTrait};
use crate::utils::time_utils;
use crate::valuation::ValuationProviderTrait;
use crate::Result;

/// High-level portfolio API. Everything is derived on demand from the
/// append-only operation ledger; nothing here persists computed state.
#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    /// Current-position snapshot as of today.
    async fn get_current_positions(&self, user_id: &str) -> Result<Vec<Position>>;

    /// Current-position snapshot as of an arbitrary cutoff date.
    async fn get_positions_as_of(&self, user_id: &str, as_of: NaiveDate)
        -> Result<Vec<Position>>;

    /// Realized profit per asset up to today, sold-out assets included.
    async fn get_realized_profit(&self, user_id: &str) -> Result<HashMap<String, Decimal>>;

    /// Gap-free monthly portfolio series, optionally windowed.
    async fn get_monthly_evolution(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<MonthlyEvolutionPoint>>;

    /// Ordered operation history for one asset.
    async fn get_operation_history(
        &self,
        user_id: &str,
        asset: &str,
    ) -> Result<Vec<InvestmentOperation>>;

    /// Appends a new operation after validation and returns the stored form.
    async fn record_operation(&self, operation: NewOperation) -> Result<InvestmentOperation>;
}

pub struct PortfolioService {
    ledger: Arc<dyn OperationLedgerTrait>,
    positions: PositionService,
    evolution: EvolutionService,
}

impl PortfolioService {
    pub fn new(
        ledger: Arc<dyn OperationLedgerTrait>,
        valuation: Arc<dyn ValuationProviderTrait>,
    ) -> Self {
        Self {
            positions: PositionService::new(ledger.clone(), valuation.clone()),
            evolution: EvolutionService::new(ledger.clone(), valuation),
            ledger,
        }
    }
}

#[async_trait]
impl PortfolioServiceTrait for PortfolioService {
    async fn get_current_positions(&self, user_id: &str) -> Result<Vec<Position>> {
        self.positions
            .get_current_positions(user_id, time_utils::today())
            .await
    }

    async fn get_positions_as_of(
        &self,
        user_id: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<Position>> {
        self.positions.get_current_positions(user_id, as_of).await
    }

    async fn get_realized_profit(&self, user_id: &str) -> Result<HashMap<String, Decimal>> {
        self.positions
            .get_realized_profit(user_id, time_utils::today())
            .await
    }

    async fn get_monthly_evolution(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<MonthlyEvolutionPoint>> {
        self.evolution
            .get_monthly_evolution(user_id, from, to)
            .await
    }

    async fn get_operation_history(
        &self,
        user_id: &str,
        asset: &str,
    ) -> Result<Vec<InvestmentOperation>> {
        self.ledger
            .list_operations(user_id, Some(asset), None)
            .await
    }

    async fn record_operation(&self, operation: NewOperation) -> Result<InvestmentOperation> {
        self.ledger.append_operation(operation).await
    }
}
