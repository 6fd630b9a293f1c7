//! Cost-basis resolver: a strict left-to-right fold over one asset's ordered
//! operations.
//!
//! The single most important rule in the engine lives here: cost basis is a
//! running weighted average, never FIFO/LIFO lot tracking. Selling leaves the
//! average cost of the remaining lot untouched; buying re-averages; a split
//! rescales quantity and per-unit cost while preserving total basis.

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::VecDeque;

use super::replay_model::{
    is_quantity_significant, round_minor, AcquisitionLot, CashFlow, LotState, OperationEffect,
    ReplayWarning, WarningKind,
};
use crate::ledger::{InvestmentOperation, OperationType};

/// Incremental per-asset replayer.
///
/// Feed it operations in `(date, sequence)` order via [`apply`]; read the
/// running state at any boundary. The monthly reconstructor relies on this to
/// replay each month's delta instead of re-folding from scratch.
///
/// [`apply`]: AssetReplayer::apply
#[derive(Debug)]
pub struct AssetReplayer {
    asset: String,
    currency: Option<String>,
    state: LotState,
    realized_profit: Decimal,
    income: Decimal,
    acquisitions: VecDeque<AcquisitionLot>,
    warnings: Vec<ReplayWarning>,
    effects: Vec<OperationEffect>,
    first_date: Option<NaiveDate>,
    recorded_states: Option<Vec<LotState>>,
}

impl AssetReplayer {
    pub fn new(asset: &str) -> Self {
        Self {
            asset: asset.to_string(),
            currency: None,
            state: LotState::default(),
            realized_profit: Decimal::ZERO,
            income: Decimal::ZERO,
            acquisitions: VecDeque::new(),
            warnings: Vec::new(),
            effects: Vec::new(),
            first_date: None,
            recorded_states: None,
        }
    }

    /// Like [`AssetReplayer::new`], but also records the intermediate
    /// `LotState` after every operation.
    pub fn with_recorded_states(asset: &str) -> Self {
        let mut replayer = Self::new(asset);
        replayer.recorded_states = Some(Vec::new());
        replayer
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn state(&self) -> &LotState {
        &self.state
    }

    pub fn realized_profit(&self) -> Decimal {
        self.realized_profit
    }

    /// Currency of the asset, set by the first operation seen.
    pub fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or("")
    }

    /// Applies one operation and returns its classified effect.
    ///
    /// Anomalies never abort the fold: an overdrawn sell or nonsensical
    /// operation is rejected in place, annotated, and replay continues.
    pub fn apply(&mut self, operation: &InvestmentOperation) -> OperationEffect {
        if operation.asset != self.asset {
            // Caller grouped operations per asset; a mismatch is a bug there.
            warn!(
                "Operation {} targets asset {} but replayer holds {}. Skipping.",
                operation.id, operation.asset, self.asset
            );
            return self.rejected(
                operation,
                WarningKind::InvalidOperation,
                format!("Operation targets asset {}", operation.asset),
            );
        }

        if self.currency.is_none() {
            self.currency = Some(operation.currency.clone());
        }
        self.first_date.get_or_insert(operation.date);

        let effect = match operation.operation_type {
            OperationType::Buy => self.apply_buy(operation),
            OperationType::Sell => self.apply_sell(operation),
            OperationType::Dividend | OperationType::Interest => self.apply_income(operation),
            OperationType::StockSplit => self.apply_split(operation),
            OperationType::Unknown => self.apply_unknown(operation),
        };

        if let Some(states) = self.recorded_states.as_mut() {
            states.push(self.state.clone());
        }
        self.effects.push(effect.clone());
        effect
    }

    fn apply_buy(&mut self, operation: &InvestmentOperation) -> OperationEffect {
        let quantity = operation.quantity;
        if !quantity.is_sign_positive() || quantity.is_zero() {
            return self.rejected(
                operation,
                WarningKind::InvalidOperation,
                format!("Buy with non-positive quantity {}", quantity),
            );
        }

        let new_quantity = self.state.quantity + quantity;
        let total_cost =
            self.state.quantity * self.state.average_cost + quantity * operation.price;
        // Weighted average, re-rounded to a whole minor unit, half-up.
        self.state.average_cost = round_minor(total_cost / new_quantity);
        self.state.quantity = new_quantity;

        self.acquisitions.push_back(AcquisitionLot {
            date: operation.date,
            quantity,
        });

        OperationEffect {
            operation_id: operation.id.clone(),
            date: operation.date,
            flow: CashFlow::Contribution(round_minor(quantity * operation.price)),
            applied: true,
        }
    }

    fn apply_sell(&mut self, operation: &InvestmentOperation) -> OperationEffect {
        let quantity = operation.quantity;
        if !quantity.is_sign_positive() || quantity.is_zero() {
            return self.rejected(
                operation,
                WarningKind::InvalidOperation,
                format!("Sell with non-positive quantity {}", quantity),
            );
        }

        let overdraw = quantity - self.state.quantity;
        if overdraw.is_sign_positive() && is_quantity_significant(&overdraw) {
            // Reject this operation's entire effect: no quantity change, no
            // realized profit, no withdrawal cash flow. One bad historical
            // entry must not null the whole portfolio view.
            return self.rejected(
                operation,
                WarningKind::OverdraftSell,
                format!(
                    "Sell quantity {} exceeds held quantity {}",
                    quantity, self.state.quantity
                ),
            );
        }

        let sold = quantity.min(self.state.quantity);
        self.realized_profit += round_minor(sold * (operation.price - self.state.average_cost));
        self.state.quantity -= sold;
        if !is_quantity_significant(&self.state.quantity) {
            // Dust left by fractional sells counts as closed. Average cost is
            // deliberately untouched: selling never re-prices the remainder.
            self.state.quantity = Decimal::ZERO;
        }
        self.consume_acquisitions(sold);

        OperationEffect {
            operation_id: operation.id.clone(),
            date: operation.date,
            flow: CashFlow::Withdrawal(round_minor(sold * operation.price)),
            applied: true,
        }
    }

    fn apply_income(&mut self, operation: &InvestmentOperation) -> OperationEffect {
        let amount = round_minor(operation.cash_amount());
        self.income += amount;
        OperationEffect {
            operation_id: operation.id.clone(),
            date: operation.date,
            flow: CashFlow::Income(amount),
            applied: true,
        }
    }

    fn apply_split(&mut self, operation: &InvestmentOperation) -> OperationEffect {
        let ratio = operation.quantity;
        if !ratio.is_sign_positive() || ratio.is_zero() {
            return self.rejected(
                operation,
                WarningKind::InvalidOperation,
                format!("Split with non-positive ratio {}", ratio),
            );
        }

        debug!(
            "Applying split ratio {} to asset {} on {}",
            ratio, self.asset, operation.date
        );
        self.state.quantity *= ratio;
        self.state.average_cost = round_minor(self.state.average_cost / ratio);
        for lot in self.acquisitions.iter_mut() {
            lot.quantity *= ratio;
        }

        OperationEffect {
            operation_id: operation.id.clone(),
            date: operation.date,
            flow: CashFlow::None,
            applied: true,
        }
    }

    fn apply_unknown(&mut self, operation: &InvestmentOperation) -> OperationEffect {
        warn!(
            "Unknown operation type on operation {} (asset {}, date {}). Replaying as cash-flow-only no-op.",
            operation.id, operation.asset, operation.date
        );
        self.warnings.push(ReplayWarning {
            operation_id: operation.id.clone(),
            asset: self.asset.clone(),
            date: operation.date,
            kind: WarningKind::UnknownOperationType,
            message: "Unknown operation type; no effect on quantity or cost basis".to_string(),
        });

        // Permissive default: a priced unknown operation still counts in the
        // cash-flow totals, on the income side.
        let flow = if operation.price.is_zero() {
            CashFlow::None
        } else {
            let amount = round_minor(operation.cash_amount());
            self.income += amount;
            CashFlow::Income(amount)
        };

        OperationEffect {
            operation_id: operation.id.clone(),
            date: operation.date,
            flow,
            applied: true,
        }
    }

    fn rejected(
        &mut self,
        operation: &InvestmentOperation,
        kind: WarningKind,
        message: String,
    ) -> OperationEffect {
        warn!(
            "Rejected operation {} for asset {} on {}: {}",
            operation.id, self.asset, operation.date, message
        );
        self.warnings.push(ReplayWarning {
            operation_id: operation.id.clone(),
            asset: self.asset.clone(),
            date: operation.date,
            kind,
            message,
        });
        OperationEffect {
            operation_id: operation.id.clone(),
            date: operation.date,
            flow: CashFlow::None,
            applied: false,
        }
    }

    /// Consumes sold quantity from the acquisition queue, oldest first.
    /// Display-only bookkeeping for the holding-time estimate.
    fn consume_acquisitions(&mut self, mut quantity: Decimal) {
        while quantity.is_sign_positive() && !quantity.is_zero() {
            let Some(front) = self.acquisitions.front_mut() else {
                break;
            };
            if front.quantity > quantity {
                front.quantity -= quantity;
                break;
            }
            quantity -= front.quantity;
            self.acquisitions.pop_front();
        }
    }

    pub fn finish(self) -> AssetReplay {
        AssetReplay {
            asset: self.asset,
            currency: self.currency.unwrap_or_default(),
            state: self.state,
            realized_profit: self.realized_profit,
            income: self.income,
            effects: self.effects,
            warnings: self.warnings,
            states: self.recorded_states,
            acquisitions: self.acquisitions,
            first_date: self.first_date,
        }
    }
}

/// Result of replaying one asset's full (or cutoff-bounded) history.
#[derive(Debug)]
pub struct AssetReplay {
    pub asset: String,
    /// Currency of the asset's operations, set by the first one seen.
    pub currency: String,
    /// Final lot state after the last operation.
    pub state: LotState,
    /// Accumulated realized profit from applied sells, minor units.
    pub realized_profit: Decimal,
    /// Accumulated dividend/interest (and priced unknown) cash, minor units.
    pub income: Decimal,
    pub effects: Vec<OperationEffect>,
    pub warnings: Vec<ReplayWarning>,
    /// Intermediate lot states, one per operation, when requested.
    pub states: Option<Vec<LotState>>,
    /// Buys still contributing to the held quantity, oldest first.
    pub acquisitions: VecDeque<AcquisitionLot>,
    pub first_date: Option<NaiveDate>,
}

impl AssetReplay {
    /// Quantity-weighted mean days the currently-held units have been held,
    /// as of `as_of`. Zero for a closed position.
    pub fn average_holding_days(&self, as_of: NaiveDate) -> Decimal {
        let total_quantity: Decimal = self.acquisitions.iter().map(|lot| lot.quantity).sum();
        if !is_quantity_significant(&total_quantity) {
            return Decimal::ZERO;
        }
        let weighted_days: Decimal = self
            .acquisitions
            .iter()
            .map(|lot| {
                let days = (as_of - lot.date).num_days().max(0);
                lot.quantity * Decimal::from(days)
            })
            .sum();
        (weighted_days / total_quantity).round_dp(2)
    }
}

/// Folds one asset's ordered operations into its final replay result.
/// Operations must already be in `(date, sequence)` order, as the ledger
/// returns them.
pub fn resolve_asset(asset: &str, operations: &[InvestmentOperation]) -> AssetReplay {
    let mut replayer = AssetReplayer::new(asset);
    for operation in operations {
        replayer.apply(operation);
    }
    replayer.finish()
}

/// Same as [`resolve_asset`] but also records the intermediate `LotState`
/// after each operation.
pub fn resolve_asset_with_states(
    asset: &str,
    operations: &[InvestmentOperation],
) -> AssetReplay {
    let mut replayer = AssetReplayer::with_recorded_states(asset);
    for operation in operations {
        replayer.apply(operation);
    }
    replayer.finish()
}
