//! In-process append-only ledger.
//!
//! Backs tests and embedders that have no external storage. Real deployments
//! implement [`OperationLedgerTrait`] over their own store; this one keeps
//! everything behind an `RwLock` and assigns ids and sequences on append.

use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::sync::RwLock;
use uuid::Uuid;

use super::ledger_errors::LedgerError;
use super::ledger_model::{InvestmentOperation, NewOperation, OperationType};
use super::ledger_traits::OperationLedgerTrait;
use crate::utils::decimal_utils::round_minor;
use crate::utils::time_utils;
use crate::Result;

#[derive(Default)]
struct LedgerInner {
    operations: Vec<InvestmentOperation>,
    next_sequence: u64,
}

#[derive(Default)]
pub struct MemoryOperationLedger {
    inner: RwLock<LedgerInner>,
}

impl MemoryOperationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate(new_operation: &NewOperation) -> Result<()> {
        if new_operation.user_id.is_empty() {
            return Err(LedgerError::InvalidOperation("Missing user id".to_string()).into());
        }
        if new_operation.asset.is_empty() {
            return Err(LedgerError::InvalidOperation("Missing asset".to_string()).into());
        }
        match new_operation.operation_type {
            OperationType::Buy | OperationType::Sell | OperationType::StockSplit => {
                if !new_operation.quantity.is_sign_positive() || new_operation.quantity.is_zero() {
                    return Err(LedgerError::InvalidOperation(format!(
                        "{} requires a positive quantity, got {}",
                        new_operation.operation_type.as_str(),
                        new_operation.quantity
                    ))
                    .into());
                }
            }
            _ => {}
        }
        if new_operation.price.is_sign_negative() {
            return Err(LedgerError::InvalidOperation(format!(
                "Negative price: {}",
                new_operation.price
            ))
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl OperationLedgerTrait for MemoryOperationLedger {
    async fn list_operations(
        &self,
        user_id: &str,
        asset: Option<&str>,
        until: Option<NaiveDate>,
    ) -> Result<Vec<InvestmentOperation>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| LedgerError::Unavailable(format!("Ledger lock poisoned: {}", e)))?;

        let mut operations: Vec<InvestmentOperation> = inner
            .operations
            .iter()
            .filter(|op| op.user_id == user_id)
            .filter(|op| asset.map_or(true, |a| op.asset == a))
            .filter(|op| until.map_or(true, |d| op.date <= d))
            .cloned()
            .collect();

        operations.sort_by_key(|op| op.sort_key());
        Ok(operations)
    }

    async fn append_operation(&self, new_operation: NewOperation) -> Result<InvestmentOperation> {
        Self::validate(&new_operation)?;
        let date = time_utils::parse_calendar_date(&new_operation.date)?;

        let mut inner = self
            .inner
            .write()
            .map_err(|e| LedgerError::Unavailable(format!("Ledger lock poisoned: {}", e)))?;

        let sequence = inner.next_sequence;
        inner.next_sequence += 1;

        let operation = InvestmentOperation {
            id: Uuid::new_v4().to_string(),
            user_id: new_operation.user_id,
            asset: new_operation.asset,
            asset_class: new_operation.asset_class,
            operation_type: new_operation.operation_type,
            date,
            quantity: new_operation.quantity,
            price: round_minor(new_operation.price),
            currency: new_operation.currency,
            broker: new_operation.broker,
            notes: new_operation.notes,
            sequence,
        };

        debug!(
            "Appended {} operation {} for user {} asset {} on {}",
            operation.operation_type.as_str(),
            operation.id,
            operation.user_id,
            operation.asset,
            operation.date
        );

        inner.operations.push(operation.clone());
        Ok(operation)
    }

    async fn first_operation_date(&self, user_id: &str) -> Result<Option<NaiveDate>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| LedgerError::Unavailable(format!("Ledger lock poisoned: {}", e)))?;

        Ok(inner
            .operations
            .iter()
            .filter(|op| op.user_id == user_id)
            .map(|op| op.date)
            .min())
    }
}

/// Convenience for tests and fixtures: builds a `NewOperation` with the
/// common fields filled in.
pub fn new_operation(
    user_id: &str,
    asset: &str,
    operation_type: OperationType,
    date: &str,
    quantity: Decimal,
    price: Decimal,
) -> NewOperation {
    NewOperation {
        user_id: user_id.to_string(),
        asset: asset.to_string(),
        asset_class: Default::default(),
        operation_type,
        date: date.to_string(),
        quantity,
        price,
        currency: "USD".to_string(),
        broker: None,
        notes: None,
    }
}
