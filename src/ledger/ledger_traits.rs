use async_trait::async_trait;
use chrono::NaiveDate;

use super::ledger_model::{InvestmentOperation, NewOperation};
use crate::Result;

/// Contract for the append-only operation ledger, the system of record.
///
/// Implementations must return operations ordered by `(date, sequence)`
/// ascending; the ordering must be stable and total so that replay is
/// deterministic. There is deliberately no update or delete surface:
/// corrections are appended as new operations.
#[async_trait]
pub trait OperationLedgerTrait: Send + Sync {
    /// Lists a user's operations, optionally restricted to one asset and/or
    /// to dates `<= until`, ordered by `(date, sequence)` ascending.
    async fn list_operations(
        &self,
        user_id: &str,
        asset: Option<&str>,
        until: Option<NaiveDate>,
    ) -> Result<Vec<InvestmentOperation>>;

    /// Appends one operation, assigning its id and insertion sequence.
    async fn append_operation(&self, new_operation: NewOperation) -> Result<InvestmentOperation>;

    /// Date of the user's earliest operation, if any.
    async fn first_operation_date(&self, user_id: &str) -> Result<Option<NaiveDate>>;
}
