//! Ledger module - operation domain models, trait seam, and in-memory store.

mod ledger_constants;
mod ledger_errors;
mod ledger_model;
mod ledger_traits;
mod memory_ledger;


pub use ledger_constants::*;
pub use ledger_errors::LedgerError;
pub use ledger_model::{AssetClass, InvestmentOperation, NewOperation, OperationType};
pub use ledger_traits::OperationLedgerTrait;
pub use memory_ledger::{new_operation, MemoryOperationLedger};
