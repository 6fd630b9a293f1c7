use thiserror::Error;

/// Errors surfaced by the operation ledger boundary.
///
/// `Unavailable` models a transport/storage failure of the external ledger
/// and is the only failure the engine propagates as a hard error. Retry
/// policy belongs to the caller, not to this crate.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}
