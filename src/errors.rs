//! Core error types for the portfolio reconstruction engine.
//!
//! This module defines storage-agnostic error types. Ledger backends convert
//! their transport/storage failures into `LedgerError` before they reach the
//! engine. Replay-local anomalies (overdrawn sells, missing valuations,
//! unknown operation types) are not errors at all: they are recovered in
//! place and surfaced as `ReplayWarning` values and degraded-data flags on
//! the output.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

use crate::ledger::LedgerError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine. Only ledger unavailability and input
/// validation are fatal to a request.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Ledger operation failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Input validation failed: {0}")]
    Validation(String),
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(format!("Failed to parse date: {}", err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
