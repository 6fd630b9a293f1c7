//! Portfolio module - replay engine, position snapshots, monthly evolution,
//! and the facade service tying them together.

pub mod evolution;
pub mod positions;
pub mod replay;

mod portfolio_service;

pub use portfolio_service::{PortfolioService, PortfolioServiceTrait};
