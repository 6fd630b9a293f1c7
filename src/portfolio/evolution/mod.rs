//! Evolution module - gap-free monthly portfolio time series.

mod evolution_model;
mod evolution_service;

#[cfg(test)]
mod evolution_service_tests;

pub use evolution_model::MonthlyEvolutionPoint;
pub use evolution_service::{EvolutionService, EvolutionServiceTrait};
