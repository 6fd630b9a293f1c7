//! Positions module - current-position snapshot building.

mod positions_model;
mod positions_service;


pub use positions_model::Position;
pub use positions_service::{PositionService, PositionServiceTrait};
