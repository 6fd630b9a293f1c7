//! Replay module - transient lot state and the cost-basis fold.

mod cost_basis_resolver;
mod replay_model;

#[cfg(test)]
mod cost_basis_resolver_tests;

pub use cost_basis_resolver::{
    resolve_asset, resolve_asset_with_states, AssetReplay, AssetReplayer,
};
pub use replay_model::{
    is_quantity_significant, round_minor, AcquisitionLot, CashFlow, LotState, OperationEffect,
    ReplayWarning, WarningKind,
};
