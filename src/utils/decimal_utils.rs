use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a minor-unit amount to a whole unit, half-up.
///
/// The single rounding rule of the engine: every stored price and every
/// re-averaged cost goes through this, so replayed state never depends on
/// where a value was rounded.
pub fn round_minor(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
