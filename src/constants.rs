/// Quantity threshold below which a position is considered closed.
pub const QUANTITY_THRESHOLD: &str = "0.00000001";

/// Decimal precision for percentage and return calculations.
pub const DECIMAL_PRECISION: u32 = 6;
