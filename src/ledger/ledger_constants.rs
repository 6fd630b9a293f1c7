/// Operation types
///
/// Each constant represents one of the canonical operation categories. Any
/// richer categorization coming from a presentation layer collapses onto this
/// closed set; extra detail travels in `notes`/`asset_class`, never as new
/// branches in the replay logic.

/// Purchase of an asset. Increases quantity and re-averages the cost basis.
pub const OPERATION_TYPE_BUY: &str = "BUY";

/// Disposal of an asset. Decreases quantity; average cost is untouched.
pub const OPERATION_TYPE_SELL: &str = "SELL";

/// Cash dividend paid out by the asset. Quantity and cost basis untouched.
pub const OPERATION_TYPE_DIVIDEND: &str = "DIVIDEND";

/// Interest earned on a fixed-income or cash-like position.
pub const OPERATION_TYPE_INTEREST: &str = "INTEREST";

/// Stock split or reverse split. Adjusts quantity and per-unit cost without
/// affecting total cost basis.
pub const OPERATION_TYPE_STOCK_SPLIT: &str = "STOCK_SPLIT";

/// Unknown or unmapped operation type. Replayed as a cash-flow-only no-op.
pub const OPERATION_TYPE_UNKNOWN: &str = "UNKNOWN";
