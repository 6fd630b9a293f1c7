use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::ledger::{AssetClass, InvestmentOperation, OperationType};
use crate::portfolio::replay::{
    resolve_asset, resolve_asset_with_states, AssetReplayer, CashFlow, WarningKind,
};

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn op(
    sequence: u64,
    operation_type: OperationType,
    on: &str,
    quantity: Decimal,
    price: Decimal,
) -> InvestmentOperation {
    InvestmentOperation {
        id: format!("op-{}", sequence),
        user_id: "u1".to_string(),
        asset: "AAPL".to_string(),
        asset_class: AssetClass::StockExchange,
        operation_type,
        date: date(on),
        quantity,
        price,
        currency: "USD".to_string(),
        broker: None,
        notes: None,
        sequence,
    }
}

#[test]
fn weighted_average_sell_and_split_scenario() {
    // Buy 10 @ 10000, Buy 10 @ 20000, Sell 5 @ 18000, 2-for-1 split.
    let operations = vec![
        op(0, OperationType::Buy, "2024-01-05", dec!(10), dec!(10000)),
        op(1, OperationType::Buy, "2024-02-10", dec!(10), dec!(20000)),
        op(2, OperationType::Sell, "2024-03-01", dec!(5), dec!(18000)),
        op(3, OperationType::StockSplit, "2024-04-01", dec!(2), dec!(0)),
    ];

    let replay = resolve_asset_with_states("AAPL", &operations);
    let states = replay.states.as_ref().unwrap();
    assert_eq!(states.len(), 4);

    // After the two buys: average cost 15000, quantity 20.
    assert_eq!(states[1].quantity, dec!(20));
    assert_eq!(states[1].average_cost, dec!(15000));

    // Selling leaves the average cost of the remaining lot untouched.
    assert_eq!(states[2].quantity, dec!(15));
    assert_eq!(states[2].average_cost, dec!(15000));
    assert_eq!(replay.realized_profit, dec!(15000)); // 5 * (18000 - 15000)

    // Split doubles quantity and halves average cost.
    assert_eq!(replay.state.quantity, dec!(30));
    assert_eq!(replay.state.average_cost, dec!(7500));
    assert!(replay.warnings.is_empty());
}

#[test]
fn average_cost_rounds_half_up_to_whole_minor_units() {
    // 1 @ 100 + 2 @ 101 -> 302/3 = 100.67 -> 101 half-up.
    let operations = vec![
        op(0, OperationType::Buy, "2024-01-05", dec!(1), dec!(100)),
        op(1, OperationType::Buy, "2024-01-06", dec!(2), dec!(101)),
    ];
    let replay = resolve_asset("AAPL", &operations);
    assert_eq!(replay.state.average_cost, dec!(101));

    // 1 @ 100 + 1 @ 101 -> 100.5 -> 101 half-up (not banker's 100).
    let operations = vec![
        op(0, OperationType::Buy, "2024-01-05", dec!(1), dec!(100)),
        op(1, OperationType::Buy, "2024-01-06", dec!(1), dec!(101)),
    ];
    let replay = resolve_asset("AAPL", &operations);
    assert_eq!(replay.state.average_cost, dec!(101));
}

#[test]
fn overdraft_sell_is_rejected_without_breaking_replay() {
    let operations = vec![
        op(0, OperationType::Buy, "2024-01-05", dec!(10), dec!(10000)),
        op(1, OperationType::Sell, "2024-02-01", dec!(100), dec!(12000)),
        op(2, OperationType::Buy, "2024-03-01", dec!(10), dec!(20000)),
    ];

    let replay = resolve_asset("AAPL", &operations);

    // Prior valid state survives and later operations still apply.
    assert_eq!(replay.state.quantity, dec!(20));
    assert_eq!(replay.state.average_cost, dec!(15000));
    assert_eq!(replay.realized_profit, Decimal::ZERO);

    assert_eq!(replay.warnings.len(), 1);
    assert_eq!(replay.warnings[0].kind, WarningKind::OverdraftSell);
    assert_eq!(replay.warnings[0].operation_id, "op-1");

    // The rejected sell contributes no withdrawal cash flow.
    let effect = &replay.effects[1];
    assert!(!effect.applied);
    assert_eq!(effect.flow, CashFlow::None);
}

#[test]
fn full_sell_then_rebuy_resets_cost_basis_exactly() {
    let operations = vec![
        op(0, OperationType::Buy, "2024-01-05", dec!(10), dec!(10000)),
        op(1, OperationType::Sell, "2024-02-01", dec!(10), dec!(13000)),
        op(2, OperationType::Buy, "2024-03-01", dec!(4), dec!(25000)),
    ];

    let replay = resolve_asset("AAPL", &operations);
    assert_eq!(replay.state.quantity, dec!(4));
    assert_eq!(replay.state.average_cost, dec!(25000));
    assert_eq!(replay.state.total_invested(), dec!(100000));
    assert_eq!(replay.realized_profit, dec!(30000));
}

#[test]
fn dividends_and_interest_leave_the_lot_untouched() {
    let operations = vec![
        op(0, OperationType::Buy, "2024-01-05", dec!(10), dec!(10000)),
        // Dividend recorded per-unit: 10 units * 150.
        op(1, OperationType::Dividend, "2024-02-01", dec!(10), dec!(150)),
        // Interest recorded as a bare amount, quantity zero.
        op(2, OperationType::Interest, "2024-02-15", dec!(0), dec!(500)),
    ];

    let replay = resolve_asset("AAPL", &operations);
    assert_eq!(replay.state.quantity, dec!(10));
    assert_eq!(replay.state.average_cost, dec!(10000));
    assert_eq!(replay.income, dec!(2000));
    assert_eq!(replay.effects[1].flow, CashFlow::Income(dec!(1500)));
    assert_eq!(replay.effects[2].flow, CashFlow::Income(dec!(500)));
}

#[test]
fn unknown_type_is_a_cash_flow_only_no_op() {
    let operations = vec![
        op(0, OperationType::Buy, "2024-01-05", dec!(10), dec!(10000)),
        op(1, OperationType::Unknown, "2024-02-01", dec!(0), dec!(700)),
        op(2, OperationType::Unknown, "2024-02-02", dec!(0), dec!(0)),
    ];

    let replay = resolve_asset("AAPL", &operations);
    assert_eq!(replay.state.quantity, dec!(10));
    assert_eq!(replay.state.average_cost, dec!(10000));
    assert_eq!(replay.income, dec!(700));
    assert_eq!(replay.effects[1].flow, CashFlow::Income(dec!(700)));
    assert_eq!(replay.effects[2].flow, CashFlow::None);
    assert_eq!(replay.warnings.len(), 2);
    assert!(replay
        .warnings
        .iter()
        .all(|w| w.kind == WarningKind::UnknownOperationType));
}

#[test]
fn split_preserves_total_cost_basis() {
    let operations = vec![
        op(0, OperationType::Buy, "2024-01-05", dec!(3), dec!(10001)),
        op(1, OperationType::StockSplit, "2024-02-01", dec!(3), dec!(0)),
    ];

    let replay = resolve_asset("AAPL", &operations);
    assert_eq!(replay.state.quantity, dec!(9));
    // 10001 / 3 = 3333.67 -> 3334 half-up; basis preserved up to rounding.
    assert_eq!(replay.state.average_cost, dec!(3334));
    let basis_drift = (replay.state.total_invested() - dec!(30003)).abs();
    assert!(basis_drift <= dec!(9), "basis drift {} too large", basis_drift);
}

#[test]
fn holding_time_is_quantity_weighted_net_of_sells_oldest_first() {
    let mut replayer = AssetReplayer::new("AAPL");
    replayer.apply(&op(0, OperationType::Buy, "2024-01-01", dec!(10), dec!(10000)));
    replayer.apply(&op(1, OperationType::Buy, "2024-03-01", dec!(10), dec!(10000)));
    // Sell 10: consumes the January buy entirely.
    replayer.apply(&op(2, OperationType::Sell, "2024-03-10", dec!(10), dec!(11000)));

    let replay = replayer.finish();
    let as_of = date("2024-03-31");
    // Only the March buy remains: held 30 days.
    assert_eq!(replay.average_holding_days(as_of), dec!(30));
}

#[test]
fn sell_dust_counts_as_closed() {
    let operations = vec![
        op(0, OperationType::Buy, "2024-01-05", dec!(1.000000001), dec!(10000)),
        op(1, OperationType::Sell, "2024-02-01", dec!(1), dec!(10000)),
    ];
    let replay = resolve_asset("AAPL", &operations);
    assert_eq!(replay.state.quantity, Decimal::ZERO);
    assert!(!replay.state.is_open());
}
