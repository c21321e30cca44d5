//! Fixed-rate trade conversion
//!
//! A flat per-unit value table, no market dynamics. All conversions
//! floor, so value leaks out of round trips and is never invented.

use crate::core::config::TradeConfig;
use crate::core::notify::NotificationSink;
use crate::core::types::{Day, ResourceKind};
use crate::economy::ledger::ResourceLedger;

/// Trade-point value of a stack: `floor(unit_value * amount)`
pub fn value_of(rates: &TradeConfig, kind: ResourceKind, amount: u64) -> u64 {
    (rates.unit_value(kind) * amount as f64).floor() as u64
}

/// How much of `to` a stack of `from` is worth:
/// `floor(value_of(from, amount) / unit_value(to))`
pub fn equivalent(rates: &TradeConfig, from: ResourceKind, amount: u64, to: ResourceKind) -> u64 {
    (value_of(rates, from, amount) as f64 / rates.unit_value(to)).floor() as u64
}

/// Swap landlord stock at the fixed rates.
///
/// Returns the amount received, or None when the give-side stock is
/// short or the conversion floors to zero. The give leg runs through the
/// checked ledger path so an over-draft rejects the whole trade.
pub fn execute_trade(
    ledger: &mut ResourceLedger,
    rates: &TradeConfig,
    give: ResourceKind,
    give_amount: u64,
    take: ResourceKind,
    day: Day,
    sink: &mut dyn NotificationSink,
) -> Option<u64> {
    if give_amount == 0 || give == take {
        return None;
    }
    let received = equivalent(rates, give, give_amount, take);
    if received == 0 {
        tracing::debug!(
            "trade {} {} -> {} floors to zero, rejected",
            give_amount,
            give,
            take
        );
        return None;
    }

    let reason = format!("trade {} for {}", give, take);
    if !ledger.modify_checked(give, -(give_amount as i64), &reason, "trade", day, sink) {
        return None;
    }
    ledger.modify(take, received as i64, &reason, "trade", day, sink);
    Some(received)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimConfig;
    use crate::core::notify::NullSink;

    fn rates() -> TradeConfig {
        // food 2.0, materials 1.5, medical 4.0, fuel 3.0, cash 1.0
        TradeConfig::default()
    }

    #[test]
    fn test_value_of_floors() {
        let rates = rates();
        assert_eq!(value_of(&rates, ResourceKind::Food, 5), 10);
        // 3 * 1.5 = 4.5 -> 4
        assert_eq!(value_of(&rates, ResourceKind::Materials, 3), 4);
        assert_eq!(value_of(&rates, ResourceKind::Cash, 7), 7);
    }

    #[test]
    fn test_equivalent_conversion() {
        let rates = rates();
        // 10 food = 20 points = 5 medical
        assert_eq!(equivalent(&rates, ResourceKind::Food, 10, ResourceKind::Medical), 5);
        // 5 fuel = 15 points = 7.5 food -> 7
        assert_eq!(equivalent(&rates, ResourceKind::Fuel, 5, ResourceKind::Food), 7);
    }

    #[test]
    fn test_round_trip_never_inflates() {
        let rates = rates();
        for from in ResourceKind::ALL {
            for to in ResourceKind::ALL {
                if from == to {
                    continue;
                }
                for n in 0..50u64 {
                    let there = equivalent(&rates, from, n, to);
                    let back = equivalent(&rates, to, there, from);
                    assert!(
                        back <= n,
                        "{} {} -> {} {} -> {} {} invented value",
                        n,
                        from,
                        there,
                        to,
                        back,
                        from
                    );
                }
            }
        }
    }

    #[test]
    fn test_execute_trade_moves_both_legs() {
        let config = SimConfig::default();
        let mut ledger = ResourceLedger::new(&config);
        ledger.set_stock(ResourceKind::Food, 10);

        let received = execute_trade(
            &mut ledger,
            &config.trade,
            ResourceKind::Food,
            10,
            ResourceKind::Medical,
            1,
            &mut NullSink,
        );

        assert_eq!(received, Some(5));
        assert_eq!(ledger.amount(ResourceKind::Food), 0);
        assert_eq!(ledger.amount(ResourceKind::Medical), 5);
        // Both legs recorded
        assert_eq!(ledger.history_len(), 2);
    }

    #[test]
    fn test_execute_trade_rejects_short_stock() {
        let config = SimConfig::default();
        let mut ledger = ResourceLedger::new(&config);
        ledger.set_stock(ResourceKind::Food, 3);

        let received = execute_trade(
            &mut ledger,
            &config.trade,
            ResourceKind::Food,
            10,
            ResourceKind::Medical,
            1,
            &mut NullSink,
        );

        assert_eq!(received, None);
        assert_eq!(ledger.amount(ResourceKind::Food), 3);
        assert_eq!(ledger.amount(ResourceKind::Medical), 0);
    }

    #[test]
    fn test_execute_trade_rejects_zero_yield() {
        let config = SimConfig::default();
        let mut ledger = ResourceLedger::new(&config);
        ledger.set_stock(ResourceKind::Cash, 100);

        // 1 cash = 1 point = 0.25 medical -> floors to zero
        let received = execute_trade(
            &mut ledger,
            &config.trade,
            ResourceKind::Cash,
            1,
            ResourceKind::Medical,
            1,
            &mut NullSink,
        );

        assert_eq!(received, None);
        assert_eq!(ledger.amount(ResourceKind::Cash), 100);
    }
}
