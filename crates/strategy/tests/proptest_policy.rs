use proptest::prelude::*;

use common::{Execution, Order, OrderNotification, OrderSide, OrderStatus};
use strategy::{BarSnapshot, Decision, MacdCciParams, PositionPolicy, PositionState};

/// Execution stub that counts submissions and tracks a position size.
#[derive(Default)]
struct CountingExecution {
    cash: f64,
    position: f64,
    submitted: usize,
}

impl Execution for CountingExecution {
    fn cash(&self) -> f64 {
        self.cash
    }

    fn position_size(&self) -> f64 {
        self.position
    }

    fn submit_buy(&mut self, size: f64) -> Order {
        self.submitted += 1;
        Order::market("TEST", OrderSide::Buy, size)
    }

    fn submit_close(&mut self) -> Option<Order> {
        if self.position <= 0.0 {
            return None;
        }
        self.submitted += 1;
        Some(Order::market("TEST", OrderSide::Sell, self.position))
    }
}

fn snapshot() -> impl Strategy<Value = BarSnapshot> {
    (
        1.0f64..1_000.0,
        prop::sample::select(vec![-1.0f64, 0.0, 1.0]),
        -20.0f64..20.0,
        -300.0f64..300.0,
        0.01f64..50.0,
    )
        .prop_map(|(close, crossover, signal, cci, atr)| BarSnapshot {
            close,
            macd: signal + crossover,
            signal,
            crossover,
            cci,
            atr,
            sma_fast: close,
            sma_slow: close,
            sma_trend: close,
            sma_trend_delta: 0.0,
        })
}

fn confirm_fill(policy: &mut PositionPolicy, exec: &mut CountingExecution, order: &Order) {
    let fill = common::Fill {
        order_id: order.id.clone(),
        pair: order.pair.clone(),
        side: order.side,
        fill_price: 1.0,
        size: order.size,
        timestamp: chrono::Utc::now(),
    };
    match order.side {
        OrderSide::Buy => exec.position = order.size,
        OrderSide::Sell => exec.position = 0.0,
    }
    policy.notify_order(&OrderNotification::completed(order, fill));
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// While an order is in flight no bar may submit another one.
    #[test]
    fn pending_order_blocks_submissions(snaps in prop::collection::vec(snapshot(), 1..60)) {
        let mut exec = CountingExecution { cash: 1_000_000.0, ..Default::default() };
        let mut policy = PositionPolicy::new(MacdCciParams::default(), "TEST");

        for snap in &snaps {
            let was_pending = policy.pending_order().is_some();
            let before = exec.submitted;
            let decision = policy.next(snap, &mut exec);
            if was_pending {
                prop_assert_eq!(decision, Decision::Pending);
                prop_assert_eq!(exec.submitted, before);
            }
        }
        prop_assert!(exec.submitted <= 1);
    }

    /// The trailing stop never moves down while the position stays long.
    #[test]
    fn stop_is_non_decreasing_while_long(snaps in prop::collection::vec(snapshot(), 1..80)) {
        let mut exec = CountingExecution { cash: 1_000_000.0, ..Default::default() };
        let mut policy = PositionPolicy::new(MacdCciParams::default(), "TEST");
        let mut last_stop: Option<f64> = None;

        for snap in &snaps {
            let decision = policy.next(snap, &mut exec);
            if let Some(order) = decision.order() {
                confirm_fill(&mut policy, &mut exec, order);
            }

            match decision {
                Decision::Trail { stop } => {
                    if let Some(prev) = last_stop {
                        prop_assert!(stop >= prev, "stop dropped from {} to {}", prev, stop);
                    }
                    last_stop = Some(stop);
                }
                Decision::Enter { stop, .. } => last_stop = Some(stop),
                Decision::Exit { .. } => last_stop = None,
                _ => {}
            }
            if policy.position() == PositionState::Long {
                prop_assert_eq!(policy.stop_level(), last_stop);
            }
        }
    }

    /// A flat policy never buys unless both the cross and the CCI confirmation hold.
    #[test]
    fn entries_require_cross_and_confirmation(snap in snapshot()) {
        let mut exec = CountingExecution { cash: 1_000_000.0, ..Default::default() };
        let mut policy = PositionPolicy::new(MacdCciParams::default(), "TEST");

        let confirmed = snap.crossover > 0.0
            && ((snap.signal < 0.0 && snap.cci > -100.0) || (snap.signal > 0.0 && snap.cci > 50.0));
        let decision = policy.next(&snap, &mut exec);

        if confirmed {
            let is_entry = matches!(decision, Decision::Enter { .. });
            prop_assert!(is_entry);
            prop_assert_eq!(policy.stop_level(), Some(snap.close - 3.0 * snap.atr));
        } else {
            prop_assert_eq!(decision, Decision::Hold);
            prop_assert_eq!(exec.submitted, 0);
        }
    }

    /// A long position closes only when price is under the stop.
    #[test]
    fn closes_only_below_stop(entry in snapshot(), bar in snapshot()) {
        let mut exec = CountingExecution { cash: 1_000_000.0, ..Default::default() };
        let mut policy = PositionPolicy::new(MacdCciParams::default(), "TEST");
        let entry = BarSnapshot { crossover: 1.0, signal: -1.0, cci: 0.0, ..entry };

        let decision = policy.next(&entry, &mut exec);
        let order = decision.order().cloned();
        prop_assert!(order.is_some());
        if let Some(order) = order {
            confirm_fill(&mut policy, &mut exec, &order);
        }
        let stop = policy.stop_level().unwrap_or(f64::NAN);

        match policy.next(&bar, &mut exec) {
            Decision::Exit { .. } => prop_assert!(bar.close < stop),
            Decision::Trail { stop: new } => {
                prop_assert!(bar.close >= stop);
                prop_assert!(new >= stop);
            }
            Decision::Hold => prop_assert_eq!(policy.stop_level(), Some(stop)),
            other => prop_assert!(false, "unexpected decision {:?}", other),
        }
    }

    /// Terminal notifications always clear the pending marker, alive ones never do.
    #[test]
    fn notifications_clear_pending_only_when_terminal(
        status in prop::sample::select(vec![
            OrderStatus::Submitted,
            OrderStatus::Accepted,
            OrderStatus::Partial,
            OrderStatus::Canceled,
            OrderStatus::Margin,
            OrderStatus::Rejected,
            OrderStatus::Expired,
        ]),
    ) {
        let mut exec = CountingExecution { cash: 1_000_000.0, ..Default::default() };
        let mut policy = PositionPolicy::new(MacdCciParams::default(), "TEST");
        let entry = BarSnapshot {
            close: 100.0, macd: 0.0, signal: -1.0, crossover: 1.0, cci: 0.0, atr: 1.0,
            sma_fast: 100.0, sma_slow: 100.0, sma_trend: 100.0, sma_trend_delta: 0.0,
        };
        let decision = policy.next(&entry, &mut exec);
        let order = decision.order().cloned();
        prop_assert!(order.is_some());

        if let Some(order) = order {
            policy.notify_order(&OrderNotification::new(&order, status, chrono::Utc::now()));
        }
        prop_assert_eq!(policy.pending_order().is_some(), status.is_alive());
        prop_assert_eq!(policy.position(), PositionState::Flat);
    }
}
