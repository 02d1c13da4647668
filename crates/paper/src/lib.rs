use std::collections::VecDeque;

use tracing::{debug, info, warn};

use common::{Bar, Execution, Fill, Order, OrderNotification, OrderSide, OrderStatus};

/// Simulated broker for backtests.
///
/// Market orders submitted while bar *t* is evaluated execute at the open of
/// bar *t+1*, adjusted by a configurable slippage. Nothing is sent anywhere.
#[derive(Debug)]
pub struct PaperBroker {
    pair: String,
    cash: f64,
    /// Units held in `pair`.
    position: f64,
    /// Volume-weighted entry price of the open position.
    entry_price: f64,
    /// Orders waiting for the next bar.
    queued: VecDeque<Order>,
    /// Slippage in basis points applied to all fills.
    slippage_bps: f64,
}

impl PaperBroker {
    pub fn new(pair: impl Into<String>, initial_cash: f64, slippage_bps: f64) -> Self {
        let pair = pair.into();
        info!(
            pair = %pair,
            cash = initial_cash,
            slippage_bps = slippage_bps,
            "PaperBroker initialized"
        );
        Self {
            pair,
            cash: initial_cash,
            position: 0.0,
            entry_price: 0.0,
            queued: VecDeque::new(),
            slippage_bps,
        }
    }

    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    /// Cash plus the open position marked at `price`.
    pub fn value(&self, price: f64) -> f64 {
        self.cash + self.position * price
    }

    /// Execute queued orders at `bar.open` and return every status change,
    /// stamped with `bar.timestamp`: all acceptances first, then the outcome
    /// of each order in submission order.
    pub fn process_bar(&mut self, bar: &Bar) -> Vec<OrderNotification> {
        let mut notifications: Vec<OrderNotification> = self
            .queued
            .iter()
            .map(|order| OrderNotification::new(order, OrderStatus::Accepted, bar.timestamp))
            .collect();
        while let Some(order) = self.queued.pop_front() {
            notifications.push(self.execute(&order, bar));
        }
        notifications
    }

    fn execute(&mut self, order: &Order, bar: &Bar) -> OrderNotification {
        // Apply slippage: buys pay more, sells receive less
        let fill_price = match order.side {
            OrderSide::Buy => bar.open * (1.0 + self.slippage_bps / 10_000.0),
            OrderSide::Sell => bar.open * (1.0 - self.slippage_bps / 10_000.0),
        };

        match order.side {
            OrderSide::Buy => {
                let cost = fill_price * order.size;
                if cost > self.cash {
                    warn!(
                        pair = %order.pair,
                        cost = cost,
                        cash = self.cash,
                        "Paper buy exceeds available cash"
                    );
                    return OrderNotification::new(order, OrderStatus::Margin, bar.timestamp);
                }
                self.cash -= cost;
                let held = self.position + order.size;
                self.entry_price =
                    (self.entry_price * self.position + fill_price * order.size) / held;
                self.position = held;
            }
            OrderSide::Sell => {
                if order.size > self.position {
                    warn!(
                        pair = %order.pair,
                        size = order.size,
                        held = self.position,
                        "Paper sell exceeds open position"
                    );
                    return OrderNotification::new(order, OrderStatus::Canceled, bar.timestamp);
                }
                self.cash += fill_price * order.size;
                self.position -= order.size;
                if self.position == 0.0 {
                    self.entry_price = 0.0;
                }
            }
        }

        debug!(
            pair = %order.pair,
            side = %order.side,
            open = bar.open,
            fill = fill_price,
            size = order.size,
            "Paper fill simulated"
        );

        OrderNotification::completed(
            order,
            Fill {
                order_id: order.id.clone(),
                pair: order.pair.clone(),
                side: order.side,
                fill_price,
                size: order.size,
                timestamp: bar.timestamp,
            },
        )
    }

    fn queue(&mut self, order: Order) -> Order {
        self.queued.push_back(order.clone());
        order
    }
}

impl Execution for PaperBroker {
    fn cash(&self) -> f64 {
        self.cash
    }

    fn position_size(&self) -> f64 {
        self.position
    }

    fn submit_buy(&mut self, size: f64) -> Order {
        let order = Order::market(self.pair.clone(), OrderSide::Buy, size);
        self.queue(order)
    }

    fn submit_close(&mut self) -> Option<Order> {
        if self.position <= 0.0 {
            return None;
        }
        let order = Order::market(self.pair.clone(), OrderSide::Sell, self.position);
        Some(self.queue(order))
    }
}
