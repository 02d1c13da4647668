use tracing::{debug, info, warn};

use common::{Execution, Order, OrderId, OrderNotification, OrderSide, OrderStatus};

use crate::{BarSnapshot, MacdCciParams};

/// Whether the strategy holds the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long,
}

/// Outcome of evaluating one bar.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Indicators are not warmed up yet.
    Warmup,
    /// An order is still in flight; the bar was not evaluated.
    Pending,
    Hold,
    Enter { order: Order, stop: f64 },
    Exit { order: Order },
    /// Exit check fired but price is above the stop; the stop was ratcheted.
    Trail { stop: f64 },
}

impl Decision {
    /// The order submitted on this bar, if any.
    pub fn order(&self) -> Option<&Order> {
        match self {
            Decision::Enter { order, .. } | Decision::Exit { order } => Some(order),
            _ => None,
        }
    }
}

/// Long-only entry/exit rules with an ATR trailing stop.
///
/// At most one order is in flight at any time: while `pending` is set every
/// bar is skipped, and only a terminal order notification clears it.
#[derive(Debug, Clone)]
pub struct PositionPolicy {
    params: MacdCciParams,
    ticker: String,
    position: PositionState,
    pending: Option<OrderId>,
    stop: Option<f64>,
}

impl PositionPolicy {
    pub fn new(params: MacdCciParams, ticker: impl Into<String>) -> Self {
        Self {
            params,
            ticker: ticker.into(),
            position: PositionState::Flat,
            pending: None,
            stop: None,
        }
    }

    pub fn position(&self) -> PositionState {
        self.position
    }

    pub fn pending_order(&self) -> Option<&OrderId> {
        self.pending.as_ref()
    }

    pub fn stop_level(&self) -> Option<f64> {
        self.stop
    }

    /// Apply a broker status change.
    ///
    /// Any non-alive status clears the pending marker, whatever the outcome.
    /// Only completed fills move the position.
    pub fn notify_order(&mut self, notification: &OrderNotification) {
        if notification.status == OrderStatus::Completed {
            self.position = match notification.side {
                OrderSide::Buy => PositionState::Long,
                OrderSide::Sell => PositionState::Flat,
            };
            if let Some(fill) = &notification.fill {
                info!(
                    ticker = %self.ticker,
                    side = %fill.side,
                    size = fill.size,
                    price = fill.fill_price,
                    "Order completed"
                );
            }
        } else if !notification.is_alive() {
            warn!(
                ticker = %self.ticker,
                side = %notification.side,
                status = %notification.status,
                "Order did not complete"
            );
        }

        if !notification.is_alive() {
            self.pending = None;
        }
    }

    /// Evaluate one bar and submit at most one order through `execution`.
    pub fn next(&mut self, snap: &BarSnapshot, execution: &mut dyn Execution) -> Decision {
        if self.pending.is_some() {
            debug!(ticker = %self.ticker, "Order pending — bar skipped");
            return Decision::Pending;
        }

        match self.position {
            PositionState::Flat => self.try_enter(snap, execution),
            PositionState::Long => self.manage_long(snap, execution),
        }
    }

    fn entry_signalled(&self, snap: &BarSnapshot) -> bool {
        if snap.crossover <= 0.0 {
            return false;
        }
        (snap.signal < 0.0 && snap.cci > self.params.cci_entry_floor)
            || (snap.signal > 0.0 && snap.cci > self.params.cci_entry_confirm)
    }

    // CCI below the exit level is sufficient on its own.
    fn exit_signalled(&self, snap: &BarSnapshot) -> bool {
        snap.cci < self.params.cci_exit || (snap.crossover < 0.0 && snap.signal > 0.0)
    }

    fn stop_for(&self, snap: &BarSnapshot) -> f64 {
        snap.close - snap.atr * self.params.atrdist
    }

    fn try_enter(&mut self, snap: &BarSnapshot, execution: &mut dyn Execution) -> Decision {
        if !self.entry_signalled(snap) {
            return Decision::Hold;
        }

        let size = (self.params.order_pct * execution.cash() / snap.close).floor();
        if !size.is_finite() || size < 1.0 {
            warn!(
                ticker = %self.ticker,
                cash = execution.cash(),
                close = snap.close,
                "Entry signalled but cash buys less than one unit"
            );
            return Decision::Hold;
        }

        let order = execution.submit_buy(size);
        let stop = self.stop_for(snap);
        self.pending = Some(order.id.clone());
        self.stop = Some(stop);
        info!(
            ticker = %self.ticker,
            size = size,
            close = snap.close,
            stop = stop,
            "Buy submitted"
        );
        Decision::Enter { order, stop }
    }

    fn manage_long(&mut self, snap: &BarSnapshot, execution: &mut dyn Execution) -> Decision {
        if !self.exit_signalled(snap) {
            return Decision::Hold;
        }

        let current = self.stop;
        match current {
            Some(stop) if snap.close < stop => match execution.submit_close() {
                Some(order) => {
                    info!(
                        ticker = %self.ticker,
                        size = order.size,
                        close = snap.close,
                        stop = stop,
                        "Stop hit — close submitted"
                    );
                    self.pending = Some(order.id.clone());
                    self.stop = None;
                    Decision::Exit { order }
                }
                None => {
                    warn!(ticker = %self.ticker, "Broker reports no position to close — resetting to flat");
                    self.position = PositionState::Flat;
                    self.stop = None;
                    Decision::Hold
                }
            },
            _ => {
                let candidate = self.stop_for(snap);
                let stop = current.map_or(candidate, |s| s.max(candidate));
                self.stop = Some(stop);
                debug!(ticker = %self.ticker, close = snap.close, stop = stop, "Stop ratcheted");
                Decision::Trail { stop }
            }
        }
    }
}
