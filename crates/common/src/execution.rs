use crate::Order;

/// Order placement surface a strategy sees during `next`.
///
/// `PaperBroker` implements this for backtests. Submissions never fail
/// synchronously: a broker that cannot honour an order reports it later
/// through an `OrderNotification` with a non-alive status.
pub trait Execution {
    /// Cash available for new positions.
    fn cash(&self) -> f64;

    /// Size of the open position in the traded instrument (0 when flat).
    fn position_size(&self) -> f64;

    /// Queue a market buy of `size` units.
    fn submit_buy(&mut self, size: f64) -> Order;

    /// Queue a market order that liquidates the open position.
    /// Returns `None` when there is nothing to close.
    fn submit_close(&mut self) -> Option<Order>;
}
