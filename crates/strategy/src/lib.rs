pub mod config;
pub mod feed;
pub mod indicators;
pub mod params;
pub mod policy;
pub mod registry;

pub use config::{StrategyConfig, StrategyFileConfig};
pub use feed::{BarSnapshot, IndicatorFeed};
pub use params::MacdCciParams;
pub use policy::{Decision, PositionPolicy, PositionState};
pub use registry::{build_strategy, MacdCciStrategy};

use common::{Bar, Execution, OrderNotification};

/// All strategy implementations must satisfy this trait.
///
/// The driver calls `notify_order` for every broker status change before
/// calling `on_bar` for the next bar, strictly in that order.
pub trait Strategy: Send {
    /// Human-readable name of this strategy instance.
    fn name(&self) -> &str;

    /// The instrument this strategy trades (e.g. "QQQ").
    fn pair(&self) -> &str;

    /// Evaluate one closed bar, submitting at most one order.
    fn on_bar(&mut self, bar: &Bar, execution: &mut dyn Execution) -> Decision;

    /// Receive a status change for an order this strategy submitted.
    fn notify_order(&mut self, notification: &OrderNotification);
}
