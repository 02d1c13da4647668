pub mod backtest;
pub mod data;
pub mod report;

pub use backtest::Backtest;
pub use data::{load_bars, parse_bars, replay};
pub use report::BacktestReport;
