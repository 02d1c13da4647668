use std::path::Path;

use serde::Serialize;

use common::{Fill, Result};

/// Summary of one backtest run.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub strategy: String,
    pub pair: String,
    pub bars: usize,
    pub starting_cash: f64,
    pub final_cash: f64,
    pub final_position: f64,
    /// Cash plus the open position marked at the last close.
    pub final_value: f64,
    pub fills: Vec<Fill>,
}

impl BacktestReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
