use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use common::{Error, Result};

/// Top-level strategy config file (TOML).
///
/// Example `config/strategies.toml`:
/// ```toml
/// [[strategy]]
/// type = "macd_cci"
/// name = "QQQ MACD/CCI"
/// pair = "QQQ"
///
/// [strategy.params]
/// macd1 = 12
/// macd2 = 26
/// atrdist = 3.0
/// order_pct = 0.95
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyFileConfig {
    #[serde(rename = "strategy")]
    pub strategies: Vec<StrategyConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyConfig {
    /// Strategy type identifier, e.g. "macd_cci".
    #[serde(rename = "type")]
    pub strategy_type: String,
    /// Human-readable name shown in logs and the run report.
    pub name: String,
    /// Instrument ticker, e.g. "QQQ".
    pub pair: String,
    /// Indicator-specific parameters.
    #[serde(default)]
    pub params: HashMap<String, toml::Value>,
}

impl StrategyFileConfig {
    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read strategy config at '{}': {e}",
                path.display()
            ))
        })?;
        Self::parse(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse strategy config at '{}': {e}",
                path.display()
            ))
        })
    }

    pub fn parse(content: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(content)?;
        if cfg.strategies.is_empty() {
            return Err(Error::Config("no [[strategy]] entries".into()));
        }
        Ok(cfg)
    }
}
