use std::path::PathBuf;

use crate::{Error, Result};

/// Runtime configuration loaded from environment variables at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// OHLCV CSV file replayed through the backtest.
    pub data_path: PathBuf,

    // Strategy config file path
    pub strategy_config_path: PathBuf,

    // Paper broker
    pub initial_cash: f64,
    pub slippage_bps: f64,

    /// Where to write the JSON run report. Nothing is written when unset.
    pub report_path: Option<PathBuf>,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        Ok(Config {
            data_path: required_env("DATA_PATH")?.into(),
            strategy_config_path: optional_env("STRATEGY_CONFIG_PATH")
                .unwrap_or_else(|| "config/strategies.toml".to_string())
                .into(),
            initial_cash: parsed_env("INITIAL_CASH", 10_000.0)?,
            slippage_bps: parsed_env("SLIPPAGE_BPS", 0.0)?,
            report_path: optional_env("REPORT_PATH").map(PathBuf::from),
        })
    }
}

fn required_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        Error::Config(format!(
            "Required environment variable '{key}' is not set. Check your .env file."
        ))
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parsed_env(key: &str, default: f64) -> Result<f64> {
    match optional_env(key) {
        None => Ok(default),
        Some(raw) => parse_non_negative(key, &raw),
    }
}

fn parse_non_negative(key: &str, raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} must be a number, got: '{raw}'")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(Error::Config(format!(
            "{key} must be a non-negative number, got: '{raw}'"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_numbers() {
        assert_eq!(parse_non_negative("INITIAL_CASH", " 2500.5 ").unwrap(), 2500.5);
    }

    #[test]
    fn rejects_garbage_and_negatives() {
        assert!(matches!(
            parse_non_negative("SLIPPAGE_BPS", "ten"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            parse_non_negative("INITIAL_CASH", "-1"),
            Err(Error::Config(_))
        ));
    }
}
