use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Tunable parameters of the MACD/CCI strategy.
///
/// Defaults are the classic MACD(12, 26, 9), CCI(20, 0.015) and a
/// 3×ATR(14) trailing stop, investing 95% of cash per entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdCciParams {
    pub macd1: usize,
    pub macd2: usize,
    pub macdsig: usize,
    /// Fast trend SMA.
    pub pfast: usize,
    /// Slow trend SMA.
    pub pslow: usize,
    pub atrperiod: usize,
    /// Stop distance in ATR multiples.
    pub atrdist: f64,
    pub smaperiod: usize,
    /// Lookback used for the SMA trend delta.
    pub dirperiod: usize,
    pub cciperiod: usize,
    pub ccifactor: f64,
    /// Entry when the signal line is below zero needs CCI above this.
    pub cci_entry_floor: f64,
    /// Entry when the signal line is above zero needs CCI above this.
    pub cci_entry_confirm: f64,
    /// Exit check fires while CCI is below this.
    pub cci_exit: f64,
    /// Fraction of cash committed on entry.
    pub order_pct: f64,
}

impl Default for MacdCciParams {
    fn default() -> Self {
        Self {
            macd1: 12,
            macd2: 26,
            macdsig: 9,
            pfast: 13,
            pslow: 50,
            atrperiod: 14,
            atrdist: 3.0,
            smaperiod: 30,
            dirperiod: 10,
            cciperiod: 20,
            ccifactor: 0.015,
            cci_entry_floor: -100.0,
            cci_entry_confirm: 50.0,
            cci_exit: 100.0,
            order_pct: 0.95,
        }
    }
}

impl MacdCciParams {
    /// Overlay values from a `[strategy.params]` table onto the defaults.
    /// Unknown keys are ignored; integers are accepted for float params.
    pub fn from_table(params: &HashMap<String, toml::Value>) -> Self {
        let d = Self::default();
        Self {
            macd1: param_usize(params, "macd1", d.macd1),
            macd2: param_usize(params, "macd2", d.macd2),
            macdsig: param_usize(params, "macdsig", d.macdsig),
            pfast: param_usize(params, "pfast", d.pfast),
            pslow: param_usize(params, "pslow", d.pslow),
            atrperiod: param_usize(params, "atrperiod", d.atrperiod),
            atrdist: param_f64(params, "atrdist", d.atrdist),
            smaperiod: param_usize(params, "smaperiod", d.smaperiod),
            dirperiod: param_usize(params, "dirperiod", d.dirperiod),
            cciperiod: param_usize(params, "cciperiod", d.cciperiod),
            ccifactor: param_f64(params, "ccifactor", d.ccifactor),
            cci_entry_floor: param_f64(params, "cci_entry_floor", d.cci_entry_floor),
            cci_entry_confirm: param_f64(params, "cci_entry_confirm", d.cci_entry_confirm),
            cci_exit: param_f64(params, "cci_exit", d.cci_exit),
            order_pct: param_f64(params, "order_pct", d.order_pct),
        }
    }
}

fn param_f64(params: &HashMap<String, toml::Value>, key: &str, default: f64) -> f64 {
    params
        .get(key)
        .and_then(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)))
        .unwrap_or(default)
}

fn param_usize(params: &HashMap<String, toml::Value>, key: &str, default: usize) -> usize {
    params
        .get(key)
        .and_then(|v| v.as_integer())
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_yields_defaults() {
        assert_eq!(MacdCciParams::from_table(&HashMap::new()), MacdCciParams::default());
    }

    #[test]
    fn table_overrides_and_integer_floats() {
        let mut table = HashMap::new();
        table.insert("macd1".to_string(), toml::Value::Integer(8));
        table.insert("atrdist".to_string(), toml::Value::Integer(2));
        table.insert("order_pct".to_string(), toml::Value::Float(0.5));
        table.insert("pslow".to_string(), toml::Value::Integer(-3));

        let p = MacdCciParams::from_table(&table);
        assert_eq!(p.macd1, 8);
        assert_eq!(p.atrdist, 2.0);
        assert_eq!(p.order_pct, 0.5);
        assert_eq!(p.pslow, 50, "negative periods fall back to the default");
    }
}
