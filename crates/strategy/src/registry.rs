use tracing::{debug, info};

use common::{Bar, Error, Execution, OrderNotification, Result};

use crate::config::StrategyConfig;
use crate::{Decision, IndicatorFeed, MacdCciParams, PositionPolicy, Strategy};

/// Build the strategy described by one `[[strategy]]` entry.
pub fn build_strategy(cfg: &StrategyConfig) -> Result<Box<dyn Strategy>> {
    match cfg.strategy_type.as_str() {
        "macd_cci" => {
            let params = MacdCciParams::from_table(&cfg.params);
            validate(&params)?;
            let strategy = MacdCciStrategy::new(cfg.name.clone(), cfg.pair.clone(), params);
            info!(name = %strategy.name(), pair = %strategy.pair(), "Registered strategy");
            Ok(Box::new(strategy))
        }
        other => Err(Error::Config(format!("unknown strategy type '{other}'"))),
    }
}

// Indicator constructors assert on these; report them as config errors instead.
fn validate(p: &MacdCciParams) -> Result<()> {
    let periods = [
        ("macd1", p.macd1),
        ("macd2", p.macd2),
        ("macdsig", p.macdsig),
        ("pfast", p.pfast),
        ("pslow", p.pslow),
        ("atrperiod", p.atrperiod),
        ("smaperiod", p.smaperiod),
        ("cciperiod", p.cciperiod),
    ];
    if let Some((key, _)) = periods.iter().find(|(_, v)| *v == 0) {
        return Err(Error::Config(format!("{key} must be at least 1")));
    }
    if p.macd1 >= p.macd2 {
        return Err(Error::Config("macd1 must be less than macd2".into()));
    }
    if p.ccifactor <= 0.0 {
        return Err(Error::Config("ccifactor must be positive".into()));
    }
    if !(p.order_pct > 0.0 && p.order_pct <= 1.0) {
        return Err(Error::Config("order_pct must be in (0, 1]".into()));
    }
    Ok(())
}

/// MACD crossover entries confirmed by CCI, exits on an ATR trailing stop.
pub struct MacdCciStrategy {
    name: String,
    pair: String,
    feed: IndicatorFeed,
    policy: PositionPolicy,
}

impl MacdCciStrategy {
    pub fn new(name: String, pair: String, params: MacdCciParams) -> Self {
        Self {
            feed: IndicatorFeed::new(&params),
            policy: PositionPolicy::new(params, pair.clone()),
            name,
            pair,
        }
    }
}

impl Strategy for MacdCciStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn pair(&self) -> &str {
        &self.pair
    }

    fn on_bar(&mut self, bar: &Bar, execution: &mut dyn Execution) -> Decision {
        match self.feed.update(bar) {
            Some(snap) => self.policy.next(&snap, execution),
            None => {
                debug!(pair = %self.pair, timestamp = %bar.timestamp, "Indicators warming up");
                Decision::Warmup
            }
        }
    }

    fn notify_order(&mut self, notification: &OrderNotification) {
        self.policy.notify_order(notification);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn cfg(strategy_type: &str, params: &[(&str, toml::Value)]) -> StrategyConfig {
        StrategyConfig {
            strategy_type: strategy_type.into(),
            name: "test".into(),
            pair: "QQQ".into(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn builds_macd_cci() {
        let strategy = build_strategy(&cfg("macd_cci", &[])).unwrap();
        assert_eq!(strategy.name(), "test");
        assert_eq!(strategy.pair(), "QQQ");
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(matches!(build_strategy(&cfg("rsi", &[])), Err(Error::Config(_))));
    }

    #[test]
    fn invalid_params_are_config_errors() {
        let bad = [
            ("macd1", toml::Value::Integer(30)),
            ("cciperiod", toml::Value::Integer(0)),
            ("order_pct", toml::Value::Float(1.5)),
        ];
        for param in bad {
            let result = build_strategy(&cfg("macd_cci", &[param.clone()]));
            assert!(matches!(result, Err(Error::Config(_))), "{param:?} accepted");
        }
    }
}
