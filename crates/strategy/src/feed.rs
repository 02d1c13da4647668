use std::collections::VecDeque;

use serde::Serialize;

use common::Bar;

use crate::indicators::{Atr, Cci, CrossOver, Macd, Sma};
use crate::MacdCciParams;

/// Indicator readings for one bar, as seen by the position policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BarSnapshot {
    pub close: f64,
    pub macd: f64,
    pub signal: f64,
    /// +1 MACD crossed above signal this bar, −1 crossed below, 0 otherwise.
    pub crossover: f64,
    pub cci: f64,
    pub atr: f64,
    pub sma_fast: f64,
    pub sma_slow: f64,
    pub sma_trend: f64,
    /// `sma_trend` now minus `sma_trend` `dirperiod` bars ago.
    pub sma_trend_delta: f64,
}

/// Computes a [`BarSnapshot`] per bar from one instance of every indicator.
///
/// Returns `None` until all of them are warmed up, so consumers never see a
/// snapshot built from partial data.
#[derive(Debug, Clone)]
pub struct IndicatorFeed {
    macd: Macd,
    cross: CrossOver,
    cci: Cci,
    atr: Atr,
    sma_fast: Sma,
    sma_slow: Sma,
    sma_trend: Sma,
    trend_history: VecDeque<f64>,
    dirperiod: usize,
}

impl IndicatorFeed {
    pub fn new(params: &MacdCciParams) -> Self {
        Self {
            macd: Macd::new(params.macd1, params.macd2, params.macdsig),
            cross: CrossOver::new(),
            cci: Cci::new(params.cciperiod, params.ccifactor),
            atr: Atr::new(params.atrperiod),
            sma_fast: Sma::new(params.pfast),
            sma_slow: Sma::new(params.pslow),
            sma_trend: Sma::new(params.smaperiod),
            trend_history: VecDeque::with_capacity(params.dirperiod + 1),
            dirperiod: params.dirperiod,
        }
    }

    pub fn update(&mut self, bar: &Bar) -> Option<BarSnapshot> {
        // Every indicator must see every bar, so nothing short-circuits here.
        let macd = self.macd.update(bar.close);
        let crossover = macd.and_then(|m| self.cross.update(m.macd, m.signal));
        let cci = self.cci.update(bar.high, bar.low, bar.close);
        let atr = self.atr.update(bar.high, bar.low, bar.close);
        let sma_fast = self.sma_fast.update(bar.close);
        let sma_slow = self.sma_slow.update(bar.close);
        let sma_trend = self.sma_trend.update(bar.close);
        let sma_trend_delta = sma_trend.and_then(|sma| self.trend_delta(sma));

        let macd = macd?;
        Some(BarSnapshot {
            close: bar.close,
            macd: macd.macd,
            signal: macd.signal,
            crossover: crossover?,
            cci: cci?,
            atr: atr?,
            sma_fast: sma_fast?,
            sma_slow: sma_slow?,
            sma_trend: sma_trend?,
            sma_trend_delta: sma_trend_delta?,
        })
    }

    fn trend_delta(&mut self, sma: f64) -> Option<f64> {
        self.trend_history.push_back(sma);
        if self.trend_history.len() > self.dirperiod + 1 {
            self.trend_history.pop_front();
        }
        if self.trend_history.len() == self.dirperiod + 1 {
            self.trend_history.front().map(|past| sma - past)
        } else {
            None
        }
    }
}
