use tokio::sync::mpsc;
use tracing::{info, warn};

use common::{Bar, Execution, Fill};
use paper::PaperBroker;
use strategy::{Decision, Strategy};

use crate::BacktestReport;

/// Drives one strategy against the paper broker, bar by bar.
///
/// Each step first lets the broker execute what was queued on the previous
/// bar and hands every resulting notification to the strategy, then lets the
/// strategy evaluate the new bar. Notifications therefore always land
/// between two evaluations, never during one.
pub struct Backtest {
    broker: PaperBroker,
    strategy: Box<dyn Strategy>,
    starting_cash: f64,
    bars: usize,
    last_close: Option<f64>,
    fills: Vec<Fill>,
}

impl Backtest {
    pub fn new(strategy: Box<dyn Strategy>, initial_cash: f64, slippage_bps: f64) -> Self {
        let broker = PaperBroker::new(strategy.pair(), initial_cash, slippage_bps);
        Self {
            broker,
            strategy,
            starting_cash: initial_cash,
            bars: 0,
            last_close: None,
            fills: Vec::new(),
        }
    }

    pub fn broker(&self) -> &PaperBroker {
        &self.broker
    }

    /// Process one bar and return what the strategy decided on it.
    pub fn step(&mut self, bar: &Bar) -> Decision {
        if bar.pair != self.strategy.pair() {
            warn!(expected = %self.strategy.pair(), got = %bar.pair, "Ignoring bar for another pair");
            return Decision::Hold;
        }

        for notification in self.broker.process_bar(bar) {
            if let Some(fill) = &notification.fill {
                self.fills.push(fill.clone());
            }
            self.strategy.notify_order(&notification);
        }

        self.bars += 1;
        self.last_close = Some(bar.close);
        self.strategy.on_bar(bar, &mut self.broker)
    }

    /// Consume bars until the channel closes, then report.
    pub async fn run(mut self, mut bar_rx: mpsc::Receiver<Bar>) -> BacktestReport {
        info!(strategy = %self.strategy.name(), pair = %self.strategy.pair(), "Backtest running");
        while let Some(bar) = bar_rx.recv().await {
            self.step(&bar);
        }
        self.finish()
    }

    /// Run over an in-memory series without a channel.
    pub fn run_all<'a>(mut self, bars: impl IntoIterator<Item = &'a Bar>) -> BacktestReport {
        for bar in bars {
            self.step(bar);
        }
        self.finish()
    }

    pub fn finish(self) -> BacktestReport {
        let mark = self.last_close.unwrap_or(0.0);
        let report = BacktestReport {
            strategy: self.strategy.name().to_string(),
            pair: self.strategy.pair().to_string(),
            bars: self.bars,
            starting_cash: self.starting_cash,
            final_cash: self.broker.cash(),
            final_position: self.broker.position_size(),
            final_value: self.broker.value(mark),
            fills: self.fills,
        };
        info!(
            bars = report.bars,
            fills = report.fills.len(),
            final_value = report.final_value,
            "Backtest finished"
        );
        report
    }
}
