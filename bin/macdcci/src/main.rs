use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use common::{Config, Error, Result};
use engine::{load_bars, replay, Backtest};
use strategy::{build_strategy, StrategyFileConfig};

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env()?;
    let strategy_file = StrategyFileConfig::load(&cfg.strategy_config_path)?;
    // One instrument per run: the first entry is the one traded.
    let strategy_cfg = strategy_file
        .strategies
        .first()
        .ok_or_else(|| Error::Config("strategy file has no entries".into()))?;
    if strategy_file.strategies.len() > 1 {
        info!(
            used = %strategy_cfg.name,
            ignored = strategy_file.strategies.len() - 1,
            "Multiple strategies configured; running the first"
        );
    }

    // ── Market data ───────────────────────────────────────────────────────────
    let bars = load_bars(&cfg.data_path, &strategy_cfg.pair)?;
    if bars.is_empty() {
        return Err(Error::Data(format!(
            "no usable bars in {}",
            cfg.data_path.display()
        )));
    }

    // ── Backtest ──────────────────────────────────────────────────────────────
    let strategy = build_strategy(strategy_cfg)?;
    let backtest = Backtest::new(strategy, cfg.initial_cash, cfg.slippage_bps);

    let (bar_tx, bar_rx) = mpsc::channel(256);
    tokio::spawn(replay(bars, bar_tx));
    let report = tokio::spawn(backtest.run(bar_rx))
        .await
        .map_err(|e| Error::Other(format!("backtest task failed: {e}")))?;

    info!(
        pair = %report.pair,
        starting_cash = report.starting_cash,
        final_value = report.final_value,
        trades = report.fills.len(),
        "Run complete"
    );

    if let Some(path) = &cfg.report_path {
        report.write_json(path)?;
        info!(path = %path.display(), "Report written");
    }
    Ok(())
}
