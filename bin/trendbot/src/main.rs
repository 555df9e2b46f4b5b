use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::{BarEvent, Config};
use engine::TrendBot;
use paper::PaperExecutor;
use strategy::{BarHistoryProvider, StrategyConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().context("loading runtime config")?;
    let strategy_cfg = StrategyConfig::load(&cfg.strategy_config_path)
        .with_context(|| format!("loading strategy config from {}", cfg.strategy_config_path))?;
    info!(symbol = %cfg.symbol, label = %strategy_cfg.label, "TrendBot starting in paper mode");

    // ── Executor + bot ────────────────────────────────────────────────────────
    let executor = Arc::new(PaperExecutor::new(cfg.pip_size, cfg.paper_slippage_bps));
    let provider = BarHistoryProvider::new(&strategy_cfg);
    info!(warm_up_bars = provider.required_bars(), "Indicator history required");
    let bot = TrendBot::new(strategy_cfg, cfg, provider, executor)?;

    // ── Bar feed: one JSON bar per line on stdin ─────────────────────────────
    let (bar_tx, bar_rx) = mpsc::channel::<BarEvent>(128);
    let bot_task = tokio::spawn(bot.run(bar_rx));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let bar: BarEvent = match serde_json::from_str(&line) {
                    Ok(bar) => bar,
                    Err(e) => {
                        warn!(error = %e, "Skipping malformed bar");
                        continue;
                    }
                };
                if bar_tx.send(bar).await.is_err() {
                    warn!("Bot stopped accepting bars");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    drop(bar_tx);
    bot_task.await.context("bot task panicked")?;
    info!("Exiting.");
    Ok(())
}
