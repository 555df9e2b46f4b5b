use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use common::{BarEvent, Config, EngineState, Error, Result, TradeExecutor};
use strategy::{Crossover, Decision, SnapshotProvider, Strategy, StrategyConfig, TrendStrategy};

use crate::dispatch::dispatch;

/// Drives one strategy on one instrument: each closed bar is ingested by the
/// provider, evaluated, and the resulting intent dispatched to the executor.
pub struct TrendBot<P: SnapshotProvider> {
    config: StrategyConfig,
    runtime: Config,
    provider: P,
    strategy: Box<dyn Strategy>,
    executor: Arc<dyn TradeExecutor>,
    state: EngineState,
}

impl<P: SnapshotProvider> TrendBot<P> {
    /// Validate configuration and build the bot in the `Stopped` state.
    pub fn new(
        config: StrategyConfig,
        runtime: Config,
        provider: P,
        executor: Arc<dyn TradeExecutor>,
    ) -> Result<Self> {
        config.validate()?;
        runtime.validate()?;
        let strategy = Box::new(TrendStrategy::new(&config));
        Ok(Self {
            config,
            runtime,
            provider,
            strategy,
            executor,
            state: EngineState::Stopped,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn on_start(&mut self) {
        info!(
            strategy = %self.strategy.name(),
            symbol = %self.runtime.symbol,
            volume_in_units = self.config.volume_in_lots * self.runtime.lot_size,
            "TrendBot started"
        );
        self.state = EngineState::Running;
    }

    pub fn on_stop(&mut self) {
        info!(strategy = %self.strategy.name(), "TrendBot stopped");
        self.state = EngineState::Stopped;
    }

    /// Evaluate one closed bar and dispatch the resulting intent.
    ///
    /// The executor is marked to the bar before evaluation, so any order
    /// placed for this bar fills against its close. Warm-up (insufficient
    /// history) yields a no-signal decision, not an error. Out-of-order bars
    /// and executor failures are returned as errors.
    pub async fn on_bar_closed(&mut self, bar: &BarEvent) -> Result<Decision> {
        if self.state != EngineState::Running {
            return Err(Error::NotRunning);
        }

        self.provider.ingest(bar)?;
        self.executor.mark_to_market(bar).await?;

        let snapshot = match self.provider.snapshot() {
            Ok(snapshot) => snapshot,
            Err(warm_up) => {
                debug!(
                    available = warm_up.available,
                    required = warm_up.required,
                    "Warming up; no signal"
                );
                return Ok(Decision::no_signal());
            }
        };

        let decision = self.strategy.evaluate(&snapshot);

        if decision.crossover != Crossover::NoCross {
            info!(
                at = %bar.timestamp,
                crossover = %decision.crossover,
                side = ?decision.intent.direction,
                ma_trending = decision.trend.is_ma_trending(),
                adx_trending = decision.trend.adx_trending,
                adxr = snapshot.adxr,
                "Crossover"
            );
        }

        let lot_size = self.runtime.lot_size;
        let config = &self.config;
        dispatch(
            decision.intent,
            &config.label,
            |direction| config.market_order(direction, lot_size),
            self.executor.as_ref(),
        )
        .await?;

        Ok(decision)
    }

    /// Start, consume bars until the channel closes, then stop.
    /// Per-bar errors are logged and the loop continues.
    pub async fn run(mut self, mut bar_rx: mpsc::Receiver<BarEvent>) {
        self.on_start();
        while let Some(bar) = bar_rx.recv().await {
            match self.on_bar_closed(&bar).await {
                Ok(_) => {}
                Err(e @ Error::OutOfOrderBar { .. }) => {
                    warn!(error = %e, "Bar skipped");
                }
                Err(e) => {
                    error!(at = %bar.timestamp, error = %e, "Bar evaluation failed");
                }
            }
        }
        warn!("Bar channel closed");
        match self.executor.positions(&self.config.label).await {
            Ok(open) => info!(
                label = %self.config.label,
                open = open.len(),
                "Open positions at shutdown"
            ),
            Err(e) => warn!(error = %e, "Could not list open positions at shutdown"),
        }
        self.on_stop();
    }
}
