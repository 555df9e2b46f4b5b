pub mod config;
pub mod crossover;
pub mod indicators;
pub mod provider;
pub mod snapshot;
pub mod trend;

pub use config::{MovingAverageConfig, StrategyConfig};
pub use crossover::{Crossover, Decision};
pub use provider::{BarHistoryProvider, SnapshotProvider};
pub use snapshot::{IndicatorSnapshot, InsufficientHistory};
pub use trend::TrendState;

/// All strategy implementations must satisfy this trait.
pub trait Strategy: Send + Sync {
    /// Human-readable name of this strategy instance.
    fn name(&self) -> &str;

    /// Evaluate the snapshot taken at one bar close.
    ///
    /// Pure: the same snapshot always yields the same decision. Callers feed
    /// each snapshot once.
    fn evaluate(&self, snapshot: &IndicatorSnapshot) -> Decision;
}

/// Moving-average crossover with informational (or optionally gating) trend
/// filters.
#[derive(Debug, Clone)]
pub struct TrendStrategy {
    name: String,
    gate_on_trend: bool,
}

impl TrendStrategy {
    pub fn new(cfg: &StrategyConfig) -> Self {
        Self {
            name: format!(
                "{} {}({})/{}({})",
                cfg.label, cfg.fast.kind, cfg.fast.period, cfg.slow.kind, cfg.slow.period
            ),
            gate_on_trend: cfg.gate_on_trend,
        }
    }
}

impl Strategy for TrendStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, snapshot: &IndicatorSnapshot) -> Decision {
        crossover::decide(snapshot, self.gate_on_trend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Direction, TradeIntent};

    #[test]
    fn name_describes_both_averages() {
        let strategy = TrendStrategy::new(&StrategyConfig::default());
        assert_eq!(strategy.name(), "TrendBot EMA(10)/EMA(20)");
    }

    #[test]
    fn evaluate_respects_gating_flag() {
        let snap = IndicatorSnapshot {
            fast_ma: vec![1.0, 1.2],
            slow_ma: vec![1.1, 1.1],
            long_ma: vec![1.3, 1.25],
            adx: 10.0,
            adxr: 10.0,
        };
        let ungated = TrendStrategy::new(&StrategyConfig::default());
        assert_eq!(ungated.evaluate(&snap).intent, TradeIntent::open(Direction::Buy));

        let gated = TrendStrategy::new(&StrategyConfig {
            gate_on_trend: true,
            ..StrategyConfig::default()
        });
        assert!(gated.evaluate(&snap).intent.is_none());
    }
}
