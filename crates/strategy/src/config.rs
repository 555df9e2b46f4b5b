use serde::{Deserialize, Serialize};

use common::{Error, MarketOrder, Result};

use crate::indicators::{AdxRating, MovingAverage, MovingAverageKind, PriceSource};

pub const STOP_LOSS_PIPS_RANGE: std::ops::RangeInclusive<f64> = 1.0..=2000.0;
pub const TAKE_PROFIT_PIPS_RANGE: std::ops::RangeInclusive<f64> = 0.0..=10_000.0;
/// Upper bound on every indicator period.
pub const MAX_PERIOD: usize = 10_000;

/// Strategy parameters, loaded once at startup and never mutated.
///
/// Example `config/trendbot.toml`:
/// ```toml
/// label = "TrendBot"
/// volume_in_lots = 0.1
/// stop_loss_pips = 20
/// take_profit_pips = 40
/// adx_period = 14
///
/// [fast]
/// period = 10
/// kind = "exponential"
/// source = "close"
///
/// [slow]
/// period = 20
/// kind = "exponential"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub fast: MovingAverageConfig,
    pub slow: MovingAverageConfig,
    /// Long-period trend average (200 by default).
    pub long: MovingAverageConfig,
    pub adx_period: usize,
    /// Order volume in lots; converted to units with the instrument lot size.
    pub volume_in_lots: f64,
    pub stop_loss_pips: f64,
    /// 0 disables the take-profit level.
    pub take_profit_pips: f64,
    /// Tag attached to every order; only positions with this label are managed.
    pub label: String,
    /// When false (default) the trend filters are reported but never block a
    /// crossover trade.
    pub gate_on_trend: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MovingAverageConfig {
    pub period: usize,
    #[serde(default = "default_kind")]
    pub kind: MovingAverageKind,
    #[serde(default)]
    pub source: PriceSource,
}

fn default_kind() -> MovingAverageKind {
    MovingAverageKind::Exponential
}

impl MovingAverageConfig {
    pub fn indicator(&self) -> MovingAverage {
        MovingAverage::new(self.kind, self.period, self.source)
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            fast: MovingAverageConfig {
                period: 10,
                kind: MovingAverageKind::Exponential,
                source: PriceSource::Close,
            },
            slow: MovingAverageConfig {
                period: 20,
                kind: MovingAverageKind::Exponential,
                source: PriceSource::Close,
            },
            long: MovingAverageConfig {
                period: 200,
                kind: MovingAverageKind::Simple,
                source: PriceSource::Close,
            },
            adx_period: 14,
            volume_in_lots: 1.0,
            stop_loss_pips: 10.0,
            take_profit_pips: 0.0,
            label: "TrendBot".to_string(),
            gate_on_trend: false,
        }
    }
}

impl StrategyConfig {
    /// Load from a TOML file and validate.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read strategy config at '{path}': {e}"))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let cfg: StrategyConfig = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations the engine must not start with.
    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("fast", self.fast.period),
            ("slow", self.slow.period),
            ("long", self.long.period),
            ("adx", self.adx_period),
        ];
        for (name, period) in periods {
            if !(1..=MAX_PERIOD).contains(&period) {
                return Err(Error::Config(format!(
                    "{name} period must be within 1..={MAX_PERIOD}, got {period}"
                )));
            }
        }
        if !(self.volume_in_lots.is_finite() && self.volume_in_lots > 0.0) {
            return Err(Error::Config(format!(
                "volume must be > 0 lots, got {}",
                self.volume_in_lots
            )));
        }
        if !STOP_LOSS_PIPS_RANGE.contains(&self.stop_loss_pips) {
            return Err(Error::Config(format!(
                "stop loss must be within 1..=2000 pips, got {}",
                self.stop_loss_pips
            )));
        }
        if !TAKE_PROFIT_PIPS_RANGE.contains(&self.take_profit_pips) {
            return Err(Error::Config(format!(
                "take profit must be within 0..=10000 pips, got {}",
                self.take_profit_pips
            )));
        }
        if self.label.trim().is_empty() {
            return Err(Error::Config("label must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn adx(&self) -> AdxRating {
        AdxRating::new(self.adx_period)
    }

    /// Order submitted for `direction` on every untouched crossover.
    pub fn market_order(&self, direction: common::Direction, lot_size: f64) -> MarketOrder {
        MarketOrder {
            label: self.label.clone(),
            direction,
            volume_in_units: self.volume_in_lots * lot_size,
            stop_loss_pips: self.stop_loss_pips,
            take_profit_pips: (self.take_profit_pips > 0.0).then_some(self.take_profit_pips),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Direction;

    #[test]
    fn defaults_are_valid() {
        assert!(StrategyConfig::default().validate().is_ok());
        assert_eq!(StrategyConfig::default().long.period, 200);
    }

    #[test]
    fn toml_fills_in_defaults() {
        let cfg = StrategyConfig::from_toml(
            r#"
            label = "EURUSD-H1"
            stop_loss_pips = 25

            [fast]
            period = 5
            kind = "weighted"
            source = "typical"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.label, "EURUSD-H1");
        assert_eq!(cfg.stop_loss_pips, 25.0);
        assert_eq!(cfg.fast.period, 5);
        assert_eq!(cfg.fast.kind, MovingAverageKind::Weighted);
        assert_eq!(cfg.fast.source, PriceSource::Typical);
        assert_eq!(cfg.slow.period, 20);
        assert!(!cfg.gate_on_trend);
    }

    #[test]
    fn zero_period_is_rejected() {
        let mut cfg = StrategyConfig::default();
        cfg.slow.period = 0;
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));

        let mut cfg = StrategyConfig::default();
        cfg.adx_period = 0;
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn oversized_period_is_rejected() {
        let err = StrategyConfig::from_toml("adx_period = 9223372036854775807").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let mut cfg = StrategyConfig::default();
        cfg.long.period = MAX_PERIOD;
        assert!(cfg.validate().is_ok());
        cfg.long.period = MAX_PERIOD + 1;
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn non_positive_volume_is_rejected() {
        let mut cfg = StrategyConfig::default();
        cfg.volume_in_lots = 0.0;
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn pip_ranges_are_enforced() {
        let mut cfg = StrategyConfig::default();
        cfg.stop_loss_pips = 0.5;
        assert!(cfg.validate().is_err());
        cfg.stop_loss_pips = 2000.0;
        assert!(cfg.validate().is_ok());

        cfg.take_profit_pips = 10_001.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_label_is_rejected() {
        let mut cfg = StrategyConfig::default();
        cfg.label = "  ".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let err = StrategyConfig::from_toml("fast = 3").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn market_order_converts_lots_and_drops_zero_take_profit() {
        let cfg = StrategyConfig {
            volume_in_lots: 0.5,
            ..StrategyConfig::default()
        };
        let order = cfg.market_order(Direction::Sell, 100_000.0);
        assert_eq!(order.volume_in_units, 50_000.0);
        assert_eq!(order.take_profit_pips, None);
        assert_eq!(order.label, "TrendBot");
    }
}
