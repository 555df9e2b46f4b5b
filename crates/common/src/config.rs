use crate::{Error, Result};

/// Runtime configuration loaded from environment variables at startup.
/// Every variable is optional; unparsable values fail fast.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Instrument the bot trades, e.g. "EURUSD".
    pub symbol: String,
    /// Units per lot, used to convert the configured lot volume.
    pub lot_size: f64,
    /// Price distance of one pip.
    pub pip_size: f64,
    /// Path of the strategy TOML file.
    pub strategy_config_path: String,
    // Paper trading
    pub paper_slippage_bps: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbol: "EURUSD".to_string(),
            lot_size: 100_000.0,
            pip_size: 0.0001,
            strategy_config_path: "config/trendbot.toml".to_string(),
            paper_slippage_bps: 0.0,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    /// Loads `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let cfg = Config {
            symbol: lookup("TRENDBOT_SYMBOL").unwrap_or(defaults.symbol),
            lot_size: parse_or(&lookup, "TRENDBOT_LOT_SIZE", defaults.lot_size)?,
            pip_size: parse_or(&lookup, "TRENDBOT_PIP_SIZE", defaults.pip_size)?,
            strategy_config_path: lookup("TRENDBOT_STRATEGY_CONFIG")
                .unwrap_or(defaults.strategy_config_path),
            paper_slippage_bps: parse_or(&lookup, "PAPER_SLIPPAGE_BPS", defaults.paper_slippage_bps)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.lot_size.is_finite() && self.lot_size > 0.0) {
            return Err(Error::Config(format!(
                "lot size must be > 0, got {}",
                self.lot_size
            )));
        }
        if !(self.pip_size.is_finite() && self.pip_size > 0.0) {
            return Err(Error::Config(format!(
                "pip size must be > 0, got {}",
                self.pip_size
            )));
        }
        if !(self.paper_slippage_bps.is_finite() && self.paper_slippage_bps >= 0.0) {
            return Err(Error::Config(format!(
                "paper slippage must be a finite number >= 0 bps, got {}",
                self.paper_slippage_bps
            )));
        }
        Ok(())
    }
}

fn parse_or<F>(lookup: &F, key: &str, default: f64) -> Result<f64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
            Error::Config(format!("{key} must be a number, got '{raw}'"))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("TRENDBOT_SYMBOL", "USDJPY"),
            ("TRENDBOT_PIP_SIZE", "0.01"),
            ("TRENDBOT_LOT_SIZE", "1000"),
        ]))
        .unwrap();
        assert_eq!(cfg.symbol, "USDJPY");
        assert_eq!(cfg.pip_size, 0.01);
        assert_eq!(cfg.lot_size, 1000.0);
    }

    #[test]
    fn unparsable_number_is_config_error() {
        let err = Config::from_lookup(lookup_from(&[("TRENDBOT_LOT_SIZE", "lots")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn non_positive_pip_size_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("TRENDBOT_PIP_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn non_finite_or_negative_slippage_is_rejected() {
        for raw in ["NaN", "inf", "-1"] {
            let err = Config::from_lookup(lookup_from(&[("PAPER_SLIPPAGE_BPS", raw)])).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "accepted slippage {raw}");
        }
        let cfg = Config::from_lookup(lookup_from(&[("PAPER_SLIPPAGE_BPS", "2.5")])).unwrap();
        assert_eq!(cfg.paper_slippage_bps, 2.5);
    }
}
