pub mod adx;
pub mod moving_average;

pub use adx::AdxRating;
pub use moving_average::MovingAverage;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use common::BarEvent;

/// Which price of each bar feeds an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Open,
    High,
    Low,
    #[default]
    Close,
    /// (high + low) / 2
    Median,
    /// (high + low + close) / 3
    Typical,
    /// (high + low + 2 * close) / 4
    Weighted,
}

impl PriceSource {
    pub fn price(self, bar: &BarEvent) -> f64 {
        match self {
            PriceSource::Open => bar.open,
            PriceSource::High => bar.high,
            PriceSource::Low => bar.low,
            PriceSource::Close => bar.close,
            PriceSource::Median => (bar.high + bar.low) / 2.0,
            PriceSource::Typical => (bar.high + bar.low + bar.close) / 3.0,
            PriceSource::Weighted => (bar.high + bar.low + 2.0 * bar.close) / 4.0,
        }
    }
}

/// Smoothing applied by a moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovingAverageKind {
    Simple,
    Exponential,
    Weighted,
}

impl std::fmt::Display for MovingAverageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovingAverageKind::Simple => write!(f, "SMA"),
            MovingAverageKind::Exponential => write!(f, "EMA"),
            MovingAverageKind::Weighted => write!(f, "WMA"),
        }
    }
}

/// Values each indicator keeps available through `latest_values`.
pub const RETAINED_VALUES: usize = 16;

/// A streaming indicator fed one closed bar at a time.
///
/// State is seeded once from the first bars and updated incrementally, so a
/// value produced for a bar never changes afterwards.
pub trait IndicatorSource {
    /// Minimum number of bars before the first value is available.
    fn required_bars(&self) -> usize;

    /// Feed the next closed bar.
    fn update(&mut self, bar: &BarEvent);

    /// The last `n` values (oldest first).
    /// Returns `None` if fewer than `n` values are available.
    fn latest_values(&self, n: usize) -> Option<Vec<f64>>;
}

/// Append to a bounded value history.
pub(crate) fn retain(values: &mut VecDeque<f64>, value: f64, cap: usize) {
    values.push_back(value);
    while values.len() > cap {
        values.pop_front();
    }
}

/// Take the tail of a value history, or `None` if it is too short.
pub(crate) fn tail(values: &VecDeque<f64>, n: usize) -> Option<Vec<f64>> {
    if n == 0 || values.len() < n {
        return None;
    }
    Some(values.iter().skip(values.len() - n).copied().collect())
}
