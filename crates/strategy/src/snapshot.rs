use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Indicator values available at one bar close. Series are oldest first and
/// hold at least two points when produced by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub fast_ma: Vec<f64>,
    pub slow_ma: Vec<f64>,
    pub long_ma: Vec<f64>,
    pub adx: f64,
    pub adxr: f64,
}

/// Not enough closed bars yet to fill every series. Treated as "no signal".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("insufficient history: {available} of {required} bars")]
pub struct InsufficientHistory {
    pub available: usize,
    pub required: usize,
}
