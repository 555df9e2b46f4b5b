use serde::Serialize;

use crate::snapshot::IndicatorSnapshot;

/// ADXR below this value counts as lacking directional strength.
pub const ADXR_TRENDING_THRESHOLD: f64 = 25.0;

/// Trend predicates derived from one snapshot. Recomputed every bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TrendState {
    pub fast_rising: bool,
    pub fast_falling: bool,
    pub slow_rising: bool,
    pub slow_falling: bool,
    pub long_rising: bool,
    pub long_falling: bool,
    pub adx_trending: bool,
}

impl TrendState {
    /// Fast, slow and long averages all rising.
    pub fn ma_trending_up(&self) -> bool {
        self.fast_rising && self.slow_rising && self.long_rising
    }

    /// Fast, slow and long averages all falling.
    pub fn ma_trending_down(&self) -> bool {
        self.fast_falling && self.slow_falling && self.long_falling
    }

    pub fn is_ma_trending(&self) -> bool {
        self.ma_trending_up() || self.ma_trending_down()
    }
}

/// True iff the last value is strictly above the one before it.
pub fn rising(series: &[f64]) -> bool {
    match series {
        [.., prev, last] => last > prev,
        _ => false,
    }
}

/// True iff the last value is strictly below the one before it.
pub fn falling(series: &[f64]) -> bool {
    match series {
        [.., prev, last] => last < prev,
        _ => false,
    }
}

/// Low ADXR combined with a sloped long average means "not trending".
///
/// A flat long average is reported as trending whatever the ADXR; callers
/// must not read this as a monotonic strength signal.
pub fn adx_trending(adxr: f64, long_series: &[f64]) -> bool {
    !(adxr < ADXR_TRENDING_THRESHOLD && (rising(long_series) || falling(long_series)))
}

pub fn classify(snapshot: &IndicatorSnapshot) -> TrendState {
    TrendState {
        fast_rising: rising(&snapshot.fast_ma),
        fast_falling: falling(&snapshot.fast_ma),
        slow_rising: rising(&snapshot.slow_ma),
        slow_falling: falling(&snapshot.slow_ma),
        long_rising: rising(&snapshot.long_ma),
        long_falling: falling(&snapshot.long_ma),
        adx_trending: adx_trending(snapshot.adxr, &snapshot.long_ma),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rising_and_falling_on_equal_values() {
        assert!(!rising(&[1.0, 1.0]));
        assert!(!falling(&[1.0, 1.0]));
    }

    #[test]
    fn rising_and_falling_use_last_two_points() {
        assert!(rising(&[5.0, 1.0, 2.0]));
        assert!(!falling(&[5.0, 1.0, 2.0]));
        assert!(falling(&[0.0, 2.0, 1.0]));
    }

    #[test]
    fn short_series_has_no_direction() {
        assert!(!rising(&[]));
        assert!(!falling(&[3.0]));
    }

    #[test]
    fn low_adxr_with_slope_is_not_trending() {
        assert!(!adx_trending(20.0, &[1.0, 2.0]));
        assert!(!adx_trending(20.0, &[2.0, 1.0]));
    }

    #[test]
    fn high_adxr_is_trending() {
        assert!(adx_trending(30.0, &[1.0, 2.0]));
        assert!(adx_trending(25.0, &[1.0, 2.0]));
    }

    #[test]
    fn low_adxr_with_flat_long_average_is_trending() {
        assert!(adx_trending(20.0, &[2.0, 2.0]));
    }

    #[test]
    fn classify_reports_every_series() {
        let snapshot = IndicatorSnapshot {
            fast_ma: vec![1.0, 1.2],
            slow_ma: vec![1.1, 1.15],
            long_ma: vec![1.0, 1.01],
            adx: 30.0,
            adxr: 28.0,
        };
        let state = classify(&snapshot);
        assert!(state.fast_rising && state.slow_rising && state.long_rising);
        assert!(!state.fast_falling && !state.slow_falling && !state.long_falling);
        assert!(state.adx_trending);
        assert!(state.ma_trending_up());
        assert!(!state.ma_trending_down());
        assert!(state.is_ma_trending());
    }
}
