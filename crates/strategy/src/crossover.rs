use serde::Serialize;

use common::{Direction, TradeIntent};

use crate::snapshot::IndicatorSnapshot;
use crate::trend::{classify, TrendState};

/// Fast/slow relationship at the latest bar relative to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Crossover {
    NoCross,
    CrossedUp,
    CrossedDown,
}

impl std::fmt::Display for Crossover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Crossover::NoCross => write!(f, "no cross"),
            Crossover::CrossedUp => write!(f, "crossed up"),
            Crossover::CrossedDown => write!(f, "crossed down"),
        }
    }
}

/// Result of evaluating one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    pub crossover: Crossover,
    pub trend: TrendState,
    pub intent: TradeIntent,
}

impl Decision {
    pub fn no_signal() -> Self {
        Self {
            crossover: Crossover::NoCross,
            trend: TrendState::default(),
            intent: TradeIntent::none(),
        }
    }
}

/// `fast` was below `slow` on the previous bar and has reached or passed it now.
pub fn crossed_above(fast: &[f64], slow: &[f64]) -> bool {
    match (fast, slow) {
        ([.., fast_prev, fast_curr], [.., slow_prev, slow_curr]) => {
            fast_prev < slow_prev && fast_curr >= slow_curr
        }
        _ => false,
    }
}

/// `fast` was above `slow` on the previous bar and has reached or passed it now.
pub fn crossed_below(fast: &[f64], slow: &[f64]) -> bool {
    match (fast, slow) {
        ([.., fast_prev, fast_curr], [.., slow_prev, slow_curr]) => {
            fast_prev > slow_prev && fast_curr <= slow_curr
        }
        _ => false,
    }
}

pub fn detect(fast: &[f64], slow: &[f64]) -> Crossover {
    if crossed_above(fast, slow) {
        Crossover::CrossedUp
    } else if crossed_below(fast, slow) {
        Crossover::CrossedDown
    } else {
        Crossover::NoCross
    }
}

/// Apply the crossover rule to a snapshot.
///
/// Trend predicates are always computed. With `gate_on_trend == false` they
/// are informational only and every crossover opens a trade. With gating on,
/// a crossover is dropped unless ADX reports a trend and the moving averages
/// are not all sloping against the trade.
pub fn decide(snapshot: &IndicatorSnapshot, gate_on_trend: bool) -> Decision {
    let trend = classify(snapshot);
    let crossover = detect(&snapshot.fast_ma, &snapshot.slow_ma);

    let direction = match crossover {
        Crossover::CrossedUp => Some(Direction::Buy),
        Crossover::CrossedDown => Some(Direction::Sell),
        Crossover::NoCross => None,
    };

    let intent = match direction {
        Some(dir) if !gate_on_trend || passes_trend_filter(&trend, dir) => TradeIntent::open(dir),
        _ => TradeIntent::none(),
    };

    Decision {
        crossover,
        trend,
        intent,
    }
}

fn passes_trend_filter(trend: &TrendState, direction: Direction) -> bool {
    let against = match direction {
        Direction::Buy => trend.ma_trending_down(),
        Direction::Sell => trend.ma_trending_up(),
    };
    trend.adx_trending && !against
}
