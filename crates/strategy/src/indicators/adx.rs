use std::collections::VecDeque;

use common::BarEvent;

use super::{retain, tail, IndicatorSource, RETAINED_VALUES};

/// Average Directional Movement Index Rating.
///
/// Uses Wilder's Directional Movement System: smoothed +DM/-DM/TR give
/// +DI/-DI, DX is their normalised spread, ADX is the Wilder average of DX,
/// and `ADXR[i] = (ADX[i] + ADX[i - period]) / 2`.
///
/// ADXR needs at least `3 * period` bars; ADX needs `2 * period`. The Wilder
/// sums and ADX are seeded once and then updated per bar.
#[derive(Debug, Clone)]
pub struct AdxRating {
    pub period: usize,
    prev: Option<BarEvent>,
    seed: DirectionalSums,
    seed_count: usize,
    smoothed: Option<DirectionalSums>,
    dx_seed: Vec<f64>,
    adx: Option<f64>,
    /// Last `period + 1` ADX values, enough to form ADXR.
    adx_history: VecDeque<f64>,
    adxr: VecDeque<f64>,
}

/// True range and directional movement, either raw or Wilder-smoothed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct DirectionalSums {
    tr: f64,
    plus_dm: f64,
    minus_dm: f64,
}

impl DirectionalSums {
    fn between(prev: &BarEvent, curr: &BarEvent) -> Self {
        let tr = (curr.high - curr.low)
            .max((curr.high - prev.close).abs())
            .max((curr.low - prev.close).abs());
        let up = curr.high - prev.high;
        let down = prev.low - curr.low;
        Self {
            tr,
            plus_dm: if up > down && up > 0.0 { up } else { 0.0 },
            minus_dm: if down > up && down > 0.0 { down } else { 0.0 },
        }
    }

    fn add(&mut self, other: &Self) {
        self.tr += other.tr;
        self.plus_dm += other.plus_dm;
        self.minus_dm += other.minus_dm;
    }

    /// Wilder running sum: `s = s - s / period + x`.
    fn smooth(&mut self, other: &Self, period: f64) {
        self.tr = self.tr - self.tr / period + other.tr;
        self.plus_dm = self.plus_dm - self.plus_dm / period + other.plus_dm;
        self.minus_dm = self.minus_dm - self.minus_dm / period + other.minus_dm;
    }

    fn dx(&self) -> f64 {
        let (plus_di, minus_di) = if self.tr > 0.0 {
            (100.0 * self.plus_dm / self.tr, 100.0 * self.minus_dm / self.tr)
        } else {
            (0.0, 0.0)
        };
        let di_sum = plus_di + minus_di;
        if di_sum > 0.0 {
            100.0 * (plus_di - minus_di).abs() / di_sum
        } else {
            0.0
        }
    }
}

impl AdxRating {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            prev: None,
            seed: DirectionalSums::default(),
            seed_count: 0,
            smoothed: None,
            dx_seed: Vec::new(),
            adx: None,
            adx_history: VecDeque::new(),
            adxr: VecDeque::with_capacity(RETAINED_VALUES),
        }
    }

    /// Latest `(adx, adxr)` pair, or `None` during warm-up.
    pub fn latest_pair(&self) -> Option<(f64, f64)> {
        Some((self.adx?, *self.adxr.back()?))
    }

    fn next_dx(&mut self, change: DirectionalSums) -> Option<f64> {
        let p = self.period as f64;
        match self.smoothed.as_mut() {
            Some(s) => s.smooth(&change, p),
            None => {
                self.seed.add(&change);
                self.seed_count += 1;
                if self.seed_count < self.period {
                    return None;
                }
                self.smoothed = Some(self.seed);
            }
        }
        self.smoothed.map(|s| s.dx())
    }

    fn next_adx(&mut self, dx: f64) -> Option<f64> {
        let p = self.period as f64;
        let adx = match self.adx {
            Some(prev) => (prev * (p - 1.0) + dx) / p,
            None => {
                self.dx_seed.push(dx);
                if self.dx_seed.len() < self.period {
                    return None;
                }
                let seed = self.dx_seed.iter().sum::<f64>() / p;
                self.dx_seed.clear();
                seed
            }
        };
        self.adx = Some(adx);
        Some(adx)
    }
}

impl IndicatorSource for AdxRating {
    fn required_bars(&self) -> usize {
        self.period.saturating_mul(3)
    }

    fn update(&mut self, bar: &BarEvent) {
        let Some(prev) = self.prev.replace(*bar) else {
            return;
        };
        let change = DirectionalSums::between(&prev, bar);
        let Some(dx) = self.next_dx(change) else {
            return;
        };
        let Some(adx) = self.next_adx(dx) else {
            return;
        };

        retain(&mut self.adx_history, adx, self.period.saturating_add(1));
        if self.adx_history.len() > self.period {
            let adxr = (adx + self.adx_history[0]) / 2.0;
            retain(&mut self.adxr, adxr, RETAINED_VALUES);
        }
    }

    /// Latest ADXR values.
    fn latest_values(&self, n: usize) -> Option<Vec<f64>> {
        tail(&self.adxr, n)
    }
}
