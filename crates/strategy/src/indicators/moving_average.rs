use std::collections::VecDeque;

use common::BarEvent;

use super::{retain, tail, IndicatorSource, MovingAverageKind, PriceSource, RETAINED_VALUES};

/// A moving average over one price series, updated bar by bar.
///
/// SMA and WMA read only the last `period` prices. EMA is seeded once with
/// the SMA of its first `period` prices and then carried forward, so its
/// values do not depend on how much history is kept.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    pub kind: MovingAverageKind,
    pub period: usize,
    pub source: PriceSource,
    window: VecDeque<f64>,
    ema: Option<f64>,
    values: VecDeque<f64>,
}

impl MovingAverage {
    pub fn new(kind: MovingAverageKind, period: usize, source: PriceSource) -> Self {
        assert!(period >= 1, "moving average period must be >= 1");
        Self {
            kind,
            period,
            source,
            window: VecDeque::new(),
            ema: None,
            values: VecDeque::with_capacity(RETAINED_VALUES),
        }
    }

    /// Feed one price and return the new value, or `None` during warm-up.
    pub fn next(&mut self, price: f64) -> Option<f64> {
        self.window.push_back(price);
        if self.window.len() > self.period {
            self.window.pop_front();
        }
        if self.window.len() < self.period {
            return None;
        }

        let value = match self.kind {
            MovingAverageKind::Simple => self.window.iter().sum::<f64>() / self.period as f64,
            MovingAverageKind::Exponential => {
                let k = 2.0 / (self.period as f64 + 1.0);
                match self.ema {
                    Some(prev) => price * k + prev * (1.0 - k),
                    None => self.window.iter().sum::<f64>() / self.period as f64,
                }
            }
            MovingAverageKind::Weighted => {
                let denom = (self.period * (self.period + 1)) as f64 / 2.0;
                self.window
                    .iter()
                    .enumerate()
                    .map(|(i, v)| v * (i + 1) as f64)
                    .sum::<f64>()
                    / denom
            }
        };

        if self.kind == MovingAverageKind::Exponential {
            self.ema = Some(value);
        }
        retain(&mut self.values, value, RETAINED_VALUES);
        Some(value)
    }
}

impl IndicatorSource for MovingAverage {
    fn required_bars(&self) -> usize {
        self.period
    }

    fn update(&mut self, bar: &BarEvent) {
        let price = self.source.price(bar);
        self.next(price);
    }

    fn latest_values(&self, n: usize) -> Option<Vec<f64>> {
        tail(&self.values, n)
    }
}
