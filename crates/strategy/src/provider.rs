use chrono::{DateTime, Utc};

use common::{BarEvent, Error, Result};

use crate::config::StrategyConfig;
use crate::indicators::{AdxRating, IndicatorSource, MovingAverage};
use crate::snapshot::{IndicatorSnapshot, InsufficientHistory};

/// Number of points per moving-average series in a snapshot (previous + current).
pub const SNAPSHOT_DEPTH: usize = 2;

/// Supplies one `IndicatorSnapshot` per closed bar.
pub trait SnapshotProvider: Send {
    /// Record a newly closed bar. Bars must arrive in strictly increasing
    /// timestamp order; replays are rejected.
    fn ingest(&mut self, bar: &BarEvent) -> Result<()>;

    /// Snapshot as of the last ingested bar.
    fn snapshot(&self) -> Result<IndicatorSnapshot, InsufficientHistory>;
}

/// Feeds every closed bar through streaming indicators.
///
/// No bar window is kept. Each indicator carries its own seeded state, so
/// the previous point of one snapshot is the current point of the last.
pub struct BarHistoryProvider {
    fast: MovingAverage,
    slow: MovingAverage,
    long: MovingAverage,
    adx: AdxRating,
    bars_seen: usize,
    last_timestamp: Option<DateTime<Utc>>,
}

impl BarHistoryProvider {
    pub fn new(cfg: &StrategyConfig) -> Self {
        Self {
            fast: cfg.fast.indicator(),
            slow: cfg.slow.indicator(),
            long: cfg.long.indicator(),
            adx: cfg.adx(),
            bars_seen: 0,
            last_timestamp: None,
        }
    }

    /// Bars needed before the first snapshot is available.
    pub fn required_bars(&self) -> usize {
        let ma = |m: &MovingAverage| m.required_bars().saturating_add(SNAPSHOT_DEPTH - 1);
        [
            ma(&self.fast),
            ma(&self.slow),
            ma(&self.long),
            self.adx.required_bars(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// Bars accepted so far.
    pub fn bars_seen(&self) -> usize {
        self.bars_seen
    }
}

impl SnapshotProvider for BarHistoryProvider {
    fn ingest(&mut self, bar: &BarEvent) -> Result<()> {
        if let Some(last) = self.last_timestamp {
            if bar.timestamp <= last {
                return Err(Error::OutOfOrderBar {
                    last,
                    received: bar.timestamp,
                });
            }
        }
        self.fast.update(bar);
        self.slow.update(bar);
        self.long.update(bar);
        self.adx.update(bar);
        self.bars_seen += 1;
        self.last_timestamp = Some(bar.timestamp);
        Ok(())
    }

    fn snapshot(&self) -> Result<IndicatorSnapshot, InsufficientHistory> {
        let insufficient = InsufficientHistory {
            available: self.bars_seen,
            required: self.required_bars(),
        };
        if self.bars_seen < insufficient.required {
            return Err(insufficient);
        }

        let fast_ma = self.fast.latest_values(SNAPSHOT_DEPTH).ok_or(insufficient)?;
        let slow_ma = self.slow.latest_values(SNAPSHOT_DEPTH).ok_or(insufficient)?;
        let long_ma = self.long.latest_values(SNAPSHOT_DEPTH).ok_or(insufficient)?;
        let (adx, adxr) = self.adx.latest_pair().ok_or(insufficient)?;

        Ok(IndicatorSnapshot {
            fast_ma,
            slow_ma,
            long_ma,
            adx,
            adxr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MovingAverageConfig;
    use crate::indicators::{MovingAverageKind, PriceSource};
    use chrono::{Duration, TimeZone};

    fn ma(kind: MovingAverageKind, period: usize) -> MovingAverageConfig {
        MovingAverageConfig {
            period,
            kind,
            source: PriceSource::Close,
        }
    }

    fn small_config() -> StrategyConfig {
        StrategyConfig {
            fast: ma(MovingAverageKind::Simple, 2),
            slow: ma(MovingAverageKind::Simple, 3),
            long: ma(MovingAverageKind::Simple, 5),
            adx_period: 2,
            ..StrategyConfig::default()
        }
    }

    fn t(i: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::hours(i)
    }

    fn bar(i: i64, close: f64) -> BarEvent {
        BarEvent {
            timestamp: t(i),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn required_bars_covers_every_indicator() {
        let provider = BarHistoryProvider::new(&small_config());
        // long SMA(5) needs 6 bars for two values; ADXR(2) needs 6.
        assert_eq!(provider.required_bars(), 6);
    }

    #[test]
    fn warm_up_reports_insufficient_history() {
        let mut provider = BarHistoryProvider::new(&small_config());
        for i in 0..5 {
            provider.ingest(&bar(i, 100.0 + i as f64)).unwrap();
        }
        let err = provider.snapshot().unwrap_err();
        assert_eq!(err, InsufficientHistory { available: 5, required: 6 });
    }

    #[test]
    fn snapshot_after_warm_up() {
        let mut provider = BarHistoryProvider::new(&small_config());
        for i in 0..6 {
            provider.ingest(&bar(i, 100.0 + i as f64)).unwrap();
        }
        let snap = provider.snapshot().unwrap();
        // closes 100..=105: SMA(2) over last bars = 103.5, 104.5
        assert_eq!(snap.fast_ma, vec![103.5, 104.5]);
        assert_eq!(snap.slow_ma, vec![103.0, 104.0]);
        assert_eq!(snap.long_ma, vec![102.0, 103.0]);
        assert!((0.0..=100.0).contains(&snap.adx));
    }

    #[test]
    fn replayed_or_older_bar_is_rejected() {
        let mut provider = BarHistoryProvider::new(&small_config());
        provider.ingest(&bar(1, 100.0)).unwrap();
        assert!(matches!(
            provider.ingest(&bar(1, 100.0)),
            Err(Error::OutOfOrderBar { .. })
        ));
        assert!(matches!(
            provider.ingest(&bar(0, 100.0)),
            Err(Error::OutOfOrderBar { .. })
        ));
        assert_eq!(provider.bars_seen(), 1);
    }

    #[test]
    fn rejected_bar_leaves_snapshot_unchanged() {
        let mut provider = BarHistoryProvider::new(&small_config());
        for i in 0..8 {
            provider.ingest(&bar(i, 100.0 + i as f64)).unwrap();
        }
        let before = provider.snapshot().unwrap();
        assert!(provider.ingest(&bar(7, 500.0)).is_err());
        assert_eq!(provider.snapshot().unwrap(), before);
    }

    #[test]
    fn consecutive_snapshots_agree_on_shared_point() {
        // Long EMAs over many bars: every value must be carried forward
        // unchanged from one snapshot to the next.
        let cfg = StrategyConfig {
            fast: ma(MovingAverageKind::Exponential, 150),
            slow: ma(MovingAverageKind::Exponential, 160),
            long: ma(MovingAverageKind::Simple, 200),
            adx_period: 14,
            ..StrategyConfig::default()
        };
        let mut provider = BarHistoryProvider::new(&cfg);
        let mut previous: Option<IndicatorSnapshot> = None;
        let mut compared = 0;

        for i in 0..900 {
            let close = 1.10 + 0.01 * (i as f64 / 17.0).sin() + 0.0001 * i as f64;
            provider.ingest(&bar(i, close)).unwrap();
            let Ok(snap) = provider.snapshot() else {
                continue;
            };
            if let Some(prev) = &previous {
                assert_eq!(snap.fast_ma[0], prev.fast_ma[1], "fast EMA revised at bar {i}");
                assert_eq!(snap.slow_ma[0], prev.slow_ma[1], "slow EMA revised at bar {i}");
                assert_eq!(snap.long_ma[0], prev.long_ma[1], "long SMA revised at bar {i}");
                compared += 1;
            }
            previous = Some(snap);
        }
        assert!(compared > 600, "only {compared} snapshots compared");
    }

    #[test]
    fn required_bars_saturates_for_huge_periods() {
        let cfg = StrategyConfig {
            long: ma(MovingAverageKind::Simple, usize::MAX),
            ..small_config()
        };
        let provider = BarHistoryProvider::new(&cfg);
        assert_eq!(provider.required_bars(), usize::MAX);
    }
}
