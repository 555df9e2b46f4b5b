use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use common::{BarEvent, Direction, Error, MarketOrder, Position, Result, TradeExecutor};

/// Simulated executor for paper trading a single instrument.
///
/// Fills are simulated at the latest known price with configurable slippage.
/// Stop-loss and take-profit levels are converted from pips to prices at
/// fill time and checked on every `update_price`. The engine marks each
/// closed bar through `mark_to_market`, so fills happen at that bar's close.
pub struct PaperExecutor {
    /// Open simulated positions, in opening order.
    positions: Arc<RwLock<Vec<Position>>>,
    /// Latest known price, updated via `update_price`.
    price: Arc<RwLock<Option<f64>>>,
    pip_size: f64,
    /// Slippage in basis points applied to all fills.
    slippage_bps: f64,
}

impl PaperExecutor {
    pub fn new(pip_size: f64, slippage_bps: f64) -> Self {
        info!(pip_size, slippage_bps, "PaperExecutor initialized");
        Self {
            positions: Arc::new(RwLock::new(Vec::new())),
            price: Arc::new(RwLock::new(None)),
            pip_size,
            slippage_bps,
        }
    }

    /// Update the latest price and close any position whose stop-loss or
    /// take-profit level was touched. Returns the closed positions.
    pub async fn update_price(&self, price: f64) -> Vec<Position> {
        *self.price.write().await = Some(price);

        let mut positions = self.positions.write().await;
        let (hit, open): (Vec<Position>, Vec<Position>) = positions
            .drain(..)
            .partition(|p| exit_triggered(p, price));
        *positions = open;

        for p in &hit {
            info!(id = %p.id, label = %p.label, side = %p.direction, price, "Protective level hit; position closed");
        }
        hit
    }

    fn fill_price(&self, mid: f64, direction: Direction) -> f64 {
        // Buys pay more, sells receive less
        match direction {
            Direction::Buy => mid * (1.0 + self.slippage_bps / 10_000.0),
            Direction::Sell => mid * (1.0 - self.slippage_bps / 10_000.0),
        }
    }
}

fn exit_triggered(position: &Position, price: f64) -> bool {
    match position.direction {
        Direction::Buy => {
            position.stop_loss_price.is_some_and(|sl| price <= sl)
                || position.take_profit_price.is_some_and(|tp| price >= tp)
        }
        Direction::Sell => {
            position.stop_loss_price.is_some_and(|sl| price >= sl)
                || position.take_profit_price.is_some_and(|tp| price <= tp)
        }
    }
}

#[async_trait]
impl TradeExecutor for PaperExecutor {
    async fn mark_to_market(&self, bar: &BarEvent) -> Result<()> {
        self.update_price(bar.close).await;
        Ok(())
    }

    async fn close_positions(&self, label: &str, direction: Direction) -> Result<usize> {
        let mut positions = self.positions.write().await;
        let before = positions.len();
        positions.retain(|p| !(p.label == label && p.direction == direction));
        let closed = before - positions.len();
        debug!(label, side = %direction, closed, "Paper positions closed");
        Ok(closed)
    }

    async fn open_market_order(&self, order: &MarketOrder) -> Result<Position> {
        let mid = self.price.read().await.ok_or_else(|| {
            Error::Execution(
                "PaperExecutor has no price yet. Ensure bars are flowing.".to_string(),
            )
        })?;
        if order.volume_in_units <= 0.0 {
            return Err(Error::Execution(format!(
                "volume must be > 0, got {}",
                order.volume_in_units
            )));
        }

        let entry_price = self.fill_price(mid, order.direction);
        let sign = match order.direction {
            Direction::Buy => 1.0,
            Direction::Sell => -1.0,
        };
        let stop_loss_price = Some(entry_price - sign * order.stop_loss_pips * self.pip_size);
        let take_profit_price = order
            .take_profit_pips
            .map(|pips| entry_price + sign * pips * self.pip_size);

        let position = Position {
            id: uuid::Uuid::new_v4().to_string(),
            label: order.label.clone(),
            direction: order.direction,
            volume_in_units: order.volume_in_units,
            entry_price,
            stop_loss_price,
            take_profit_price,
            opened_at: Utc::now(),
        };

        debug!(
            label = %order.label,
            side = %order.direction,
            mid,
            fill = entry_price,
            volume = order.volume_in_units,
            "Paper fill simulated"
        );

        self.positions.write().await.push(position.clone());
        Ok(position)
    }

    async fn positions(&self, label: &str) -> Result<Vec<Position>> {
        Ok(self
            .positions
            .read()
            .await
            .iter()
            .filter(|p| p.label == label)
            .cloned()
            .collect())
    }
}
