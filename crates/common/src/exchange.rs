use async_trait::async_trait;

use crate::{BarEvent, Direction, MarketOrder, Position, Result};

/// Abstraction over order placement and position management.
///
/// `PaperExecutor` implements this for simulation. A live broker adapter
/// would implement it the same way.
///
/// Only the dispatcher in `crates/engine` calls into a `dyn TradeExecutor`.
/// Retries and rejection handling are the implementation's concern.
#[async_trait]
pub trait TradeExecutor: Send + Sync {
    /// Close every open position tagged with `label` whose direction equals
    /// `direction`. Returns the number of positions closed.
    async fn close_positions(&self, label: &str, direction: Direction) -> Result<usize>;

    /// Submit a market order and return the resulting position.
    async fn open_market_order(&self, order: &MarketOrder) -> Result<Position>;

    /// Open positions tagged with `label`, in opening order.
    async fn positions(&self, label: &str) -> Result<Vec<Position>>;

    /// Called once per closed bar, before the bar is evaluated.
    /// Simulated executors use it to mark prices; brokers need not.
    async fn mark_to_market(&self, _bar: &BarEvent) -> Result<()> {
        Ok(())
    }
}
