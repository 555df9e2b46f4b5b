use tracing::info;

use common::{Direction, MarketOrder, Position, Result, TradeExecutor, TradeIntent};

/// What the dispatcher did for one intent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    pub closed: usize,
    pub opened: Option<Position>,
}

/// Hand a trade intent to the executor: close opposing positions first,
/// then open the new market order. Does nothing for an empty intent.
///
/// `order_for` builds the order for the intent's direction.
/// Executor failures are returned unchanged; there are no retries here.
pub async fn dispatch<F>(
    intent: TradeIntent,
    label: &str,
    order_for: F,
    executor: &dyn TradeExecutor,
) -> Result<DispatchOutcome>
where
    F: FnOnce(Direction) -> MarketOrder,
{
    let Some(direction) = intent.direction else {
        return Ok(DispatchOutcome::default());
    };

    let mut outcome = DispatchOutcome::default();

    if intent.close_opposite {
        let opposite = direction.opposite();
        outcome.closed = executor.close_positions(label, opposite).await?;
        info!(label, side = %opposite, closed = outcome.closed, "Closed opposing positions");
    }

    let order = order_for(direction);
    let position = executor.open_market_order(&order).await?;
    info!(
        label,
        side = %position.direction,
        volume = position.volume_in_units,
        price = position.entry_price,
        "Market order executed"
    );
    outcome.opened = Some(position);

    Ok(outcome)
}
