use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A closed price bar for the configured instrument and timeframe.
/// Each bar drives exactly one evaluation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarEvent {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

/// Side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Buy => Direction::Sell,
            Direction::Sell => Direction::Buy,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

/// Output of one evaluation cycle, consumed immediately by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeIntent {
    /// `None` = no action on this bar.
    pub direction: Option<Direction>,
    /// Close open positions in the opposite direction before opening.
    pub close_opposite: bool,
}

impl TradeIntent {
    pub fn none() -> Self {
        Self {
            direction: None,
            close_opposite: false,
        }
    }

    pub fn open(direction: Direction) -> Self {
        Self {
            direction: Some(direction),
            close_opposite: true,
        }
    }

    pub fn is_none(&self) -> bool {
        self.direction.is_none()
    }
}

impl Default for TradeIntent {
    fn default() -> Self {
        Self::none()
    }
}

/// A market order handed to the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOrder {
    pub label: String,
    pub direction: Direction,
    pub volume_in_units: f64,
    pub stop_loss_pips: f64,
    /// `None` = no take-profit level.
    pub take_profit_pips: Option<f64>,
}

/// An open position tracked by the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub label: String,
    pub direction: Direction,
    pub volume_in_units: f64,
    pub entry_price: f64,
    pub stop_loss_price: Option<f64>,
    pub take_profit_price: Option<f64>,
    pub opened_at: DateTime<Utc>,
}

/// Current state of the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    #[default]
    Stopped,
    Running,
}
