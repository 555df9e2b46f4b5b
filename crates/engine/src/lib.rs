pub mod dispatch;
pub mod lifecycle;

pub use dispatch::dispatch;
pub use lifecycle::TrendBot;
