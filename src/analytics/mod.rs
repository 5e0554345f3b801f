pub mod indicators;
pub mod spread;

pub use indicators::{atr, rsi, sma};
pub use spread::{calendar_spread, CalendarSpreadPoint};
