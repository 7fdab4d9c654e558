//! Core domain types: bars in, signals through, positions and trades out.

pub mod bar;
pub mod position;
pub mod signal;
pub mod trade;

pub use bar::Bar;
pub use position::{Position, PositionSide};
pub use signal::{Signal, SignalAction};
pub use trade::Trade;
