//! Reading data model and the latest-value observable cell.

mod cell;
mod speed;

pub use cell::StateCell;
pub use speed::SpeedReading;
