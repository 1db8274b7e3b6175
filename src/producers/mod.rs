//! Reading producers: background pollers feeding the observable cells.

mod producer;
mod satellites;
mod speed;

pub use producer::Producer;
pub use satellites::SatelliteCountProducer;
pub use speed::{SpeedProducer, SPEED_UNIT_KEY};
