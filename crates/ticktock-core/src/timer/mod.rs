mod duration;
mod engine;

pub use duration::{parse_duration, MAX_DURATION};
pub use engine::{TimerEngine, TimerPhase};
