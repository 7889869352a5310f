//! Recording time value objects

mod duration;
mod elapsed;

pub use duration::{Duration, DEFAULT_MAX_DURATION_SECS, DEFAULT_TIMESLICE_MS};
pub use elapsed::ElapsedTime;
