//! Elapsed recording time shown on the `mm:ss` clock

use std::fmt;
use std::time::Duration as StdDuration;

const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1_000;

/// Elapsed time since a recording started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ElapsedTime {
    milliseconds: u64,
}

impl ElapsedTime {
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    pub fn from_std(duration: StdDuration) -> Self {
        Self::from_millis(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    /// Whole minutes, not wrapped at the hour
    pub const fn minutes(&self) -> u64 {
        self.milliseconds / MS_PER_MINUTE
    }

    /// Seconds within the current minute
    pub const fn seconds(&self) -> u64 {
        (self.milliseconds % MS_PER_MINUTE) / MS_PER_SECOND
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes(), self.seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_all_zeros() {
        assert_eq!(ElapsedTime::default().to_string(), "00:00");
    }

    #[test]
    fn floors_partial_seconds() {
        assert_eq!(ElapsedTime::from_millis(1_999).to_string(), "00:01");
        assert_eq!(ElapsedTime::from_millis(59_999).to_string(), "00:59");
    }

    #[test]
    fn rolls_into_minutes() {
        let t = ElapsedTime::from_millis(65_432);
        assert_eq!(t.minutes(), 1);
        assert_eq!(t.seconds(), 5);
        assert_eq!(t.to_string(), "01:05");
    }

    #[test]
    fn minutes_do_not_wrap_at_the_hour() {
        let t = ElapsedTime::from_millis(61 * 60_000 + 5_000);
        assert_eq!(t.to_string(), "61:05");
    }

    #[test]
    fn from_std_duration() {
        let t = ElapsedTime::from_std(StdDuration::from_secs(125));
        assert_eq!(t.to_string(), "02:05");
    }
}
