//! Time formatting helpers for operator output.

use credo_types::time::{SECS_PER_DAY, SECS_PER_MINUTE};
use credo_types::Timestamp;

const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;

/// Format a duration as its two most significant units, e.g. `"10m 0s"`.
pub fn format_duration(secs: u64) -> String {
    match secs {
        s if s < SECS_PER_MINUTE => format!("{s}s"),
        s if s < SECS_PER_HOUR => format!("{}m {}s", s / SECS_PER_MINUTE, s % SECS_PER_MINUTE),
        s if s < SECS_PER_DAY => format!("{}h {}m", s / SECS_PER_HOUR, (s % SECS_PER_HOUR) / SECS_PER_MINUTE),
        s => format!("{}d {}h", s / SECS_PER_DAY, (s % SECS_PER_DAY) / SECS_PER_HOUR),
    }
}

/// Time left until `until`, or `"expired"`.
pub fn format_remaining(until: Timestamp, now: Timestamp) -> String {
    if until <= now {
        "expired".to_string()
    } else {
        format_duration(now.elapsed_since(until))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(600), "10m 0s");
        assert_eq!(format_duration(3_660), "1h 1m");
        assert_eq!(format_duration(2 * SECS_PER_DAY + 7_200), "2d 2h");
    }

    #[test]
    fn remaining() {
        let now = Timestamp::new(1_000);
        assert_eq!(format_remaining(Timestamp::new(1_090), now), "1m 30s");
        assert_eq!(format_remaining(Timestamp::new(1_000), now), "expired");
    }
}
