//! Wall-clock timestamps in the microsecond convention the model uses.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall time as microseconds since the Unix epoch.
pub fn now_us() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_micros()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::now_us;

    #[test]
    fn timestamps_are_positive_and_monotonic_enough() {
        let a = now_us();
        let b = now_us();
        assert!(a > 1_600_000_000_000_000); // after 2020
        assert!(b >= a);
    }
}
