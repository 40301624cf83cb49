//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Delay before retry number `attempt` (1-based), doubling from `base_ms`
/// up to `max_ms`, plus up to 10% jitter.
pub fn retry_delay(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let doubling = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(doubling).min(max_ms);

    let jitter_range = delay_ms / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(delay_ms + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_and_caps() {
        let d1 = retry_delay(1, 100, 2000);
        assert!(d1.as_millis() >= 100 && d1.as_millis() <= 110);

        let d2 = retry_delay(2, 100, 2000);
        assert!(d2.as_millis() >= 200);

        let capped = retry_delay(10, 100, 1000);
        assert!(capped.as_millis() >= 1000 && capped.as_millis() <= 1100);
    }

    #[test]
    fn zeroth_attempt_has_no_delay() {
        assert_eq!(retry_delay(0, 100, 1000), Duration::from_millis(0));
    }
}
