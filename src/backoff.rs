//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

/// Floor for every backoff interval; attempt 0 waits exactly this long.
pub const MIN_DELAY: Duration = Duration::from_millis(500);

/// Calculate the jittered exponential backoff interval for `attempt`.
///
/// The interval is [`MIN_DELAY`] scaled by an integer drawn uniformly from
/// `[1, 2^attempt)`, so attempt 0 always yields `MIN_DELAY` and attempt `k`
/// stays within `[MIN_DELAY, MIN_DELAY * 2^k)`. The randomization spreads
/// concurrent retriers apart instead of letting them hammer in lockstep.
pub fn backoff_interval(attempt: u32) -> Duration {
    let bound = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    let multiplier = if bound <= 1 {
        1
    } else {
        rand::thread_rng().gen_range(1..bound)
    };

    let millis = (MIN_DELAY.as_millis() as u64).saturating_mul(multiplier);
    Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_zero_is_min_delay() {
        for _ in 0..100 {
            assert_eq!(backoff_interval(0), MIN_DELAY);
        }
    }

    #[test]
    fn test_attempt_one_is_min_delay() {
        // Range [1, 2) collapses to the constant 1.
        for _ in 0..100 {
            assert_eq!(backoff_interval(1), MIN_DELAY);
        }
    }

    #[test]
    fn test_interval_bounds() {
        for _ in 0..1000 {
            let interval = backoff_interval(3);
            assert!(interval >= MIN_DELAY);
            assert!(interval < MIN_DELAY * 8);
        }
    }

    #[test]
    fn test_growth_is_exponential() {
        for attempt in 0..10u32 {
            let interval = backoff_interval(attempt);
            assert!(interval >= MIN_DELAY);
            assert!(interval < MIN_DELAY * 2u32.pow(attempt).max(2));
        }
    }

    #[test]
    fn test_large_attempt_saturates() {
        let interval = backoff_interval(200);
        assert!(interval >= MIN_DELAY);
    }
}
