//! Injected environment dependencies.

use chrono::{DateTime, SubsecRound, Utc};

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```
/// use chrono::SubsecRound;
/// use ticketdesk_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let before = chrono::Utc::now().trunc_subsecs(6);
/// assert!(clock.now() >= before);
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time, truncated to the microsecond precision of `TIMESTAMPTZ`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_has_microsecond_precision() {
        for _ in 0..100 {
            assert_eq!(SystemClock.now().timestamp_subsec_nanos() % 1_000, 0);
        }
    }
}
