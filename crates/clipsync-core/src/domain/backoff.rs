//! Exponential reconnect delay.
//!
//! The outbound connector waits between failed connection attempts.  The
//! delay starts at a floor, doubles after every consecutive failure, never
//! exceeds a cap, and drops back to the floor after a successful connect.
//!
//! With the default floor of 500 ms and cap of 8 s the waits are:
//!
//! ```text
//! 500ms, 1s, 2s, 4s, 8s, 8s, 8s, ...
//! ```

use std::time::Duration;

/// Default first delay after a failure.
pub const DEFAULT_BACKOFF_FLOOR: Duration = Duration::from_millis(500);

/// Default upper bound on any single delay.
pub const DEFAULT_BACKOFF_CAP: Duration = Duration::from_secs(8);

/// Reconnect delay state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    floor: Duration,
    cap: Duration,
    current: Duration,
}

impl Backoff {
    /// Creates a backoff starting at `floor` and bounded by `cap`.
    ///
    /// A `cap` below `floor` is raised to `floor`.
    pub fn new(floor: Duration, cap: Duration) -> Self {
        let cap = cap.max(floor);
        Self {
            floor,
            cap,
            current: floor,
        }
    }

    /// Records one failed attempt and returns how long to wait before the
    /// next one.
    pub fn on_failure(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.cap);
        delay
    }

    /// Returns to the floor after a successful connection.
    pub fn reset(&mut self) {
        self.current = self.floor;
    }

    /// The delay the next failure would produce.
    pub fn current(&self) -> Duration {
        self.current
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_BACKOFF_FLOOR, DEFAULT_BACKOFF_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_default_sequence_doubles_then_caps() {
        let mut backoff = Backoff::default();

        let delays: Vec<_> = (0..7).map(|_| backoff.on_failure()).collect();

        assert_eq!(
            delays,
            vec![ms(500), ms(1000), ms(2000), ms(4000), ms(8000), ms(8000), ms(8000)]
        );
    }

    #[test]
    fn test_reset_returns_to_floor() {
        // Arrange: several failures push the delay up to the cap
        let mut backoff = Backoff::default();
        for _ in 0..6 {
            backoff.on_failure();
        }
        assert_eq!(backoff.current(), ms(8000));

        // Act
        backoff.reset();

        // Assert
        assert_eq!(backoff.on_failure(), ms(500));
    }

    #[test]
    fn test_cap_that_is_not_a_power_of_two_multiple_is_respected() {
        let mut backoff = Backoff::new(ms(300), ms(1000));
        assert_eq!(backoff.on_failure(), ms(300));
        assert_eq!(backoff.on_failure(), ms(600));
        assert_eq!(backoff.on_failure(), ms(1000));
        assert_eq!(backoff.on_failure(), ms(1000));
    }

    #[test]
    fn test_cap_below_floor_is_raised_to_floor() {
        let mut backoff = Backoff::new(ms(500), ms(100));
        assert_eq!(backoff.on_failure(), ms(500));
        assert_eq!(backoff.on_failure(), ms(500));
    }

    #[test]
    fn test_huge_cap_does_not_overflow() {
        let mut backoff = Backoff::new(Duration::from_secs(u64::MAX / 2), Duration::MAX);
        backoff.on_failure();
        backoff.on_failure();
        assert_eq!(backoff.current(), Duration::MAX);
    }
}
