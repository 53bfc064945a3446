//! Time abstractions for testable timestamp assignment.
//!
//! The ingestion handlers stamp every accepted payload with a receive time.
//! Injecting the clock keeps those timestamps deterministic in tests.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

/// Clock abstraction for time operations.
///
/// Production code uses [`RealClock`]; tests inject [`TestClock`] to control
/// time progression.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns the current instant for duration measurements.
    fn now(&self) -> Instant;

    /// Returns the current system time for timestamps.
    fn now_system(&self) -> SystemTime;

    /// Returns the current Unix time in milliseconds.
    ///
    /// This is the wire and storage format for all sluice timestamps.
    fn unix_millis(&self) -> i64 {
        let since_epoch = self.now_system().duration_since(UNIX_EPOCH).unwrap_or_default();
        i64::try_from(since_epoch.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Real clock implementation using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealClock;

impl RealClock {
    /// Creates a new real clock instance.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for RealClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_system(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Test clock for deterministic time control.
///
/// Both monotonic and system time advance together via [`TestClock::advance`];
/// system time alone can be repositioned with [`TestClock::jump_to`].
#[derive(Debug, Clone)]
pub struct TestClock {
    /// Monotonic time in nanoseconds since clock creation.
    monotonic_ns: Arc<AtomicU64>,
    /// System time as nanoseconds since UNIX_EPOCH.
    system_ns: Arc<AtomicU64>,
    /// Base instant for monotonic time calculations.
    base_instant: Instant,
}

impl TestClock {
    /// Creates a new test clock starting at the current time.
    pub fn new() -> Self {
        Self::with_start_time(SystemTime::now())
    }

    /// Creates a test clock starting at a specific system time.
    pub fn with_start_time(start: SystemTime) -> Self {
        let since_epoch = start.duration_since(UNIX_EPOCH).unwrap_or_default();

        Self {
            monotonic_ns: Arc::new(AtomicU64::new(0)),
            system_ns: Arc::new(AtomicU64::new(
                u64::try_from(since_epoch.as_nanos().min(u128::from(u64::MAX))).unwrap_or(0),
            )),
            base_instant: Instant::now(),
        }
    }

    /// Advances both clocks by the specified duration.
    pub fn advance(&self, duration: Duration) {
        let duration_ns = u64::try_from(duration.as_nanos().min(u128::from(u64::MAX))).unwrap_or(0);

        self.monotonic_ns.fetch_add(duration_ns, Ordering::AcqRel);
        self.system_ns.fetch_add(duration_ns, Ordering::AcqRel);
    }

    /// Jumps the system clock to a specific time.
    ///
    /// Monotonic time only ever moves forward; system time may jump back.
    pub fn jump_to(&self, time: SystemTime) {
        let target_ns = u64::try_from(
            time.duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
                .min(u128::from(u64::MAX)),
        )
        .unwrap_or(0);
        let current_ns = self.system_ns.load(Ordering::Acquire);

        if target_ns > current_ns {
            self.advance(Duration::from_nanos(target_ns - current_ns));
        } else {
            self.system_ns.store(target_ns, Ordering::Release);
        }
    }

    /// Returns elapsed monotonic time since clock creation.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.monotonic_ns.load(Ordering::Acquire))
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        let elapsed_ns = self.monotonic_ns.load(Ordering::Acquire);
        self.base_instant + Duration::from_nanos(elapsed_ns)
    }

    fn now_system(&self) -> SystemTime {
        let ns = self.system_ns.load(Ordering::Acquire);
        UNIX_EPOCH + Duration::from_nanos(ns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances() {
        let clock = TestClock::new();
        let start = clock.now();

        clock.advance(Duration::from_secs(10));

        assert_eq!(clock.now().duration_since(start), Duration::from_secs(10));
    }

    #[test]
    fn test_clock_system_time() {
        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1000);
        let clock = TestClock::with_start_time(start);

        assert_eq!(clock.now_system(), start);

        clock.advance(Duration::from_secs(60));
        assert_eq!(clock.now_system(), start + Duration::from_secs(60));
    }

    #[test]
    fn test_clock_unix_millis() {
        let start = SystemTime::UNIX_EPOCH + Duration::from_millis(1_722_950_400_123);
        let clock = TestClock::with_start_time(start);

        assert_eq!(clock.unix_millis(), 1_722_950_400_123);

        clock.advance(Duration::from_millis(5));
        assert_eq!(clock.unix_millis(), 1_722_950_400_128);
    }

    #[test]
    fn test_clock_jump_backwards_keeps_monotonic() {
        let clock = TestClock::with_start_time(UNIX_EPOCH + Duration::from_secs(2000));
        clock.advance(Duration::from_secs(10));
        let monotonic_before = clock.now();

        clock.jump_to(UNIX_EPOCH + Duration::from_secs(500));

        assert_eq!(clock.now_system(), UNIX_EPOCH + Duration::from_secs(500));
        assert!(clock.now() >= monotonic_before);
    }

    #[test]
    fn real_clock_unix_millis_is_positive() {
        assert!(RealClock::new().unix_millis() > 0);
    }
}
