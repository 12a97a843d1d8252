use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tagwatch_core::Timestamp;

use crate::traits::Clock;

/// Manually driven clock.
///
/// Clones share the same counter, so a test can keep one clone and advance
/// time under a driver that owns another.
///
/// ```
/// use std::time::Duration;
/// use tagwatch_hardware::mock::MockClock;
/// use tagwatch_hardware::traits::Clock;
///
/// let clock = MockClock::new();
/// let driver_clock = clock.clone();
///
/// clock.advance(Duration::from_millis(1500));
/// assert_eq!(driver_clock.now().as_millis(), 1500);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    millis: Arc<AtomicU32>,
}

impl MockClock {
    /// Create a clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock reading `start`.
    pub fn starting_at(start: Timestamp) -> Self {
        let clock = Self::new();
        clock.set(start);
        clock
    }

    pub fn set(&self, now: Timestamp) {
        self.millis.store(now.as_millis(), Ordering::SeqCst);
    }

    /// Move the clock forward, wrapping past `u32::MAX`.
    pub fn advance(&self, delta: Duration) {
        let now = self.now().wrapping_add(delta);
        self.set(now);
    }
}

impl Clock for MockClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.load(Ordering::SeqCst))
    }
}
