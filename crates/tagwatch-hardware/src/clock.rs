use std::time::Instant;

use tagwatch_core::Timestamp;

use crate::traits::Clock;

/// Milliseconds since the clock was created, read from [`Instant`].
///
/// The count is truncated to `u32` and wraps after about 49.7 days, the same
/// as a microcontroller tick counter.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // Truncation is the wraparound.
        Timestamp::from_millis(self.origin.elapsed().as_millis() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock::new();
        let t0 = clock.now();
        std::thread::sleep(Duration::from_millis(5));
        let t1 = clock.now();

        assert!(t1.elapsed_since(t0) >= Duration::from_millis(5));
    }
}
