//! Common types shared across the hardware layer.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tagwatch_core::constants::{DEFAULT_BAUD_RATE, DEFAULT_SETTLE_DELAY};

/// A tag reported to the outside world.
///
/// Carries the anonymized identifier, never the raw one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// Anonymized identifier text.
    pub tag: String,

    /// Wall-clock time of the announcement.
    pub at: DateTime<Utc>,
}

impl Announcement {
    /// Create an announcement stamped with the current time.
    pub fn now(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            at: Utc::now(),
        }
    }
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.at.to_rfc3339(), self.tag)
    }
}

/// Serial line settings for the reader.
///
/// The frame format is fixed at 8 data bits, no parity, one stop bit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialSettings {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3").
    pub port: String,

    /// Line speed in bits per second.
    pub baud_rate: u32,

    /// Blocking read timeout of the port.
    pub read_timeout: Duration,

    /// Pause between writing a request and reading the answer.
    pub settle_delay: Duration,
}

impl SerialSettings {
    /// Create settings for `port` at the reader's default speed.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_millis(50),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Set the line speed.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the blocking read timeout.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Set the pause between write and read.
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_settings_defaults() {
        let settings = SerialSettings::new("/dev/ttyUSB0");
        assert_eq!(settings.baud_rate, 57600);
        assert_eq!(settings.settle_delay, Duration::from_millis(10));
    }

    #[test]
    fn test_serial_settings_builder() {
        let settings = SerialSettings::new("COM3")
            .with_baud_rate(115_200)
            .with_read_timeout(Duration::from_millis(20))
            .with_settle_delay(Duration::ZERO);

        assert_eq!(settings.port, "COM3");
        assert_eq!(settings.baud_rate, 115_200);
        assert_eq!(settings.read_timeout, Duration::from_millis(20));
        assert_eq!(settings.settle_delay, Duration::ZERO);
    }

    #[test]
    fn test_announcement_serialization() {
        let announcement = Announcement::now("ID:226000052");
        let json = serde_json::to_string(&announcement).unwrap();
        let back: Announcement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, announcement);
    }
}
