//! Error types for reader I/O.
//!
//! Protocol failures from the codec and parser pass through unchanged as
//! [`HardwareError::Protocol`], so callers can still match on the exact
//! device status.

use tagwatch_core::DeviceStatus;
use tagwatch_protocol::CodecError;

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur while talking to the reader.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Frame validation or parsing failed.
    #[error(transparent)]
    Protocol(#[from] tagwatch_core::Error),

    /// No complete response arrived in time.
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Transport is closed or unplugged.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Transport-level failure other than a read.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Reading from the transport failed.
    #[error("Transport read failed: {message}")]
    TransportRead { message: String },

    /// Transport or driver configuration is invalid.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new transport read error.
    pub fn transport_read(message: impl Into<String>) -> Self {
        Self::TransportRead {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Status code equivalent of this error.
    ///
    /// ```
    /// use tagwatch_core::DeviceStatus;
    /// use tagwatch_hardware::HardwareError;
    ///
    /// assert_eq!(HardwareError::timeout(300).status(), DeviceStatus::InventoryTimeout);
    /// ```
    pub fn status(&self) -> DeviceStatus {
        match self {
            Self::Protocol(err) => err.status(),
            Self::Timeout { .. } => DeviceStatus::InventoryTimeout,
            Self::TransportRead { .. } => DeviceStatus::TransportRead,
            _ => DeviceStatus::Error,
        }
    }
}

impl From<CodecError> for HardwareError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Protocol(err) => Self::Protocol(err),
            CodecError::Io(err) => Self::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_error() {
        let error = HardwareError::timeout(300);
        assert!(matches!(error, HardwareError::Timeout { .. }));
        assert_eq!(error.to_string(), "Operation timeout after 300ms");
    }

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("/dev/ttyUSB0");
        assert_eq!(error.to_string(), "Device disconnected: /dev/ttyUSB0");
    }

    #[test]
    fn test_protocol_error_is_transparent() {
        let inner = tagwatch_core::Error::Device(DeviceStatus::NoTagInRange);
        let error = HardwareError::from(inner.clone());

        assert_eq!(error.to_string(), inner.to_string());
        assert_eq!(error.status(), DeviceStatus::NoTagInRange);
    }

    #[test]
    fn test_codec_error_conversion() {
        let error = HardwareError::from(CodecError::Protocol(tagwatch_core::Error::malformed(
            "short",
        )));
        assert!(matches!(
            error,
            HardwareError::Protocol(tagwatch_core::Error::MalformedFrame { .. })
        ));

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        assert!(matches!(
            HardwareError::from(CodecError::Io(io)),
            HardwareError::Io(_)
        ));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            HardwareError::transport_read("framing").status(),
            DeviceStatus::TransportRead
        );
        assert_eq!(
            HardwareError::configuration("bad baud").status(),
            DeviceStatus::Error
        );
    }
}
