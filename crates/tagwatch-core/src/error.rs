use crate::types::DeviceStatus;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Capacity errors
    #[error("Queue full: capacity {capacity} reached")]
    QueueFull { capacity: usize },

    #[error("Queue empty")]
    QueueEmpty,

    #[error("Too many records: {count} reported, at most {max} supported")]
    TooManyRecords { count: usize, max: usize },

    #[error("Identifier too long: {len} bytes, at most {max} supported")]
    IdentifierTooLong { len: usize, max: usize },

    // Protocol errors
    #[error("Checksum mismatch: expected {expected:#06X}, got {actual:#06X}")]
    CrcMismatch { expected: u16, actual: u16 },

    #[error("Device reported {0}")]
    Device(DeviceStatus),

    #[error("Malformed frame: {message}")]
    MalformedFrame { message: String },
}

impl Error {
    /// Create a malformed frame error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedFrame {
            message: message.into(),
        }
    }

    /// Status code equivalent of this error.
    ///
    /// Device-reported statuses come back unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagwatch_core::{DeviceStatus, Error};
    ///
    /// assert_eq!(Error::QueueEmpty.status(), DeviceStatus::QueueEmpty);
    /// assert_eq!(
    ///     Error::Device(DeviceStatus::Other(0x33)).status(),
    ///     DeviceStatus::Other(0x33)
    /// );
    /// ```
    pub fn status(&self) -> DeviceStatus {
        match self {
            Self::QueueFull { .. } => DeviceStatus::QueueFull,
            Self::QueueEmpty => DeviceStatus::QueueEmpty,
            Self::TooManyRecords { .. } => DeviceStatus::TooManyRecords,
            Self::IdentifierTooLong { .. } => DeviceStatus::IdentifierTooLong,
            Self::CrcMismatch { .. } => DeviceStatus::CrcMismatch,
            Self::Device(status) => *status,
            Self::MalformedFrame { .. } => DeviceStatus::Error,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
