//! Reader configuration.
//!
//! Every field has a default mirroring the reader firmware, so an empty file
//! (or no file at all) yields a working setup:
//!
//! ```toml
//! port = "/dev/ttyUSB0"
//! baud_rate = 57600
//! address = 0
//! start_offset = 3
//! read_length = 3
//! expiry_ms = 5000
//! poll_interval_ms = 200
//! response_timeout_ms = 300
//! settle_delay_ms = 10
//! announce_delay_ms = 800
//!
//! [anonymizer]
//! mode = "xor-key"
//! prefix = ""
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tagwatch_core::constants::*;
use tagwatch_hardware::anonymizer::{DecimalAnonymizer, XorKeyAnonymizer};
use tagwatch_hardware::{AnyAnonymizer, DEFAULT_RESPONSE_TIMEOUT, SerialSettings};
use tagwatch_protocol::InventoryRequest;

/// How identifiers are rendered before they leave the reader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnonymizerMode {
    /// Plain 3-digit decimal bytes.
    Decimal,
    /// Bytes masked with a fresh random key per announcement.
    #[default]
    XorKey,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymizerConfig {
    pub mode: AnonymizerMode,

    /// Text placed before every announced identifier.
    pub prefix: String,
}

/// Complete reader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Serial port name
    pub port: String,

    pub baud_rate: u32,

    /// Reader address on the bus (0xFF broadcasts)
    pub address: u8,

    /// First TID word to read
    pub start_offset: u8,

    /// Number of TID words to read
    pub read_length: u8,

    /// Time without a sighting after which a tag counts as gone
    pub expiry_ms: u64,

    pub poll_interval_ms: u64,

    pub response_timeout_ms: u64,

    /// Pause between writing a request and reading the answer
    pub settle_delay_ms: u64,

    /// Pause between two announcements
    pub announce_delay_ms: u64,

    pub anonymizer: AnonymizerConfig,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            address: DEFAULT_READER_ADDRESS,
            start_offset: DEFAULT_START_OFFSET,
            read_length: DEFAULT_READ_LENGTH,
            expiry_ms: DEFAULT_EXPIRY.as_millis() as u64,
            poll_interval_ms: 200,
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT.as_millis() as u64,
            settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
            announce_delay_ms: DEFAULT_ANNOUNCE_DELAY.as_millis() as u64,
            anonymizer: AnonymizerConfig::default(),
        }
    }
}

impl ReaderConfig {
    /// Load configuration from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                tracing::info!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let id_len = usize::from(self.read_length) * 2;
        if self.read_length == 0 || id_len > MAX_TAG_ID_LEN {
            return Err(ConfigError::ValidationError(format!(
                "read_length must be 1-{} words, got {}",
                MAX_TAG_ID_LEN / 2,
                self.read_length
            )));
        }

        if self.baud_rate == 0 {
            return Err(ConfigError::ValidationError(
                "baud_rate must be > 0".into(),
            ));
        }

        for (name, value) in [
            ("expiry_ms", self.expiry_ms),
            ("poll_interval_ms", self.poll_interval_ms),
            ("response_timeout_ms", self.response_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!("{name} must be > 0")));
            }
        }

        // Elapsed time comes from a wrapping u32 millisecond clock.
        if self.expiry_ms > u64::from(u32::MAX) {
            return Err(ConfigError::ValidationError(format!(
                "expiry_ms must be at most {}, got {}",
                u32::MAX,
                self.expiry_ms
            )));
        }

        Ok(())
    }

    /// Set the serial port name
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    /// Set the anonymizer mode
    pub fn anonymizer_mode(mut self, mode: AnonymizerMode) -> Self {
        self.anonymizer.mode = mode;
        self
    }

    pub fn expiry(&self) -> Duration {
        Duration::from_millis(self.expiry_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    pub fn announce_delay(&self) -> Duration {
        Duration::from_millis(self.announce_delay_ms)
    }

    /// Inventory request sent every cycle.
    pub fn request(&self) -> InventoryRequest {
        InventoryRequest::new(self.address, self.start_offset, self.read_length)
    }

    pub fn serial_settings(&self) -> SerialSettings {
        SerialSettings::new(self.port.clone())
            .with_baud_rate(self.baud_rate)
            .with_settle_delay(Duration::from_millis(self.settle_delay_ms))
    }

    pub fn build_anonymizer(&self) -> AnyAnonymizer {
        let prefix = self.anonymizer.prefix.clone();
        match self.anonymizer.mode {
            AnonymizerMode::Decimal => DecimalAnonymizer::new(prefix).into(),
            AnonymizerMode::XorKey => XorKeyAnonymizer::new(prefix).into(),
        }
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Failed to render configuration: {0}")]
    SerializeError(String),
}
