use crate::{Result, constants::MAX_TAG_ID_LEN, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Status byte reported by the reader, or produced by the core for its own
/// failures.
///
/// Values are taken verbatim from the reader protocol. Bytes the protocol
/// does not name are kept as [`DeviceStatus::Other`] so they can be
/// propagated unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceStatus {
    /// Generic failure (0x00).
    Error,

    /// Command completed (0x01).
    Success,

    /// Inventory timed out; the reader reports the tags inquired so far (0x02).
    InventoryTimeout,

    /// Response does not fit one frame; more frames follow (0x03).
    FrameOverflow,

    /// Reader ran out of memory mid-inventory (0x04).
    MemoryExhausted,

    /// Identifier longer than the supported maximum (0xFA).
    IdentifierTooLong,

    /// No operable tag in the effective range (0xFB).
    NoTagInRange,

    /// More records than the supported batch size (0xFC).
    TooManyRecords,

    /// Checksum failure (0xFE).
    CrcMismatch,

    /// Ring buffer full (0x0A).
    QueueFull,

    /// Ring buffer empty (0x0B).
    QueueEmpty,

    /// Nothing could be read from the transport (0x1A).
    TransportRead,

    /// Any status byte not named above.
    Other(u8),
}

impl DeviceStatus {
    /// Decode a status byte.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagwatch_core::DeviceStatus;
    ///
    /// assert_eq!(DeviceStatus::from_byte(0x01), DeviceStatus::Success);
    /// assert_eq!(DeviceStatus::from_byte(0x77), DeviceStatus::Other(0x77));
    /// ```
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => Self::Error,
            0x01 => Self::Success,
            0x02 => Self::InventoryTimeout,
            0x03 => Self::FrameOverflow,
            0x04 => Self::MemoryExhausted,
            0xFA => Self::IdentifierTooLong,
            0xFB => Self::NoTagInRange,
            0xFC => Self::TooManyRecords,
            0xFE => Self::CrcMismatch,
            0x0A => Self::QueueFull,
            0x0B => Self::QueueEmpty,
            0x1A => Self::TransportRead,
            other => Self::Other(other),
        }
    }

    /// Encode the status back to its wire byte.
    pub fn as_byte(&self) -> u8 {
        match self {
            Self::Error => 0x00,
            Self::Success => 0x01,
            Self::InventoryTimeout => 0x02,
            Self::FrameOverflow => 0x03,
            Self::MemoryExhausted => 0x04,
            Self::IdentifierTooLong => 0xFA,
            Self::NoTagInRange => 0xFB,
            Self::TooManyRecords => 0xFC,
            Self::CrcMismatch => 0xFE,
            Self::QueueFull => 0x0A,
            Self::QueueEmpty => 0x0B,
            Self::TransportRead => 0x1A,
            Self::Other(byte) => *byte,
        }
    }

    /// Check whether this is the success status.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<u8> for DeviceStatus {
    fn from(byte: u8) -> Self {
        Self::from_byte(byte)
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Success => "success",
            Self::InventoryTimeout => "inventory timeout",
            Self::FrameOverflow => "frame overflow",
            Self::MemoryExhausted => "memory exhausted",
            Self::IdentifierTooLong => "identifier too long",
            Self::NoTagInRange => "no tag in range",
            Self::TooManyRecords => "too many records",
            Self::CrcMismatch => "checksum mismatch",
            Self::QueueFull => "queue full",
            Self::QueueEmpty => "queue empty",
            Self::TransportRead => "transport read failure",
            Self::Other(_) => "unknown status",
        };
        write!(f, "{name} (0x{:02X})", self.as_byte())
    }
}

/// Monotonic millisecond counter.
///
/// The counter is 32 bits wide and wraps roughly every 49.7 days. Elapsed
/// time is always computed with wrapping subtraction, so comparisons stay
/// correct across the overflow as long as the real interval is shorter than
/// one full period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timestamp(u32);

impl Timestamp {
    /// Create a timestamp from a raw millisecond count.
    pub const fn from_millis(millis: u32) -> Self {
        Self(millis)
    }

    /// Raw millisecond count.
    #[must_use]
    pub const fn as_millis(&self) -> u32 {
        self.0
    }

    /// Time elapsed from `earlier` to `self`, wraparound-safe.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use tagwatch_core::Timestamp;
    ///
    /// let before = Timestamp::from_millis(u32::MAX - 99);
    /// let after = Timestamp::from_millis(400);
    /// assert_eq!(after.elapsed_since(before), Duration::from_millis(500));
    /// ```
    #[must_use]
    pub fn elapsed_since(&self, earlier: Timestamp) -> Duration {
        Duration::from_millis(u64::from(self.0.wrapping_sub(earlier.0)))
    }

    /// Timestamp advanced by `delta`, wrapping on overflow.
    #[must_use]
    pub fn wrapping_add(&self, delta: Duration) -> Self {
        // Truncation is the point: the counter is modular.
        Self(self.0.wrapping_add(delta.as_millis() as u32))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Tag identifier (TID), 0 to [`MAX_TAG_ID_LEN`] bytes stored inline.
///
/// Equality is an exact match of the significant bytes.
#[derive(Clone, Copy, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct TagId {
    len: u8,
    bytes: [u8; MAX_TAG_ID_LEN],
}

impl TagId {
    /// Create an identifier from raw bytes.
    ///
    /// # Errors
    /// Returns [`Error::IdentifierTooLong`] if `bytes` is longer than
    /// [`MAX_TAG_ID_LEN`].
    ///
    /// # Examples
    ///
    /// ```
    /// use tagwatch_core::TagId;
    ///
    /// let id = TagId::new(&[0xE2, 0x00, 0x34]).unwrap();
    /// assert_eq!(id.as_bytes(), &[0xE2, 0x00, 0x34]);
    /// assert!(TagId::new(&[0u8; 7]).is_err());
    /// ```
    pub fn new(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_TAG_ID_LEN {
            return Err(Error::IdentifierTooLong {
                len: bytes.len(),
                max: MAX_TAG_ID_LEN,
            });
        }
        let mut id = Self::default();
        id.bytes[..bytes.len()].copy_from_slice(bytes);
        id.len = bytes.len() as u8;
        Ok(id)
    }

    /// Significant identifier bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    /// Number of significant bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Check whether the identifier has no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Upper-case hexadecimal representation.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.as_bytes().iter().map(|b| format!("{b:02X}")).collect()
    }

    /// Every byte as a zero-padded 3-digit decimal number.
    ///
    /// This is the representation the reader's keyboard output has always
    /// used.
    ///
    /// ```
    /// use tagwatch_core::TagId;
    ///
    /// let id = TagId::new(&[7, 42, 255]).unwrap();
    /// assert_eq!(id.to_decimal(), "007042255");
    /// ```
    #[must_use]
    pub fn to_decimal(&self) -> String {
        self.as_bytes().iter().map(|b| format!("{b:03}")).collect()
    }
}

impl PartialEq for TagId {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for TagId {}

impl std::hash::Hash for TagId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl TryFrom<&[u8]> for TagId {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::new(bytes)
    }
}

impl TryFrom<Vec<u8>> for TagId {
    type Error = Error;

    fn try_from(bytes: Vec<u8>) -> Result<Self> {
        Self::new(&bytes)
    }
}

impl From<TagId> for Vec<u8> {
    fn from(id: TagId) -> Self {
        id.as_bytes().to_vec()
    }
}

impl fmt::Debug for TagId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TagId({})", self.to_hex())
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// One tracked tag.
///
/// `announced == false` means the tag is eligible for external action. The
/// consumer flips it with [`TagRecord::mark_announced`]; only the presence
/// cache resets it, when a tag reappears after expiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    /// Tag identifier.
    pub id: TagId,

    /// Whether the consumer already acted on this presence episode.
    pub announced: bool,

    /// Last time the tag was observed.
    pub last_seen: Timestamp,
}

impl TagRecord {
    /// Create an unannounced record observed at `seen_at`.
    pub fn new(id: TagId, seen_at: Timestamp) -> Self {
        Self {
            id,
            announced: false,
            last_seen: seen_at,
        }
    }

    /// Record that the consumer acted on this presence episode.
    pub fn mark_announced(&mut self) {
        self.announced = true;
    }

    /// Check whether the record went unseen for at least `expiry` at `now`.
    #[must_use]
    pub fn is_stale(&self, now: Timestamp, expiry: Duration) -> bool {
        now.elapsed_since(self.last_seen) >= expiry
    }
}
