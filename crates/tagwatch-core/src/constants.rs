//! Core constants for the UHF reader serial protocol.
//!
//! This module defines the protocol-level constants shared by the codec, the
//! presence cache and the hardware layer. They follow the command set of the
//! PK-UHF101 / UHFReader18 family of fixed-position readers.
//!
//! # Frame Structure
//!
//! Every frame on the wire is length-prefixed and closed by a CRC-16:
//!
//! ```text
//! +------+------+-----+--------+---------+---------+---------+
//! | Len  | Adr  | Cmd | Status | Data[]  | CRC LSB | CRC MSB |
//! +------+------+-----+--------+---------+---------+---------+
//! ```
//!
//! - `Len` counts every byte of the frame except itself.
//! - `Status` only appears in responses.
//! - The checksum covers every byte before it and is sent least significant
//!   byte first.
//!
//! # Usage
//!
//! ```
//! use tagwatch_core::constants::*;
//!
//! // An inventory response carrying the maximum batch fits in one frame
//! assert!(MAX_INVENTORY_RESPONSE_LEN <= MAX_RESPONSE_FRAME_LEN);
//! assert_eq!(INVENTORY_REQUEST_LEN, 7);
//! ```

use std::time::Duration;

// ============================================================================
// Capacities
// ============================================================================

/// Maximum number of tags a single inventory response may report.
///
/// Responses claiming more records than this are rejected with
/// [`Error::TooManyRecords`](crate::Error::TooManyRecords).
pub const MAX_BATCH_RECORDS: usize = 15;

/// Maximum identifier length in bytes.
///
/// Chosen so that a full batch of identifiers still fits in one response
/// frame. Three TID words (six bytes) is the default read length.
pub const MAX_TAG_ID_LEN: usize = 6;

/// Default capacity of the persistent presence cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 25;

/// Default time after which an unseen tag is considered gone.
///
/// A tag re-observed after this threshold is announced again.
pub const DEFAULT_EXPIRY: Duration = Duration::from_millis(5000);

// ============================================================================
// Command Set
// ============================================================================

/// Inventory command code.
pub const CMD_INVENTORY: u8 = 0x01;

/// Broadcast reader address.
pub const BROADCAST_ADDRESS: u8 = 0xFF;

/// Default reader address.
pub const DEFAULT_READER_ADDRESS: u8 = 0x00;

/// Default TID start offset (in words) for inventory requests.
pub const DEFAULT_START_OFFSET: u8 = 0x03;

/// Default TID read length (in words) for inventory requests.
pub const DEFAULT_READ_LENGTH: u8 = 3;

/// Largest TID read length (in words) the reader accepts.
pub const MAX_READ_LENGTH: u8 = 15;

// ============================================================================
// Frame Layout
// ============================================================================

/// Size of the CRC-16 trailer in bytes.
pub const CRC_LEN: usize = 2;

/// Total size of an inventory request frame.
pub const INVENTORY_REQUEST_LEN: usize = 7;

/// Index of the length byte in any frame.
pub const LENGTH_INDEX: usize = 0;

/// Index of the reader address byte in any frame.
pub const ADDRESS_INDEX: usize = 1;

/// Index of the command byte in any frame.
pub const COMMAND_INDEX: usize = 2;

/// Index of the status byte in a response frame.
pub const STATUS_INDEX: usize = 3;

/// Index of the first data byte in a response frame.
pub const DATA_INDEX: usize = 4;

/// Smallest well-formed response: header, status and CRC, no data.
pub const MIN_RESPONSE_LEN: usize = DATA_INDEX + CRC_LEN;

/// Largest response frame the length byte can describe.
pub const MAX_RESPONSE_FRAME_LEN: usize = u8::MAX as usize + 1;

/// Largest inventory response for a full batch of maximum-length identifiers.
///
/// Header (4) + record count (1) + records + CRC (2).
pub const MAX_INVENTORY_RESPONSE_LEN: usize =
    DATA_INDEX + 1 + MAX_BATCH_RECORDS * (MAX_TAG_ID_LEN + 1) + CRC_LEN;

// ============================================================================
// CRC-16
// ============================================================================

/// Reflected CRC-16 polynomial (0x1021 bit-reversed).
pub const CRC16_POLYNOMIAL: u16 = 0x8408;

/// Initial CRC-16 register value.
pub const CRC16_INIT: u16 = 0xFFFF;

// ============================================================================
// Serial Link
// ============================================================================

/// Default baud rate of the reader's RS-485 link.
pub const DEFAULT_BAUD_RATE: u32 = 57_600;

/// Delay between transmitting a request and reading the response.
///
/// The half-duplex link needs time to turn around before the reader answers.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(10);

/// Pacing delay between two announcements.
pub const DEFAULT_ANNOUNCE_DELAY: Duration = Duration::from_millis(800);
