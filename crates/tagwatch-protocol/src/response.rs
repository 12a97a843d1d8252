//! Response frame validation and inventory parsing.
//!
//! # Response Format
//!
//! ```text
//! +------+------+-------+--------+--------+---------+---------+
//! | Len  | Adr  | reCmd | Status | Data[] | CRC LSB | CRC MSB |
//! +------+------+-------+--------+--------+---------+---------+
//! ```
//!
//! For the inventory command, `Data[]` carries the tags found in range:
//!
//! ```text
//! +-----+------+-----------+------+-----------+-----
//! | Num | Len1 | TID1 ...  | Len2 | TID2 ...  | ...
//! +-----+------+-----------+------+-----------+-----
//! ```
//!
//! # Validation
//!
//! [`ResponseFrame::parse`] checks the frame in two tiers:
//!
//! 1. A status of [`DeviceStatus::CrcMismatch`] means the reader itself saw a
//!    corrupted request; the frame is rejected at once.
//! 2. Otherwise the checksum is recomputed over everything but the trailer
//!    and compared with the trailer.
//!
//! # Example
//!
//! ```
//! use tagwatch_core::Timestamp;
//! use tagwatch_protocol::validate_and_parse;
//!
//! let raw = [
//!     0x0D, 0x00, 0x01, 0x01, // header, status = success
//!     0x01,                   // one tag
//!     0x06, 0xE2, 0x00, 0x34, 0x12, 0x01, 0x6E,
//!     0x90, 0xBA,             // CRC, LSB first
//! ];
//!
//! let batch = validate_and_parse(&raw, Timestamp::from_millis(1000)).unwrap();
//! assert_eq!(batch.len(), 1);
//! assert_eq!(batch[0].id.to_hex(), "E2003412016E");
//! assert!(!batch[0].announced);
//! ```

use crate::crc;
use tagwatch_core::{
    DeviceStatus, Error, Result, RingBuffer, TagId, TagRecord, Timestamp, constants::*,
};
use tracing::{trace, warn};

/// Records captured in one inventory cycle.
pub type Batch = RingBuffer<TagRecord, MAX_BATCH_RECORDS>;

/// A validated response frame borrowed from a receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseFrame<'a> {
    bytes: &'a [u8],
}

impl<'a> ResponseFrame<'a> {
    /// Validate `bytes` as one complete response frame.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedFrame`] if the frame is shorter than a bare header
    ///   or its length byte disagrees with its size
    /// - [`Error::CrcMismatch`] if the reader reported a checksum failure or
    ///   the trailer does not match the recomputed checksum
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < MIN_RESPONSE_LEN {
            return Err(Error::malformed(format!(
                "response of {} bytes is shorter than the {MIN_RESPONSE_LEN}-byte minimum",
                bytes.len()
            )));
        }
        if bytes.len() > MAX_RESPONSE_FRAME_LEN {
            return Err(Error::malformed(format!(
                "response of {} bytes exceeds the {MAX_RESPONSE_FRAME_LEN}-byte maximum",
                bytes.len()
            )));
        }

        let declared = usize::from(bytes[LENGTH_INDEX]);
        if declared + 1 != bytes.len() {
            return Err(Error::malformed(format!(
                "length byte announces {} bytes, frame has {}",
                declared + 1,
                bytes.len()
            )));
        }

        let frame = Self { bytes };
        let received = frame.checksum();

        if frame.status() == DeviceStatus::CrcMismatch {
            return Err(Error::CrcMismatch {
                expected: received,
                actual: received,
            });
        }

        let computed = crc::crc16(frame.body());
        if computed != received {
            return Err(Error::CrcMismatch {
                expected: computed,
                actual: received,
            });
        }

        trace!(len = bytes.len(), status = %frame.status(), "response frame validated");
        Ok(frame)
    }

    /// Raw frame bytes, checksum included.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Address of the answering reader.
    pub fn address(&self) -> u8 {
        self.bytes[ADDRESS_INDEX]
    }

    /// Command this frame answers.
    pub fn command(&self) -> u8 {
        self.bytes[COMMAND_INDEX]
    }

    /// Execution status reported by the reader.
    pub fn status(&self) -> DeviceStatus {
        DeviceStatus::from_byte(self.bytes[STATUS_INDEX])
    }

    /// Data bytes between the status byte and the checksum.
    pub fn data(&self) -> &'a [u8] {
        &self.bytes[DATA_INDEX..self.bytes.len() - CRC_LEN]
    }

    /// Checksum carried in the trailer.
    pub fn checksum(&self) -> u16 {
        let n = self.bytes.len();
        crc::from_wire([self.bytes[n - 2], self.bytes[n - 1]])
    }

    fn body(&self) -> &'a [u8] {
        &self.bytes[..self.bytes.len() - CRC_LEN]
    }

    /// Parse the frame as an inventory response into a fresh [`Batch`].
    ///
    /// Every record is stamped with `captured_at` and starts unannounced.
    ///
    /// # Errors
    ///
    /// - [`Error::TooManyRecords`] if a successful response reports more than
    ///   [`MAX_BATCH_RECORDS`] tags
    /// - [`Error::Device`] with the reader's status, unchanged, if it is not
    ///   a success
    /// - [`Error::IdentifierTooLong`] if an entry exceeds [`MAX_TAG_ID_LEN`]
    /// - [`Error::MalformedFrame`] if the frame is not an inventory answer or
    ///   an entry runs past the data
    pub fn inventory(&self, captured_at: Timestamp) -> Result<Batch> {
        let mut batch = Batch::new();
        self.capture_into(&mut batch, captured_at)?;
        Ok(batch)
    }

    /// Parse the frame as an inventory response, capturing every record into
    /// `buffer`.
    ///
    /// A full `buffer` drops its oldest record and keeps going; capture never
    /// fails on capacity. Returns the number of records captured.
    ///
    /// # Errors
    ///
    /// Same as [`ResponseFrame::inventory`]. On error `buffer` may already
    /// hold the records that preceded the failing entry.
    pub fn capture_into<const N: usize>(
        &self,
        buffer: &mut RingBuffer<TagRecord, N>,
        captured_at: Timestamp,
    ) -> Result<usize> {
        if self.command() != CMD_INVENTORY {
            return Err(Error::malformed(format!(
                "expected inventory response (0x{CMD_INVENTORY:02X}), got command 0x{:02X}",
                self.command()
            )));
        }

        let status = self.status();
        let count = self.data().first().copied().map(usize::from);

        if let (true, Some(count)) = (status.is_success(), count)
            && count > MAX_BATCH_RECORDS
        {
            return Err(Error::TooManyRecords {
                count,
                max: MAX_BATCH_RECORDS,
            });
        }

        if !status.is_success() {
            return Err(Error::Device(status));
        }

        let Some(count) = count else {
            return Err(Error::malformed("inventory response without record count"));
        };

        let mut entries = &self.data()[1..];
        for index in 0..count {
            let Some((&len, rest)) = entries.split_first() else {
                return Err(Error::malformed(format!(
                    "record {index} of {count} missing"
                )));
            };
            let len = usize::from(len);
            if len > MAX_TAG_ID_LEN {
                return Err(Error::IdentifierTooLong {
                    len,
                    max: MAX_TAG_ID_LEN,
                });
            }
            if rest.len() < len {
                return Err(Error::malformed(format!(
                    "record {index} announces {len} bytes, {} left",
                    rest.len()
                )));
            }

            let (id, rest) = rest.split_at(len);
            let record = TagRecord::new(TagId::new(id)?, captured_at);
            if let Some(dropped) = buffer.enqueue_evicting(record) {
                warn!(tag = %dropped.id, capacity = N, "batch full, dropped oldest record");
            }
            entries = rest;
        }

        if !entries.is_empty() {
            trace!(trailing = entries.len(), "ignoring bytes after the last record");
        }

        Ok(count)
    }
}

/// Validate a raw inventory response and parse it into a batch.
///
/// Shorthand for [`ResponseFrame::parse`] followed by
/// [`ResponseFrame::inventory`].
pub fn validate_and_parse(bytes: &[u8], now: Timestamp) -> Result<Batch> {
    ResponseFrame::parse(bytes)?.inventory(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    /// Build a response frame with correct length byte and checksum.
    fn frame(status: u8, data: &[u8]) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_u8((DATA_INDEX + data.len() + CRC_LEN - 1) as u8);
        buf.put_u8(0x00);
        buf.put_u8(CMD_INVENTORY);
        buf.put_u8(status);
        buf.put_slice(data);
        crc::append(&mut buf);
        buf
    }

    const ONE_TAG: [u8; 14] = [
        0x0D, 0x00, 0x01, 0x01, 0x01, 0x06, 0xE2, 0x00, 0x34, 0x12, 0x01, 0x6E, 0x90, 0xBA,
    ];

    #[test]
    fn test_parse_known_frame() {
        let frame = ResponseFrame::parse(&ONE_TAG).unwrap();

        assert_eq!(frame.address(), 0x00);
        assert_eq!(frame.command(), CMD_INVENTORY);
        assert_eq!(frame.status(), DeviceStatus::Success);
        assert_eq!(frame.checksum(), 0xBA90);
        assert_eq!(frame.data().len(), 8);
    }

    #[test]
    fn test_inventory_stamps_records() {
        let now = Timestamp::from_millis(4242);
        let batch = ResponseFrame::parse(&ONE_TAG).unwrap().inventory(now).unwrap();

        assert_eq!(batch.len(), 1);
        let record = batch[0];
        assert_eq!(record.id.as_bytes(), &[0xE2, 0x00, 0x34, 0x12, 0x01, 0x6E]);
        assert_eq!(record.last_seen, now);
        assert!(!record.announced);
    }

    #[test]
    fn test_variable_length_entries() {
        let raw = frame(0x01, &[0x02, 0x02, 0xAA, 0xBB, 0x01, 0xCC]);
        assert_eq!(raw[0], 0x0B);
        assert_eq!(&raw[raw.len() - 2..], &[0xBC, 0x49]);

        let batch = validate_and_parse(&raw, Timestamp::default()).unwrap();
        let ids: Vec<String> = batch.iter().map(|r| r.id.to_hex()).collect();
        assert_eq!(ids, vec!["AABB", "CC"]);
    }

    #[test]
    fn test_zero_records() {
        let raw = frame(0x01, &[0x00]);
        let batch = validate_and_parse(&raw, Timestamp::default()).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_crc_mismatch_on_corrupted_payload() {
        let mut raw = ONE_TAG;
        raw[7] ^= 0x01;

        let err = ResponseFrame::parse(&raw).unwrap_err();
        assert!(matches!(err, Error::CrcMismatch { actual: 0xBA90, .. }));
    }

    #[test]
    fn test_crc_mismatch_on_corrupted_trailer() {
        let mut raw = ONE_TAG;
        raw[13] ^= 0x80;

        assert!(matches!(
            ResponseFrame::parse(&raw),
            Err(Error::CrcMismatch { expected: 0xBA90, .. })
        ));
    }

    #[test]
    fn test_device_crc_status_short_circuits() {
        // The checksum is valid, but the reader reports a CRC failure.
        let raw = [0x05, 0x00, 0x01, 0xFE, 0x5F, 0x6A];
        assert!(crc::verify(&raw[..4], crc::from_wire([0x5F, 0x6A])));

        let err = ResponseFrame::parse(&raw).unwrap_err();
        assert!(matches!(err, Error::CrcMismatch { .. }));
        assert_eq!(err.status(), DeviceStatus::CrcMismatch);
    }

    #[test]
    fn test_device_status_propagates_verbatim() {
        let raw = [0x05, 0x00, 0x01, 0xFB, 0xF2, 0x3D];
        let err = validate_and_parse(&raw, Timestamp::default()).unwrap_err();
        assert_eq!(err, Error::Device(DeviceStatus::NoTagInRange));

        let raw = frame(0x37, &[0x01, 0x01, 0xAA]);
        let err = validate_and_parse(&raw, Timestamp::default()).unwrap_err();
        assert_eq!(err, Error::Device(DeviceStatus::Other(0x37)));
    }

    #[test]
    fn test_too_many_records() {
        let raw = frame(0x01, &[MAX_BATCH_RECORDS as u8 + 1]);
        let err = validate_and_parse(&raw, Timestamp::default()).unwrap_err();
        assert_eq!(
            err,
            Error::TooManyRecords {
                count: 16,
                max: MAX_BATCH_RECORDS
            }
        );
    }

    #[test]
    fn test_large_count_with_error_status_reports_status() {
        let raw = frame(0x02, &[0x20]);
        let err = validate_and_parse(&raw, Timestamp::default()).unwrap_err();
        assert_eq!(err, Error::Device(DeviceStatus::InventoryTimeout));
    }

    #[test]
    fn test_identifier_too_long() {
        let raw = frame(0x01, &[0x01, 0x07, 1, 2, 3, 4, 5, 6, 7]);
        let err = validate_and_parse(&raw, Timestamp::default()).unwrap_err();
        assert_eq!(err, Error::IdentifierTooLong { len: 7, max: 6 });
    }

    #[test]
    fn test_truncated_entry() {
        let raw = frame(0x01, &[0x02, 0x02, 0xAA, 0xBB, 0x04, 0xCC]);
        let err = validate_and_parse(&raw, Timestamp::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedFrame { .. }));
    }

    #[test]
    fn test_missing_count() {
        let raw = frame(0x01, &[]);
        let err = validate_and_parse(&raw, Timestamp::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedFrame { .. }));
    }

    #[test]
    fn test_length_byte_mismatch() {
        let mut raw = ONE_TAG.to_vec();
        raw.push(0x00);
        assert!(matches!(
            ResponseFrame::parse(&raw),
            Err(Error::MalformedFrame { .. })
        ));
        assert!(matches!(
            ResponseFrame::parse(&ONE_TAG[..5]),
            Err(Error::MalformedFrame { .. })
        ));
    }

    #[test]
    fn test_wrong_command() {
        let mut raw = BytesMut::new();
        raw.put_slice(&[0x05, 0x00, 0x21, 0x01]);
        crc::append(&mut raw);

        let frame = ResponseFrame::parse(&raw).unwrap();
        assert!(matches!(
            frame.inventory(Timestamp::default()),
            Err(Error::MalformedFrame { .. })
        ));
    }

    #[test]
    fn test_capture_into_small_buffer_drops_oldest() {
        let raw = frame(0x01, &[0x03, 0x01, 0x0A, 0x01, 0x0B, 0x01, 0x0C]);
        let frame = ResponseFrame::parse(&raw).unwrap();
        let mut small: RingBuffer<TagRecord, 2> = RingBuffer::new();

        let captured = frame.capture_into(&mut small, Timestamp::default()).unwrap();

        assert_eq!(captured, 3);
        let ids: Vec<String> = small.iter().map(|r| r.id.to_hex()).collect();
        assert_eq!(ids, vec!["0B", "0C"]);
    }
}
