//! CRC-16 integrity check for reader frames.
//!
//! The reader protects every frame with the reflected CRC-16 known as
//! CRC-16/MCRF4XX: polynomial 0x8408 (0x1021 bit-reversed), initial value
//! 0xFFFF, no final XOR.
//!
//! # Wire Order
//!
//! The checksum travels least significant byte first:
//!
//! ```text
//! [ Len ][ Adr ][ Cmd ] ... [ CRC LSB ][ CRC MSB ]
//! ```
//!
//! [`to_wire`] and [`from_wire`] are the only places that convert between
//! the 16-bit value and its two wire bytes. They use explicit little-endian
//! conversions, so the result does not depend on the host's byte order.
//!
//! # Example
//!
//! ```
//! use tagwatch_protocol::crc;
//!
//! // Broadcast inventory command: 04 00 01 + CRC
//! let checksum = crc::crc16(&[0x04, 0x00, 0x01]);
//! assert_eq!(checksum, 0x4BDB);
//! assert_eq!(crc::to_wire(checksum), [0xDB, 0x4B]);
//! ```

use bytes::BufMut;
use tagwatch_core::constants::{CRC_LEN, CRC16_INIT, CRC16_POLYNOMIAL};

/// Compute the CRC-16 of `data`.
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(CRC16_INIT, |crc, &byte| {
        let mut crc = crc ^ u16::from(byte);
        for _ in 0..8 {
            crc = if crc & 0x0001 != 0 {
                (crc >> 1) ^ CRC16_POLYNOMIAL
            } else {
                crc >> 1
            };
        }
        crc
    })
}

/// Split a checksum into its two wire bytes (LSB first).
pub fn to_wire(crc: u16) -> [u8; CRC_LEN] {
    crc.to_le_bytes()
}

/// Reassemble a checksum from its two wire bytes (LSB first).
pub fn from_wire(bytes: [u8; CRC_LEN]) -> u16 {
    u16::from_le_bytes(bytes)
}

/// Check `crc` against the checksum of `payload`.
///
/// ```
/// use tagwatch_protocol::crc;
///
/// let payload = b"123456789";
/// assert!(crc::verify(payload, crc::crc16(payload)));
/// assert!(!crc::verify(payload, 0x0000));
/// ```
pub fn verify(payload: &[u8], crc: u16) -> bool {
    crc16(payload) == crc
}

/// Append the checksum of everything already in `buf`.
pub fn append<B: BufMut + AsRef<[u8]>>(buf: &mut B) {
    let crc = crc16(buf.as_ref());
    buf.put_slice(&to_wire(crc));
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use rstest::rstest;

    #[rstest]
    #[case::empty(&[], 0xFFFF)]
    #[case::check_string(b"123456789", 0x6F91)]
    #[case::broadcast_inventory(&[0x04, 0x00, 0x01], 0x4BDB)]
    #[case::tid_inventory(&[0x06, 0x00, 0x01, 0x03, 0x03], 0x493F)]
    #[case::no_tag_response(&[0x05, 0x00, 0x01, 0xFB], 0x3DF2)]
    fn test_crc16_known_vectors(#[case] data: &[u8], #[case] expected: u16) {
        assert_eq!(crc16(data), expected);
    }

    #[test]
    fn test_wire_order_is_lsb_first() {
        assert_eq!(to_wire(0x4BDB), [0xDB, 0x4B]);
        assert_eq!(from_wire([0xDB, 0x4B]), 0x4BDB);
    }

    #[test]
    fn test_append() {
        let mut buf = BytesMut::from(&[0x04u8, 0x00, 0x01][..]);
        append(&mut buf);
        assert_eq!(&buf[..], &[0x04, 0x00, 0x01, 0xDB, 0x4B]);
    }

    #[test]
    fn test_frame_with_appended_crc_has_zero_residue() {
        // Running the reflected CRC over data + its LSB-first checksum gives 0.
        let mut buf = BytesMut::from(&b"tag frame"[..]);
        append(&mut buf);
        assert_eq!(crc16(&buf), 0x0000);
    }

    #[test]
    fn test_verify_rejects_swapped_bytes() {
        let crc = crc16(&[0x04, 0x00, 0x01]);
        assert!(verify(&[0x04, 0x00, 0x01], crc));
        assert!(!verify(&[0x04, 0x00, 0x01], crc.swap_bytes()));
    }
}
