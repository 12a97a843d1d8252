use crate::crc;
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tagwatch_core::constants::*;

/// Inventory command sent to the reader.
///
/// Encodes to a fixed 7-byte frame:
///
/// ```text
/// +------+------+------+-------+--------+---------+---------+
/// | Len  | Adr  | Cmd  | Start | Length | CRC LSB | CRC MSB |
/// | 0x06 | 0xXX | 0x01 | 0xXX  | 0xXX   |  0xXX   |  0xXX   |
/// +------+------+------+-------+--------+---------+---------+
/// ```
///
/// `Start` is the TID memory word offset and `Length` the number of words
/// to read for each tag.
///
/// # Example
/// ```
/// use tagwatch_protocol::InventoryRequest;
///
/// let request = InventoryRequest::new(0x00, 0x03, 3);
/// assert_eq!(
///     request.to_array(),
///     [0x06, 0x00, 0x01, 0x03, 0x03, 0x3F, 0x49]
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryRequest {
    address: u8,
    start_offset: u8,
    read_length: u8,
}

impl InventoryRequest {
    /// Create an inventory request for the reader at `address`.
    pub fn new(address: u8, start_offset: u8, read_length: u8) -> Self {
        InventoryRequest {
            address,
            start_offset,
            read_length,
        }
    }

    /// Create a request addressed to every reader on the bus.
    pub fn broadcast(start_offset: u8, read_length: u8) -> Self {
        Self::new(BROADCAST_ADDRESS, start_offset, read_length)
    }

    /// Set the reader address.
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Set the TID start offset (in words).
    pub fn with_start_offset(mut self, start_offset: u8) -> Self {
        self.start_offset = start_offset;
        self
    }

    /// Set the TID read length (in words).
    pub fn with_read_length(mut self, read_length: u8) -> Self {
        self.read_length = read_length;
        self
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn start_offset(&self) -> u8 {
        self.start_offset
    }

    pub fn read_length(&self) -> u8 {
        self.read_length
    }

    /// Identifier length in bytes the reader will return for this request.
    pub fn identifier_len(&self) -> usize {
        usize::from(self.read_length) * 2
    }

    /// Encode the request into its wire bytes.
    pub fn to_array(&self) -> [u8; INVENTORY_REQUEST_LEN] {
        let mut frame = [0u8; INVENTORY_REQUEST_LEN];
        frame[LENGTH_INDEX] = (INVENTORY_REQUEST_LEN - 1) as u8;
        frame[ADDRESS_INDEX] = self.address;
        frame[COMMAND_INDEX] = CMD_INVENTORY;
        frame[3] = self.start_offset;
        frame[4] = self.read_length;

        let body = INVENTORY_REQUEST_LEN - CRC_LEN;
        let checksum = crc::crc16(&frame[..body]);
        frame[body..].copy_from_slice(&crc::to_wire(checksum));
        frame
    }

    /// Append the encoded request to `dst`.
    pub fn encode_into(&self, dst: &mut BytesMut) {
        dst.reserve(INVENTORY_REQUEST_LEN);
        dst.put_slice(&self.to_array());
    }

    /// Encode the request into a [`Bytes`] buffer.
    pub fn encode(&self) -> Bytes {
        Bytes::copy_from_slice(&self.to_array())
    }
}

impl Default for InventoryRequest {
    fn default() -> Self {
        Self::new(
            DEFAULT_READER_ADDRESS,
            DEFAULT_START_OFFSET,
            DEFAULT_READ_LENGTH,
        )
    }
}
