//! Frame builders shared by the integration tests.

#![allow(dead_code)]

use bytes::{BufMut, BytesMut};
use tagwatch_core::constants::CMD_INVENTORY;
use tagwatch_protocol::crc;

/// Build a response frame with a correct length byte and checksum.
pub fn response(address: u8, status: u8, data: &[u8]) -> BytesMut {
    let mut buf = BytesMut::with_capacity(data.len() + 6);
    buf.put_u8((data.len() + 5) as u8);
    buf.put_u8(address);
    buf.put_u8(CMD_INVENTORY);
    buf.put_u8(status);
    buf.put_slice(data);
    crc::append(&mut buf);
    buf
}

/// Build a successful inventory response listing `ids`.
pub fn inventory(ids: &[&[u8]]) -> BytesMut {
    let mut data = vec![ids.len() as u8];
    for id in ids {
        data.push(id.len() as u8);
        data.extend_from_slice(id);
    }
    response(0x00, 0x01, &data)
}

/// The reader's answer when no tag is in range.
pub fn no_tag() -> BytesMut {
    response(0x00, 0xFB, &[])
}
