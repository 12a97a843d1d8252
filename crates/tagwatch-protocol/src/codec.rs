//! Tokio codec for reader frame framing.
//!
//! The reader answers over a byte stream with no start marker: every frame
//! begins with a length byte counting the bytes that follow it. `UhfCodec`
//! buffers partial reads until a whole frame is present and hands it out
//! as [`Bytes`], leaving checksum and payload validation to
//! [`ResponseFrame::parse`](crate::ResponseFrame::parse).
//!
//! ```text
//! Serial Stream -> Decoder -> Bytes (one complete frame)
//! InventoryRequest -> Encoder -> Serial Stream
//! ```
//!
//! # Usage
//!
//! ```
//! use bytes::BytesMut;
//! use tokio_util::codec::{Decoder, Encoder};
//! use tagwatch_protocol::{InventoryRequest, UhfCodec};
//!
//! let mut codec = UhfCodec::new();
//!
//! let mut out = BytesMut::new();
//! codec.encode(InventoryRequest::default(), &mut out).unwrap();
//! assert_eq!(out.len(), 7);
//!
//! // A response split across two reads
//! let mut rx = BytesMut::from(&[0x05, 0x00, 0x01][..]);
//! assert!(codec.decode(&mut rx).unwrap().is_none());
//! rx.extend_from_slice(&[0xFB, 0xF2, 0x3D]);
//! let frame = codec.decode(&mut rx).unwrap().unwrap();
//! assert_eq!(&frame[..], &[0x05, 0x00, 0x01, 0xFB, 0xF2, 0x3D]);
//! ```

use std::io;

use bytes::{Bytes, BytesMut};
use tagwatch_core::constants::{LENGTH_INDEX, MAX_RESPONSE_FRAME_LEN, MIN_RESPONSE_LEN};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::InventoryRequest;

/// Errors raised while framing a byte stream.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error(transparent)]
    Protocol(#[from] tagwatch_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Length-prefixed frame codec for the reader's serial link.
#[derive(Debug, Clone)]
pub struct UhfCodec {
    /// Frames longer than this are rejected.
    max_frame_size: usize,
}

impl UhfCodec {
    /// Create a codec accepting the largest frame a length byte can describe.
    pub fn new() -> Self {
        Self {
            max_frame_size: MAX_RESPONSE_FRAME_LEN,
        }
    }

    /// Create a codec with a tighter frame size limit.
    ///
    /// ```
    /// use tagwatch_protocol::UhfCodec;
    ///
    /// let codec = UhfCodec::with_max_frame_size(112);
    /// assert_eq!(codec.max_frame_size(), 112);
    /// ```
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            max_frame_size: max_frame_size.min(MAX_RESPONSE_FRAME_LEN),
        }
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl Default for UhfCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for UhfCodec {
    type Item = Bytes;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, CodecError> {
        let Some(&declared) = src.get(LENGTH_INDEX) else {
            return Ok(None);
        };

        let frame_len = usize::from(declared) + 1;
        if frame_len < MIN_RESPONSE_LEN {
            // Nothing after this byte can be trusted to line up with a frame.
            src.clear();
            return Err(tagwatch_core::Error::malformed(format!(
                "length byte {declared:#04X} is below the {}-byte minimum",
                MIN_RESPONSE_LEN - 1
            ))
            .into());
        }
        if frame_len > self.max_frame_size {
            src.clear();
            return Err(tagwatch_core::Error::malformed(format!(
                "frame of {frame_len} bytes exceeds the {}-byte limit",
                self.max_frame_size
            ))
            .into());
        }

        if src.len() < frame_len {
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        let frame = src.split_to(frame_len).freeze();
        trace!(len = frame.len(), "frame assembled");
        Ok(Some(frame))
    }
}

impl Encoder<InventoryRequest> for UhfCodec {
    type Error = CodecError;

    fn encode(&mut self, item: InventoryRequest, dst: &mut BytesMut) -> Result<(), CodecError> {
        item.encode_into(dst);
        Ok(())
    }
}
