//! Seams between the reader logic and the outside world.
//!
//! The inventory driver never touches a port, a system clock or a random
//! source directly. Each is reached through one of these traits so the same
//! logic runs against real hardware and against the mocks in
//! [`crate::mock`].
//!
//! I/O traits use native `async fn` methods (Rust 1.90 + Edition 2024
//! RPITIT), eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use bytes::BytesMut;
use tagwatch_core::{TagId, Timestamp};

use crate::error::Result;
use crate::types::Announcement;

/// Byte link to the reader.
///
/// # Examples
///
/// ```no_run
/// use bytes::BytesMut;
/// use tagwatch_hardware::Result;
/// use tagwatch_hardware::traits::Transport;
///
/// async fn exchange<T: Transport>(link: &mut T, request: &[u8]) -> Result<BytesMut> {
///     link.send(request).await?;
///     let mut buf = BytesMut::new();
///     while link.receive(&mut buf).await? > 0 {}
///     Ok(buf)
/// }
/// ```
pub trait Transport: Send {
    /// Write `bytes` to the reader in full.
    ///
    /// # Errors
    ///
    /// Returns an error if the link is closed or the write fails.
    async fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Append whatever bytes are available to `buf`.
    ///
    /// Returns the number of bytes appended. Zero means nothing arrived
    /// within the transport's own read timeout; it is not end of stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the link is closed or the read fails.
    async fn receive(&mut self, buf: &mut BytesMut) -> Result<usize>;
}

/// Monotonic millisecond clock.
pub trait Clock: Send + Sync {
    /// Current time. Wraps around after `u32::MAX` milliseconds.
    fn now(&self) -> Timestamp;
}

/// Turns a raw identifier into the text that leaves the device.
pub trait Anonymizer: Send {
    fn anonymize(&mut self, id: &TagId) -> String;
}

/// Destination of tag announcements.
pub trait TagSink: Send {
    /// Deliver one announcement.
    ///
    /// # Errors
    ///
    /// Returns an error if the announcement cannot be delivered.
    async fn emit(&mut self, announcement: Announcement) -> Result<()>;
}
