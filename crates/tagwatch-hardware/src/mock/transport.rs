//! Mock reader link for testing and development.
//!
//! This module provides an in-memory transport whose responses are scripted
//! through a handle, in the spirit of a loopback cable with a human typing
//! the reader's side.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc;

use crate::{HardwareError, Result, traits::Transport};

/// How long [`MockTransport::receive`] waits before reporting no data.
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(20);

/// In-memory transport driven by a [`MockTransportHandle`].
///
/// Each queued chunk is returned by one `receive` call, so a response can be
/// split to exercise partial reads.
///
/// # Examples
///
/// ```
/// use bytes::BytesMut;
/// use tagwatch_hardware::mock::MockTransport;
/// use tagwatch_hardware::traits::Transport;
///
/// #[tokio::main]
/// async fn main() -> tagwatch_hardware::Result<()> {
///     let (mut link, handle) = MockTransport::new();
///
///     handle.push_response(&[0x05, 0x00, 0x01, 0xFB, 0xF2, 0x3D])?;
///
///     link.send(&[0x04, 0x00, 0x01, 0xDB, 0x4B]).await?;
///     let mut buf = BytesMut::new();
///     assert_eq!(link.receive(&mut buf).await?, 6);
///
///     assert_eq!(handle.sent().len(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockTransport {
    /// Scripted chunks waiting to be read
    response_rx: mpsc::UnboundedReceiver<Bytes>,

    /// Everything written so far, shared with the handle
    sent: Arc<Mutex<Vec<Bytes>>>,

    read_timeout: Duration,
}

impl MockTransport {
    /// Create a mock transport and the handle that scripts it.
    pub fn new() -> (Self, MockTransportHandle) {
        Self::with_read_timeout(DEFAULT_READ_TIMEOUT)
    }

    /// Create a mock transport whose empty reads wait `read_timeout`.
    pub fn with_read_timeout(read_timeout: Duration) -> (Self, MockTransportHandle) {
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let sent = Arc::new(Mutex::new(Vec::new()));

        let transport = Self {
            response_rx,
            sent: Arc::clone(&sent),
            read_timeout,
        };
        let handle = MockTransportHandle { response_tx, sent };

        (transport, handle)
    }
}

impl Transport for MockTransport {
    async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        if self.response_rx.is_closed() && self.response_rx.is_empty() {
            return Err(HardwareError::disconnected("mock transport"));
        }
        lock(&self.sent).push(Bytes::copy_from_slice(bytes));
        Ok(())
    }

    async fn receive(&mut self, buf: &mut BytesMut) -> Result<usize> {
        match tokio::time::timeout(self.read_timeout, self.response_rx.recv()).await {
            Ok(Some(chunk)) => {
                buf.extend_from_slice(&chunk);
                Ok(chunk.len())
            }
            Ok(None) => Err(HardwareError::disconnected("mock transport")),
            Err(_) => Ok(0),
        }
    }
}

/// Handle for scripting a [`MockTransport`].
///
/// Dropping every handle disconnects the transport once its queued chunks
/// are drained.
#[derive(Debug, Clone)]
pub struct MockTransportHandle {
    response_tx: mpsc::UnboundedSender<Bytes>,
    sent: Arc<Mutex<Vec<Bytes>>>,
}

impl MockTransportHandle {
    /// Queue a response delivered in one read.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport has been dropped.
    pub fn push_response(&self, bytes: &[u8]) -> Result<()> {
        self.response_tx
            .send(Bytes::copy_from_slice(bytes))
            .map_err(|_| HardwareError::disconnected("mock transport"))
    }

    /// Queue a response delivered `chunk_size` bytes per read.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport has been dropped.
    pub fn push_chunked(&self, bytes: &[u8], chunk_size: usize) -> Result<()> {
        for chunk in bytes.chunks(chunk_size.max(1)) {
            self.push_response(chunk)?;
        }
        Ok(())
    }

    /// Frames written to the transport, oldest first.
    pub fn sent(&self) -> Vec<Bytes> {
        lock(&self.sent).clone()
    }

    /// Most recent frame written to the transport.
    pub fn last_sent(&self) -> Option<Bytes> {
        lock(&self.sent).last().cloned()
    }
}

fn lock(sent: &Mutex<Vec<Bytes>>) -> std::sync::MutexGuard<'_, Vec<Bytes>> {
    sent.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
