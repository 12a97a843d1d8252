//! Inventory driver.
//!
//! [`Reader`] runs one inventory cycle at a time over a [`Transport`]:
//!
//! ```text
//!  InventoryRequest --encode--> Transport --bytes--> UhfCodec --frame-->
//!  validate_and_parse --Batch--> PresenceCache::reconcile --> ReconcileReport
//! ```
//!
//! [`announce`] then drains the tags the cache marked as newly present.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use tagwatch_hardware::{Reader, announce};
//! use tagwatch_hardware::anonymizer::DecimalAnonymizer;
//! use tagwatch_hardware::mock::{MockClock, MockTransport};
//! use tagwatch_hardware::sink::CollectingSink;
//! use tagwatch_presence::PresenceCache;
//!
//! #[tokio::main]
//! async fn main() -> tagwatch_hardware::Result<()> {
//!     let (link, handle) = MockTransport::new();
//!     let mut reader = Reader::new(link, MockClock::new());
//!     let mut cache: PresenceCache = PresenceCache::with_default_expiry();
//!
//!     // One tag in range
//!     handle.push_response(&[
//!         0x0D, 0x00, 0x01, 0x01, 0x01, 0x06, 0xE2, 0x00, 0x34, 0x12, 0x01, 0x6E, 0x90, 0xBA,
//!     ])?;
//!     let report = reader.poll(&mut cache).await?;
//!     assert_eq!(report.appended, 1);
//!
//!     let mut sink = CollectingSink::new();
//!     let mut anonymizer = DecimalAnonymizer::default();
//!     announce(&mut cache, &mut anonymizer, &mut sink, Duration::ZERO).await?;
//!     assert_eq!(sink.tags(), vec!["226000052018001110"]);
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tagwatch_core::{DeviceStatus, Error, Timestamp, constants::MAX_RESPONSE_FRAME_LEN};
use tagwatch_presence::{PresenceCache, ReconcileReport};
use tagwatch_protocol::{Batch, InventoryRequest, UhfCodec, validate_and_parse};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace, warn};

use crate::traits::{Anonymizer, Clock, TagSink, Transport};
use crate::types::Announcement;
use crate::{HardwareError, Result};

/// Default time allowed for a complete response to arrive.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_millis(300);

/// Inventory driver over a transport and a clock.
#[derive(Debug)]
pub struct Reader<T, C> {
    transport: T,
    clock: C,
    codec: UhfCodec,
    request: InventoryRequest,
    response_timeout: Duration,
    rx: BytesMut,
}

impl<T: Transport, C: Clock> Reader<T, C> {
    /// Create a driver sending the default inventory request.
    pub fn new(transport: T, clock: C) -> Self {
        Self {
            transport,
            clock,
            codec: UhfCodec::new(),
            request: InventoryRequest::default(),
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            rx: BytesMut::with_capacity(MAX_RESPONSE_FRAME_LEN),
        }
    }

    /// Set the request sent each cycle.
    pub fn with_request(mut self, request: InventoryRequest) -> Self {
        self.request = request;
        self
    }

    /// Set how long to wait for a complete response.
    pub fn with_response_timeout(mut self, response_timeout: Duration) -> Self {
        self.response_timeout = response_timeout;
        self
    }

    pub fn request(&self) -> &InventoryRequest {
        &self.request
    }

    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Give back the transport and clock.
    pub fn into_parts(self) -> (T, C) {
        (self.transport, self.clock)
    }

    /// Run one inventory cycle and return the captured batch.
    ///
    /// # Errors
    ///
    /// - [`HardwareError::Timeout`] if no complete frame arrives within the
    ///   response timeout
    /// - [`HardwareError::Protocol`] with the validation or parsing error,
    ///   including device statuses such as no tag in range
    /// - transport errors as reported by the transport
    pub async fn inventory(&mut self) -> Result<Batch> {
        self.capture().await.map(|(batch, _)| batch)
    }

    /// Run one inventory cycle and fold its batch into `cache`.
    ///
    /// A reader answering that no tag is in range yields an empty report.
    /// Every other failure is returned unchanged; the cache is left as it
    /// was and the next cycle starts afresh.
    pub async fn poll<const N: usize>(
        &mut self,
        cache: &mut PresenceCache<N>,
    ) -> Result<ReconcileReport> {
        match self.capture().await {
            Ok((batch, now)) => Ok(cache.reconcile(&batch, now)),
            Err(HardwareError::Protocol(Error::Device(DeviceStatus::NoTagInRange))) => {
                trace!("no tag in range");
                Ok(ReconcileReport::default())
            }
            Err(err) => {
                warn!(error = %err, "inventory cycle failed");
                Err(err)
            }
        }
    }

    /// Exchange one frame and parse it, stamped with a single clock reading.
    async fn capture(&mut self) -> Result<(Batch, Timestamp)> {
        let frame = self.exchange().await?;
        let now = self.clock.now();
        let batch = validate_and_parse(&frame, now)?;
        Ok((batch, now))
    }

    /// Send the request and wait for one response frame.
    async fn exchange(&mut self) -> Result<Bytes> {
        let mut out = BytesMut::new();
        self.codec.encode(self.request, &mut out)?;

        // Leftovers from a timed-out cycle belong to no request.
        self.rx.clear();
        self.transport.send(&out).await?;
        trace!(request = ?&out[..], "inventory request sent");

        let timeout = self.response_timeout;
        tokio::time::timeout(timeout, self.read_frame())
            .await
            .map_err(|_| HardwareError::timeout(timeout.as_millis() as u64))?
    }

    async fn read_frame(&mut self) -> Result<Bytes> {
        loop {
            if let Some(frame) = self.codec.decode(&mut self.rx)? {
                debug!(len = frame.len(), "response received");
                return Ok(frame);
            }
            if self.transport.receive(&mut self.rx).await? == 0 {
                tokio::task::yield_now().await;
            }
        }
    }
}

/// Emit every pending record of `cache` and mark it announced.
///
/// Waits `delay` between two emissions. A record whose emission fails stays
/// pending and the error is returned. Returns the number of announcements.
pub async fn announce<const N: usize, A, S>(
    cache: &mut PresenceCache<N>,
    anonymizer: &mut A,
    sink: &mut S,
    delay: Duration,
) -> Result<usize>
where
    A: Anonymizer,
    S: TagSink,
{
    let mut emitted = 0;

    for record in cache.pending_mut() {
        if emitted > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let tag = anonymizer.anonymize(&record.id);
        sink.emit(Announcement::now(tag)).await?;
        record.mark_announced();
        emitted += 1;
    }

    if emitted > 0 {
        debug!(count = emitted, "tags announced");
    }
    Ok(emitted)
}
