//! Hardware abstraction layer for the tagwatch reader.
//!
//! This crate connects the pure protocol and presence logic to the world:
//! a byte link to the UHF reader, a millisecond clock, an anonymizer for the
//! identifiers that leave the device, and a sink for announcements.
//!
//! # Design Philosophy
//!
//! - **Async-first**: I/O traits use native `async fn` in traits
//!   (Rust 1.90 + Edition 2024 RPITIT).
//! - **Substitutable**: every seam has a mock, so a full inventory cycle runs
//!   in tests without a reader attached.
//! - **Error-aware**: all operations return [`Result<T>`][error::Result];
//!   protocol errors pass through with their device status intact.
//!
//! # Inventory Cycle
//!
//! ```no_run
//! use std::time::Duration;
//! use tagwatch_hardware::{Reader, SystemClock, announce};
//! use tagwatch_hardware::anonymizer::XorKeyAnonymizer;
//! use tagwatch_hardware::sink::StdoutSink;
//! use tagwatch_hardware::traits::Transport;
//! use tagwatch_presence::PresenceCache;
//!
//! async fn run<T: Transport>(link: T) -> tagwatch_hardware::Result<()> {
//!     let mut reader = Reader::new(link, SystemClock::new());
//!     let mut cache: PresenceCache = PresenceCache::with_default_expiry();
//!     let mut anonymizer = XorKeyAnonymizer::new("");
//!     let mut sink = StdoutSink::new();
//!
//!     loop {
//!         reader.poll(&mut cache).await?;
//!         announce(&mut cache, &mut anonymizer, &mut sink, Duration::from_millis(800)).await?;
//!     }
//! }
//! ```
//!
//! # Features
//!
//! - `hardware-serial`: [`SerialTransport`](serial::SerialTransport) over
//!   the `serialport` crate.

pub mod anonymizer;
pub mod clock;
pub mod devices;
pub mod error;
pub mod mock;
pub mod reader;
#[cfg(feature = "hardware-serial")]
pub mod serial;
pub mod sink;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use anonymizer::{DecimalAnonymizer, XorKeyAnonymizer};
pub use clock::SystemClock;
pub use devices::{AnyAnonymizer, AnyTransport};
pub use error::{HardwareError, Result};
pub use reader::{DEFAULT_RESPONSE_TIMEOUT, Reader, announce};
#[cfg(feature = "hardware-serial")]
pub use serial::SerialTransport;
pub use sink::{CollectingSink, StdoutSink};
pub use traits::{Anonymizer, Clock, TagSink, Transport};
pub use types::{Announcement, SerialSettings};
