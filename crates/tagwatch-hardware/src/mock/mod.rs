//! Mock implementations for testing and development.
//!
//! These stand in for the serial link and the tick counter so the whole
//! inventory cycle can run without a reader attached.

pub mod clock;
pub mod transport;

// Re-export commonly used types
pub use clock::MockClock;
pub use transport::{MockTransport, MockTransportHandle};
