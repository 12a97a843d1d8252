pub mod constants;
pub mod error;
pub mod ring_buffer;
pub mod types;

pub use error::{Error, Result};
pub use ring_buffer::RingBuffer;
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
