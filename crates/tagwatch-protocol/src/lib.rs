pub mod codec;
pub mod crc;
pub mod request;
pub mod response;

pub use codec::{CodecError, UhfCodec};
pub use request::InventoryRequest;
pub use response::{Batch, ResponseFrame, validate_and_parse};
