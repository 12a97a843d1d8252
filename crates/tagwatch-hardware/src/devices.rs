//! Enum wrappers for transport and anonymizer dispatch.
//!
//! Native `async fn` in traits are not object-safe, so `Box<dyn Transport>`
//! is not an option. These enums give the binary one concrete type to hold
//! whichever implementation the configuration selects.
//!
//! # Examples
//!
//! ```
//! use tagwatch_hardware::devices::AnyTransport;
//! use tagwatch_hardware::mock::MockTransport;
//!
//! let (link, _handle) = MockTransport::new();
//! let any_link = AnyTransport::Mock(link);
//!
//! // Can now be used polymorphically through the Transport trait
//! ```

use bytes::BytesMut;
use tagwatch_core::TagId;

use crate::Result;
use crate::anonymizer::{DecimalAnonymizer, XorKeyAnonymizer};
use crate::mock::MockTransport;
#[cfg(feature = "hardware-serial")]
use crate::serial::SerialTransport;
use crate::traits::{Anonymizer, Transport};

/// Enum wrapper for transport dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyTransport {
    /// In-memory link for development and testing.
    Mock(MockTransport),

    /// Serial port link.
    #[cfg(feature = "hardware-serial")]
    Serial(SerialTransport),
}

impl Transport for AnyTransport {
    async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        match self {
            Self::Mock(link) => link.send(bytes).await,
            #[cfg(feature = "hardware-serial")]
            Self::Serial(link) => link.send(bytes).await,
        }
    }

    async fn receive(&mut self, buf: &mut BytesMut) -> Result<usize> {
        match self {
            Self::Mock(link) => link.receive(buf).await,
            #[cfg(feature = "hardware-serial")]
            Self::Serial(link) => link.receive(buf).await,
        }
    }
}

/// Enum wrapper for anonymizer dispatch.
///
/// ```
/// use tagwatch_core::TagId;
/// use tagwatch_hardware::devices::AnyAnonymizer;
/// use tagwatch_hardware::anonymizer::DecimalAnonymizer;
/// use tagwatch_hardware::traits::Anonymizer;
///
/// let mut anonymizer = AnyAnonymizer::Decimal(DecimalAnonymizer::new("ID:"));
/// let text = anonymizer.anonymize(&TagId::new(&[1, 2]).unwrap());
/// assert_eq!(text, "ID:001002");
/// ```
#[derive(Debug, Clone)]
pub enum AnyAnonymizer {
    Decimal(DecimalAnonymizer),
    XorKey(XorKeyAnonymizer),
}

impl Anonymizer for AnyAnonymizer {
    fn anonymize(&mut self, id: &TagId) -> String {
        match self {
            Self::Decimal(inner) => inner.anonymize(id),
            Self::XorKey(inner) => inner.anonymize(id),
        }
    }
}

impl From<DecimalAnonymizer> for AnyAnonymizer {
    fn from(inner: DecimalAnonymizer) -> Self {
        Self::Decimal(inner)
    }
}

impl From<XorKeyAnonymizer> for AnyAnonymizer {
    fn from(inner: XorKeyAnonymizer) -> Self {
        Self::XorKey(inner)
    }
}
