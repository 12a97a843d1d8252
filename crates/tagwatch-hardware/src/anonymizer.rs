//! Identifier anonymizers.
//!
//! Both render bytes as zero-padded 3-digit decimals, the format the reader's
//! keyboard output has always used:
//!
//! ```text
//! DecimalAnonymizer   prefix + dec(id[0]) dec(id[1]) ...
//! XorKeyAnonymizer    prefix + dec(id[0]^k0) dec(id[1]^k1) dec(id[2]^k0) ... dec(k0) dec(k1)
//! ```
//!
//! The XOR variant draws a fresh key for every call, so the same tag never
//! produces the same text twice, while a receiver that knows the scheme can
//! still recover the identifier from the trailing key bytes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tagwatch_core::TagId;

use crate::traits::Anonymizer;

/// Number of key bytes appended to an XOR-masked identifier.
pub const XOR_KEY_LEN: usize = 2;

/// Plain decimal rendering behind a fixed prefix.
#[derive(Debug, Clone, Default)]
pub struct DecimalAnonymizer {
    prefix: String,
}

impl DecimalAnonymizer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Anonymizer for DecimalAnonymizer {
    fn anonymize(&mut self, id: &TagId) -> String {
        format!("{}{}", self.prefix, id.to_decimal())
    }
}

/// Masks the identifier with a random two-byte key.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use tagwatch_core::TagId;
/// use tagwatch_hardware::anonymizer::XorKeyAnonymizer;
/// use tagwatch_hardware::traits::Anonymizer;
///
/// let mut anonymizer = XorKeyAnonymizer::with_rng("ID:", StdRng::seed_from_u64(7));
/// let text = anonymizer.anonymize(&TagId::new(&[0xE2, 0x00, 0x34]).unwrap());
///
/// // prefix, three masked bytes, two key bytes
/// assert_eq!(text.len(), 3 + 5 * 3);
/// assert!(text.starts_with("ID:"));
/// ```
#[derive(Debug, Clone)]
pub struct XorKeyAnonymizer<R = StdRng> {
    prefix: String,
    rng: R,
}

impl XorKeyAnonymizer<StdRng> {
    /// Create an anonymizer seeded from the operating system.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_rng(prefix, StdRng::from_os_rng())
    }
}

impl<R: Rng> XorKeyAnonymizer<R> {
    /// Create an anonymizer drawing keys from `rng`.
    pub fn with_rng(prefix: impl Into<String>, rng: R) -> Self {
        Self {
            prefix: prefix.into(),
            rng,
        }
    }

    /// Draw a key. Neither byte is ever 0x00 or 0xFF.
    fn draw_key(&mut self) -> [u8; XOR_KEY_LEN] {
        std::array::from_fn(|_| self.rng.random_range(1..=254))
    }
}

impl<R: Rng + Send> Anonymizer for XorKeyAnonymizer<R> {
    fn anonymize(&mut self, id: &TagId) -> String {
        let key = self.draw_key();
        mask(&self.prefix, id, key)
    }
}

/// Render `id` masked with `key`, followed by the key itself.
///
/// ```
/// use tagwatch_core::TagId;
/// use tagwatch_hardware::anonymizer::mask;
///
/// let id = TagId::new(&[0x10, 0x20, 0x30]).unwrap();
/// assert_eq!(mask("", &id, [0x01, 0x02]), "017034049001002");
/// ```
pub fn mask(prefix: &str, id: &TagId, key: [u8; XOR_KEY_LEN]) -> String {
    let masked: String = id
        .as_bytes()
        .iter()
        .enumerate()
        .map(|(i, b)| format!("{:03}", b ^ key[i % XOR_KEY_LEN]))
        .collect();
    let key_text: String = key.iter().map(|k| format!("{k:03}")).collect();

    format!("{prefix}{masked}{key_text}")
}

/// Recover the identifier bytes from a [`mask`]ed text without its prefix.
///
/// Returns `None` if the text is not a whole number of 3-digit groups.
pub fn unmask(text: &str) -> Option<Vec<u8>> {
    if text.len() % 3 != 0 || text.len() < XOR_KEY_LEN * 3 {
        return None;
    }

    let groups = text
        .as_bytes()
        .chunks(3)
        .map(|chunk| std::str::from_utf8(chunk).ok()?.parse::<u8>().ok())
        .collect::<Option<Vec<u8>>>()?;

    let (masked, key) = groups.split_at(groups.len() - XOR_KEY_LEN);
    Some(
        masked
            .iter()
            .enumerate()
            .map(|(i, b)| b ^ key[i % XOR_KEY_LEN])
            .collect(),
    )
}
