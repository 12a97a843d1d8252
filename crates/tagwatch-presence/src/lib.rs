//! Presence tracking for inventoried tags.
//!
//! [`PresenceCache`] remembers which tags are in range and whether each has
//! already been reported, so a tag lingering at the antenna is announced once
//! per presence episode instead of once per inventory cycle.

pub mod cache;

pub use cache::{PresenceCache, ReconcileReport};
