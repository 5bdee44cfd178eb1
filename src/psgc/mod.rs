//! Philippine Standard Geographic Code lookups.
//!
//! Region, province, city/municipality and barangay lists come from the
//! public PSGC API through a SQLite read-through cache with a per-minute
//! request budget. Upstream strings are repaired for double-encoded UTF-8
//! before they are stored.

mod cache;
mod client;
mod encoding;
mod rate_counter;
mod region_match;

pub use cache::{CacheStatus, CachedResponse, PsgcCache};
pub use client::{HttpPsgcSource, PsgcSource};
pub use encoding::{fix_double_encoding, fix_json};
pub use rate_counter::RateCounter;
pub use region_match::{Region, match_region};
