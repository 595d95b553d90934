//! # lootwatch-types
//!
//! Core value types shared by the lootwatch crates. Everything here is a
//! plain value: snapshots copied out of the health telemetry, ranked rollups
//! produced by the event aggregator, and records recovered from the hunt
//! catalog.
//!
//! ## Features
//!
//! - `serde`: JSON/etc. serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use lootwatch_types::BoundedRing;
//!
//! let mut ring = BoundedRing::new(3);
//! for i in 0..5 {
//!     ring.push(i);
//! }
//!
//! // Only the newest three survive, in insertion order.
//! assert_eq!(ring.into_vec(), vec![2, 3, 4]);
//! ```

mod catalog;
mod health;
mod ring;
mod summary;
pub mod text;

pub use catalog::*;
pub use health::*;
pub use ring::*;
pub use summary::*;

/// Current Unix time in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
