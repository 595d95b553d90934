//! # lootwatch-sdk
//!
//! Lock-free ingestion health telemetry.
//!
//! The ingestion thread records what it does through a shared
//! [`HealthState`]; any number of UI or reporting threads copy out a
//! coherent [`HealthSnapshot`] at frame rate without ever blocking it.
//!
//! ## Quick Start
//!
//! ```rust
//! use lootwatch_sdk::HealthState;
//! use lootwatch_types::Severity;
//! use std::sync::Arc;
//!
//! let health = Arc::new(HealthState::new());
//! health.reset(1, 1);
//!
//! // Ingestion side
//! health.on_event(10_000);
//! health.update_io(10_000, 4096, 2048, 512, false);
//! health.on_parse_error("unexpected token");
//!
//! // UI side
//! let snapshot = health.snapshot(10_200);
//! assert_eq!(snapshot.lag_severity, Severity::Ok);
//! assert_eq!(snapshot.parse_errors, 1);
//! assert_eq!(snapshot.errors[0].message, "Parse: unexpected token");
//! ```
//!
//! ## Features
//!
//! - **Untorn snapshots**: a sequence counter guarantees every snapshot
//!   reflects a single instant of the writer
//! - **Never fails**: every write-side call is accepted best-effort
//! - **Bounded**: ten recent error records, a ten-second rate window
//! - **Background emission** (`tokio` feature): periodic JSON file or
//!   channel output via [`Emitter`]

mod emitter;
mod errors;
mod output;
mod rate;
mod state;

pub use emitter::{Emitter, EmitterBuilder};
pub use errors::{ErrorLog, RawErrors};
pub use output::Output;
pub use rate::{RateBuckets, RateWindow};
pub use state::{HealthState, FLUSH_FAILED_MESSAGE, ROTATED_MESSAGE};

#[cfg(feature = "tokio")]
pub use emitter::EmissionHandle;

// Re-export types for convenience
pub use lootwatch_types::{ErrorEvent, HealthSnapshot, Severity};
