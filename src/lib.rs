//! # lootwatch
//!
//! Ingestion health telemetry and bounded rollups for game-client hunting
//! logs.
//!
//! An ingestion thread tails the client's event log and reports through a
//! [`HealthState`]; a UI thread polls coherent [`HealthSnapshot`]s of it
//! without ever blocking the writer. Separately, the event log and the hunt
//! record file are scanned on demand into bounded summaries.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ingestion thread ──▶ HealthState ──▶ snapshot(now) ──▶ UI  │
//! │                           │                                 │
//! │                           ▼                                 │
//! │                        Emitter ──▶ health.json ──▶ source   │
//! │                                                             │
//! │  events.csv ──▶ data::aggregate ──▶ EventSummary            │
//! │  hunts.csv  ──▶ data::catalog   ──▶ Vec<CatalogEntry>       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`data`]**: CSV scans: [`TopKAggregator`] and [`CatalogLoader`]
//! - **[`source`]**: reads snapshots published by [`Output::File`]
//! - **[`config`]**: layered [`Settings`] for the CLI
//!
//! The telemetry itself lives in `lootwatch-sdk` and the value types in
//! `lootwatch-types`; both are re-exported here.
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! lootwatch summary events.csv --start-line 1200
//! lootwatch catalog hunts.csv --max 20
//! lootwatch health health.json --follow
//! ```
//!
//! ### As a library
//!
//! ```
//! use lootwatch::{format_label, CatalogLoader};
//!
//! let records = "\
//! ts_start,ts_end,label,kills,shots,loot,expense,net,return_pct
//! 2024-05-01 10:00:00,2024-05-01 11:00:00,Opalo,12,300,8.5,6.0,2.5,141.6
//! ";
//! let entries = CatalogLoader::new().load_reader(records.as_bytes(), 0).unwrap();
//! assert_eq!(
//!     format_label(&entries[0]),
//!     "2024-05-01 10:00 -> 2024-05-01 11:00 | Opalo | 12 kills | 8.50 loot | no offsets"
//! );
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod source;

pub use config::Settings;
pub use data::{CatalogLoader, TopKAggregator};
pub use error::LoadError;
pub use source::SnapshotFile;

pub use lootwatch_sdk::{Emitter, EmitterBuilder, HealthState, Output};
pub use lootwatch_types::{
    current_timestamp_ms, format_label, AggregationKey, BoundedRing, CatalogEntry, Category,
    CategorySummary, ErrorEvent, EventSummary, HealthSnapshot, OffsetRange, SchemaGeneration,
    Severity,
};
