//! Readers for health snapshots published by another process.
//!
//! The ingestion side publishes through `lootwatch_sdk::Output::File`; the
//! CLI reads that file back with [`SnapshotFile`].

mod file;

pub use file::SnapshotFile;
