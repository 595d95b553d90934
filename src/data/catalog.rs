//! Newest-N recovery of the hunt record file.
//!
//! The record file only ever grows, and older rows may predate columns that
//! were added later. Every generation is accepted: see
//! [`SchemaGeneration`] for the column layouts.

use std::io::{self, BufRead};
use std::path::Path;

use lootwatch_types::text::{truncate_bytes, LABEL_WIDTH, TAG_WIDTH, TIMESTAMP_WIDTH};
use lootwatch_types::{BoundedRing, CatalogEntry, OffsetRange, SchemaGeneration};
use tracing::debug;

use super::csv::{parse_decimal, parse_integer, split_fields};
use super::{open_input, read_lines};
use crate::error::LoadError;

/// Capacity used when the caller asks for `0` records.
pub const DEFAULT_CAPACITY: usize = 256;

/// Upper bound on retained records, whatever the caller asks for.
pub const MAX_CAPACITY: usize = 4096;

/// Most columns a record line is split into.
pub const MAX_FIELDS: usize = 16;

/// Lines with fewer columns than this are not records.
const MIN_FIELDS: usize = 2;

/// Returns true if `line` is the record file header.
pub fn is_catalog_header(line: &str) -> bool {
    line.contains("ts_start") && line.contains("ts_end")
}

/// Effective ring capacity for a requested record count.
pub fn resolve_capacity(max_items: usize) -> usize {
    match max_items {
        0 => DEFAULT_CAPACITY,
        n => n.min(MAX_CAPACITY),
    }
}

/// Loads the most recent records of a hunt record file.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogLoader;

impl CatalogLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load at most `max_items` of the newest records at `path`, oldest
    /// first. `0` selects [`DEFAULT_CAPACITY`].
    pub fn load(&self, path: &Path, max_items: usize) -> Result<Vec<CatalogEntry>, LoadError> {
        let reader = open_input(path)?;
        let entries = self
            .load_reader(reader, max_items)
            .map_err(|source| LoadError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(
            path = %path.display(),
            max_items,
            loaded = entries.len(),
            "loaded hunt catalog"
        );
        Ok(entries)
    }

    /// Load from any buffered reader.
    pub fn load_reader<R: BufRead>(
        &self,
        reader: R,
        max_items: usize,
    ) -> io::Result<Vec<CatalogEntry>> {
        let mut ring = BoundedRing::new(resolve_capacity(max_items));
        let mut evicted = 0u64;

        read_lines(reader, |line| {
            if is_catalog_header(line) {
                return;
            }
            if let Some(entry) = parse_entry(line) {
                if ring.push(entry).is_some() {
                    evicted += 1;
                }
            }
        })?;

        if evicted > 0 {
            debug!(evicted, capacity = ring.capacity(), "older records dropped");
        }
        Ok(ring.into_vec())
    }
}

/// Parse one record line. Each column is parsed on its own; a bad column
/// leaves that field at its zero value.
pub fn parse_entry(line: &str) -> Option<CatalogEntry> {
    let fields = split_fields(line, MAX_FIELDS);
    if fields.len() < MIN_FIELDS {
        return None;
    }
    let field = |i: usize| fields.get(i).copied().unwrap_or("");
    let decimal = |i: usize| parse_decimal(field(i)).unwrap_or(0.0);
    let count = |i: usize| parse_integer::<i32>(field(i)).unwrap_or(0);

    let offsets = match (parse_integer::<i64>(field(9)), parse_integer::<i64>(field(10))) {
        (Some(start), Some(end)) => Some(OffsetRange { start, end }),
        _ => None,
    };
    let tag = Some(field(11))
        .filter(|tag| !tag.is_empty())
        .map(|tag| truncate_bytes(tag, TAG_WIDTH).to_string());

    Some(CatalogEntry {
        ts_start: truncate_bytes(field(0), TIMESTAMP_WIDTH).to_string(),
        ts_end: truncate_bytes(field(1), TIMESTAMP_WIDTH).to_string(),
        label: truncate_bytes(field(2), LABEL_WIDTH).to_string(),
        kills: count(3),
        shots: count(4),
        loot: decimal(5),
        expense: decimal(6),
        net: decimal(7),
        return_pct: decimal(8),
        offsets,
        tag,
        schema: SchemaGeneration::from_field_count(fields.len()),
    })
}
