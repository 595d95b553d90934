//! Bounded top-K rollup of the event log.
//!
//! The event log has six positional columns:
//!
//! ```text
//! ts, type, name, (unused), value, (unused)
//! ```
//!
//! Rows are classified by their type into mob / craft / rare, grouped by
//! name, and each category's groups are ranked by summed value.

use std::collections::HashMap;
use std::io::{self, BufRead};
use std::path::Path;

use lootwatch_types::text::{truncate_bytes, KEY_WIDTH};
use lootwatch_types::{AggregationKey, Category, EventSummary, TOP_K, UNKNOWN_KEY};
use tracing::debug;

use super::csv::{parse_decimal, split_exact};
use super::{open_input, read_lines};
use crate::error::LoadError;

/// Number of positional columns in an event row.
pub const EVENT_FIELDS: usize = 6;

/// Distinct keys tracked per category before new keys stop being added.
pub const DEFAULT_MAX_KEYS: usize = 4096;

const TYPE_FIELD: usize = 1;
const NAME_FIELD: usize = 2;
const VALUE_FIELD: usize = 4;

/// Returns true if `line` is the event log header.
pub fn is_event_header(line: &str) -> bool {
    line.contains("timestamp") && (line.contains("event_type") || line.contains(",type,"))
}

/// Scans an event log into per-category totals and a ranked top list.
///
/// # Example
///
/// ```
/// use lootwatch::data::TopKAggregator;
/// use lootwatch_types::Category;
///
/// let log = "\
/// timestamp,event_type,name,extra,value,extra
/// 1,X_MOB,rat,,1.0,
/// 2,X_MOB,rat,,2.0,
/// 3,X_MOB,wolf,,5.0,
/// ";
/// let summary = TopKAggregator::new().summarize(log.as_bytes(), 0).unwrap();
///
/// let mob = summary.category(Category::Mob);
/// assert_eq!(mob.top[0].name, "wolf");
/// assert_eq!(mob.top[1].name, "rat");
/// assert_eq!(mob.top[1].count, 2);
/// ```
#[derive(Debug, Clone)]
pub struct TopKAggregator {
    top_k: usize,
    max_keys: usize,
}

impl Default for TopKAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl TopKAggregator {
    pub fn new() -> Self {
        Self {
            top_k: TOP_K,
            max_keys: DEFAULT_MAX_KEYS,
        }
    }

    /// Override the number of distinct keys tracked per category.
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys.max(self.top_k);
        self
    }

    /// Aggregate the event log at `path`, skipping the first `start_line`
    /// data lines.
    pub fn compute(&self, path: &Path, start_line: u64) -> Result<EventSummary, LoadError> {
        let reader = open_input(path)?;
        let summary = self
            .summarize(reader, start_line)
            .map_err(|source| LoadError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(
            path = %path.display(),
            start_line,
            lines_read = summary.lines_read,
            dropped = summary.rows_dropped,
            ignored = summary.rows_ignored,
            "aggregated event log"
        );
        Ok(summary)
    }

    /// Aggregate from any buffered reader.
    pub fn summarize<R: BufRead>(&self, reader: R, start_line: u64) -> io::Result<EventSummary> {
        let mut summary = EventSummary::default();
        let mut tables: [KeyTable; 3] = Default::default();
        let mut first = true;
        let mut index: u64 = 0;

        read_lines(reader, |line| {
            if std::mem::take(&mut first) && is_event_header(line) {
                return;
            }

            let cursor = index;
            index += 1;
            if cursor < start_line {
                return;
            }
            summary.lines_read += 1;

            let fields = split_exact(line, EVENT_FIELDS);
            let Some(value) = parse_decimal(fields[VALUE_FIELD]) else {
                summary.rows_dropped += 1;
                return;
            };
            let Some(category) = Category::classify(fields[TYPE_FIELD]) else {
                summary.rows_ignored += 1;
                return;
            };

            let bucket = summary.category_mut(category);
            bucket.count += 1;
            bucket.sum += value;

            tables[slot(category)].upsert(fields[NAME_FIELD], value, self.max_keys);
        })?;

        for category in Category::ALL {
            let table = std::mem::take(&mut tables[slot(category)]);
            summary.category_mut(category).top = table.into_ranked(self.top_k);
        }

        Ok(summary)
    }
}

fn slot(category: Category) -> usize {
    match category {
        Category::Mob => 0,
        Category::Craft => 1,
        Category::Rare => 2,
    }
}

/// Per-category working table, discarded once ranked.
#[derive(Debug, Default)]
struct KeyTable {
    keys: HashMap<String, AggregationKey>,
    overflowed: u64,
}

impl KeyTable {
    fn upsert(&mut self, name: &str, value: f64, max_keys: usize) {
        let name = if name.is_empty() {
            UNKNOWN_KEY
        } else {
            truncate_bytes(name, KEY_WIDTH)
        };

        if let Some(key) = self.keys.get_mut(name) {
            key.add(value);
        } else if self.keys.len() < max_keys {
            let mut key = AggregationKey::new(name);
            key.add(value);
            self.keys.insert(name.to_string(), key);
        } else {
            self.overflowed += 1;
        }
    }

    fn into_ranked(self, top_k: usize) -> Vec<AggregationKey> {
        if self.overflowed > 0 {
            debug!(rows = self.overflowed, "key table full; rows kept in totals only");
        }
        let mut keys: Vec<AggregationKey> = self.keys.into_values().collect();
        keys.sort_by(AggregationKey::rank_cmp);
        keys.truncate(top_k);
        keys
    }
}
