//! Hunt catalog records.
//!
//! The record file has grown columns over time; columns are only ever
//! appended, so a record's generation is visible from how many columns it
//! carries:
//!
//! ```text
//! v1: ts_start, ts_end, label, kills, shots, loot, expense, net, return_pct
//! v2: v1 + start_offset, end_offset
//! v3: v2 + tag
//! ```

use crate::text::{truncate_chars, DISPLAY_TIMESTAMP_WIDTH};

/// Column layout generation of a catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SchemaGeneration {
    #[default]
    V1,
    V2,
    V3,
}

impl SchemaGeneration {
    /// Generation implied by a column count.
    pub fn from_field_count(fields: usize) -> Self {
        if fields >= 12 {
            SchemaGeneration::V3
        } else if fields >= 11 {
            SchemaGeneration::V2
        } else {
            SchemaGeneration::V1
        }
    }
}

/// Byte range of the event log covered by a hunt.
///
/// Stored as written; the ingestion side uses negative values as markers,
/// so no ordering or sign is assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OffsetRange {
    pub start: i64,
    pub end: i64,
}

/// One historical hunt.
///
/// Mandatory fields that failed to parse are left at their zero value.
/// The offset range and the tag are independent of each other and of the
/// mandatory fields.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatalogEntry {
    pub ts_start: String,
    pub ts_end: String,
    pub label: String,
    pub kills: i32,
    pub shots: i32,
    pub loot: f64,
    pub expense: f64,
    pub net: f64,
    pub return_pct: f64,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub offsets: Option<OffsetRange>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub tag: Option<String>,
    pub schema: SchemaGeneration,
}

impl CatalogEntry {
    pub fn has_offsets(&self) -> bool {
        self.offsets.is_some()
    }

    pub fn has_tag(&self) -> bool {
        self.tag.is_some()
    }
}

/// Render a one-line picker label for a record.
///
/// Timestamps are cut to their first 16 characters (minute precision for
/// `YYYY-MM-DD HH:MM:SS`). The trailing segments depend on which optional
/// fields are present:
///
/// ```text
/// {start} -> {end} | {label} | {kills} kills | {loot} loot | @{so}-{eo} | #{tag}
/// {start} -> {end} | {label} | {kills} kills | {loot} loot | @{so}-{eo}
/// {start} -> {end} | {label} | {kills} kills | {loot} loot | no offsets | #{tag}
/// {start} -> {end} | {label} | {kills} kills | {loot} loot | no offsets
/// ```
pub fn format_label(entry: &CatalogEntry) -> String {
    let start = truncate_chars(&entry.ts_start, DISPLAY_TIMESTAMP_WIDTH);
    let end = truncate_chars(&entry.ts_end, DISPLAY_TIMESTAMP_WIDTH);
    let head = format!(
        "{} -> {} | {} | {} kills | {:.2} loot",
        start, end, entry.label, entry.kills, entry.loot
    );

    match (&entry.offsets, &entry.tag) {
        (Some(range), Some(tag)) => {
            format!("{} | @{}-{} | #{}", head, range.start, range.end, tag)
        }
        (Some(range), None) => format!("{} | @{}-{}", head, range.start, range.end),
        (None, Some(tag)) => format!("{} | no offsets | #{}", head, tag),
        (None, None) => format!("{} | no offsets", head),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CatalogEntry {
        CatalogEntry {
            ts_start: "2024-05-01 12:34:56".to_string(),
            ts_end: "2024-05-01 13:10:02".to_string(),
            label: "Opalo".to_string(),
            kills: 42,
            loot: 12.5,
            ..Default::default()
        }
    }

    #[test]
    fn label_without_optional_fields() {
        assert_eq!(
            format_label(&entry()),
            "2024-05-01 12:34 -> 2024-05-01 13:10 | Opalo | 42 kills | 12.50 loot | no offsets"
        );
    }

    #[test]
    fn label_with_offsets_only() {
        let e = CatalogEntry {
            offsets: Some(OffsetRange { start: 10, end: 900 }),
            ..entry()
        };
        assert!(format_label(&e).ends_with("| 12.50 loot | @10-900"));
    }

    #[test]
    fn label_with_tag_only() {
        let e = CatalogEntry {
            tag: Some("argo".to_string()),
            ..entry()
        };
        assert!(format_label(&e).ends_with("| no offsets | #argo"));
    }

    #[test]
    fn label_with_offsets_and_tag() {
        let e = CatalogEntry {
            offsets: Some(OffsetRange { start: 1, end: 2 }),
            tag: Some("argo".to_string()),
            ..entry()
        };
        assert!(format_label(&e).ends_with("| @1-2 | #argo"));
    }

    #[test]
    fn short_timestamps_are_not_padded() {
        let e = CatalogEntry {
            ts_start: "12:00".to_string(),
            ts_end: String::new(),
            ..entry()
        };
        assert!(format_label(&e).starts_with("12:00 ->  | Opalo"));
    }

    #[test]
    fn generation_from_field_count() {
        assert_eq!(SchemaGeneration::from_field_count(9), SchemaGeneration::V1);
        assert_eq!(SchemaGeneration::from_field_count(10), SchemaGeneration::V1);
        assert_eq!(SchemaGeneration::from_field_count(11), SchemaGeneration::V2);
        assert_eq!(SchemaGeneration::from_field_count(12), SchemaGeneration::V3);
        assert_eq!(SchemaGeneration::from_field_count(16), SchemaGeneration::V3);
    }
}
