//! Bounded scans over the CSV files the ingestion side appends to.
//!
//! ## Submodules
//!
//! - [`csv`]: line tokenizer and locale-tolerant number parsing
//! - [`aggregate`]: ranked per-category rollups of the event log ([`TopKAggregator`])
//! - [`catalog`]: newest-N recovery of the hunt record file ([`CatalogLoader`])
//!
//! ## Data Flow
//!
//! ```text
//! events.csv ──▶ TopKAggregator::compute() ──▶ EventSummary (top 10 per category)
//!
//! hunts.csv  ──▶ CatalogLoader::load() ──▶ BoundedRing<CatalogEntry> ──▶ Vec (oldest first)
//!                                                                      └──▶ format_label()
//! ```
//!
//! Both scans are synchronous and own their working memory for the
//! duration of the call only.

pub mod aggregate;
pub mod catalog;
pub mod csv;

pub use aggregate::TopKAggregator;
pub use catalog::CatalogLoader;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::LoadError;

/// Open `path` for buffered reading.
pub(crate) fn open_input(path: &Path) -> Result<BufReader<File>, LoadError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Feed every line of `reader` to `f`, without its line terminator.
///
/// Invalid UTF-8 is replaced rather than rejected; the file is appended to
/// by another process and a partially written trailing line is possible.
pub(crate) fn read_lines<R: BufRead, F: FnMut(&str)>(mut reader: R, mut f: F) -> io::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        f(line.trim_end_matches(['\r', '\n']));
    }
}
