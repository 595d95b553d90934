//! Error types for loading CSV inputs.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while scanning an input file.
///
/// Malformed rows are never errors; they are skipped and only show up as
/// lower counts.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading failed part way through the input.
    #[error("read failed on {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::Open { path, .. } | LoadError::Read { path, .. } => path,
        }
    }
}
