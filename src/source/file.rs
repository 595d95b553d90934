//! Polls a health snapshot file written by the emitter.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use lootwatch_types::HealthSnapshot;

/// Reads [`HealthSnapshot`]s from a JSON file that another process
/// overwrites periodically.
///
/// The file's modification time is tracked, so a poll only yields a
/// snapshot when the file has been rewritten since the last one.
#[derive(Debug)]
pub struct SnapshotFile {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
}

impl SnapshotFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            last_modified: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Human-readable description of the source.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Error from the last poll, if it failed.
    pub fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns the snapshot if the file changed since the last successful
    /// read.
    pub fn poll(&mut self) -> Option<HealthSnapshot> {
        let current = self.modified_time();

        let changed = match (&self.last_modified, &current) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(last), Some(current)) => current > last,
        };
        if !changed {
            return None;
        }

        let snapshot = self.read_file()?;
        self.last_modified = current;
        Some(snapshot)
    }

    fn modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&mut self) -> Option<HealthSnapshot> {
        let result = fs::read_to_string(&self.path)
            .map_err(|e| format!("Read error: {}", e))
            .and_then(|content| {
                serde_json::from_str(&content).map_err(|e| format!("Parse error: {}", e))
            });

        match result {
            Ok(snapshot) => {
                self.last_error = None;
                Some(snapshot)
            }
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "snapshot poll failed");
                self.last_error = Some(e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_snapshot(file: &mut NamedTempFile, snapshot: &HealthSnapshot) {
        let json = serde_json::to_string(snapshot).unwrap();
        file.as_file_mut().set_len(0).unwrap();
        std::io::Seek::rewind(file).unwrap();
        writeln!(file, "{}", json).unwrap();
        file.flush().unwrap();
    }

    #[test]
    fn new_source_has_no_error() {
        let source = SnapshotFile::new("/tmp/health.json");
        assert_eq!(source.path(), Path::new("/tmp/health.json"));
        assert_eq!(source.description(), "file: /tmp/health.json");
        assert!(source.error().is_none());
    }

    #[test]
    fn first_poll_reads_then_waits_for_change() {
        let mut file = NamedTempFile::new().unwrap();
        let snapshot = HealthSnapshot {
            events: 7,
            lag_ms: 20,
            ..Default::default()
        };
        write_snapshot(&mut file, &snapshot);

        let mut source = SnapshotFile::new(file.path());
        assert_eq!(source.poll(), Some(snapshot));
        assert!(source.poll().is_none());
    }

    #[test]
    fn missing_file_reports_read_error() {
        let mut source = SnapshotFile::new("/nonexistent/path/health.json");
        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Read error"));
    }

    #[test]
    fn invalid_json_reports_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut source = SnapshotFile::new(file.path());
        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Parse error"));
    }

    #[test]
    fn recovers_after_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{").unwrap();
        let mut source = SnapshotFile::new(file.path());
        assert!(source.poll().is_none());

        write_snapshot(&mut file, &HealthSnapshot::default());
        assert!(source.poll().is_some());
        assert!(source.error().is_none());
    }
}
