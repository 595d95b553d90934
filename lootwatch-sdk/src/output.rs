//! Output backends for emitting health snapshots.

use std::path::PathBuf;

use lootwatch_types::HealthSnapshot;

/// Output destination for snapshots.
///
/// Configure where the emitter should publish snapshots.
#[derive(Debug)]
pub enum Output {
    /// Write snapshots to a JSON file.
    ///
    /// Each snapshot is written to a sibling `.tmp` file and renamed over
    /// the target, so readers see either the old or the new snapshot.
    File(PathBuf),

    /// Send snapshots through a channel.
    ///
    /// Use `Output::channel()` to create this variant and get the receiver.
    #[cfg(feature = "tokio")]
    Channel(tokio::sync::mpsc::Sender<HealthSnapshot>),
}

impl Output {
    /// Create a file output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lootwatch_sdk::Output;
    ///
    /// let output = Output::file("health.json");
    /// ```
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Output::File(path.into())
    }

    /// Create a channel output and return both the output and receiver.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lootwatch_sdk::Output;
    ///
    /// let (output, mut rx) = Output::channel(16);
    ///
    /// // Later, receive snapshots
    /// // while let Some(snapshot) = rx.recv().await {
    /// //     println!("lag {} ms", snapshot.lag_ms);
    /// // }
    /// ```
    #[cfg(feature = "tokio")]
    pub fn channel(buffer: usize) -> (Self, tokio::sync::mpsc::Receiver<HealthSnapshot>) {
        let (tx, rx) = tokio::sync::mpsc::channel(buffer);
        (Output::Channel(tx), rx)
    }

    /// Emit a snapshot to this output.
    #[cfg(feature = "tokio")]
    pub(crate) async fn emit(&self, snapshot: &HealthSnapshot) -> std::io::Result<()> {
        match self {
            Output::File(path) => {
                let json = serde_json::to_string_pretty(snapshot)?;
                let tmp = temp_path(path);
                tokio::fs::write(&tmp, json).await?;
                if let Err(e) = tokio::fs::rename(&tmp, path).await {
                    let _ = tokio::fs::remove_file(&tmp).await;
                    return Err(e);
                }
            }
            Output::Channel(tx) => {
                // Best effort send (don't block if channel is full)
                let _ = tx.try_send(snapshot.clone());
            }
        }
        Ok(())
    }
}

/// `health.json` -> `health.json.tmp`, in the same directory so the rename
/// stays on one filesystem.
#[cfg(feature = "tokio")]
fn temp_path(path: &std::path::Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(all(test, feature = "tokio"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_output_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("health.json");
        let output = Output::file(&path);

        let snapshot = HealthSnapshot {
            events: 12,
            ..Default::default()
        };
        output.emit(&snapshot).await.unwrap();

        let written: HealthSnapshot =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.events, 12);
    }

    #[tokio::test]
    async fn file_output_replaces_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("health.json");
        let output = Output::file(&path);

        let long = HealthSnapshot {
            errors: vec![Default::default(); 10],
            ..Default::default()
        };
        output.emit(&long).await.unwrap();
        let short = HealthSnapshot {
            events: 3,
            ..Default::default()
        };
        output.emit(&short).await.unwrap();

        let written: HealthSnapshot =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, short);

        // only the target is left behind
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("health.json")]);
    }

    #[test]
    fn temp_path_is_a_sibling() {
        assert_eq!(
            temp_path(std::path::Path::new("/var/run/health.json")),
            PathBuf::from("/var/run/health.json.tmp")
        );
    }

    #[tokio::test]
    async fn channel_output_drops_when_full() {
        let (output, mut rx) = Output::channel(1);
        let snapshot = HealthSnapshot::default();

        output.emit(&snapshot).await.unwrap();
        output.emit(&snapshot).await.unwrap();

        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn file_output_reports_unwritable_path() {
        let output = Output::file("/nonexistent/dir/health.json");
        assert!(output.emit(&HealthSnapshot::default()).await.is_err());
    }
}
