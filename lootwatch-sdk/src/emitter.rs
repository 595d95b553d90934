//! Periodic publishing of health snapshots.

use std::sync::Arc;
use std::time::Duration;

use lootwatch_types::{current_timestamp_ms, HealthSnapshot};

use crate::output::Output;
use crate::state::HealthState;

/// Publishes snapshots of a shared [`HealthState`] to configured outputs.
///
/// The emitter is a reader like any other: it never blocks the ingestion
/// writer.
///
/// # Example
///
/// ```rust,no_run
/// use lootwatch_sdk::{Emitter, Output};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let emitter = Emitter::builder()
///         .output(Output::file("health.json"))
///         .interval(Duration::from_secs(1))
///         .build();
///
///     // Hand the state to the ingestion side
///     let health = emitter.health();
///     health.reset(1, 1);
///
///     // Start background emission
///     let handle = emitter.start();
///
///     health.on_event(lootwatch_types::current_timestamp_ms());
///     tokio::time::sleep(Duration::from_secs(5)).await;
///     handle.stop();
/// }
/// ```
#[derive(Debug)]
pub struct Emitter {
    state: Arc<HealthState>,
    outputs: Arc<Vec<Output>>,
    interval: Duration,
}

impl Emitter {
    /// Create an emitter over a fresh state with no outputs and a 1 second
    /// interval.
    pub fn new() -> Self {
        Self {
            state: Arc::new(HealthState::new()),
            outputs: Arc::new(Vec::new()),
            interval: Duration::from_secs(1),
        }
    }

    /// Create a builder for configuring the emitter.
    pub fn builder() -> EmitterBuilder {
        EmitterBuilder::new()
    }

    /// The shared state this emitter reads.
    pub fn health(&self) -> Arc<HealthState> {
        Arc::clone(&self.state)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Take a snapshot against the current wall clock.
    pub fn collect(&self) -> HealthSnapshot {
        self.state.snapshot(current_timestamp_ms())
    }

    /// Start background emission of snapshots.
    ///
    /// This spawns a tokio task that periodically snapshots the state and
    /// emits to all configured outputs. Returns a handle that can be used to
    /// stop the emission.
    #[cfg(feature = "tokio")]
    pub fn start(&self) -> EmissionHandle {
        use tokio::sync::watch;

        let (stop_tx, stop_rx) = watch::channel(false);
        let state = Arc::clone(&self.state);
        let outputs = Arc::clone(&self.outputs);
        let interval = self.interval;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            let mut stop_rx = stop_rx;

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let snapshot = state.snapshot(current_timestamp_ms());
                        emit_all(&outputs, &snapshot).await;
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("health emission stopped");
        });

        EmissionHandle { stop_tx }
    }

    /// Emit a snapshot to all outputs immediately.
    #[cfg(feature = "tokio")]
    pub async fn emit_now(&self) {
        let snapshot = self.collect();
        emit_all(&self.outputs, &snapshot).await;
    }
}

#[cfg(feature = "tokio")]
async fn emit_all(outputs: &[Output], snapshot: &HealthSnapshot) {
    for output in outputs {
        if let Err(e) = output.emit(snapshot).await {
            tracing::warn!(?output, error = %e, "failed to emit health snapshot");
        }
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for configuring an [`Emitter`].
#[derive(Debug, Default)]
pub struct EmitterBuilder {
    state: Option<Arc<HealthState>>,
    outputs: Vec<Output>,
    interval: Option<Duration>,
}

impl EmitterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read from an existing state instead of creating one.
    pub fn state(mut self, state: Arc<HealthState>) -> Self {
        self.state = Some(state);
        self
    }

    /// Add an output destination.
    ///
    /// Multiple outputs can be added; snapshots will be emitted to all of them.
    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Set the emission interval.
    ///
    /// Defaults to 1 second if not specified.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn build(self) -> Emitter {
        Emitter {
            state: self.state.unwrap_or_default(),
            outputs: Arc::new(self.outputs),
            interval: self.interval.unwrap_or(Duration::from_secs(1)),
        }
    }
}

/// Handle for controlling background emission.
///
/// Call `stop()` to end emission. Dropping the handle also ends it, since
/// the task sees its stop channel close.
#[cfg(feature = "tokio")]
pub struct EmissionHandle {
    stop_tx: tokio::sync::watch::Sender<bool>,
}

#[cfg(feature = "tokio")]
impl EmissionHandle {
    /// Stop background emission.
    pub fn stop(self) {
        let _ = self.stop_tx.send(true);
    }
}
