//! Seqlock-published ingestion telemetry.
//!
//! One writer (the ingestion pipeline) mutates the telemetry; any number of
//! readers copy it out with [`HealthState::snapshot`]. A sequence counter
//! brackets every mutation:
//!
//! ```text
//! writer: seq = s+1 (odd) ─ fence(Release) ─ field stores ─ seq = s+2 (Release)
//! reader: s1 = seq (Acquire) ─ field loads ─ fence(Acquire) ─ s2 = seq
//!         retry unless s1 == s2 and s1 is even
//! ```
//!
//! Every field is an atomic, so a reader racing the writer never performs a
//! data race; it may copy a mixture of old and new values, but the counter
//! check throws such copies away before they are decoded.
//!
//! The counter protects readers from the writer, not writers from each
//! other. Mutations must not be issued from two threads at once.

use std::fmt;
use std::sync::atomic::{fence, AtomicBool, AtomicU32, AtomicU64, Ordering};

use lootwatch_types::text::{truncate_bytes, MESSAGE_WIDTH};
use lootwatch_types::{current_timestamp_ms, HealthSnapshot, Severity};

use crate::errors::{ErrorLog, RawErrors};
use crate::rate::{RateBuckets, RateWindow};

/// Message recorded when a flush fails.
pub const FLUSH_FAILED_MESSAGE: &str = "Flush failed";

/// Message recorded when the source reports a rotation.
pub const ROTATED_MESSAGE: &str = "Source rotated";

/// Spins before a blocked reader starts yielding its time slice.
const SPINS_BEFORE_YIELD: u32 = 64;

/// Process-wide ingestion telemetry.
///
/// Create one per process, share it behind an `Arc` with the ingestion side
/// and the UI side, and call [`reset`](Self::reset) at the start of every
/// ingestion session. None of the operations can fail.
///
/// # Example
///
/// ```rust
/// use lootwatch_sdk::HealthState;
/// use std::sync::Arc;
///
/// let health = Arc::new(HealthState::new());
/// health.reset(1, 2);
///
/// let writer = Arc::clone(&health);
/// std::thread::spawn(move || {
///     writer.on_event(1_700_000_000_000);
/// })
/// .join()
/// .unwrap();
///
/// let snapshot = health.snapshot(1_700_000_000_500);
/// assert_eq!(snapshot.events, 1);
/// assert_eq!(snapshot.lag_ms, 500);
/// ```
#[derive(Default)]
pub struct HealthState {
    seq: AtomicU64,

    source_id: AtomicU64,
    sink_id: AtomicU64,

    last_event_ms: AtomicU64,
    last_flush_ms: AtomicU64,

    source_size: AtomicU64,
    source_position: AtomicU64,
    sink_size: AtomicU64,
    rotated: AtomicBool,

    events: AtomicU64,
    io_errors: AtomicU64,
    parse_errors: AtomicU64,
    last_code_a: AtomicU32,
    last_code_b: AtomicU32,

    rate: RateWindow,
    errors: ErrorLog,
}

/// Everything a reader copies inside one read section.
#[derive(Debug, Clone, Copy)]
struct RawHealth {
    source_id: u64,
    sink_id: u64,
    last_event_ms: u64,
    last_flush_ms: u64,
    source_size: u64,
    source_position: u64,
    sink_size: u64,
    rotated: bool,
    events: u64,
    io_errors: u64,
    parse_errors: u64,
    last_code_a: u32,
    last_code_b: u32,
    rate: RateBuckets,
    errors: RawErrors,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `mutate` as one write section.
    fn write<F: FnOnce(&Self)>(&self, mutate: F) {
        let seq = self.seq.load(Ordering::Relaxed);
        self.seq.store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        mutate(self);

        self.seq.store(seq.wrapping_add(2), Ordering::Release);
    }

    fn increment(counter: &AtomicU64) {
        let value = counter.load(Ordering::Relaxed);
        counter.store(value.wrapping_add(1), Ordering::Relaxed);
    }

    /// Start a new ingestion session.
    ///
    /// Every counter, timestamp, bucket and error record goes back to its
    /// initial value. Readers never observe a half-reset state.
    pub fn reset(&self, source_id: u64, sink_id: u64) {
        self.write(|s| {
            s.source_id.store(source_id, Ordering::Relaxed);
            s.sink_id.store(sink_id, Ordering::Relaxed);
            s.last_event_ms.store(0, Ordering::Relaxed);
            s.last_flush_ms.store(0, Ordering::Relaxed);
            s.source_size.store(0, Ordering::Relaxed);
            s.source_position.store(0, Ordering::Relaxed);
            s.sink_size.store(0, Ordering::Relaxed);
            s.rotated.store(false, Ordering::Relaxed);
            s.events.store(0, Ordering::Relaxed);
            s.io_errors.store(0, Ordering::Relaxed);
            s.parse_errors.store(0, Ordering::Relaxed);
            s.last_code_a.store(0, Ordering::Relaxed);
            s.last_code_b.store(0, Ordering::Relaxed);
            s.rate.reset();
            s.errors.reset();
        });
    }

    /// Record that one log line was consumed at `timestamp_ms`.
    pub fn on_event(&self, timestamp_ms: u64) {
        self.write(|s| {
            Self::increment(&s.events);
            s.last_event_ms.store(timestamp_ms, Ordering::Relaxed);
            s.rate.record(timestamp_ms);
        });
    }

    /// Record the outcome of flushing the output file.
    ///
    /// Success clears the last error codes. Failure counts as an IO error and
    /// logs a FAIL record.
    pub fn on_flush(&self, timestamp_ms: u64, success: bool, code_a: u32, code_b: u32) {
        self.write(|s| {
            if success {
                s.last_flush_ms.store(timestamp_ms, Ordering::Relaxed);
                s.last_code_a.store(0, Ordering::Relaxed);
                s.last_code_b.store(0, Ordering::Relaxed);
            } else {
                Self::increment(&s.io_errors);
                s.last_code_a.store(code_a, Ordering::Relaxed);
                s.last_code_b.store(code_b, Ordering::Relaxed);
                s.errors.push(
                    Severity::Fail,
                    timestamp_ms,
                    code_a,
                    code_b,
                    FLUSH_FAILED_MESSAGE,
                );
            }
        });
    }

    /// Record an IO failure described by `context`.
    pub fn on_io_error(&self, context: &str, code_a: u32, code_b: u32) {
        let now = current_timestamp_ms();
        self.write(|s| {
            Self::increment(&s.io_errors);
            s.last_code_a.store(code_a, Ordering::Relaxed);
            s.last_code_b.store(code_b, Ordering::Relaxed);
            s.errors.push(Severity::Fail, now, code_a, code_b, context);
        });
    }

    /// Record a line that could not be interpreted.
    pub fn on_parse_error(&self, context: &str) {
        let now = current_timestamp_ms();
        let message = format!("Parse: {}", truncate_bytes(context, MESSAGE_WIDTH));
        self.write(|s| {
            Self::increment(&s.parse_errors);
            s.errors.push(Severity::Warn, now, 0, 0, &message);
        });
    }

    /// Update source/sink sizes and the read position.
    ///
    /// Every call with `rotated == true` sets the rotation flag and logs a
    /// WARN record, so a source that stays rotated across calls logs one
    /// record per call. `rotated == false` leaves the flag as it was.
    pub fn update_io(
        &self,
        timestamp_ms: u64,
        source_size: u64,
        source_position: u64,
        sink_size: u64,
        rotated: bool,
    ) {
        self.write(|s| {
            s.source_size.store(source_size, Ordering::Relaxed);
            s.source_position.store(source_position, Ordering::Relaxed);
            s.sink_size.store(sink_size, Ordering::Relaxed);
            if rotated {
                s.rotated.store(true, Ordering::Relaxed);
                s.errors.push(Severity::Warn, timestamp_ms, 0, 0, ROTATED_MESSAGE);
            }
        });
    }

    fn load_raw(&self) -> RawHealth {
        RawHealth {
            source_id: self.source_id.load(Ordering::Relaxed),
            sink_id: self.sink_id.load(Ordering::Relaxed),
            last_event_ms: self.last_event_ms.load(Ordering::Relaxed),
            last_flush_ms: self.last_flush_ms.load(Ordering::Relaxed),
            source_size: self.source_size.load(Ordering::Relaxed),
            source_position: self.source_position.load(Ordering::Relaxed),
            sink_size: self.sink_size.load(Ordering::Relaxed),
            rotated: self.rotated.load(Ordering::Relaxed),
            events: self.events.load(Ordering::Relaxed),
            io_errors: self.io_errors.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            last_code_a: self.last_code_a.load(Ordering::Relaxed),
            last_code_b: self.last_code_b.load(Ordering::Relaxed),
            rate: self.rate.load(),
            errors: self.errors.load(),
        }
    }

    /// One read attempt. `None` if a write was in progress or completed
    /// during the copy.
    fn read_once(&self) -> Option<RawHealth> {
        let before = self.seq.load(Ordering::Acquire);
        if before & 1 == 1 {
            return None;
        }

        let raw = self.load_raw();

        fence(Ordering::Acquire);
        let after = self.seq.load(Ordering::Relaxed);
        (before == after).then_some(raw)
    }

    /// Copy out a consistent snapshot, deriving lag, rate and severities
    /// against `now_ms`.
    ///
    /// Retries until a copy is taken without an intervening write. Never
    /// blocks the writer.
    pub fn snapshot(&self, now_ms: u64) -> HealthSnapshot {
        let mut attempts: u32 = 0;
        loop {
            if let Some(raw) = self.read_once() {
                return raw.derive(now_ms);
            }
            attempts = attempts.saturating_add(1);
            if attempts < SPINS_BEFORE_YIELD {
                std::hint::spin_loop();
            } else {
                std::thread::yield_now();
            }
        }
    }

    /// Like [`snapshot`](Self::snapshot), but gives up after `max_attempts`
    /// failed copies.
    pub fn try_snapshot(&self, now_ms: u64, max_attempts: u32) -> Option<HealthSnapshot> {
        for _ in 0..max_attempts {
            if let Some(raw) = self.read_once() {
                return Some(raw.derive(now_ms));
            }
            std::hint::spin_loop();
        }
        None
    }

    /// Current value of the sequence counter. Odd while a write is in
    /// progress.
    pub fn sequence(&self) -> u64 {
        self.seq.load(Ordering::Acquire)
    }
}

impl RawHealth {
    fn derive(self, now_ms: u64) -> HealthSnapshot {
        let lag_ms = now_ms.saturating_sub(self.last_event_ms);
        HealthSnapshot {
            now_ms,
            last_event_ms: self.last_event_ms,
            last_flush_ms: self.last_flush_ms,
            source_id: self.source_id,
            sink_id: self.sink_id,
            source_size: self.source_size,
            source_position: self.source_position,
            sink_size: self.sink_size,
            rotated: self.rotated,
            events: self.events,
            io_errors: self.io_errors,
            parse_errors: self.parse_errors,
            last_code_a: self.last_code_a,
            last_code_b: self.last_code_b,
            rate_x100: self.rate.rate_x100(now_ms),
            lag_ms,
            io_severity: Severity::from_io(self.io_errors, self.last_code_b, self.rotated),
            lag_severity: Severity::from_lag(lag_ms),
            errors: self.errors.to_events(),
        }
    }
}

impl fmt::Debug for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthState")
            .field("seq", &self.sequence())
            .field("events", &self.events.load(Ordering::Relaxed))
            .field("io_errors", &self.io_errors.load(Ordering::Relaxed))
            .field("parse_errors", &self.parse_errors.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lootwatch_types::ERROR_RING_CAPACITY;

    const T: u64 = 1_700_000_000_000;

    fn fresh() -> HealthState {
        let state = HealthState::new();
        state.reset(7, 9);
        state
    }

    #[test]
    fn reset_records_ids_and_zeroes_counters() {
        let state = fresh();
        state.on_event(T);
        state.on_io_error("open failed", 2, 3);
        state.update_io(T, 100, 50, 10, true);

        state.reset(11, 12);
        let snapshot = state.snapshot(T);
        assert_eq!(snapshot.source_id, 11);
        assert_eq!(snapshot.sink_id, 12);
        assert_eq!(snapshot.events, 0);
        assert_eq!(snapshot.io_errors, 0);
        assert_eq!(snapshot.source_size, 0);
        assert!(!snapshot.rotated);
        assert_eq!(snapshot.rate_x100, 0);
        assert!(snapshot.errors.is_empty());
        assert_eq!(snapshot.io_severity, Severity::Ok);
    }

    #[test]
    fn sequence_is_even_between_writes() {
        let state = fresh();
        let before = state.sequence();
        assert_eq!(before % 2, 0);
        state.on_event(T);
        assert_eq!(state.sequence(), before + 2);
    }

    #[test]
    fn on_event_updates_lag_and_rate() {
        let state = fresh();
        state.on_event(T);
        state.on_event(T + 400);

        let snapshot = state.snapshot(T + 1000);
        assert_eq!(snapshot.events, 2);
        assert_eq!(snapshot.last_event_ms, T + 400);
        assert_eq!(snapshot.lag_ms, 600);
        assert_eq!(snapshot.lag_severity, Severity::Ok);
        assert_eq!(snapshot.rate_x100, 20);
    }

    #[test]
    fn lag_severity_tracks_thresholds() {
        let state = fresh();
        state.on_event(T);
        assert_eq!(state.snapshot(T + 1499).lag_severity, Severity::Ok);
        assert_eq!(state.snapshot(T + 1500).lag_severity, Severity::Warn);
        assert_eq!(state.snapshot(T + 5000).lag_severity, Severity::Fail);
    }

    #[test]
    fn lag_saturates_when_reader_clock_is_behind() {
        let state = fresh();
        state.on_event(T + 10);
        assert_eq!(state.snapshot(T).lag_ms, 0);
    }

    #[test]
    fn successful_flush_clears_codes() {
        let state = fresh();
        state.on_flush(T, false, 4, 5);
        state.on_flush(T + 10, true, 0, 0);

        let snapshot = state.snapshot(T + 10);
        assert_eq!(snapshot.last_flush_ms, T + 10);
        assert_eq!(snapshot.last_code_a, 0);
        assert_eq!(snapshot.last_code_b, 0);
        // the earlier failure still counts
        assert_eq!(snapshot.io_errors, 1);
        assert_eq!(snapshot.io_severity, Severity::Fail);
    }

    #[test]
    fn failed_flush_logs_fail_record() {
        let state = fresh();
        state.on_flush(T, false, 4, 5);

        let snapshot = state.snapshot(T);
        assert_eq!(snapshot.io_errors, 1);
        assert_eq!((snapshot.last_code_a, snapshot.last_code_b), (4, 5));
        assert_eq!(snapshot.last_flush_ms, 0);
        let event = &snapshot.errors[0];
        assert_eq!(event.severity, Severity::Fail);
        assert_eq!(event.message, FLUSH_FAILED_MESSAGE);
        assert_eq!(event.timestamp_ms, T);
    }

    #[test]
    fn io_error_uses_context_as_message() {
        let state = fresh();
        state.on_io_error("read chat.log", 13, 0);

        let snapshot = state.snapshot(T);
        assert_eq!(snapshot.io_errors, 1);
        assert_eq!(snapshot.errors[0].message, "read chat.log");
        assert_eq!(snapshot.errors[0].severity, Severity::Fail);
        assert_eq!(snapshot.io_severity, Severity::Fail);
    }

    #[test]
    fn io_error_context_is_truncated() {
        let state = fresh();
        state.on_io_error(&"x".repeat(300), 0, 0);
        assert_eq!(state.snapshot(T).errors[0].message.len(), MESSAGE_WIDTH);
    }

    #[test]
    fn parse_error_is_a_warning_with_prefix() {
        let state = fresh();
        state.on_parse_error("bad line");

        let snapshot = state.snapshot(T);
        assert_eq!(snapshot.parse_errors, 1);
        assert_eq!(snapshot.io_errors, 0);
        assert_eq!(snapshot.errors[0].message, "Parse: bad line");
        assert_eq!(snapshot.errors[0].severity, Severity::Warn);
        assert_eq!(snapshot.io_severity, Severity::Ok);
    }

    #[test]
    fn reset_clears_failure_severity() {
        let state = fresh();
        state.on_flush(T, false, 0, 8);
        assert_eq!(state.snapshot(T).io_severity, Severity::Fail);

        state.reset(1, 1);
        assert_eq!(state.snapshot(T).io_severity, Severity::Ok);
    }

    #[test]
    fn update_io_records_sizes() {
        let state = fresh();
        state.update_io(T, 1000, 400, 200, false);

        let snapshot = state.snapshot(T);
        assert_eq!(snapshot.source_size, 1000);
        assert_eq!(snapshot.source_position, 400);
        assert_eq!(snapshot.sink_size, 200);
        assert_eq!(snapshot.source_backlog(), 600);
        assert!(!snapshot.rotated);
        assert!(snapshot.errors.is_empty());
    }

    #[test]
    fn rotation_warns_on_every_rotated_call() {
        let state = fresh();
        state.update_io(T, 10, 0, 0, true);
        state.update_io(T + 1, 20, 10, 0, true);
        state.update_io(T + 2, 30, 20, 0, false);

        let snapshot = state.snapshot(T + 2);
        assert!(snapshot.rotated);
        assert_eq!(snapshot.io_severity, Severity::Warn);
        assert_eq!(snapshot.errors.len(), 2);
        assert!(snapshot
            .errors
            .iter()
            .all(|e| e.severity == Severity::Warn && e.message == ROTATED_MESSAGE));
    }

    #[test]
    fn fifteen_errors_keep_newest_ten() {
        let state = fresh();
        for i in 0..15 {
            state.on_parse_error(&format!("line {i}"));
        }

        let snapshot = state.snapshot(T);
        assert_eq!(snapshot.parse_errors, 15);
        assert_eq!(snapshot.errors.len(), ERROR_RING_CAPACITY);
        assert_eq!(snapshot.errors[0].message, "Parse: line 14");
        assert_eq!(snapshot.errors[9].message, "Parse: line 5");
    }

    #[test]
    fn try_snapshot_succeeds_without_writer() {
        let state = fresh();
        state.on_event(T);
        let snapshot = state.try_snapshot(T, 1).unwrap();
        assert_eq!(snapshot.events, 1);
    }

    #[test]
    fn try_snapshot_with_zero_attempts_gives_up() {
        let state = fresh();
        assert!(state.try_snapshot(T, 0).is_none());
    }

    #[test]
    fn never_reset_state_is_usable() {
        let state = HealthState::new();
        let snapshot = state.snapshot(T);
        assert_eq!(snapshot.events, 0);
        assert_eq!(snapshot.lag_severity, Severity::Fail);
    }
}
