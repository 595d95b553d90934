//! Ingestion health snapshots.

/// Number of error records retained, newest first.
pub const ERROR_RING_CAPACITY: usize = 10;

/// Length of the trailing rate window in seconds.
pub const RATE_WINDOW_SECS: u64 = 10;

/// Lag below this many milliseconds is healthy.
pub const LAG_WARN_MS: u64 = 1500;

/// Lag at or above this many milliseconds is a failure.
pub const LAG_FAIL_MS: u64 = 5000;

/// Severity of an error record or a derived health indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
#[repr(u8)]
pub enum Severity {
    #[default]
    Ok = 0,
    Warn = 1,
    Fail = 2,
}

impl Severity {
    /// Decode a stored discriminant. Unknown values map to `Fail`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Severity::Ok,
            1 => Severity::Warn,
            _ => Severity::Fail,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warn => "WARN",
            Severity::Fail => "FAIL",
        }
    }

    /// Classify ingestion lag.
    pub fn from_lag(lag_ms: u64) -> Self {
        if lag_ms < LAG_WARN_MS {
            Severity::Ok
        } else if lag_ms < LAG_FAIL_MS {
            Severity::Warn
        } else {
            Severity::Fail
        }
    }

    /// Classify the IO side of ingestion.
    ///
    /// Any IO error, or a nonzero secondary status code, is a failure.
    /// A rotated source is only a warning.
    pub fn from_io(io_errors: u64, last_code_b: u32, rotated: bool) -> Self {
        if io_errors > 0 || last_code_b != 0 {
            Severity::Fail
        } else if rotated {
            Severity::Warn
        } else {
            Severity::Ok
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.symbol())
    }
}

/// One entry of the recent-errors list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorEvent {
    pub severity: Severity,
    /// Unix timestamp in milliseconds.
    pub timestamp_ms: u64,
    pub code_a: u32,
    pub code_b: u32,
    /// At most [`MESSAGE_WIDTH`](crate::text::MESSAGE_WIDTH) bytes.
    pub message: String,
}

/// A coherent, point-in-time copy of ingestion telemetry.
///
/// Every raw field corresponds to a single instant of the writer; the
/// derived fields (`lag_ms`, `rate_x100`, severities) are computed from
/// those fields and the reader-supplied `now_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthSnapshot {
    /// Reader wall clock, Unix milliseconds.
    pub now_ms: u64,
    pub last_event_ms: u64,
    pub last_flush_ms: u64,

    /// Identifiers passed to the last session reset.
    pub source_id: u64,
    pub sink_id: u64,

    pub source_size: u64,
    pub source_position: u64,
    pub sink_size: u64,
    pub rotated: bool,

    pub events: u64,
    pub io_errors: u64,
    pub parse_errors: u64,
    pub last_code_a: u32,
    pub last_code_b: u32,

    /// Events per second over the trailing window, scaled by 100.
    pub rate_x100: u64,
    /// `now_ms - last_event_ms`, saturating at zero.
    pub lag_ms: u64,
    pub io_severity: Severity,
    pub lag_severity: Severity,

    /// Up to [`ERROR_RING_CAPACITY`] records, newest first.
    pub errors: Vec<ErrorEvent>,
}

impl HealthSnapshot {
    /// Events per second as a float, for display.
    pub fn rate_per_sec(&self) -> f64 {
        self.rate_x100 as f64 / 100.0
    }

    /// The worse of the IO and lag indicators.
    pub fn overall(&self) -> Severity {
        self.io_severity.max(self.lag_severity)
    }

    /// Bytes of the source not yet consumed.
    pub fn source_backlog(&self) -> u64 {
        self.source_size.saturating_sub(self.source_position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lag_thresholds() {
        assert_eq!(Severity::from_lag(0), Severity::Ok);
        assert_eq!(Severity::from_lag(1499), Severity::Ok);
        assert_eq!(Severity::from_lag(1500), Severity::Warn);
        assert_eq!(Severity::from_lag(4999), Severity::Warn);
        assert_eq!(Severity::from_lag(5000), Severity::Fail);
    }

    #[test]
    fn io_severity_precedence() {
        assert_eq!(Severity::from_io(0, 0, false), Severity::Ok);
        assert_eq!(Severity::from_io(0, 0, true), Severity::Warn);
        assert_eq!(Severity::from_io(1, 0, true), Severity::Fail);
        assert_eq!(Severity::from_io(0, 5, false), Severity::Fail);
    }

    #[test]
    fn severity_round_trips_through_u8() {
        for s in [Severity::Ok, Severity::Warn, Severity::Fail] {
            assert_eq!(Severity::from_u8(s.as_u8()), s);
        }
        assert_eq!(Severity::from_u8(200), Severity::Fail);
    }

    #[test]
    fn overall_is_worst_indicator() {
        let snapshot = HealthSnapshot {
            io_severity: Severity::Warn,
            lag_severity: Severity::Fail,
            ..Default::default()
        };
        assert_eq!(snapshot.overall(), Severity::Fail);
    }

    #[test]
    fn rate_per_sec_unscales() {
        let snapshot = HealthSnapshot {
            rate_x100: 250,
            ..Default::default()
        };
        assert!((snapshot.rate_per_sec() - 2.5).abs() < f64::EPSILON);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn severity_serializes_uppercase() {
        let json = serde_json::to_string(&Severity::Warn).unwrap();
        assert_eq!(json, "\"WARN\"");
    }
}
