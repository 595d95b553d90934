//! Fixed-size ring of recent error records stored in atomics.

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, AtomicUsize, Ordering};

use lootwatch_types::text::{truncate_bytes, MESSAGE_WIDTH};
use lootwatch_types::{ErrorEvent, RingIndex, Severity, ERROR_RING_CAPACITY};

/// Number of 8-byte words needed to hold a message.
const MESSAGE_WORDS: usize = MESSAGE_WIDTH.div_ceil(8);

#[derive(Debug, Default)]
struct ErrorSlot {
    severity: AtomicU8,
    timestamp_ms: AtomicU64,
    code_a: AtomicU32,
    code_b: AtomicU32,
    message_len: AtomicUsize,
    message: [AtomicU64; MESSAGE_WORDS],
}

/// Plain copy of one slot. The message is still packed so that a torn copy
/// is never decoded.
#[derive(Debug, Clone, Copy, Default)]
struct RawError {
    severity: u8,
    timestamp_ms: u64,
    code_a: u32,
    code_b: u32,
    message_len: usize,
    message: [u64; MESSAGE_WORDS],
}

/// Plain copy of an [`ErrorLog`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RawErrors {
    slots: [RawError; ERROR_RING_CAPACITY],
    head: usize,
    len: usize,
}

/// The ten most recent error records.
///
/// Slot placement follows [`RingIndex`]; `head` and `len` are kept in
/// atomics next to the slots. All stores are relaxed, so callers must wrap
/// writes and reads in the health sequence lock.
#[derive(Debug, Default)]
pub struct ErrorLog {
    slots: [ErrorSlot; ERROR_RING_CAPACITY],
    head: AtomicUsize,
    len: AtomicUsize,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(&self) -> RingIndex {
        RingIndex::from_parts(
            ERROR_RING_CAPACITY,
            self.head.load(Ordering::Relaxed),
            self.len.load(Ordering::Relaxed),
        )
    }

    /// Append a record, overwriting the oldest once full. The message is cut
    /// to [`MESSAGE_WIDTH`] bytes.
    pub fn push(
        &self,
        severity: Severity,
        timestamp_ms: u64,
        code_a: u32,
        code_b: u32,
        message: &str,
    ) {
        let mut index = self.index();
        let slot = &self.slots[index.push()];

        slot.severity.store(severity.as_u8(), Ordering::Relaxed);
        slot.timestamp_ms.store(timestamp_ms, Ordering::Relaxed);
        slot.code_a.store(code_a, Ordering::Relaxed);
        slot.code_b.store(code_b, Ordering::Relaxed);

        let bytes = truncate_bytes(message, MESSAGE_WIDTH).as_bytes();
        for (word, chunk) in slot.message.iter().zip(bytes.chunks(8)) {
            let mut buf = [0u8; 8];
            buf[..chunk.len()].copy_from_slice(chunk);
            word.store(u64::from_le_bytes(buf), Ordering::Relaxed);
        }
        slot.message_len.store(bytes.len(), Ordering::Relaxed);

        self.head.store(index.head(), Ordering::Relaxed);
        self.len.store(index.len(), Ordering::Relaxed);
    }

    pub fn reset(&self) {
        for slot in &self.slots {
            slot.severity.store(0, Ordering::Relaxed);
            slot.timestamp_ms.store(0, Ordering::Relaxed);
            slot.code_a.store(0, Ordering::Relaxed);
            slot.code_b.store(0, Ordering::Relaxed);
            slot.message_len.store(0, Ordering::Relaxed);
            for word in &slot.message {
                word.store(0, Ordering::Relaxed);
            }
        }
        self.head.store(0, Ordering::Relaxed);
        self.len.store(0, Ordering::Relaxed);
    }

    /// Copy every slot with relaxed loads.
    pub fn load(&self) -> RawErrors {
        let mut raw = RawErrors {
            head: self.head.load(Ordering::Relaxed),
            len: self.len.load(Ordering::Relaxed),
            ..Default::default()
        };
        for (copy, slot) in raw.slots.iter_mut().zip(self.slots.iter()) {
            copy.severity = slot.severity.load(Ordering::Relaxed);
            copy.timestamp_ms = slot.timestamp_ms.load(Ordering::Relaxed);
            copy.code_a = slot.code_a.load(Ordering::Relaxed);
            copy.code_b = slot.code_b.load(Ordering::Relaxed);
            copy.message_len = slot.message_len.load(Ordering::Relaxed);
            for (w, word) in copy.message.iter_mut().zip(slot.message.iter()) {
                *w = word.load(Ordering::Relaxed);
            }
        }
        raw
    }
}

impl RawErrors {
    /// Decode the records, newest first.
    pub fn to_events(&self) -> Vec<ErrorEvent> {
        let index = RingIndex::from_parts(ERROR_RING_CAPACITY, self.head, self.len);
        index
            .newest_first()
            .map(|slot| self.slots[slot].to_event())
            .collect()
    }
}

impl RawError {
    fn to_event(&self) -> ErrorEvent {
        let mut bytes = Vec::with_capacity(MESSAGE_WORDS * 8);
        for word in &self.message {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        bytes.truncate(self.message_len.min(MESSAGE_WIDTH));

        ErrorEvent {
            severity: Severity::from_u8(self.severity),
            timestamp_ms: self.timestamp_ms,
            code_a: self.code_a,
            code_b: self.code_b,
            message: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
