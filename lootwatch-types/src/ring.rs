//! Fixed-capacity circular buffers.
//!
//! [`RingIndex`] holds the slot arithmetic on its own so that storage which
//! cannot live in a `Vec<T>` (the atomic error slots in `lootwatch-sdk`) can
//! share it with [`BoundedRing`].

/// Slot bookkeeping for a ring of fixed capacity.
///
/// `head` is the next physical slot to write; `len` is the number of live
/// entries, never more than `capacity`. The oldest live entry sits `len`
/// slots behind `head`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingIndex {
    capacity: usize,
    head: usize,
    len: usize,
}

impl RingIndex {
    /// Create an empty index. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            head: 0,
            len: 0,
        }
    }

    /// Rebuild an index from previously stored `head` and `len` values.
    ///
    /// Out-of-range values are clamped so the result is always usable.
    pub fn from_parts(capacity: usize, head: usize, len: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            head: head % capacity,
            len: len.min(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Claim the next physical slot, advancing the write index.
    ///
    /// When the ring is full the returned slot is the one holding the
    /// oldest entry.
    pub fn push(&mut self) -> usize {
        let slot = self.head;
        self.head = (self.head + 1) % self.capacity;
        if self.len < self.capacity {
            self.len += 1;
        }
        slot
    }

    /// Physical slot of the oldest live entry.
    pub fn oldest(&self) -> usize {
        (self.head + self.capacity - self.len) % self.capacity
    }

    /// Map a logical position (0 = oldest) to its physical slot.
    pub fn physical(&self, logical: usize) -> Option<usize> {
        (logical < self.len).then(|| (self.oldest() + logical) % self.capacity)
    }

    /// Physical slots from oldest to newest.
    pub fn oldest_first(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).map(move |i| (self.oldest() + i) % self.capacity)
    }

    /// Physical slots from newest to oldest.
    pub fn newest_first(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).map(move |i| (self.head + self.capacity - 1 - i) % self.capacity)
    }

    /// Forget every entry.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

/// A fixed-capacity buffer that overwrites its oldest entry on overflow.
///
/// Iteration and [`into_vec`](Self::into_vec) always follow insertion order,
/// independent of where entries physically sit.
#[derive(Debug, Clone)]
pub struct BoundedRing<T> {
    slots: Vec<T>,
    index: RingIndex,
}

impl<T> BoundedRing<T> {
    /// Create an empty ring. A capacity of zero is raised to one.
    ///
    /// Storage grows on demand up to `capacity`, so a large capacity over a
    /// short input does not allocate the full buffer.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            index: RingIndex::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.index.capacity()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.index.is_full()
    }

    /// Append a value, returning the entry it displaced if the ring was full.
    pub fn push(&mut self, value: T) -> Option<T> {
        let slot = self.index.push();
        if slot == self.slots.len() {
            self.slots.push(value);
            None
        } else {
            Some(std::mem::replace(&mut self.slots[slot], value))
        }
    }

    /// Entry at logical position `i` (0 = oldest).
    pub fn get(&self, i: usize) -> Option<&T> {
        self.index.physical(i).map(|slot| &self.slots[slot])
    }

    /// Most recently pushed entry.
    pub fn newest(&self) -> Option<&T> {
        self.index.newest_first().next().map(|slot| &self.slots[slot])
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.index.oldest_first().map(move |slot| &self.slots[slot])
    }

    /// Entries from newest to oldest.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &T> + '_ {
        self.index.newest_first().map(move |slot| &self.slots[slot])
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }

    /// Consume the ring, returning entries from oldest to newest.
    pub fn into_vec(self) -> Vec<T> {
        let oldest = self.index.oldest();
        let mut slots = self.slots;
        slots.rotate_left(oldest);
        slots
    }
}

impl<T> Extend<T> for BoundedRing<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}
