use std::collections::BTreeMap;

use bytes::BytesMut;

/// Size-classed storage for pooled buffers.
///
/// Buffers are keyed by exact capacity in an ordered map so a take can
/// find the smallest class that satisfies the request. Within a class,
/// reuse is LIFO: the most recently returned buffer is handed out first
/// for cache locality.
///
/// The aggregate byte counter lives here, next to the classes it
/// describes, and is updated in the same critical section as every
/// insert and removal.
pub struct SizeClassStore {
    classes: BTreeMap<usize, Vec<BytesMut>>,
    pooled_bytes: usize,
    pooled_buffers: usize,
}

impl SizeClassStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            classes: BTreeMap::new(),
            pooled_bytes: 0,
            pooled_buffers: 0,
        }
    }

    /// Total bytes currently retained.
    #[inline]
    pub fn pooled_bytes(&self) -> usize {
        self.pooled_bytes
    }

    /// Number of buffers currently retained.
    #[inline]
    pub fn pooled_buffers(&self) -> usize {
        self.pooled_buffers
    }

    /// Remove and return a buffer with capacity >= `size`, if any.
    ///
    /// Picks the smallest sufficient class, then the most recently
    /// inserted buffer within it. Empty classes are pruned so the map
    /// only holds keys with live buffers.
    pub fn remove(&mut self, size: usize) -> Option<BytesMut> {
        let (&class, bufs) = self.classes.range_mut(size..).next()?;
        let buf = bufs.pop()?;
        if bufs.is_empty() {
            self.classes.remove(&class);
        }

        self.pooled_bytes -= buf.capacity();
        self.pooled_buffers -= 1;
        Some(buf)
    }

    /// Insert a buffer under its capacity class.
    ///
    /// The caller has already applied the quota policy; this only does
    /// the bookkeeping.
    pub fn insert(&mut self, buf: BytesMut) {
        let capacity = buf.capacity();
        self.pooled_bytes += capacity;
        self.pooled_buffers += 1;
        self.classes.entry(capacity).or_default().push(buf);
    }

    /// Drop every pooled buffer and reset the aggregate counters.
    ///
    /// Returns (buffers, bytes) dropped.
    pub fn clear(&mut self) -> (usize, usize) {
        let dropped = (self.pooled_buffers, self.pooled_bytes);
        self.classes.clear();
        self.pooled_bytes = 0;
        self.pooled_buffers = 0;
        dropped
    }
}

impl Default for SizeClassStore {
    fn default() -> Self {
        Self::new()
    }
}
