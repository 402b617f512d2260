use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::buffer::PoolBuffer;
use crate::config::PoolConfig;
use crate::pool::store::SizeClassStore;

/// Relaxed ordering for stat counters (eventual visibility is fine for
/// monitoring).
const RELAXED: Ordering = Ordering::Relaxed;

/// The pooling policy layer.
///
/// Decides on take whether a request is served from the store or from a
/// fresh allocation, and on return whether a buffer is retained or
/// discarded. Arguments are trusted here: validation happens at the
/// [`BufferPool`](crate::pool::BufferPool) boundary, and no engine
/// operation can fail.
///
/// The store and its aggregate counter sit behind a single mutex, so
/// the retained-bytes cap holds under concurrent take/return/clear.
/// Stat counters are relaxed atomics outside the lock; they are
/// monitoring data, not part of the quota accounting.
pub struct PoolEngine {
    config: PoolConfig,
    store: Mutex<SizeClassStore>,

    /// Takes served from the store.
    hits: AtomicU64,
    /// Takes served by fresh allocation.
    misses: AtomicU64,
    /// Returns retained in the store.
    returns: AtomicU64,
    /// Returns discarded (oversized or quota exceeded).
    discards: AtomicU64,
}

impl PoolEngine {
    /// Create an engine with the given limits.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            store: Mutex::new(SizeClassStore::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            returns: AtomicU64::new(0),
            discards: AtomicU64::new(0),
        }
    }

    /// The limits this engine enforces.
    #[inline]
    pub fn config(&self) -> PoolConfig {
        self.config
    }

    /// Take a buffer with capacity >= `size`.
    ///
    /// Serves from the smallest sufficient size class when possible,
    /// otherwise allocates exactly `size` bytes. Either way the buffer
    /// comes out empty.
    pub fn take(&self, size: usize) -> PoolBuffer {
        let pooled = self.store.lock().remove(size);

        match pooled {
            Some(mut buf) => {
                self.hits.fetch_add(1, RELAXED);
                buf.clear();
                PoolBuffer::from(buf)
            }
            None => {
                self.misses.fetch_add(1, RELAXED);
                PoolBuffer::with_capacity(size)
            }
        }
    }

    /// Return a buffer to the pool.
    ///
    /// The buffer is retained under its capacity class unless it is
    /// empty-capacity, exceeds `max_buffer_size`, or would push the
    /// aggregate past `max_pool_size`; in those cases it is dropped
    /// here and its memory goes back to the allocator.
    pub fn put(&self, buf: PoolBuffer) {
        let buf = buf.into_bytes();
        let capacity = buf.capacity();

        if capacity == 0 || capacity > self.config.max_buffer_size {
            self.discards.fetch_add(1, RELAXED);
            trace!(capacity, "discarding buffer: not poolable");
            return;
        }

        let mut store = self.store.lock();
        if store.pooled_bytes() + capacity > self.config.max_pool_size {
            drop(store);
            self.discards.fetch_add(1, RELAXED);
            trace!(capacity, "discarding buffer: pool quota reached");
            return;
        }

        store.insert(buf);
        drop(store);
        self.returns.fetch_add(1, RELAXED);
    }

    /// Drop every pooled buffer and reset the aggregate to zero.
    ///
    /// Buffers already handed out are unaffected; they are simply
    /// discarded if returned later and the quota no longer admits them.
    pub fn clear(&self) {
        let (buffers, bytes) = self.store.lock().clear();
        if buffers > 0 {
            debug!(buffers, bytes, "pool cleared");
        }
    }

    /// Total bytes currently retained.
    pub fn pooled_bytes(&self) -> usize {
        self.store.lock().pooled_bytes()
    }

    /// Number of buffers currently retained.
    pub fn pooled_buffers(&self) -> usize {
        self.store.lock().pooled_buffers()
    }

    /// Snapshot the counters.
    pub fn stats(&self) -> PoolStats {
        let store = self.store.lock();
        PoolStats {
            pooled_bytes: store.pooled_bytes(),
            pooled_buffers: store.pooled_buffers(),
            hits: self.hits.load(RELAXED),
            misses: self.misses.load(RELAXED),
            returns: self.returns.load(RELAXED),
            discards: self.discards.load(RELAXED),
        }
    }
}

/// Pool statistics for monitoring.
#[derive(Debug, Clone, Copy)]
pub struct PoolStats {
    /// Bytes currently retained across all size classes.
    pub pooled_bytes: usize,
    /// Buffers currently retained.
    pub pooled_buffers: usize,
    /// Takes served from the store.
    pub hits: u64,
    /// Takes served by fresh allocation.
    pub misses: u64,
    /// Returns retained in the store.
    pub returns: u64,
    /// Returns discarded (oversized or quota exceeded).
    pub discards: u64,
}

impl PoolStats {
    /// Fraction of takes served from the store (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
