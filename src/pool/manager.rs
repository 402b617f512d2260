use std::sync::Arc;

use crate::buffer::{Lease, PoolBuffer};
use crate::config::{PoolConfig, MAX_ALLOC};
use crate::error::{Error, Result};
use crate::pool::engine::{PoolEngine, PoolStats};
use crate::pool::handle::PoolHandle;

/// The public buffer-manager contract.
///
/// `take_buffer` moves a buffer out to the caller; `return_buffer`
/// moves it back. Implementations validate their arguments here, at
/// the outermost layer; anything forwarded further down is trusted.
///
/// The canonical implementation is [`BufferPool`]. Foreign
/// implementations (a recording pool in tests, a metered wrapper) can
/// be dropped in anywhere a manager is expected, and adapt to the
/// engine shape through [`PoolHandle`].
pub trait BufferManager: Send + Sync {
    /// Take a buffer with capacity >= `size`.
    fn take_buffer(&self, size: usize) -> Result<PoolBuffer>;

    /// Relinquish a buffer back to the pool.
    fn return_buffer(&self, buffer: PoolBuffer) -> Result<()>;

    /// Discard every pooled buffer. Buffers already taken out are
    /// unaffected.
    fn clear(&self);
}

/// Bounded byte-buffer pool.
///
/// Validates arguments and forwards to a shared [`PoolEngine`].
/// Cloning is cheap and clones share the same pool.
#[derive(Clone)]
pub struct BufferPool {
    engine: Arc<PoolEngine>,
}

impl BufferPool {
    /// Create a pool with the default limits.
    pub fn new() -> Self {
        Self {
            engine: Arc::new(PoolEngine::new(PoolConfig::default())),
        }
    }

    /// Create a pool with explicit limits.
    ///
    /// `max_pool_size` caps the aggregate bytes retained;
    /// `max_buffer_size` caps the capacity of any single retained
    /// buffer. Both may be zero, yielding a pool that retains nothing.
    /// Fails with `InvalidArgument` when either bound exceeds the
    /// maximum allocation size.
    pub fn with_limits(max_pool_size: usize, max_buffer_size: usize) -> Result<Self> {
        Self::with_config(PoolConfig::new(max_pool_size, max_buffer_size))
    }

    /// Create a pool from a validated config.
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine: Arc::new(PoolEngine::new(config)),
        })
    }

    pub(crate) fn from_engine(engine: Arc<PoolEngine>) -> Self {
        Self { engine }
    }

    /// The limits this pool enforces.
    #[inline]
    pub fn config(&self) -> PoolConfig {
        self.engine.config()
    }

    /// Engine-shaped handle onto this pool's own engine.
    ///
    /// The handle shares state with the pool: buffers returned through
    /// one are visible to takes through the other.
    pub fn handle(&self) -> PoolHandle {
        PoolHandle::Native(Arc::clone(&self.engine))
    }

    /// Take a buffer and lease it: the buffer goes back to the pool
    /// when the guard drops.
    pub fn lease(&self, size: usize) -> Result<Lease<'_>> {
        let buf = self.take_buffer(size)?;
        Ok(Lease::new(self, buf))
    }

    /// Bytes currently retained across all size classes.
    pub fn pooled_bytes(&self) -> usize {
        self.engine.pooled_bytes()
    }

    /// Buffers currently retained.
    pub fn pooled_buffers(&self) -> usize {
        self.engine.pooled_buffers()
    }

    /// Check whether the pool currently retains nothing.
    pub fn is_empty(&self) -> bool {
        self.engine.pooled_buffers() == 0
    }

    /// Snapshot hit/miss/return/discard counters.
    pub fn stats(&self) -> PoolStats {
        self.engine.stats()
    }
}

impl BufferManager for BufferPool {
    fn take_buffer(&self, size: usize) -> Result<PoolBuffer> {
        if size > MAX_ALLOC {
            return Err(Error::InvalidArgument(format!(
                "requested size {} exceeds maximum allocation size",
                size
            )));
        }
        Ok(self.engine.take(size))
    }

    /// Returns a buffer to the pool.
    ///
    /// Buffers that did not originate from this pool are accepted
    /// silently and pooled subject to the usual quota checks; the
    /// canonical pool never rejects a return.
    fn return_buffer(&self, buffer: PoolBuffer) -> Result<()> {
        self.engine.put(buffer);
        Ok(())
    }

    fn clear(&self) {
        self.engine.clear();
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("BufferPool")
            .field("config", &self.config())
            .field("pooled_bytes", &stats.pooled_bytes)
            .field("pooled_buffers", &stats.pooled_buffers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_factory_rejects_out_of_range_bounds() {
        // usize::MAX is the unsigned image of -1.
        assert!(BufferPool::with_limits(usize::MAX, 64).is_err());
        assert!(BufferPool::with_limits(1024, usize::MAX).is_err());
        assert!(BufferPool::with_limits(0, 0).is_ok());
    }

    #[test]
    fn test_take_rejects_out_of_range_size() {
        let pool = BufferPool::with_limits(1024, 512).unwrap();
        let err = pool.take_buffer(usize::MAX).unwrap_err();
        assert!(err.to_string().contains("Invalid argument"));
    }

    #[test]
    fn test_take_satisfies_requested_capacity() {
        let pool = BufferPool::with_limits(4096, 1024).unwrap();
        for size in [0, 1, 7, 64, 1000] {
            let buf = pool.take_buffer(size).unwrap();
            assert!(buf.capacity() >= size);
        }
    }

    #[test]
    fn test_foreign_buffer_accepted_silently() {
        let pool = BufferPool::with_limits(1024, 512).unwrap();

        // A buffer this pool never handed out.
        let foreign = PoolBuffer::from(BytesMut::with_capacity(256));
        pool.return_buffer(foreign).unwrap();

        assert_eq!(pool.pooled_buffers(), 1);
        let buf = pool.take_buffer(200).unwrap();
        assert!(buf.capacity() >= 200);
        assert_eq!(pool.stats().hits, 1);
    }

    #[test]
    fn test_clones_share_the_pool() {
        let pool = BufferPool::with_limits(1024, 512).unwrap();
        let clone = pool.clone();

        let buf = pool.take_buffer(64).unwrap();
        clone.return_buffer(buf).unwrap();

        assert_eq!(pool.pooled_buffers(), 1);
        let _ = pool.take_buffer(64).unwrap();
        assert_eq!(clone.stats().hits, 1);
    }

    #[test]
    fn test_clear_forwards_to_engine() {
        let pool = BufferPool::with_limits(1024, 512).unwrap();
        let buf = pool.take_buffer(64).unwrap();
        pool.return_buffer(buf).unwrap();
        assert!(!pool.is_empty());

        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.pooled_bytes(), 0);
    }

    #[test]
    fn test_usable_as_trait_object() {
        let pool: Arc<dyn BufferManager> =
            Arc::new(BufferPool::with_limits(1024, 512).unwrap());

        let buf = pool.take_buffer(64).unwrap();
        assert!(buf.capacity() >= 64);
        pool.return_buffer(buf).unwrap();
        pool.clear();
    }
}
