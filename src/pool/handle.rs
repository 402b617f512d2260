use std::sync::Arc;

use crate::buffer::PoolBuffer;
use crate::pool::engine::PoolEngine;
use crate::pool::manager::{BufferManager, BufferPool};

/// Engine-shaped handle onto a pool, whichever side it came from.
///
/// Code that needs the trusted engine contract holds one of these
/// instead of a wrapper chain. The two cases are explicit: either the
/// handle owns a native [`PoolEngine`], or it forwards to a foreign
/// [`BufferManager`]. Unwrapping is a match on the tag, and converting
/// back to a manager never stacks a second wrapper (a handle built
/// from a manager gives back that same manager).
#[derive(Clone)]
pub enum PoolHandle {
    /// A native engine, reached with zero indirection.
    Native(Arc<PoolEngine>),
    /// A foreign manager, reached through one forwarding layer.
    Adapted(Arc<dyn BufferManager>),
}

impl PoolHandle {
    /// Take a buffer with capacity >= `size`.
    ///
    /// Sizes reaching the engine shape are already validated, so a
    /// foreign manager has no legitimate reason to refuse; if one does
    /// anyway, the request degrades to a fresh allocation.
    pub fn take(&self, size: usize) -> PoolBuffer {
        match self {
            PoolHandle::Native(engine) => engine.take(size),
            PoolHandle::Adapted(manager) => manager
                .take_buffer(size)
                .unwrap_or_else(|_| PoolBuffer::with_capacity(size)),
        }
    }

    /// Return a buffer to the pool.
    ///
    /// A foreign manager that refuses the return forfeits the buffer;
    /// discarding is a valid pool outcome.
    pub fn put(&self, buf: PoolBuffer) {
        match self {
            PoolHandle::Native(engine) => engine.put(buf),
            PoolHandle::Adapted(manager) => {
                let _ = manager.return_buffer(buf);
            }
        }
    }

    /// Discard every pooled buffer.
    pub fn clear(&self) {
        match self {
            PoolHandle::Native(engine) => engine.clear(),
            PoolHandle::Adapted(manager) => manager.clear(),
        }
    }

    /// Convert back to the manager shape.
    ///
    /// A native engine is wrapped in its canonical [`BufferPool`]
    /// facade, sharing the same engine. An adapted manager comes back
    /// untouched, so round-tripping never deepens the wrapper stack.
    pub fn into_manager(self) -> Arc<dyn BufferManager> {
        match self {
            PoolHandle::Native(engine) => Arc::new(BufferPool::from_engine(engine)),
            PoolHandle::Adapted(manager) => manager,
        }
    }
}

impl From<&BufferPool> for PoolHandle {
    /// Unwrap a canonical pool to its own engine. No forwarding layer
    /// is added.
    fn from(pool: &BufferPool) -> Self {
        pool.handle()
    }
}

impl From<Arc<dyn BufferManager>> for PoolHandle {
    /// Adapt a foreign manager to the engine shape.
    fn from(manager: Arc<dyn BufferManager>) -> Self {
        PoolHandle::Adapted(manager)
    }
}

impl std::fmt::Debug for PoolHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolHandle::Native(_) => f.write_str("PoolHandle::Native"),
            PoolHandle::Adapted(_) => f.write_str("PoolHandle::Adapted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use parking_lot::Mutex;

    /// Foreign manager that pools at most one buffer, for exercising
    /// the Adapted arm.
    struct SingleSlot {
        slot: Mutex<Option<PoolBuffer>>,
    }

    impl SingleSlot {
        fn new() -> Self {
            Self {
                slot: Mutex::new(None),
            }
        }
    }

    impl BufferManager for SingleSlot {
        fn take_buffer(&self, size: usize) -> Result<PoolBuffer> {
            let pooled = self.slot.lock().take();
            Ok(match pooled {
                Some(buf) if buf.capacity() >= size => buf,
                _ => PoolBuffer::with_capacity(size),
            })
        }

        fn return_buffer(&self, buffer: PoolBuffer) -> Result<()> {
            *self.slot.lock() = Some(buffer);
            Ok(())
        }

        fn clear(&self) {
            self.slot.lock().take();
        }
    }

    #[test]
    fn test_native_handle_shares_pool_state() {
        let pool = BufferPool::with_limits(1024, 512).unwrap();
        let handle = pool.handle();

        // Return through the handle, take through the facade.
        handle.put(PoolBuffer::with_capacity(64));
        assert_eq!(pool.pooled_buffers(), 1);

        let buf = pool.take_buffer(64).unwrap();
        assert!(buf.capacity() >= 64);
        assert_eq!(pool.stats().hits, 1);
    }

    #[test]
    fn test_native_roundtrip_is_functionally_identical() {
        let pool = BufferPool::with_limits(1024, 512).unwrap();

        let manager = pool.handle().into_manager();
        manager.return_buffer(PoolBuffer::with_capacity(64)).unwrap();

        // Same engine underneath: the original facade sees the return.
        assert_eq!(pool.pooled_buffers(), 1);
        manager.clear();
        assert_eq!(pool.pooled_buffers(), 0);
    }

    #[test]
    fn test_adapted_roundtrip_returns_same_manager() {
        let manager: Arc<dyn BufferManager> = Arc::new(SingleSlot::new());

        let roundtripped = PoolHandle::from(Arc::clone(&manager)).into_manager();
        assert!(Arc::ptr_eq(&manager, &roundtripped));
    }

    #[test]
    fn test_adapted_handle_forwards_operations() {
        let manager: Arc<dyn BufferManager> = Arc::new(SingleSlot::new());
        let handle = PoolHandle::from(Arc::clone(&manager));

        handle.put(PoolBuffer::with_capacity(128));
        let buf = handle.take(100);
        assert!(buf.capacity() >= 128);

        handle.put(buf);
        handle.clear();
        // Slot was emptied, so the next take allocates fresh.
        let buf = handle.take(100);
        assert_eq!(buf.capacity(), 100);
    }

    #[test]
    fn test_take_through_handle_enforces_quota() {
        let pool = BufferPool::with_limits(100, 50).unwrap();
        let handle = pool.handle();

        handle.put(PoolBuffer::with_capacity(60));
        assert_eq!(pool.pooled_bytes(), 0);

        handle.put(PoolBuffer::with_capacity(40));
        handle.put(PoolBuffer::with_capacity(40));
        handle.put(PoolBuffer::with_capacity(40));
        assert_eq!(pool.pooled_bytes(), 80);
    }
}
