//! Pooled buffer payload and RAII lease.
//!
//! [`PoolBuffer`] is the unit of ownership the pool hands out and takes
//! back. It moves into the caller on take and moves back into the pool
//! on return, so a buffer can never be held by the pool and a caller at
//! the same time.

use bytes::BytesMut;

use crate::pool::{BufferManager, BufferPool};

/// An owned, reusable byte buffer.
///
/// Wraps a `BytesMut` whose capacity is the pooling key. Contents are
/// opaque to the pool and are cleared before every hand-out.
pub struct PoolBuffer {
    data: BytesMut,
}

impl PoolBuffer {
    /// Allocate a fresh buffer with at least the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
        }
    }

    /// Capacity of the underlying storage in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Unwrap into the underlying `BytesMut`, detaching the storage
    /// from any pool bookkeeping.
    #[inline]
    pub fn into_bytes(self) -> BytesMut {
        self.data
    }
}

impl From<BytesMut> for PoolBuffer {
    /// Adopt an externally allocated `BytesMut`.
    ///
    /// Buffers built this way never saw a pool; returning one is still
    /// accepted and pooled subject to the usual quota checks.
    fn from(data: BytesMut) -> Self {
        Self { data }
    }
}

impl std::ops::Deref for PoolBuffer {
    type Target = BytesMut;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl std::ops::DerefMut for PoolBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl std::fmt::Debug for PoolBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolBuffer")
            .field("len", &self.data.len())
            .field("capacity", &self.data.capacity())
            .finish()
    }
}

/// RAII guard that returns its buffer to the pool on drop.
pub struct Lease<'a> {
    pool: &'a BufferPool,
    buf: Option<PoolBuffer>,
}

impl<'a> Lease<'a> {
    pub(crate) fn new(pool: &'a BufferPool, buf: PoolBuffer) -> Self {
        Self {
            pool,
            buf: Some(buf),
        }
    }

    /// Take the buffer out, preventing return to the pool.
    pub fn detach(mut self) -> PoolBuffer {
        self.buf.take().unwrap()
    }
}

impl std::ops::Deref for Lease<'_> {
    type Target = PoolBuffer;

    fn deref(&self) -> &Self::Target {
        self.buf.as_ref().unwrap()
    }
}

impl std::ops::DerefMut for Lease<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.buf.as_mut().unwrap()
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            let _ = self.pool.return_buffer(buf);
        }
    }
}
