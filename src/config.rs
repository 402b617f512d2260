use crate::error::{Error, Result};

/// Default aggregate cap on retained bytes (8 MiB).
pub const DEFAULT_MAX_POOL_SIZE: usize = 8 * 1024 * 1024;

/// Default per-buffer pooling cap (64 KiB). Larger buffers are
/// allocated fresh and never retained.
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 64 * 1024;

/// Largest size or bound accepted at the pool boundary.
///
/// A negative length cast through unsigned conventions lands above this
/// limit (`-1` becomes `usize::MAX`), and no single Rust allocation may
/// exceed `isize::MAX` bytes, so anything larger is a caller error.
pub const MAX_ALLOC: usize = isize::MAX as usize;

/// Pool sizing limits.
///
/// Both limits may be zero: a zero-sized pool is valid and simply never
/// retains anything (every take allocates fresh, every return discards).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum aggregate bytes retained across all size classes.
    pub max_pool_size: usize,

    /// Buffers with capacity above this are never pooled.
    pub max_buffer_size: usize,
}

impl PoolConfig {
    /// Create a config with the given limits.
    pub fn new(max_pool_size: usize, max_buffer_size: usize) -> Self {
        Self {
            max_pool_size,
            max_buffer_size,
        }
    }

    /// Check both limits against [`MAX_ALLOC`].
    pub fn validate(&self) -> Result<()> {
        if self.max_pool_size > MAX_ALLOC {
            return Err(Error::InvalidArgument(format!(
                "max_pool_size {} exceeds maximum allocation size",
                self.max_pool_size
            )));
        }
        if self.max_buffer_size > MAX_ALLOC {
            return Err(Error::InvalidArgument(format!(
                "max_buffer_size {} exceeds maximum allocation size",
                self.max_buffer_size
            )));
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = PoolConfig::default();
        assert_eq!(config.max_pool_size, DEFAULT_MAX_POOL_SIZE);
        assert_eq!(config.max_buffer_size, DEFAULT_MAX_BUFFER_SIZE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_limits_are_valid() {
        assert!(PoolConfig::new(0, 0).validate().is_ok());
    }

    #[test]
    fn test_oversized_bounds_rejected() {
        // usize::MAX is what a negative bound looks like after an
        // unsigned cast.
        assert!(PoolConfig::new(usize::MAX, 64).validate().is_err());
        assert!(PoolConfig::new(1024, usize::MAX).validate().is_err());
    }
}
