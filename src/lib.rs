pub mod buffer;
pub mod config;
pub mod error;
pub mod pool;

pub use buffer::{Lease, PoolBuffer};
pub use config::PoolConfig;
pub use error::{Error, Result};
pub use pool::{BufferManager, BufferPool, PoolEngine, PoolHandle, PoolStats};
