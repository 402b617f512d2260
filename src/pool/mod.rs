//! The pooling layers: policy engine, size-classed store, public
//! facade, and the adapter between the two shapes.
//!
//! Control flow runs facade, then engine, then store. [`BufferPool`]
//! validates arguments, [`PoolEngine`] applies the retain-or-discard
//! policy, and the store owns the pooled buffers. [`PoolHandle`] bridges code that
//! holds one shape and needs the other.

mod engine;
mod handle;
mod manager;
mod store;

pub use engine::{PoolEngine, PoolStats};
pub use handle::PoolHandle;
pub use manager::{BufferManager, BufferPool};
