//! # Block Pools
//!
//! Fixed-size, fixed-count block allocation for real-time code.
//!
//! ## Design Philosophy
//!
//! All memory is reserved before the pool exists. After that:
//! - No heap allocations
//! - No fragmentation
//! - No blocking, not even under contention

mod block_pool;
mod storage;

pub use block_pool::BlockPool;
pub use storage::{PoolStorage, SliceStorage};
