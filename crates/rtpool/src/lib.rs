//! # RTPOOL
//!
//! Typed fixed-size memory pools for embedded and real-time code.
//!
//! `MemoryPool<T, N>` holds room for `N` values of `T` inside itself and
//! hands blocks out in constant time, from any thread or interrupt handler,
//! without ever touching the heap.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rtpool::MemoryPool;
//!
//! #[derive(Default)]
//! struct Sample { channel: u8, value: i32 }
//!
//! let pool: MemoryPool<Sample, 64> = MemoryPool::new();
//!
//! // Raw interface: alloc / calloc / free
//! let raw = pool.calloc().expect("pool has room");
//! unsafe { pool.free(raw)? };
//!
//! // Owning interface: released on drop
//! let sample = pool.boxed(Sample { channel: 2, value: -40 }).ok();
//! ```
//!
//! The allocator itself, including pools over caller-supplied slices,
//! lives in [`rtpool_core`] and is re-exported here.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

mod inline_storage;
mod memory_pool;
mod pool_box;

pub use inline_storage::InlineStorage;
pub use memory_pool::MemoryPool;
pub use pool_box::PoolBox;

pub use rtpool_core::{
    BlockPool, PoolConfig, PoolError, PoolResult, PoolStats, PoolStorage, SliceStorage, SlotLink,
};
