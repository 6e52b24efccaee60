//! # RTPOOL Core
//!
//! Fixed-size, fixed-count memory pools for embedded and real-time code:
//! - Deterministic: no fragmentation, no growth, no hidden allocation
//! - Interrupt-safe: allocate and release are lock-free and never block
//! - Checked: double and foreign releases are reported, never absorbed
//!
//! ## Architecture
//!
//! ```text
//! BlockPool<S: PoolStorage>
//! ├── PoolConfig      (block_size, capacity, align)
//! ├── S::arena()      block_size * capacity bytes, caller-owned
//! ├── S::links()      [SlotLink; capacity] next index + FREE/ALLOCATED
//! └── FreeList        tagged head word, one CAS per update
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use rtpool_core::{BlockPool, PoolConfig, SlotLink};
//!
//! let mut arena = [0u8; 3 * 32];
//! let mut links: [SlotLink; 3] = Default::default();
//! let pool = BlockPool::from_slices(PoolConfig::new(32, 3), &mut arena, &mut links)?;
//!
//! let block = pool.allocate_zeroed().ok_or("exhausted")?;
//! unsafe { pool.release(block)? };
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod pool;
pub mod stats;
pub mod sync;

pub use config::PoolConfig;
pub use error::{PoolError, PoolResult};
pub use pool::{BlockPool, PoolStorage, SliceStorage};
pub use stats::PoolStats;
pub use sync::{FreeList, SlotLink};
