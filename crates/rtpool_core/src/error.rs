//! # Pool Error Types
//!
//! All errors that can occur when building a pool or returning a block to it.
//!
//! Exhaustion is deliberately absent: running out of blocks is an expected
//! outcome and is reported as `None` by the allocation calls.

use thiserror::Error;

/// Errors that can occur in the pool allocator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    // =========================================================================
    // CONSTRUCTION
    // =========================================================================
    /// Block size of zero bytes.
    #[error("block size must be greater than zero")]
    ZeroBlockSize,

    /// Capacity of zero blocks.
    #[error("capacity must be greater than zero")]
    ZeroCapacity,

    /// More blocks than the free list can index.
    #[error("capacity {capacity} exceeds the maximum of {max} blocks")]
    CapacityTooLarge {
        /// Requested capacity.
        capacity: usize,
        /// Largest capacity the free list supports on this target.
        max: usize,
    },

    /// Alignment that is not a power of two.
    #[error("alignment {0} is not a power of two")]
    InvalidAlignment(usize),

    /// Block size that would leave later blocks misaligned.
    #[error("block size {block_size} is not a multiple of alignment {align}")]
    BlockSizeNotAligned {
        /// Configured block size.
        block_size: usize,
        /// Configured alignment.
        align: usize,
    },

    /// `block_size * capacity` does not fit in `usize`.
    #[error("arena size overflows usize")]
    ArenaSizeOverflow,

    /// Arena storage is not exactly `block_size * capacity` bytes.
    #[error("arena size mismatch: expected {expected} bytes, got {actual}")]
    ArenaSizeMismatch {
        /// Bytes required by the config.
        expected: usize,
        /// Bytes supplied by the storage.
        actual: usize,
    },

    /// Control storage does not hold exactly one link per block.
    #[error("link count mismatch: expected {expected}, got {actual}")]
    LinkCountMismatch {
        /// Links required by the config.
        expected: usize,
        /// Links supplied by the storage.
        actual: usize,
    },

    /// Arena base address does not satisfy the configured alignment.
    #[error("arena base is not aligned to {align} bytes")]
    ArenaNotAligned {
        /// Required alignment.
        align: usize,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // RELEASE
    // =========================================================================
    /// Address lies outside this pool's arena.
    #[error("address does not belong to this pool")]
    OutOfRange,

    /// Address lies inside the arena but not on a block boundary.
    #[error("address at arena offset {offset} is not on a {block_size}-byte block boundary")]
    Misaligned {
        /// Byte offset from the arena base.
        offset: usize,
        /// Configured block size.
        block_size: usize,
    },

    /// Block is already free (double release).
    #[error("block {index} is not allocated")]
    NotAllocated {
        /// Slot index of the block.
        index: usize,
    },
}

impl PoolError {
    /// Returns `true` for errors produced by an invalid `release` call.
    #[inline]
    #[must_use]
    pub const fn is_release_error(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange | Self::Misaligned { .. } | Self::NotAllocated { .. }
        )
    }
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
