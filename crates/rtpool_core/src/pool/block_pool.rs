//! # Block Pool
//!
//! Fixed-size block allocator over caller-supplied storage.
//!
//! ## Safety Note
//!
//! Blocks are handed out as raw pointers into the arena, so pointer
//! arithmetic and the zero-fill need unsafe code. The free-list itself is
//! plain atomics.
//!
//! Only construction logs. `allocate` and `release` never call into
//! `tracing`, since a subscriber may take a lock; exhaustion and rejected
//! releases are counted in [`PoolStats`] instead.

#![allow(unsafe_code)]

use std::fmt;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::storage::{PoolStorage, SliceStorage};
use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};
use crate::stats::PoolStats;
use crate::sync::{FreeList, SlotLink};

/// A pool of `capacity` blocks, each `block_size` bytes.
///
/// Every block is either FREE (on the free list) or ALLOCATED (owned by
/// exactly one caller). `allocate` and `release` never block and may be
/// called concurrently from any thread or interrupt handler.
///
/// Allocation order is LIFO: the most recently released block is the next
/// one handed out. Callers must not rely on it.
///
/// # Example
///
/// ```rust,ignore
/// let mut arena = [0u8; 3 * 16];
/// let mut links: [SlotLink; 3] = Default::default();
/// let pool = BlockPool::from_slices(PoolConfig::new(16, 3), &mut arena, &mut links)?;
///
/// let block = pool.allocate().expect("pool has room");
/// // ... use the 16 bytes at `block` ...
/// unsafe { pool.release(block)? };
/// ```
pub struct BlockPool<S: PoolStorage> {
    /// Arena and control records.
    storage: S,
    /// Block geometry.
    config: PoolConfig,
    /// Free slot indices.
    free: FreeList,
    /// Number of ALLOCATED blocks.
    used: AtomicUsize,
    /// High-water mark of `used`.
    peak: AtomicUsize,
    /// Allocation requests that found the pool empty.
    exhausted: AtomicUsize,
    /// Release calls that were rejected.
    rejected: AtomicUsize,
}

impl<'a> BlockPool<SliceStorage<'a>> {
    /// Creates a pool over borrowed slices.
    ///
    /// # Arguments
    ///
    /// * `config` - Block geometry
    /// * `arena` - Exactly `block_size * capacity` bytes
    /// * `links` - Exactly `capacity` control records
    ///
    /// # Errors
    ///
    /// See [`BlockPool::new`].
    pub fn from_slices(
        config: PoolConfig,
        arena: &'a mut [u8],
        links: &'a mut [SlotLink],
    ) -> PoolResult<Self> {
        Self::new(config, SliceStorage::new(arena, links))
    }
}

impl<S: PoolStorage> BlockPool<S> {
    /// Creates a pool with every block FREE, slot 0 first.
    ///
    /// No memory is allocated; the arena and links come from `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, if the arena is not
    /// exactly `block_size * capacity` bytes, if there is not exactly one
    /// link per block, or if the arena base is misaligned.
    pub fn new(config: PoolConfig, storage: S) -> PoolResult<Self> {
        config.validate()?;

        let expected = config.arena_len()?;
        let actual = storage.arena_len();
        if actual != expected {
            return Err(PoolError::ArenaSizeMismatch { expected, actual });
        }

        let links = storage.links();
        if links.len() != config.capacity {
            return Err(PoolError::LinkCountMismatch {
                expected: config.capacity,
                actual: links.len(),
            });
        }

        if storage.arena().as_ptr() as usize % config.align != 0 {
            return Err(PoolError::ArenaNotAligned { align: config.align });
        }

        let free = FreeList::new(links);

        tracing::debug!(
            block_size = config.block_size,
            capacity = config.capacity,
            align = config.align,
            arena_bytes = expected,
            "block pool created"
        );

        Ok(Self {
            storage,
            config,
            free,
            used: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            exhausted: AtomicUsize::new(0),
            rejected: AtomicUsize::new(0),
        })
    }

    // =========================================================================
    // ALLOCATION
    // =========================================================================

    /// Claims a free block.
    ///
    /// This is a **lock-free** operation with **zero heap allocations**. It
    /// never waits: when every block is taken it returns `None` at once.
    ///
    /// The block's contents are whatever its previous owner left there.
    #[must_use]
    pub fn allocate(&self) -> Option<NonNull<u8>> {
        let links = self.storage.links();

        let Some(index) = self.free.pop(links) else {
            self.exhausted.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        let used = self.used.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak.fetch_max(used, Ordering::Relaxed);
        links[index].mark_allocated();

        Some(self.block_ptr(index))
    }

    /// Claims a free block and fills its `block_size` bytes with zero.
    ///
    /// The fill runs after the claim, on a block no one else can reach.
    #[must_use]
    pub fn allocate_zeroed(&self) -> Option<NonNull<u8>> {
        let block = self.allocate()?;
        // SAFETY: `block` was just claimed, so this context owns its
        // `block_size` bytes exclusively, and they lie inside the arena.
        unsafe { std::ptr::write_bytes(block.as_ptr(), 0, self.config.block_size) };
        Some(block)
    }

    /// Returns a block to the pool.
    ///
    /// Rejected addresses leave the pool untouched:
    /// - outside the arena: [`PoolError::OutOfRange`]
    /// - not on a block boundary: [`PoolError::Misaligned`]
    /// - already free: [`PoolError::NotAllocated`]
    ///
    /// # Errors
    ///
    /// Returns the rejection reason; the block stays in whatever state it
    /// was before the call.
    ///
    /// # Safety
    ///
    /// The caller must own `block` (it came from this pool's `allocate` and
    /// has not been released since) and must not touch its memory after
    /// this call. The pool rejects addresses it can prove are wrong, but it
    /// cannot tell one owner of a live block from another.
    pub unsafe fn release(&self, block: NonNull<u8>) -> PoolResult<()> {
        let index = self.index_of(block).map_err(|e| self.reject(e))?;
        let links = self.storage.links();

        if !links[index].try_mark_free() {
            return Err(self.reject(PoolError::NotAllocated { index }));
        }

        self.used.fetch_sub(1, Ordering::Relaxed);
        self.free.push(links, index);
        Ok(())
    }

    /// Counts a rejected release.
    fn reject(&self, error: PoolError) -> PoolError {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        error
    }

    #[inline]
    fn block_ptr(&self, index: usize) -> NonNull<u8> {
        debug_assert!(index < self.config.capacity);
        // SAFETY: `index < capacity`, so the offset stays inside the arena
        // the storage guarantees, and an in-bounds offset of a non-null
        // pointer is non-null.
        unsafe {
            let base = self.storage.arena().as_ptr();
            NonNull::new_unchecked(base.add(index * self.config.block_size))
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Slot index of a block address.
    ///
    /// # Errors
    ///
    /// [`PoolError::OutOfRange`] or [`PoolError::Misaligned`] if `block` is
    /// not the start of one of this pool's blocks.
    pub fn index_of(&self, block: NonNull<u8>) -> PoolResult<usize> {
        let base = self.storage.arena().as_ptr() as usize;
        let offset = (block.as_ptr() as usize)
            .checked_sub(base)
            .ok_or(PoolError::OutOfRange)?;

        if offset >= self.storage.arena_len() {
            return Err(PoolError::OutOfRange);
        }
        if offset % self.config.block_size != 0 {
            return Err(PoolError::Misaligned {
                offset,
                block_size: self.config.block_size,
            });
        }
        Ok(offset / self.config.block_size)
    }

    /// Address of the block at `index`, whatever its state.
    #[inline]
    #[must_use]
    pub fn block_at(&self, index: usize) -> Option<NonNull<u8>> {
        (index < self.config.capacity).then(|| self.block_ptr(index))
    }

    /// Returns whether `ptr` points anywhere inside the arena.
    #[inline]
    #[must_use]
    pub fn contains(&self, ptr: NonNull<u8>) -> bool {
        let base = self.storage.arena().as_ptr() as usize;
        (ptr.as_ptr() as usize)
            .checked_sub(base)
            .is_some_and(|offset| offset < self.storage.arena_len())
    }

    /// Returns whether `block` is the start of a currently ALLOCATED block.
    #[must_use]
    pub fn is_allocated(&self, block: NonNull<u8>) -> bool {
        self.index_of(block)
            .is_ok_and(|index| self.storage.links()[index].is_allocated())
    }

    /// Returns the block geometry.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns the size of each block in bytes.
    #[inline]
    #[must_use]
    pub const fn block_size(&self) -> usize {
        self.config.block_size
    }

    /// Returns the total number of blocks.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Returns the alignment of every block.
    #[inline]
    #[must_use]
    pub const fn align(&self) -> usize {
        self.config.align
    }

    /// Returns the number of currently allocated blocks.
    #[inline]
    #[must_use]
    pub fn used_count(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }

    /// Returns the number of free blocks.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.config.capacity - self.used_count()
    }

    /// Returns whether every block is allocated.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// Returns whether no block is allocated.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.used_count() == 0
    }

    /// Takes a snapshot of the pool counters.
    ///
    /// Counters are read one at a time, so a snapshot taken while other
    /// contexts are active is only approximately consistent.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let used = self.used_count();
        PoolStats {
            block_size: self.config.block_size,
            capacity: self.config.capacity,
            used,
            free: self.config.capacity - used,
            peak: self.peak.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }

    /// Returns the backing storage.
    #[inline]
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: PoolStorage> fmt::Debug for BlockPool<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockPool")
            .field("block_size", &self.config.block_size)
            .field("capacity", &self.config.capacity)
            .field("align", &self.config.align)
            .field("used", &self.used_count())
            .finish_non_exhaustive()
    }
}
