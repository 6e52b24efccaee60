//! # Typed Memory Pool
//!
//! A [`BlockPool`] sized for `N` values of `T`, with its storage embedded.

#![allow(unsafe_code)]

use std::fmt;
use std::ptr::NonNull;

use bytemuck::Zeroable;
use rtpool_core::{BlockPool, PoolConfig, PoolResult, PoolStats};

use crate::inline_storage::InlineStorage;
use crate::pool_box::PoolBox;

/// Fixed pool of `N` blocks, each holding one `T`.
///
/// Blocks are handed out uninitialised (`alloc`), zeroed (`calloc`), or
/// as an owning [`PoolBox`] (`boxed`). Every call is lock-free and can be
/// made from any thread or interrupt handler through a shared reference.
///
/// # Example
///
/// ```rust,ignore
/// struct Message { id: u32, payload: [u8; 60] }
///
/// let pool: MemoryPool<Message, 16> = MemoryPool::new();
///
/// // O(1), no heap allocation, returns None when all 16 are out
/// let msg = pool.calloc().expect("pool has room");
/// unsafe {
///     (*msg.as_ptr()).id = 7;
///     pool.free(msg)?;
/// }
/// ```
pub struct MemoryPool<T, const N: usize> {
    pool: BlockPool<InlineStorage<T, N>>,
}

impl<T, const N: usize> MemoryPool<T, N> {
    /// Creates a pool with all `N` blocks free and zeroed.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized or `N` is zero. Both are sizing bugs in
    /// the program, not runtime conditions.
    #[must_use]
    pub fn new() -> Self {
        match Self::try_new() {
            Ok(pool) => pool,
            Err(error) => {
                tracing::error!(%error, "memory pool construction failed");
                panic!("invalid memory pool geometry: {error}");
            }
        }
    }

    /// Creates a pool, reporting a geometry error instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns the core's construction error (zero-sized `T`, `N == 0`, or
    /// more blocks than the free list can index).
    pub fn try_new() -> PoolResult<Self> {
        let pool = BlockPool::new(PoolConfig::for_type::<T>(N), InlineStorage::new())?;
        Ok(Self { pool })
    }

    // =========================================================================
    // ALLOCATION
    // =========================================================================

    /// Claims a block. Its contents are whatever was there before.
    ///
    /// Returns `None` when all `N` blocks are out.
    #[inline]
    #[must_use]
    pub fn alloc(&self) -> Option<NonNull<T>> {
        self.pool.allocate().map(NonNull::cast)
    }

    /// Claims a block with every byte set to zero.
    ///
    /// Returns `None` when all `N` blocks are out.
    #[inline]
    #[must_use]
    pub fn calloc(&self) -> Option<NonNull<T>> {
        self.pool.allocate_zeroed().map(NonNull::cast)
    }

    /// Returns a block to the pool. Does not drop the value in it.
    ///
    /// # Errors
    ///
    /// Returns the core's release error if `block` is not a currently
    /// allocated block of this pool. The pool is left untouched.
    ///
    /// # Safety
    ///
    /// The caller must own `block` and must not touch it afterwards. Any
    /// value stored in it is forgotten, not dropped.
    #[inline]
    pub unsafe fn free(&self, block: NonNull<T>) -> PoolResult<()> {
        self.pool.release(block.cast())
    }

    /// Moves `value` into a block and returns an owning guard.
    ///
    /// # Errors
    ///
    /// Hands `value` back if the pool is exhausted.
    pub fn boxed(&self, value: T) -> Result<PoolBox<'_, T, N>, T> {
        let Some(block) = self.alloc() else {
            return Err(value);
        };
        // SAFETY: freshly claimed, properly aligned and sized for one `T`.
        unsafe { block.as_ptr().write(value) };
        // SAFETY: the block now holds an initialised `T` owned by the guard.
        Ok(unsafe { PoolBox::from_raw(self, block) })
    }

    /// Returns an owning guard over an all-zero `T`.
    ///
    /// Returns `None` when the pool is exhausted.
    #[must_use]
    pub fn boxed_zeroed(&self) -> Option<PoolBox<'_, T, N>>
    where
        T: Zeroable,
    {
        let block = self.calloc()?;
        // SAFETY: `T: Zeroable`, so the zeroed block is a valid `T`.
        Some(unsafe { PoolBox::from_raw(self, block) })
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Returns the total number of blocks (`N`).
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns the number of blocks currently out.
    #[inline]
    #[must_use]
    pub fn used_count(&self) -> usize {
        self.pool.used_count()
    }

    /// Returns the number of free blocks.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.pool.free_count()
    }

    /// Returns whether every block is out.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.pool.is_full()
    }

    /// Returns whether no block is out.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Returns whether `block` is a currently allocated block of this pool.
    #[inline]
    #[must_use]
    pub fn owns(&self, block: NonNull<T>) -> bool {
        self.pool.is_allocated(block.cast())
    }

    /// Takes a snapshot of the pool counters.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Returns the untyped pool underneath.
    #[inline]
    #[must_use]
    pub const fn as_block_pool(&self) -> &BlockPool<InlineStorage<T, N>> {
        &self.pool
    }
}

impl<T, const N: usize> Default for MemoryPool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> fmt::Debug for MemoryPool<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPool")
            .field("type", &std::any::type_name::<T>())
            .field("capacity", &N)
            .field("used", &self.used_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtpool_core::PoolError;

    #[derive(Clone, Copy, Debug, PartialEq)]
    #[repr(C)]
    struct Sample {
        id: u32,
        value: f32,
    }

    #[test]
    fn test_capacity_bound() {
        let pool: MemoryPool<Sample, 3> = MemoryPool::new();

        let a = pool.alloc().unwrap();
        let b = pool.alloc().unwrap();
        let c = pool.alloc().unwrap();
        assert!(a != b && b != c && a != c);
        assert!(pool.alloc().is_none());
        assert!(pool.is_full());
        assert_eq!(pool.used_count(), 3);
    }

    #[test]
    fn test_blocks_are_aligned_for_t() {
        let pool: MemoryPool<u64, 4> = MemoryPool::new();
        while let Some(block) = pool.alloc() {
            assert_eq!(block.as_ptr() as usize % std::mem::align_of::<u64>(), 0);
        }
    }

    #[test]
    fn test_calloc_zeroes_reused_block() {
        let pool: MemoryPool<Sample, 1> = MemoryPool::new();

        let block = pool.alloc().unwrap();
        unsafe {
            block.as_ptr().write(Sample { id: 99, value: 1.5 });
            pool.free(block).unwrap();
        }

        let zeroed = pool.calloc().unwrap();
        assert_eq!(zeroed, block);
        assert_eq!(unsafe { *zeroed.as_ptr() }, Sample { id: 0, value: 0.0 });
    }

    #[test]
    fn test_free_rejects_double_free() {
        let pool: MemoryPool<u32, 2> = MemoryPool::new();
        let block = pool.alloc().unwrap();
        unsafe {
            assert_eq!(pool.free(block), Ok(()));
            assert_eq!(pool.free(block), Err(PoolError::NotAllocated { index: 0 }));
        }
        assert_eq!(pool.free_count(), 2);
    }

    #[test]
    fn test_free_rejects_foreign_block() {
        let pool: MemoryPool<u32, 2> = MemoryPool::new();
        let other: MemoryPool<u32, 2> = MemoryPool::new();
        let block = other.alloc().unwrap();

        assert!(!pool.owns(block));
        assert_eq!(unsafe { pool.free(block) }, Err(PoolError::OutOfRange));
        assert!(other.owns(block));
    }

    #[test]
    fn test_try_new_rejects_zero_sized_type() {
        assert_eq!(
            MemoryPool::<(), 4>::try_new().unwrap_err(),
            PoolError::ZeroBlockSize
        );
    }

    #[test]
    fn test_try_new_rejects_zero_capacity() {
        assert_eq!(MemoryPool::<u32, 0>::try_new().unwrap_err(), PoolError::ZeroCapacity);
    }

    #[test]
    #[should_panic(expected = "invalid memory pool geometry")]
    fn test_new_panics_on_sizing_bug() {
        let _pool: MemoryPool<u32, 0> = MemoryPool::new();
    }

    #[test]
    fn test_boxed_returns_value_when_exhausted() {
        let pool: MemoryPool<String, 1> = MemoryPool::new();
        let _held = pool.boxed("first".to_string()).unwrap();
        let rejected = pool.boxed("second".to_string()).unwrap_err();
        assert_eq!(rejected, "second");
    }

    #[test]
    fn test_stats_forwarded() {
        let pool: MemoryPool<u16, 4> = MemoryPool::new();
        let _a = pool.alloc().unwrap();
        let stats = pool.stats();
        assert_eq!(stats.block_size, 2);
        assert_eq!(stats.capacity, 4);
        assert_eq!(stats.used, 1);
        assert_eq!(pool.capacity(), 4);
    }

    #[test]
    fn test_debug_output() {
        let pool: MemoryPool<u8, 2> = MemoryPool::new();
        let text = format!("{pool:?}");
        assert!(text.contains("capacity: 2"));
        assert!(text.contains("u8"));
    }
}
