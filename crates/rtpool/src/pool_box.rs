//! # Pool Box
//!
//! An owning handle to one value living in a [`MemoryPool`] block. Dropping
//! the handle drops the value and releases the block.

#![allow(unsafe_code)]

use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::memory_pool::MemoryPool;

/// Owning handle to a `T` stored in a pool block.
///
/// Borrows the pool, so the pool cannot move or drop while the handle
/// lives.
///
/// ## Usage
///
/// ```rust,ignore
/// let pool: MemoryPool<Packet, 32> = MemoryPool::new();
///
/// let mut packet = pool.boxed(Packet::default()).map_err(|_| Exhausted)?;
/// packet.len = 12;
///
/// // Block is released automatically when `packet` goes out of scope
/// ```
pub struct PoolBox<'a, T, const N: usize> {
    pool: &'a MemoryPool<T, N>,
    block: NonNull<T>,
    _owns: PhantomData<T>,
}

impl<'a, T, const N: usize> PoolBox<'a, T, N> {
    /// Wraps a block that already holds a value.
    ///
    /// # Safety
    ///
    /// `block` must be a currently allocated block of `pool`, owned by the
    /// caller, holding an initialised `T`. Ownership of both moves into the
    /// returned handle.
    #[inline]
    #[must_use]
    pub unsafe fn from_raw(pool: &'a MemoryPool<T, N>, block: NonNull<T>) -> Self {
        Self {
            pool,
            block,
            _owns: PhantomData,
        }
    }

    /// Gives up the handle without dropping the value or releasing the block.
    ///
    /// The caller becomes responsible for dropping the value and for
    /// calling [`MemoryPool::free`].
    #[inline]
    #[must_use]
    pub fn into_raw(this: Self) -> NonNull<T> {
        ManuallyDrop::new(this).block
    }

    /// Moves the value out and releases the block.
    #[must_use]
    pub fn into_inner(this: Self) -> T {
        let this = ManuallyDrop::new(this);
        // SAFETY: the block holds an initialised `T` owned by this handle,
        // and the handle is never used again.
        let value = unsafe { this.block.as_ptr().read() };
        // SAFETY: the block belongs to `pool` and the value was moved out.
        let released = unsafe { this.pool.free(this.block) };
        debug_assert!(released.is_ok(), "pool box released a foreign block");
        value
    }

    /// Address of the block.
    #[inline]
    #[must_use]
    pub fn as_ptr(this: &Self) -> NonNull<T> {
        this.block
    }
}

impl<T, const N: usize> Deref for PoolBox<'_, T, N> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: the handle owns an initialised `T` in a live block.
        unsafe { self.block.as_ref() }
    }
}

impl<T, const N: usize> DerefMut for PoolBox<'_, T, N> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the handle owns the block exclusively.
        unsafe { self.block.as_mut() }
    }
}

impl<T, const N: usize> Drop for PoolBox<'_, T, N> {
    fn drop(&mut self) {
        // SAFETY: the handle owns an initialised `T`; after dropping it the
        // block is released exactly once and never touched again.
        unsafe {
            std::ptr::drop_in_place(self.block.as_ptr());
            let released = self.pool.free(self.block);
            debug_assert!(released.is_ok(), "pool box released a foreign block");
        }
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for PoolBox<'_, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

// SAFETY: the handle owns a `T` and shares the pool; moving it to another
// thread moves the `T` (needs `T: Send`) and releases through `&MemoryPool`,
// which is `Sync` when `T: Send`.
unsafe impl<T: Send, const N: usize> Send for PoolBox<'_, T, N> {}
// SAFETY: `&PoolBox` only hands out `&T`.
unsafe impl<T: Send + Sync, const N: usize> Sync for PoolBox<'_, T, N> {}
