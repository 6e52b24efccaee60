//! # Pool Storage
//!
//! Where a pool's arena and control records live. The pool never allocates
//! either: they come from the caller, borrowed from a static or a stack
//! frame ([`SliceStorage`]), or embedded inline in a larger value.

#![allow(unsafe_code)]

use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::sync::SlotLink;

/// Backing memory for a [`BlockPool`](crate::BlockPool).
///
/// # Safety
///
/// Implementors must guarantee that, for as long as the storage value is
/// neither moved nor dropped:
///
/// - [`arena`](Self::arena) returns the same pointer on every call, and it
///   is valid for reads and writes of [`arena_len`](Self::arena_len) bytes
///   through a shared reference to the storage.
/// - No other code reads or writes the arena except through pointers handed
///   out by the pool.
/// - [`links`](Self::links) returns the same slice on every call.
pub unsafe trait PoolStorage {
    /// Base address of the arena.
    fn arena(&self) -> NonNull<u8>;

    /// Length of the arena in bytes.
    fn arena_len(&self) -> usize;

    /// One control record per block.
    fn links(&self) -> &[SlotLink];
}

/// Storage borrowed from caller-owned slices.
///
/// ```rust,ignore
/// let mut arena = [0u8; 256];
/// let mut links: [SlotLink; 8] = Default::default();
/// let storage = SliceStorage::new(&mut arena, &mut links);
/// ```
pub struct SliceStorage<'a> {
    arena: NonNull<u8>,
    len: usize,
    links: &'a [SlotLink],
    _marker: PhantomData<&'a mut [u8]>,
}

impl<'a> SliceStorage<'a> {
    /// Borrows `arena` and `links` exclusively for the life of the storage.
    ///
    /// Sizes are not checked here; the pool checks them against its config.
    #[must_use]
    pub fn new(arena: &'a mut [u8], links: &'a mut [SlotLink]) -> Self {
        Self {
            len: arena.len(),
            arena: NonNull::from(arena).cast(),
            links,
            _marker: PhantomData,
        }
    }
}

// SAFETY: the pointer comes from a `&'a mut [u8]` that this value holds for
// `'a`, so it stays fixed and unaliased while the storage exists.
unsafe impl PoolStorage for SliceStorage<'_> {
    #[inline]
    fn arena(&self) -> NonNull<u8> {
        self.arena
    }

    #[inline]
    fn arena_len(&self) -> usize {
        self.len
    }

    #[inline]
    fn links(&self) -> &[SlotLink] {
        self.links
    }
}

// SAFETY: SliceStorage stands in for `&mut [u8]` and `&[SlotLink]`, both of
// which are Send and Sync. Blocks are only reached through pool handouts.
unsafe impl Send for SliceStorage<'_> {}
// SAFETY: see above.
unsafe impl Sync for SliceStorage<'_> {}

impl std::fmt::Debug for SliceStorage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SliceStorage")
            .field("arena", &self.arena)
            .field("len", &self.len)
            .field("links", &self.links.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_storage_reports_borrowed_regions() {
        let mut arena = [0u8; 24];
        let mut links: Vec<SlotLink> = (0..3).map(|_| SlotLink::new()).collect();
        let base = arena.as_ptr();

        let storage = SliceStorage::new(&mut arena, &mut links);
        assert_eq!(storage.arena().as_ptr().cast_const(), base);
        assert_eq!(storage.arena_len(), 24);
        assert_eq!(storage.links().len(), 3);
    }

    #[test]
    fn test_stack_arrays_back_a_pool() {
        let mut arena = [0u8; 256];
        let mut links: [SlotLink; 8] = Default::default();
        let storage = SliceStorage::new(&mut arena, &mut links);
        assert_eq!(storage.arena_len(), 256);
        assert_eq!(storage.links().len(), 8);

        let pool = crate::BlockPool::new(crate::PoolConfig::new(32, 8), storage).unwrap();
        assert_eq!(pool.capacity(), 8);
    }

    #[test]
    fn test_empty_arena_is_dangling_but_non_null() {
        let mut arena: [u8; 0] = [];
        let mut links: [SlotLink; 0] = [];
        let storage = SliceStorage::new(&mut arena, &mut links);
        assert_eq!(storage.arena_len(), 0);
        assert!(storage.links().is_empty());
    }
}
