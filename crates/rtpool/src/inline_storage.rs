//! # Inline Storage
//!
//! Arena and control records embedded directly in a value, sized at compile
//! time from `T` and `N`. No pointer to anything outside `self`.

#![allow(unsafe_code)]

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr::NonNull;

use rtpool_core::{PoolStorage, SlotLink};

/// Room for `N` values of `T` plus one [`SlotLink`] per value.
///
/// The arena starts zeroed. Moving the storage moves the arena, so any raw
/// block pointer handed out before the move dangles afterwards.
pub struct InlineStorage<T, const N: usize> {
    arena: UnsafeCell<[MaybeUninit<T>; N]>,
    links: [SlotLink; N],
}

impl<T, const N: usize> InlineStorage<T, N> {
    /// Creates zeroed storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            arena: UnsafeCell::new(std::array::from_fn(|_| MaybeUninit::zeroed())),
            links: std::array::from_fn(|_| SlotLink::new()),
        }
    }
}

impl<T, const N: usize> Default for InlineStorage<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: the arena is owned by `self`, reached only through the pointer
// below (derived from the `UnsafeCell`, so writes through a shared reference
// are allowed), and keeps its address until `self` moves. `links` is a
// plain field.
unsafe impl<T, const N: usize> PoolStorage for InlineStorage<T, N> {
    #[inline]
    fn arena(&self) -> NonNull<u8> {
        // SAFETY: `UnsafeCell::get` on a live field is never null.
        unsafe { NonNull::new_unchecked(self.arena.get().cast::<u8>()) }
    }

    #[inline]
    fn arena_len(&self) -> usize {
        std::mem::size_of::<[T; N]>()
    }

    #[inline]
    fn links(&self) -> &[SlotLink] {
        &self.links
    }
}

// SAFETY: values of `T` are written in one context and may be read or
// dropped in another, which is exactly what `T: Send` permits. All shared
// bookkeeping is atomic.
unsafe impl<T: Send, const N: usize> Sync for InlineStorage<T, N> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_type() {
        let storage = InlineStorage::<u64, 5>::new();
        assert_eq!(storage.arena_len(), 40);
        assert_eq!(storage.links().len(), 5);
        assert_eq!(storage.arena().as_ptr() as usize % std::mem::align_of::<u64>(), 0);
    }

    #[test]
    fn test_starts_zeroed() {
        let storage = InlineStorage::<[u8; 4], 3>::new();
        let bytes = unsafe { std::slice::from_raw_parts(storage.arena().as_ptr(), storage.arena_len()) };
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zero_sized_type_has_empty_arena() {
        let storage = InlineStorage::<(), 4>::new();
        assert_eq!(storage.arena_len(), 0);
    }
}
