//! # Tagged Free List
//!
//! A Treiber stack of slot indices. The links live in a control array
//! (`[SlotLink]`) beside the arena rather than inside the free blocks, so a
//! context reading a stale link never races with the owner of that block.
//!
//! The head is a single word split in two halves:
//! - Lower half: index of the first free slot (`NIL` when empty)
//! - Upper half: ABA tag, bumped on every successful update
//!
//! A context that was preempted between loading the head and swapping it
//! will see its compare-and-swap fail, even if the same index made it back
//! to the top of the stack in the meantime.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Slot state: on the free list.
const FREE: u8 = 0;

/// Slot state: handed out to a caller.
const ALLOCATED: u8 = 1;

/// Per-slot control record.
///
/// One per block. Holds the next-free index while the slot is on the free
/// list and the FREE/ALLOCATED state used to reject double releases.
#[derive(Debug)]
pub struct SlotLink {
    /// Index of the next free slot, or `FreeList::NIL`.
    next: AtomicUsize,
    /// `FREE` or `ALLOCATED`.
    state: AtomicU8,
}

impl SlotLink {
    /// Creates an unlinked, free slot record.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicUsize::new(FreeList::NIL),
            state: AtomicU8::new(FREE),
        }
    }

    /// Returns whether the slot is currently handed out.
    #[inline]
    #[must_use]
    pub fn is_allocated(&self) -> bool {
        self.state.load(Ordering::Acquire) == ALLOCATED
    }

    /// Marks a freshly popped slot as handed out.
    #[inline]
    pub(crate) fn mark_allocated(&self) {
        self.state.store(ALLOCATED, Ordering::Release);
    }

    /// Flips ALLOCATED to FREE. Only one of several racing callers wins.
    #[inline]
    pub(crate) fn try_mark_free(&self) -> bool {
        self.state
            .compare_exchange(ALLOCATED, FREE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for SlotLink {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock-free LIFO stack of free slot indices.
#[derive(Debug)]
pub struct FreeList {
    /// Packed `(tag, index)` head word.
    head: AtomicUsize,
}

impl FreeList {
    /// Bits reserved for the slot index.
    const INDEX_BITS: u32 = usize::BITS / 2;

    /// Mask selecting the index half of the head word.
    const INDEX_MASK: usize = (1 << Self::INDEX_BITS) - 1;

    /// Sentinel index marking the end of the list.
    pub const NIL: usize = Self::INDEX_MASK;

    /// Largest number of slots the list can index on this target.
    pub const MAX_CAPACITY: usize = Self::INDEX_MASK;

    #[inline]
    const fn pack(index: usize, tag: usize) -> usize {
        (tag << Self::INDEX_BITS) | index
    }

    #[inline]
    const fn index(word: usize) -> usize {
        word & Self::INDEX_MASK
    }

    #[inline]
    const fn next_tag(word: usize) -> usize {
        ((word >> Self::INDEX_BITS) + 1) & Self::INDEX_MASK
    }

    /// Links every slot in index order (slot 0 at the head) and marks
    /// them all free.
    ///
    /// # Panics
    ///
    /// Panics if `links` holds more than [`Self::MAX_CAPACITY`] entries.
    #[must_use]
    pub fn new(links: &[SlotLink]) -> Self {
        assert!(
            links.len() <= Self::MAX_CAPACITY,
            "free list cannot index {} slots",
            links.len()
        );

        let count = links.len();
        for (index, link) in links.iter().enumerate() {
            let next = if index + 1 < count { index + 1 } else { Self::NIL };
            link.next.store(next, Ordering::Relaxed);
            link.state.store(FREE, Ordering::Relaxed);
        }

        let first = if count == 0 { Self::NIL } else { 0 };
        Self {
            head: AtomicUsize::new(Self::pack(first, 0)),
        }
    }

    /// Index at the top of the stack, if any.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<usize> {
        let index = Self::index(self.head.load(Ordering::Acquire));
        (index != Self::NIL).then_some(index)
    }

    /// Returns whether no slot is free.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.peek().is_none()
    }

    /// Claims the top slot. Never blocks; returns `None` when empty.
    ///
    /// `links` must be the array this list was built over.
    pub(crate) fn pop(&self, links: &[SlotLink]) -> Option<usize> {
        let mut current = self.head.load(Ordering::Acquire);
        loop {
            let index = Self::index(current);
            if index == Self::NIL {
                return None;
            }

            // May be stale if another context moved `index` in the
            // meantime; the tag makes the swap below fail in that case.
            let next = links[index].next.load(Ordering::Relaxed);
            let replacement = Self::pack(next, Self::next_tag(current));

            match self.head.compare_exchange_weak(
                current,
                replacement,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(index),
                Err(observed) => current = observed,
            }
        }
    }

    /// Returns a slot to the top of the stack.
    ///
    /// The `Release` swap publishes everything the caller wrote to the
    /// block before the next `pop` can hand it out again.
    ///
    /// `index` must be a slot of `links` that is not on the list.
    pub(crate) fn push(&self, links: &[SlotLink], index: usize) {
        debug_assert!(index < links.len());

        let mut current = self.head.load(Ordering::Relaxed);
        loop {
            links[index].next.store(Self::index(current), Ordering::Relaxed);
            let replacement = Self::pack(index, Self::next_tag(current));

            match self.head.compare_exchange_weak(
                current,
                replacement,
                Ordering::Release,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }
}
