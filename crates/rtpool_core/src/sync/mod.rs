//! # Lock-Free Slot Tracking
//!
//! The free-tracking structure shared by every execution context that
//! touches a pool, interrupt handlers included.
//!
//! ## The Problem
//!
//! ```text
//! Thread / ISR A:  pop slot 3 ──┐
//! Thread / ISR B:  pop slot 3 ──┴─> same block handed out twice
//! ```
//!
//! ## The Solution: Tagged Compare-And-Swap
//!
//! Every mutation of the free list is one compare-and-swap on a single
//! head word. Nothing is held across the call, so a preempted context
//! never stalls another one, and interrupts are never masked.

mod free_list;

pub use free_list::{FreeList, SlotLink};
