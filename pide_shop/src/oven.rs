//! The oven: a counting gate bounding how many orders cook at the same time.
//!
//! Cooks take an [`OvenSlot`] before an order enters Cooking and keep it until the
//! order leaves Cooking. The slot is given back when it is dropped, so it is returned
//! exactly once whatever happens to the order. The gate has its own lock, independent
//! of the shop state lock, and waiting for a slot never times out.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::trace;

#[derive(Debug)]
pub struct Oven {
    in_use: Mutex<usize>,
    slot_freed: Condvar,
    capacity: usize,
    peak_in_use: AtomicUsize,
    total_slots_taken: AtomicUsize,
}

impl Oven {
    /// Creates an empty oven with room for `capacity` orders.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "oven capacity must be > 0");
        Oven {
            in_use: Mutex::new(0),
            slot_freed: Condvar::new(),
            capacity,
            peak_in_use: AtomicUsize::new(0),
            total_slots_taken: AtomicUsize::new(0),
        }
    }

    /// Takes a slot, waiting as long as needed for one to be free.
    pub fn acquire(&self) -> OvenSlot<'_> {
        let mut in_use = self.lock();
        while *in_use >= self.capacity {
            in_use = self
                .slot_freed
                .wait(in_use)
                .unwrap_or_else(PoisonError::into_inner);
        }
        self.take(&mut in_use)
    }

    /// Takes a slot only if one is free right now.
    pub fn try_acquire(&self) -> Option<OvenSlot<'_>> {
        let mut in_use = self.lock();
        if *in_use >= self.capacity {
            return None;
        }
        Some(self.take(&mut in_use))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Orders currently holding a slot.
    pub fn in_use(&self) -> usize {
        *self.lock()
    }

    /// Highest number of slots ever held at the same time.
    pub fn peak(&self) -> usize {
        self.peak_in_use.load(Ordering::Relaxed)
    }

    /// Slots handed out since the oven was built.
    pub fn total_slots_taken(&self) -> usize {
        self.total_slots_taken.load(Ordering::Relaxed)
    }

    fn take(&self, in_use: &mut MutexGuard<'_, usize>) -> OvenSlot<'_> {
        **in_use += 1;
        self.peak_in_use.fetch_max(**in_use, Ordering::Relaxed);
        self.total_slots_taken.fetch_add(1, Ordering::Relaxed);
        trace!(in_use = **in_use, capacity = self.capacity, "oven slot taken");
        OvenSlot { oven: self }
    }

    fn release(&self) {
        let mut in_use = self.lock();
        *in_use -= 1;
        trace!(in_use = *in_use, capacity = self.capacity, "oven slot released");
        drop(in_use);
        self.slot_freed.notify_one();
    }

    // a counter is consistent after any panic, so poisoning is ignored
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.in_use.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A place in the oven. Dropping it frees the place.
#[must_use = "the oven slot is released as soon as it is dropped"]
#[derive(Debug)]
pub struct OvenSlot<'a> {
    oven: &'a Oven,
}

impl Drop for OvenSlot<'_> {
    fn drop(&mut self) {
        self.oven.release();
    }
}
