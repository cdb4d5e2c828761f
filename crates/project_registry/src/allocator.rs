//! Project ID Allocator
//!
//! Monotonic, lock-free generator of project IDs. The counter holds the last
//! value handed out, so `next()` always returns `seed + 1` first.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{RegistryError, Result};

#[derive(Debug, Default)]
pub struct ProjectIdAllocator {
    last: AtomicU32,
}

impl ProjectIdAllocator {
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    pub fn with_seed(seed: u32) -> Self {
        Self {
            last: AtomicU32::new(seed),
        }
    }

    /// Hand out the next ID. Distinct across concurrent callers.
    ///
    /// Fails once `u32::MAX` has been handed out; the counter never wraps.
    pub fn next(&self) -> Result<u32> {
        self.last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| last.checked_add(1))
            .map(|last| last + 1)
            .map_err(|_| RegistryError::IdsExhausted)
    }

    /// Reset the counter so the following `next()` returns `seed + 1`.
    ///
    /// Used after restoring persisted projects, so fresh IDs don't collide
    /// with ones already stored.
    pub fn reseed(&self, seed: u32) {
        self.last.store(seed, Ordering::SeqCst);
    }

    /// Last ID handed out (or the seed, if none since reseeding).
    pub fn current(&self) -> u32 {
        self.last.load(Ordering::SeqCst)
    }
}
