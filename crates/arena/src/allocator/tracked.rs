//! Tracked allocator implementation
//!
//! Wraps another allocator and keeps byte and block counts, so callers can
//! check that an arena hands back every byte it took. An optional byte
//! budget turns the wrapper into a deterministic out-of-memory source.
//!
//! ## Invariants
//!
//! - Every successful allocation is counted exactly once
//! - Every deallocation subtracts what its allocation added
//! - Refused allocations only bump the failure counter

use core::alloc::Layout;
use core::fmt;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};

use super::{Allocator, SystemAllocator};
use crate::error::{ArenaError, ArenaResult};

/// Point-in-time copy of a [`TrackedAllocator`]'s counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackedStats {
    /// Bytes currently held by callers
    pub live_bytes: usize,
    /// Blocks currently held by callers
    pub live_blocks: usize,
    /// Highest `live_bytes` ever observed
    pub peak_bytes: usize,
    /// Successful allocations
    pub allocations: usize,
    /// Deallocations
    pub deallocations: usize,
    /// Refused allocations (budget or inner allocator)
    pub failures: usize,
}

impl fmt::Display for TrackedStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "live: {} bytes in {} blocks (peak {}), allocs: {}, frees: {}, failures: {}",
            self.live_bytes,
            self.live_blocks,
            self.peak_bytes,
            self.allocations,
            self.deallocations,
            self.failures
        )
    }
}

/// A wrapper allocator that tracks memory usage
#[derive(Debug)]
pub struct TrackedAllocator<A = SystemAllocator> {
    inner: A,
    limit: Option<usize>,
    live_bytes: AtomicUsize,
    live_blocks: AtomicUsize,
    peak_bytes: AtomicUsize,
    allocations: AtomicUsize,
    deallocations: AtomicUsize,
    failures: AtomicUsize,
}

impl<A> TrackedAllocator<A> {
    /// Creates a new tracker around `inner`
    pub const fn new(inner: A) -> Self {
        Self {
            inner,
            limit: None,
            live_bytes: AtomicUsize::new(0),
            live_blocks: AtomicUsize::new(0),
            peak_bytes: AtomicUsize::new(0),
            allocations: AtomicUsize::new(0),
            deallocations: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        }
    }

    /// Refuses any allocation that would push live bytes above `limit`
    #[must_use = "builder methods must be chained or built"]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Gets a reference to the underlying allocator
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Byte budget, if any
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Bytes currently allocated and not yet released
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::Relaxed)
    }

    /// Blocks currently allocated and not yet released
    pub fn live_blocks(&self) -> usize {
        self.live_blocks.load(Ordering::Relaxed)
    }

    /// Check if anything handed out has not come back
    pub fn has_leaks(&self) -> bool {
        self.live_blocks() != 0 || self.live_bytes() != 0
    }

    /// Get a statistics snapshot
    pub fn stats(&self) -> TrackedStats {
        TrackedStats {
            live_bytes: self.live_bytes(),
            live_blocks: self.live_blocks(),
            peak_bytes: self.peak_bytes.load(Ordering::Relaxed),
            allocations: self.allocations.load(Ordering::Relaxed),
            deallocations: self.deallocations.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    fn within_limit(&self, size: usize) -> bool {
        self.limit.is_none_or(|limit| {
            self.live_bytes()
                .checked_add(size)
                .is_some_and(|total| total <= limit)
        })
    }

    fn record_allocation(&self, size: usize) {
        let live = self.live_bytes.fetch_add(size, Ordering::Relaxed) + size;
        self.live_blocks.fetch_add(1, Ordering::Relaxed);
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.peak_bytes.fetch_max(live, Ordering::Relaxed);
    }

    fn record_deallocation(&self, size: usize) {
        self.live_bytes.fetch_sub(size, Ordering::Relaxed);
        self.live_blocks.fetch_sub(1, Ordering::Relaxed);
        self.deallocations.fetch_add(1, Ordering::Relaxed);
    }
}

impl<A: Default> Default for TrackedAllocator<A> {
    fn default() -> Self {
        Self::new(A::default())
    }
}

// SAFETY: Forwards to `A`; the bookkeeping never touches the blocks.
unsafe impl<A: Allocator> Allocator for TrackedAllocator<A> {
    unsafe fn allocate(&self, layout: Layout) -> ArenaResult<NonNull<[u8]>> {
        if !self.within_limit(layout.size()) {
            self.failures.fetch_add(1, Ordering::Relaxed);
            return Err(ArenaError::allocation_failed_with_layout(layout));
        }

        // SAFETY: Same contract as our caller's.
        match unsafe { self.inner.allocate(layout) } {
            Ok(block) => {
                self.record_allocation(layout.size());
                Ok(block)
            }
            Err(err) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                Err(err)
            }
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: ptr was allocated through self.inner with this layout.
        unsafe { self.inner.deallocate(ptr, layout) };
        self.record_deallocation(layout.size());
    }
}
