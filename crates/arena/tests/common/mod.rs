//! Shared helpers for integration tests

#![allow(dead_code, unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

use nebula_arena::allocator::SystemAllocator;
use nebula_arena::{Allocator, ArenaError, ArenaResult};

/// Backing allocator that serves `budget` requests, then refuses every
/// request after that
#[derive(Debug)]
pub struct FailingAllocator {
    remaining: AtomicUsize,
    refused: AtomicUsize,
}

impl FailingAllocator {
    /// Serves the first `budget` allocations
    pub fn after(budget: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(budget),
            refused: AtomicUsize::new(0),
        }
    }

    /// Refuses everything, including the very first chunk
    pub fn always() -> Self {
        Self::after(0)
    }

    pub fn refused(&self) -> usize {
        self.refused.load(Ordering::Relaxed)
    }
}

unsafe impl Allocator for FailingAllocator {
    unsafe fn allocate(&self, layout: Layout) -> ArenaResult<NonNull<[u8]>> {
        let granted = self
            .remaining
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();
        if !granted {
            self.refused.fetch_add(1, Ordering::Relaxed);
            return Err(ArenaError::allocation_failed_with_layout(layout));
        }
        unsafe { SystemAllocator.allocate(layout) }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { SystemAllocator.deallocate(ptr, layout) }
    }
}

/// Deterministic byte pattern seeded by `seed`
pub fn pattern(seed: u8, len: usize) -> Vec<u8> {
    (0..len).map(|i| seed.wrapping_add(i as u8).wrapping_mul(31)).collect()
}

/// Installs a test-writer `tracing` subscriber once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("nebula_arena=debug")),
        )
        .with_test_writer()
        .try_init();
}
