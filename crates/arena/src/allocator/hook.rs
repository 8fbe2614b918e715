//! User-supplied allocate/free pair
//!
//! Lets an embedder route arena chunk memory through its own allocator
//! without writing an [`Allocator`] impl: hand over two plain functions with
//! the same shape as [`std::alloc::alloc`] and [`std::alloc::dealloc`].

use core::alloc::Layout;
use core::fmt;
use core::ptr::NonNull;

use super::{Allocator, dangling_for};
use crate::error::{ArenaError, ArenaResult};

/// Allocation half of a hook pair; returns null on failure
///
/// Never called with a zero-sized layout.
pub type AllocFn = unsafe fn(Layout) -> *mut u8;

/// Release half of a hook pair
///
/// Receives exactly the pointer and layout of an earlier [`AllocFn`] call.
pub type DeallocFn = unsafe fn(*mut u8, Layout);

/// Allocator built from an [`AllocFn`] / [`DeallocFn`] pair
#[derive(Clone, Copy)]
pub struct HookAllocator {
    alloc: AllocFn,
    dealloc: DeallocFn,
}

impl HookAllocator {
    /// Creates an allocator from a user-supplied pair
    ///
    /// # Safety
    ///
    /// `alloc` must return either null or a block valid for `layout`, and
    /// `dealloc` must accept every block `alloc` returned.
    pub const unsafe fn new(alloc: AllocFn, dealloc: DeallocFn) -> Self {
        Self { alloc, dealloc }
    }

    /// The global allocator, expressed as a hook pair
    pub const fn global() -> Self {
        Self {
            alloc: std::alloc::alloc,
            dealloc: std::alloc::dealloc,
        }
    }
}

impl Default for HookAllocator {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Debug for HookAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookAllocator")
            .field("alloc", &(self.alloc as *const ()))
            .field("dealloc", &(self.dealloc as *const ()))
            .finish()
    }
}

// SAFETY: `new` makes the caller vouch for the pair; `global` uses the
// standard global allocator functions.
unsafe impl Allocator for HookAllocator {
    unsafe fn allocate(&self, layout: Layout) -> ArenaResult<NonNull<[u8]>> {
        if layout.size() == 0 {
            return Ok(NonNull::slice_from_raw_parts(dangling_for(layout), 0));
        }

        // SAFETY: non-zero layout; the pair's contract is upheld by `new`.
        let ptr = unsafe { (self.alloc)(layout) };
        NonNull::new(ptr)
            .map(|ptr| NonNull::slice_from_raw_parts(ptr, layout.size()))
            .ok_or_else(|| ArenaError::allocation_failed_with_layout(layout))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }

        // SAFETY: ptr came from `self.alloc` with this layout (caller contract).
        unsafe { (self.dealloc)(ptr.as_ptr(), layout) };
    }
}
