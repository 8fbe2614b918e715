//! System allocator backing
//!
//! The default source of chunk memory: a thin wrapper over the platform's
//! general-purpose allocator.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::NonNull;
use std::alloc::System;

use super::{Allocator, copy_reallocate, dangling_for};
use crate::error::{ArenaError, ArenaResult};

/// Wrapper for the system's default allocator
///
/// Stateless and thread-safe; every arena that does not name a backing
/// allocator uses this one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemAllocator;

impl SystemAllocator {
    /// Creates a new `SystemAllocator`
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

// SAFETY: Delegates to `std::alloc::System`, which upholds the contract for
// non-zero sizes; zero-sized layouts get a dangling, aligned pointer that is
// never dereferenced or freed.
unsafe impl Allocator for SystemAllocator {
    #[inline]
    unsafe fn allocate(&self, layout: Layout) -> ArenaResult<NonNull<[u8]>> {
        if layout.size() == 0 {
            return Ok(NonNull::slice_from_raw_parts(dangling_for(layout), 0));
        }

        // SAFETY: layout has non-zero size (checked above).
        let ptr = unsafe { System.alloc(layout) };
        NonNull::new(ptr)
            .map(|ptr| NonNull::slice_from_raw_parts(ptr, layout.size()))
            .ok_or_else(|| ArenaError::allocation_failed_with_layout(layout))
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }

        // SAFETY: ptr came from System.alloc with this layout (caller contract).
        unsafe { System.dealloc(ptr.as_ptr(), layout) };
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> ArenaResult<NonNull<[u8]>> {
        if old_layout.align() != new_layout.align()
            || old_layout.size() == 0
            || new_layout.size() == 0
        {
            // SAFETY: Same contract, handled by the copying fallback.
            return unsafe { copy_reallocate(self, ptr, old_layout, new_layout) };
        }

        // SAFETY: ptr/old_layout describe a live System block (caller
        // contract) and new_layout.size() is non-zero with the same alignment.
        let new_ptr = unsafe { System.realloc(ptr.as_ptr(), old_layout, new_layout.size()) };
        NonNull::new(new_ptr)
            .map(|ptr| NonNull::slice_from_raw_parts(ptr, new_layout.size()))
            .ok_or_else(|| ArenaError::allocation_failed_with_layout(new_layout))
    }
}
