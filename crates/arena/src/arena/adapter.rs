//! Arena-backed allocator
//!
//! [`ArenaAllocator`] lets allocator-generic code (including another
//! [`Arena`]) draw memory from an arena through the [`Allocator`] trait.
//! Deallocation is a no-op: memory comes back only when the arena is reset
//! or dropped.

use core::alloc::Layout;
use core::ptr::NonNull;

use super::Arena;
use crate::allocator::{Allocator, copy_reallocate, dangling_for};
use crate::error::ArenaResult;

/// An arena-backed memory allocator
///
/// # Examples
///
/// ```
/// use std::alloc::Layout;
///
/// use nebula_arena::{Allocator, Arena};
///
/// let arena = Arena::new(256)?;
/// let allocator = arena.as_allocator();
///
/// let layout = Layout::from_size_align(64, 8).unwrap();
/// let block = unsafe { allocator.allocate(layout)? };
/// assert_eq!(block.len(), 64);
/// # Ok::<(), nebula_arena::ArenaError>(())
/// ```
pub struct ArenaAllocator<'a, A: Allocator> {
    arena: &'a Arena<A>,
}

impl<'a, A: Allocator> ArenaAllocator<'a, A> {
    /// Wraps a borrowed arena
    pub fn new(arena: &'a Arena<A>) -> Self {
        Self { arena }
    }

    /// Get a reference to the underlying arena
    pub fn arena(&self) -> &'a Arena<A> {
        self.arena
    }
}

impl<A: Allocator> Clone for ArenaAllocator<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: Allocator> Copy for ArenaAllocator<'_, A> {}

impl<A: Allocator> core::fmt::Debug for ArenaAllocator<'_, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ArenaAllocator")
            .field("arena", self.arena)
            .finish()
    }
}

// SAFETY: Blocks come from `Arena::alloc_aligned`, which hands out disjoint
// ranges aligned as requested; they stay valid while the borrowed arena is
// neither reset nor dropped, which the `'a` borrow rules out.
unsafe impl<A: Allocator> Allocator for ArenaAllocator<'_, A> {
    unsafe fn allocate(&self, layout: Layout) -> ArenaResult<NonNull<[u8]>> {
        if layout.size() == 0 {
            return Ok(NonNull::slice_from_raw_parts(dangling_for(layout), 0));
        }

        let ptr = self.arena.alloc_aligned(layout.size(), layout.align())?;
        Ok(NonNull::slice_from_raw_parts(ptr, layout.size()))
    }

    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {}

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> ArenaResult<NonNull<[u8]>> {
        // Shrinking keeps the block: its tail is simply never reused.
        if new_layout.size() <= old_layout.size()
            && (ptr.as_ptr() as usize).is_multiple_of(new_layout.align())
        {
            return Ok(NonNull::slice_from_raw_parts(ptr, new_layout.size()));
        }

        // SAFETY: Same contract as our caller's.
        unsafe { copy_reallocate(self, ptr, old_layout, new_layout) }
    }
}
