//! Allocator capability set
//!
//! [`Allocator`] is the seam on both sides of the arena:
//! - below it, as the backing allocator chunk buffers are obtained from
//!   ([`SystemAllocator`] by default, [`HookAllocator`] for a user-supplied
//!   function pair, [`TrackedAllocator`] for accounting);
//! - above it, as the interface allocator-aware code consumes through
//!   [`ArenaAllocator`](crate::arena::ArenaAllocator).
//!
//! # Safety
//!
//! Implementors must return blocks that are valid for reads and writes of
//! `layout.size()` bytes, aligned to `layout.align()`, and not aliased by any
//! other live block from the same allocator.

use core::alloc::Layout;
use core::ptr::{self, NonNull};

use crate::error::{ArenaError, ArenaResult};

mod hook;
mod system;
mod tracked;

pub use self::hook::{AllocFn, DeallocFn, HookAllocator};
pub use self::system::SystemAllocator;
pub use self::tracked::{TrackedAllocator, TrackedStats};

/// Generic allocator interface
///
/// # Safety
///
/// See the module documentation for the contract on returned blocks.
pub unsafe trait Allocator {
    /// Allocates a block described by `layout`
    ///
    /// # Safety
    ///
    /// `layout.align()` must be a power of two (guaranteed by [`Layout`]).
    /// The returned memory is uninitialized.
    unsafe fn allocate(&self, layout: Layout) -> ArenaResult<NonNull<[u8]>>;

    /// Releases a block
    ///
    /// # Safety
    ///
    /// - `ptr` must have been returned by `allocate` on this allocator
    /// - `layout` must be the layout it was allocated with
    /// - `ptr` must not be used afterwards
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Resizes a block
    ///
    /// An unchanged layout returns the same block. Anything else allocates a
    /// new block, copies the overlapping prefix over and releases the old
    /// block. On error the old block is left untouched.
    ///
    /// # Safety
    ///
    /// Same requirements as [`deallocate`](Self::deallocate) for `ptr` and
    /// `old_layout`. On success the old pointer must no longer be used.
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> ArenaResult<NonNull<[u8]>> {
        unsafe { copy_reallocate(self, ptr, old_layout, new_layout) }
    }
}

/// Allocate + copy + deallocate resize shared by [`Allocator`] implementors
///
/// # Safety
///
/// Same contract as [`Allocator::reallocate`].
pub(crate) unsafe fn copy_reallocate<A: Allocator + ?Sized>(
    allocator: &A,
    ptr: NonNull<u8>,
    old_layout: Layout,
    new_layout: Layout,
) -> ArenaResult<NonNull<[u8]>> {
    if old_layout == new_layout {
        return Ok(NonNull::slice_from_raw_parts(ptr, new_layout.size()));
    }

    // SAFETY: new_layout is a valid Layout; the block is fresh.
    let new_ptr = unsafe { allocator.allocate(new_layout)? };
    let copy_len = old_layout.size().min(new_layout.size());

    // SAFETY: Copying old contents into the new block.
    // - ptr is valid for old_layout.size() reads (caller contract)
    // - new_ptr is valid for new_layout.size() writes (just allocated)
    // - the blocks are distinct live allocations, so they do not overlap
    unsafe {
        ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.cast::<u8>().as_ptr(), copy_len);
        allocator.deallocate(ptr, old_layout);
    }

    Ok(new_ptr)
}

// SAFETY: Forwards every call to `A`, preserving its contract.
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    unsafe fn allocate(&self, layout: Layout) -> ArenaResult<NonNull<[u8]>> {
        unsafe { (**self).allocate(layout) }
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { (**self).deallocate(ptr, layout) }
    }

    #[inline]
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> ArenaResult<NonNull<[u8]>> {
        unsafe { (**self).reallocate(ptr, old_layout, new_layout) }
    }
}

/// Non-null, `layout`-aligned address for an empty block
#[inline]
pub(crate) fn dangling_for(layout: Layout) -> NonNull<u8> {
    NonNull::new(ptr::without_provenance_mut::<u8>(layout.align())).unwrap_or(NonNull::dangling())
}

/// Builds a layout, mapping overflow to [`ArenaError::SizeOverflow`]
#[inline]
pub(crate) fn layout_for(size: usize, align: usize) -> ArenaResult<Layout> {
    if !align.is_power_of_two() {
        return Err(ArenaError::invalid_alignment(align));
    }
    Layout::from_size_align(size, align).map_err(|_| ArenaError::size_overflow("layout size"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_for_rejects_bad_alignment() {
        assert_eq!(layout_for(8, 3), Err(ArenaError::invalid_alignment(3)));
    }

    #[test]
    fn layout_for_rejects_overflow() {
        assert_eq!(
            layout_for(usize::MAX, 16),
            Err(ArenaError::size_overflow("layout size"))
        );
    }

    #[test]
    fn default_reallocate_grows_and_keeps_contents() {
        let allocator = SystemAllocator::new();
        let old = Layout::from_size_align(4, 1).unwrap();
        let new = Layout::from_size_align(64, 1).unwrap();

        unsafe {
            let block = allocator.allocate(old).unwrap().cast::<u8>();
            block.as_ptr().copy_from_nonoverlapping([1u8, 2, 3, 4].as_ptr(), 4);

            let grown = allocator.reallocate(block, old, new).unwrap();
            assert_eq!(grown.len(), 64);
            let bytes = core::slice::from_raw_parts(grown.cast::<u8>().as_ptr(), 4);
            assert_eq!(bytes, &[1, 2, 3, 4]);

            allocator.deallocate(grown.cast(), new);
        }
    }

    #[test]
    fn default_reallocate_same_layout_is_identity() {
        let allocator = SystemAllocator::new();
        let layout = Layout::from_size_align(64, 8).unwrap();

        unsafe {
            let block = allocator.allocate(layout).unwrap().cast::<u8>();
            let same = allocator.reallocate(block, layout, layout).unwrap();
            assert_eq!(same.cast::<u8>(), block);
            assert_eq!(same.len(), 64);
            allocator.deallocate(block, layout);
        }
    }
}
