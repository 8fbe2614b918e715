//! Arena chunks
//!
//! A chunk is one contiguous buffer obtained from the backing allocator,
//! split by a bump offset into handed-out bytes `[0, used)` and free bytes
//! `[used, capacity)`.
//!
//! ## Invariants
//!
//! - `used <= capacity` at all times
//! - `used` only grows between resets
//! - the buffer never moves or changes size while the chunk exists

use core::alloc::Layout;
use core::cell::Cell;
use core::ptr::NonNull;

use crate::allocator::{Allocator, layout_for};
use crate::error::ArenaResult;

/// Capacity and fill level of one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkInfo {
    /// Bytes in the chunk buffer
    pub capacity: usize,
    /// Bytes handed out since creation or the last reset
    pub used: usize,
}

impl ChunkInfo {
    /// Bytes still free at the end of the chunk
    pub const fn remaining(&self) -> usize {
        self.capacity - self.used
    }
}

/// Memory chunk managed by the arena
///
/// The chunk does not free itself: the owning arena returns the buffer to
/// the allocator it came from via [`Chunk::release`].
pub(crate) struct Chunk {
    ptr: NonNull<u8>,
    layout: Layout,
    used: Cell<usize>,
}

impl Chunk {
    /// Obtains a `capacity`-byte buffer aligned to `align` from `allocator`
    pub(crate) fn allocate<A: Allocator>(
        allocator: &A,
        capacity: usize,
        align: usize,
    ) -> ArenaResult<Self> {
        let layout = layout_for(capacity, align)?;

        // SAFETY: layout is valid and non-zero (capacity >= 1 for every
        // caller); the block is exclusively ours until `release`.
        let block = unsafe { allocator.allocate(layout)? };

        Ok(Self {
            ptr: block.cast(),
            layout,
            used: Cell::new(0),
        })
    }

    /// Returns the buffer to `allocator`
    ///
    /// # Safety
    ///
    /// `allocator` must be the allocator this chunk was created with, and no
    /// pointer into the chunk may be used afterwards.
    pub(crate) unsafe fn release<A: Allocator>(self, allocator: &A) {
        // SAFETY: ptr/layout are exactly what `allocate` obtained.
        unsafe { allocator.deallocate(self.ptr, self.layout) };
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.layout.size()
    }

    #[inline]
    pub(crate) fn used(&self) -> usize {
        self.used.get()
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.capacity() - self.used()
    }

    pub(crate) fn info(&self) -> ChunkInfo {
        ChunkInfo {
            capacity: self.capacity(),
            used: self.used(),
        }
    }

    /// Whether `ptr` points into this chunk's buffer
    pub(crate) fn contains(&self, ptr: *const u8) -> bool {
        let start = self.ptr.as_ptr() as usize;
        let addr = ptr as usize;
        addr >= start && addr - start < self.capacity()
    }

    /// Carves `size` bytes aligned to `align` off the free tail
    ///
    /// Returns the block and the padding skipped to reach alignment, or
    /// `None` (leaving the chunk untouched) if the tail is too small.
    /// `align` must be a power of two.
    #[inline]
    pub(crate) fn try_bump(&self, size: usize, align: usize) -> Option<(NonNull<u8>, usize)> {
        debug_assert!(align.is_power_of_two());

        let used = self.used.get();
        let cursor = (self.ptr.as_ptr() as usize).wrapping_add(used);
        let padding = cursor.wrapping_neg() & (align - 1);
        let start = used.checked_add(padding)?;
        let end = start.checked_add(size)?;
        if end > self.capacity() {
            return None;
        }

        self.used.set(end);
        // SAFETY: start <= end <= capacity, so the offset stays inside
        // (or one past) the buffer.
        Some((unsafe { self.ptr.add(start) }, padding))
    }

    /// Rewinds the bump offset; capacity is kept
    #[inline]
    pub(crate) fn reset(&self) {
        self.used.set(0);
    }
}
