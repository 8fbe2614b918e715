//! Chunked bump arena
//!
//! # Safety
//!
//! This module implements a single-threaded, chunked bump allocator:
//! - `RefCell` around the chunk table (runtime borrow checking)
//! - `Cell` bump offsets inside every chunk
//! - chunk buffers come from, and go back to, the arena's backing allocator
//!
//! ## Invariants
//!
//! - After construction the arena owns at least one chunk
//! - Every chunk has `used <= capacity` and at least `chunk_size` capacity
//! - Handed-out ranges never overlap until the next `reset`
//! - Chunk buffers are never moved or resized, so handed-out pointers stay
//!   valid across later allocations
//! - `reset` rewinds offsets but never changes which chunks are owned
//!
//! ## Allocation policy
//!
//! First-fit over the chunks, newest first. A request no chunk can hold gets
//! a fresh chunk of `max(chunk_size, size)` bytes, which becomes the newest.
//! Older chunks keep serving small requests after an oversized allocation
//! forced a large chunk in.
//!
//! ## Not Thread-Safe
//!
//! - `Arena` is `Send` (when its allocator is) but never `Sync`
//! - Share an arena across threads only behind external synchronisation

use core::alloc::Layout;
use core::cell::RefCell;
use core::mem::MaybeUninit;
use core::ptr::{self, NonNull};

use super::chunk::{Chunk, ChunkInfo};
use super::{ArenaAllocator, ArenaConfig, ArenaStats, ArenaStatsSnapshot};
use crate::allocator::{Allocator, SystemAllocator};
use crate::error::{ArenaError, ArenaResult};
use crate::log;

/// Chunked bump-pointer arena
///
/// Individual allocations are never freed. [`reset`](Arena::reset) makes all
/// capacity reusable at once, dropping the arena returns every chunk to the
/// backing allocator `A`.
///
/// # Examples
///
/// ```
/// use nebula_arena::Arena;
///
/// let mut arena = Arena::new(64)?;
/// let name = arena.alloc_str("frame-local")?;
/// let scratch = arena.alloc_slice_copy(&[1u32, 2, 3])?;
/// assert_eq!(name, "frame-local");
/// assert_eq!(scratch, &[1, 2, 3]);
///
/// arena.reset();
/// assert_eq!(arena.used(), 0);
/// # Ok::<(), nebula_arena::ArenaError>(())
/// ```
pub struct Arena<A: Allocator = SystemAllocator> {
    /// Oldest chunk first; the newest chunk (the list head) is last
    chunks: RefCell<Vec<Chunk>>,
    config: ArenaConfig,
    stats: ArenaStats,
    allocator: A,
}

// SAFETY: The arena exclusively owns its chunk buffers; nothing else holds
// them. Moving it to another thread moves that ownership with it, as long as
// the backing allocator may move too. Cell/RefCell keep it `!Sync`.
unsafe impl<A: Allocator + Send> Send for Arena<A> {}

impl Arena<SystemAllocator> {
    /// Creates an arena whose chunks hold at least `chunk_size` bytes
    ///
    /// The first chunk is allocated immediately.
    pub fn new(chunk_size: usize) -> ArenaResult<Self> {
        Self::with_config(ArenaConfig::new().with_chunk_size(chunk_size))
    }

    /// Creates an arena from a full configuration
    pub fn with_config(config: ArenaConfig) -> ArenaResult<Self> {
        Self::with_allocator(config, SystemAllocator::new())
    }
}

impl<A: Allocator> Arena<A> {
    /// Creates an arena that takes its chunks from `allocator`
    ///
    /// Fails if the configuration is invalid or the first chunk cannot be
    /// obtained; nothing is leaked in either case.
    pub fn with_allocator(config: ArenaConfig, allocator: A) -> ArenaResult<Self> {
        config.validate()?;

        let arena = Self {
            chunks: RefCell::new(Vec::new()),
            config,
            stats: ArenaStats::new(),
            allocator,
        };

        {
            let mut chunks = arena.chunks.borrow_mut();
            let chunk = arena.new_chunk(&mut chunks, arena.config.chunk_size)?;
            chunks.push(chunk);
            log::debug!(
                capacity = arena.config.chunk_size,
                "arena created with initial chunk"
            );
        }

        Ok(arena)
    }

    /// Allocates `size` raw bytes
    ///
    /// No alignment beyond the chunk buffer's own is applied: the block
    /// starts exactly where the previous allocation in its chunk ended.
    /// The memory is uninitialized and stays valid until the next
    /// [`reset`](Self::reset) or until the arena is dropped.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::ZeroSized`] for `size == 0`
    /// - [`ArenaError::SizeOverflow`] if no chunk for `size` can be described
    /// - [`ArenaError::AllocationFailed`] if the backing allocator refuses
    ///
    /// The arena is unchanged on error.
    #[inline]
    pub fn alloc(&self, size: usize) -> ArenaResult<NonNull<u8>> {
        self.alloc_aligned(size, 1)
    }

    /// Allocates `size` bytes starting at a multiple of `align`
    ///
    /// Same first-fit policy as [`alloc`](Self::alloc); a chunk fits when
    /// its free tail holds the alignment padding plus `size`.
    ///
    /// A zero-sized request is rejected before anything, counters included,
    /// is touched.
    pub fn alloc_aligned(&self, size: usize, align: usize) -> ArenaResult<NonNull<u8>> {
        if size == 0 {
            return Err(ArenaError::ZeroSized);
        }

        let result = self.bump(size, align);
        if result.is_err() && self.config.track_stats {
            self.stats.record_failure();
        }
        result
    }

    fn bump(&self, size: usize, align: usize) -> ArenaResult<NonNull<u8>> {
        if !align.is_power_of_two() {
            return Err(ArenaError::invalid_alignment(align));
        }

        let mut chunks = self.chunks.borrow_mut();

        if let Some((ptr, padding)) = chunks
            .iter()
            .rev()
            .find_map(|chunk| chunk.try_bump(size, align))
        {
            self.record_allocation(size, padding);
            return Ok(ptr);
        }

        let capacity = self.growth_capacity(size, align)?;
        let chunk = self.new_chunk(&mut chunks, capacity)?;
        let Some((ptr, padding)) = chunk.try_bump(size, align) else {
            // SAFETY: the chunk was never published, nothing points into it.
            unsafe { chunk.release(&self.allocator) };
            return Err(ArenaError::size_overflow("aligned chunk capacity"));
        };
        chunks.push(chunk);

        log::debug!(
            capacity,
            request = size,
            chunks = chunks.len(),
            "arena grew by one chunk"
        );

        self.record_allocation(size, padding);
        Ok(ptr)
    }

    /// Capacity of the chunk that must be added to serve `size` at `align`
    fn growth_capacity(&self, size: usize, align: usize) -> ArenaResult<usize> {
        let needed = if align > self.config.chunk_align {
            size.checked_add(align - 1)
                .ok_or_else(|| ArenaError::size_overflow("aligned request size"))?
        } else {
            size
        };
        Ok(needed.max(self.config.chunk_size))
    }

    /// Obtains a chunk, with table space for it already reserved
    ///
    /// Reserving first means the push that follows cannot fail, so a chunk
    /// buffer is never orphaned by a failing table growth.
    fn new_chunk(&self, chunks: &mut Vec<Chunk>, capacity: usize) -> ArenaResult<Chunk> {
        chunks
            .try_reserve(1)
            .map_err(|_| ArenaError::allocation_failed_with_layout(Layout::new::<Chunk>()))?;

        let chunk = Chunk::allocate(&self.allocator, capacity, self.config.chunk_align)?;
        if self.config.track_stats {
            self.stats.record_chunk();
        }
        Ok(chunk)
    }

    fn record_allocation(&self, size: usize, padding: usize) {
        if self.config.track_stats {
            self.stats.record_allocation(size, padding);
        }
    }

    /// Allocates `size` uninitialized bytes as a slice
    ///
    /// The slice borrows the arena, so it cannot outlive a `reset` or drop.
    pub fn alloc_uninit(&self, size: usize) -> ArenaResult<&mut [MaybeUninit<u8>]> {
        let ptr = self.alloc(size)?;
        // SAFETY: ptr is valid for `size` bytes, exclusively ours until the
        // next reset (which needs `&mut self`), and MaybeUninit tolerates
        // uninitialized contents.
        Ok(unsafe { core::slice::from_raw_parts_mut(ptr.cast().as_ptr(), size) })
    }

    /// Copies a slice into the arena
    ///
    /// An empty slice is returned as-is without touching the arena.
    pub fn alloc_slice_copy<T: Copy>(&self, src: &[T]) -> ArenaResult<&mut [T]> {
        if src.is_empty() || size_of::<T>() == 0 {
            // SAFETY: zero-sized types and empty slices need no backing
            // memory, any aligned non-null pointer will do.
            return Ok(unsafe {
                core::slice::from_raw_parts_mut(NonNull::<T>::dangling().as_ptr(), src.len())
            });
        }

        let size = size_of_val(src);
        let dst = self.alloc_aligned(size, align_of::<T>())?.cast::<T>();

        // SAFETY: Copying the slice into a fresh block.
        // - dst is aligned for T and valid for `size` bytes (just allocated)
        // - src and dst cannot overlap (dst was free arena memory)
        // - T: Copy, so a bitwise copy produces valid values
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), dst.as_ptr(), src.len());
            Ok(core::slice::from_raw_parts_mut(dst.as_ptr(), src.len()))
        }
    }

    /// Copies a string into the arena
    pub fn alloc_str(&self, s: &str) -> ArenaResult<&str> {
        let bytes = self.alloc_slice_copy(s.as_bytes())?;
        // SAFETY: bytes is a verbatim copy of valid UTF-8.
        Ok(unsafe { core::str::from_utf8_unchecked(bytes) })
    }

    /// Moves a value into the arena
    ///
    /// The value's destructor never runs: the arena reclaims memory in bulk
    /// without knowing what it holds.
    pub fn alloc_value<T>(&self, value: T) -> ArenaResult<&mut T> {
        let ptr = if size_of::<T>() == 0 {
            NonNull::<T>::dangling()
        } else {
            self.alloc_aligned(size_of::<T>(), align_of::<T>())?
                .cast::<T>()
        };

        // SAFETY: ptr is aligned for T and valid for size_of::<T>() bytes
        // (fresh arena block, or dangling for a zero-sized T).
        unsafe {
            ptr.as_ptr().write(value);
            Ok(&mut *ptr.as_ptr())
        }
    }

    /// Rewinds every chunk, keeping all capacity
    ///
    /// Everything allocated so far becomes invalid; the `&mut self` receiver
    /// guarantees no borrowed arena memory is still alive.
    pub fn reset(&mut self) {
        let chunks = self.chunks.get_mut();
        log::trace!(
            chunks = chunks.len(),
            rewound = chunks.iter().map(Chunk::used).sum::<usize>(),
            "arena reset"
        );
        for chunk in chunks.iter() {
            chunk.reset();
        }

        if self.config.track_stats {
            self.stats.record_reset();
        }
    }

    /// Releases every chunk and the arena itself
    ///
    /// Equivalent to dropping the arena.
    pub fn destroy(self) {
        drop(self);
    }

    /// Exposes the arena through the generic [`Allocator`] interface
    pub fn as_allocator(&self) -> ArenaAllocator<'_, A> {
        ArenaAllocator::new(self)
    }

    /// Number of chunks currently owned
    pub fn chunk_count(&self) -> usize {
        self.chunks.borrow().len()
    }

    /// Capacity and fill level of every chunk, newest first
    pub fn chunks(&self) -> Vec<ChunkInfo> {
        self.chunks.borrow().iter().rev().map(Chunk::info).collect()
    }

    /// Sum of chunk capacities
    pub fn capacity(&self) -> usize {
        self.chunks.borrow().iter().map(Chunk::capacity).sum()
    }

    /// Bytes handed out (including alignment padding) since the last reset
    pub fn used(&self) -> usize {
        self.chunks.borrow().iter().map(Chunk::used).sum()
    }

    /// Free bytes summed over all chunks
    ///
    /// Free space is split across chunks, so a single request of this size
    /// may still need a new chunk.
    pub fn available(&self) -> usize {
        self.chunks.borrow().iter().map(Chunk::remaining).sum()
    }

    /// Whether `ptr` points into memory owned by this arena
    pub fn contains(&self, ptr: *const u8) -> bool {
        self.chunks.borrow().iter().any(|chunk| chunk.contains(ptr))
    }

    /// Minimum capacity of any chunk
    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Backing allocator the chunks come from
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Running counters
    pub fn stats(&self) -> &ArenaStats {
        &self.stats
    }

    /// Counters combined with the current chunk figures
    pub fn stats_snapshot(&self) -> ArenaStatsSnapshot {
        ArenaStatsSnapshot {
            allocations: self.stats.allocations(),
            bytes_requested: self.stats.bytes_requested(),
            padding_bytes: self.stats.padding_bytes(),
            failed_allocations: self.stats.failed_allocations(),
            chunks_created: self.stats.chunks_created(),
            resets: self.stats.resets(),
            chunk_count: self.chunk_count(),
            capacity: self.capacity(),
            used: self.used(),
        }
    }
}

impl<A: Allocator> Drop for Arena<A> {
    fn drop(&mut self) {
        let chunks = self.chunks.get_mut();
        log::debug!(
            chunks = chunks.len(),
            capacity = chunks.iter().map(Chunk::capacity).sum::<usize>(),
            "arena destroyed"
        );

        // Newest first, mirroring the list order.
        for chunk in chunks.drain(..).rev() {
            // SAFETY: every chunk came from self.allocator, and `&mut self`
            // proves nothing borrows arena memory any more.
            unsafe { chunk.release(&self.allocator) };
        }
    }
}

impl<A: Allocator> core::fmt::Debug for Arena<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Arena")
            .field("chunk_size", &self.config.chunk_size)
            .field("chunks", &self.chunks())
            .finish_non_exhaustive()
    }
}
