//! Statistics tracking for arenas

use core::cell::Cell;
use core::fmt;

/// Running counters of an arena
///
/// Counters only move when the arena was configured with `track_stats`.
/// Live capacity figures are not stored here; they are read off the chunk
/// list when a snapshot is taken.
#[derive(Debug, Default)]
pub struct ArenaStats {
    allocations: Cell<u64>,
    bytes_requested: Cell<u64>,
    padding_bytes: Cell<u64>,
    failed_allocations: Cell<u64>,
    chunks_created: Cell<u64>,
    resets: Cell<u64>,
}

fn bump(counter: &Cell<u64>, by: u64) {
    counter.set(counter.get().saturating_add(by));
}

impl ArenaStats {
    /// Creates a zeroed counter set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocations(&self) -> u64 {
        self.allocations.get()
    }

    pub fn bytes_requested(&self) -> u64 {
        self.bytes_requested.get()
    }

    pub fn padding_bytes(&self) -> u64 {
        self.padding_bytes.get()
    }

    pub fn failed_allocations(&self) -> u64 {
        self.failed_allocations.get()
    }

    pub fn chunks_created(&self) -> u64 {
        self.chunks_created.get()
    }

    pub fn resets(&self) -> u64 {
        self.resets.get()
    }

    pub(crate) fn record_allocation(&self, size: usize, padding: usize) {
        bump(&self.allocations, 1);
        bump(&self.bytes_requested, size as u64);
        bump(&self.padding_bytes, padding as u64);
    }

    pub(crate) fn record_failure(&self) {
        bump(&self.failed_allocations, 1);
    }

    pub(crate) fn record_chunk(&self) {
        bump(&self.chunks_created, 1);
    }

    pub(crate) fn record_reset(&self) {
        bump(&self.resets, 1);
    }
}

/// Point-in-time view of an arena: counters plus live chunk figures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaStatsSnapshot {
    /// Successful allocations since creation
    pub allocations: u64,
    /// Bytes requested by successful allocations
    pub bytes_requested: u64,
    /// Bytes skipped to satisfy alignment
    pub padding_bytes: u64,
    /// Allocations that returned an error
    pub failed_allocations: u64,
    /// Chunks obtained from the backing allocator, including the first
    pub chunks_created: u64,
    /// Calls to `reset`
    pub resets: u64,
    /// Chunks currently owned
    pub chunk_count: usize,
    /// Sum of chunk capacities
    pub capacity: usize,
    /// Sum of chunk fill levels
    pub used: usize,
}

impl ArenaStatsSnapshot {
    /// Bytes still free across all chunks
    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.used)
    }

    /// Share of capacity handed out (0..1)
    pub fn utilization_ratio(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.used as f64 / self.capacity as f64
        }
    }

    /// Share of capacity still free (0..1)
    pub fn fragmentation_ratio(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.available() as f64 / self.capacity as f64
        }
    }

    /// Mean requested size of successful allocations
    pub fn average_allocation_size(&self) -> f64 {
        if self.allocations == 0 {
            0.0
        } else {
            self.bytes_requested as f64 / self.allocations as f64
        }
    }
}

impl fmt::Display for ArenaStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} chunks, {}/{} bytes used ({:.1}%), {} allocations, {} failed, {} resets",
            self.chunk_count,
            self.used,
            self.capacity,
            self.utilization_ratio() * 100.0,
            self.allocations,
            self.failed_allocations,
            self.resets
        )
    }
}
