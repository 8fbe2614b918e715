//! Arena configuration

use crate::error::{ArenaError, ArenaResult};

/// Default capacity of every chunk the arena grows into (4 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024;

/// Alignment of every chunk buffer, matching what a general-purpose
/// allocator hands out on mainstream 64-bit targets
pub const DEFAULT_CHUNK_ALIGN: usize = 16;

/// Arena configuration builder
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArenaConfig {
    /// Minimum capacity of any chunk; the first chunk is exactly this large
    pub chunk_size: usize,
    /// Alignment of chunk buffers (power of two)
    pub chunk_align: usize,
    /// Whether to keep allocation counters
    pub track_stats: bool,
}

impl ArenaConfig {
    /// Creates new config with default values
    pub const fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_align: DEFAULT_CHUNK_ALIGN,
            track_stats: true,
        }
    }

    /// 4 KiB chunks, for tests and tiny scratch spaces
    pub const fn tiny() -> Self {
        Self::new().with_chunk_size(4 * 1024)
    }

    /// 64 KiB chunks, for per-request scratch
    pub const fn small() -> Self {
        Self::new().with_chunk_size(64 * 1024)
    }

    /// 1 MiB chunks, for per-phase workloads
    pub const fn medium() -> Self {
        Self::new().with_chunk_size(1024 * 1024)
    }

    /// 16 MiB chunks without counters, for heavy frame-scoped workloads
    pub const fn large() -> Self {
        Self::new()
            .with_chunk_size(16 * 1024 * 1024)
            .with_stats(false)
    }

    /// Sets the default chunk size
    #[must_use = "builder methods must be chained or built"]
    pub const fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Sets the chunk buffer alignment
    #[must_use = "builder methods must be chained or built"]
    pub const fn with_chunk_align(mut self, align: usize) -> Self {
        self.chunk_align = align;
        self
    }

    /// Enables/disables statistics tracking
    #[must_use = "builder methods must be chained or built"]
    pub const fn with_stats(mut self, enabled: bool) -> Self {
        self.track_stats = enabled;
        self
    }

    /// Checks the configuration before an arena is built from it
    pub fn validate(&self) -> ArenaResult<()> {
        if self.chunk_size == 0 {
            return Err(ArenaError::invalid_config("chunk_size must be non-zero"));
        }
        if !self.chunk_align.is_power_of_two() {
            return Err(ArenaError::invalid_alignment(self.chunk_align));
        }
        if self.chunk_size > isize::MAX as usize - (self.chunk_align - 1) {
            return Err(ArenaError::size_overflow("chunk size"));
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}
