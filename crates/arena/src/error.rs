//! Error types for nebula-arena
//!
//! Every fallible arena operation reports failure through [`ArenaError`].
//! A failed operation never leaves the arena half-updated: either the
//! request is satisfied, or the arena is exactly as it was before the call.

use core::alloc::Layout;

use thiserror::Error;

/// Arena operation errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    /// The backing allocator refused to hand out memory
    #[error("Arena allocation failed: {size} bytes with {align} byte alignment")]
    AllocationFailed { size: usize, align: usize },

    /// Zero-byte allocations are not supported
    #[error("Zero-sized allocations are not supported")]
    ZeroSized,

    /// Size arithmetic would wrap around
    #[error("Size overflow during operation: {operation}")]
    SizeOverflow { operation: &'static str },

    /// Alignment is not a power of two
    #[error("Invalid alignment: {alignment}")]
    InvalidAlignment { alignment: usize },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

}

impl ArenaError {
    /// Create allocation failed error
    pub fn allocation_failed(size: usize, align: usize) -> Self {
        crate::log::warning!(size, align, "backing allocator refused arena memory");

        Self::AllocationFailed { size, align }
    }

    /// Create allocation failed error from layout
    pub fn allocation_failed_with_layout(layout: Layout) -> Self {
        Self::allocation_failed(layout.size(), layout.align())
    }

    /// Create size overflow error
    pub fn size_overflow(operation: &'static str) -> Self {
        Self::SizeOverflow { operation }
    }

    /// Create invalid alignment error
    pub fn invalid_alignment(alignment: usize) -> Self {
        Self::InvalidAlignment { alignment }
    }

    /// Create invalid config error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Whether retrying after memory is released elsewhere could succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AllocationFailed { .. })
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AllocationFailed { .. } => "ARENA:ALLOC:FAILED",
            Self::ZeroSized => "ARENA:ALLOC:ZERO",
            Self::SizeOverflow { .. } => "ARENA:ALLOC:OVERFLOW",
            Self::InvalidAlignment { .. } => "ARENA:ALLOC:ALIGN",
            Self::InvalidConfig { .. } => "ARENA:CONFIG:INVALID",
        }
    }
}

/// Result type for arena operations
pub type ArenaResult<T> = Result<T, ArenaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_failed_mentions_request() {
        let error = ArenaError::allocation_failed(1024, 16);
        assert!(error.to_string().contains("1024"));
        assert!(error.to_string().contains("16"));
    }

    #[test]
    fn layout_constructor_matches_fields() {
        let layout = Layout::new::<u64>();
        assert_eq!(
            ArenaError::allocation_failed_with_layout(layout),
            ArenaError::AllocationFailed {
                size: layout.size(),
                align: layout.align(),
            }
        );
    }

    #[test]
    fn every_variant_has_a_code() {
        let errors = [
            ArenaError::allocation_failed(8, 8),
            ArenaError::ZeroSized,
            ArenaError::size_overflow("request"),
            ArenaError::invalid_alignment(3),
            ArenaError::invalid_config("bad"),
        ];
        let codes: Vec<_> = errors.iter().map(ArenaError::code).collect();
        assert_eq!(
            codes,
            [
                "ARENA:ALLOC:FAILED",
                "ARENA:ALLOC:ZERO",
                "ARENA:ALLOC:OVERFLOW",
                "ARENA:ALLOC:ALIGN",
                "ARENA:CONFIG:INVALID",
            ]
        );
    }

    #[test]
    fn error_codes() {
        assert_eq!(ArenaError::ZeroSized.code(), "ARENA:ALLOC:ZERO");
        assert_eq!(
            ArenaError::size_overflow("chunk layout").code(),
            "ARENA:ALLOC:OVERFLOW"
        );
        assert_eq!(
            ArenaError::invalid_config("chunk_size must be non-zero").code(),
            "ARENA:CONFIG:INVALID"
        );
    }

    #[test]
    fn only_oom_is_retryable() {
        assert!(ArenaError::allocation_failed(8, 1).is_retryable());
        assert!(!ArenaError::ZeroSized.is_retryable());
        assert!(!ArenaError::invalid_alignment(3).is_retryable());
    }
}
