//! Chunked bump arena
//!
//! - [`Arena`]: the arena itself, generic over its backing [`Allocator`]
//! - [`ArenaConfig`]: chunk size, chunk alignment and stats switch
//! - [`ArenaAllocator`]: an arena seen through the [`Allocator`] trait
//! - [`ArenaStats`] / [`ArenaStatsSnapshot`]: usage counters
//!
//! [`Allocator`]: crate::allocator::Allocator

mod adapter;
#[allow(clippy::module_inception)]
mod arena;
mod chunk;
mod config;
mod stats;

pub use self::adapter::ArenaAllocator;
pub use self::arena::Arena;
pub use self::chunk::ChunkInfo;
pub use self::config::{ArenaConfig, DEFAULT_CHUNK_ALIGN, DEFAULT_CHUNK_SIZE};
pub use self::stats::{ArenaStats, ArenaStatsSnapshot};
