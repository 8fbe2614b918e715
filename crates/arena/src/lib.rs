//! # nebula-arena
//!
//! Chunked bump-pointer arena for transient allocations in the Nebula
//! workflow engine: per-execution scratch buffers, parsed expression nodes,
//! interned strings that die together.
//!
//! An [`Arena`] owns a list of chunks obtained from a backing
//! [`Allocator`]. Allocating bumps an offset inside the first chunk (newest
//! first) with enough free space and grows by a new chunk when none has.
//! Nothing is freed individually; [`Arena::reset`] rewinds every chunk at
//! once and dropping the arena returns every chunk to its allocator.
//!
//! ## Quick Start
//!
//! ```rust
//! use nebula_arena::prelude::*;
//!
//! let mut arena = Arena::with_config(ArenaConfig::small())?;
//! let key = arena.alloc_str("execution-42")?;
//! let ids = arena.alloc_slice_copy(&[7u64, 11, 13])?;
//! assert_eq!(key, "execution-42");
//! assert_eq!(ids.len(), 3);
//!
//! arena.reset(); // capacity stays, contents are gone
//! # Ok::<(), ArenaError>(())
//! ```
//!
//! ## Features
//!
//! - `logging` (default): `tracing` events on chunk growth, reset, drop and
//!   allocation failure
//! - `serde`: serialize / deserialize [`ArenaConfig`]

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(unsafe_code)]
#![warn(rust_2018_idioms)]
// Safe helpers hand out `&mut` into arena memory from `&self`; `reset`
// needs `&mut self`, so the borrow checker still rules out aliasing.
#![allow(clippy::mut_from_ref)]

pub mod allocator;
pub mod arena;
pub mod error;
mod log;

pub use crate::allocator::{Allocator, SystemAllocator};
pub use crate::arena::{Arena, ArenaAllocator, ArenaConfig};
pub use crate::error::{ArenaError, ArenaResult};

pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::allocator::{Allocator, HookAllocator, SystemAllocator, TrackedAllocator};
    pub use crate::arena::{Arena, ArenaAllocator, ArenaConfig, ArenaStatsSnapshot, ChunkInfo};
    pub use crate::error::{ArenaError, ArenaResult};
}
