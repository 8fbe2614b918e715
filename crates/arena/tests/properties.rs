//! Property tests for arena invariants: monotonic fill levels, disjoint and
//! stable blocks, zero-size rejection and reset idempotence

#![allow(unsafe_code)]

mod common;

use nebula_arena::arena::ChunkInfo;
use nebula_arena::{Arena, ArenaError};
use proptest::prelude::*;

use common::pattern;

fn chunk_size() -> impl Strategy<Value = usize> {
    prop_oneof![Just(1usize), 8usize..=64, 64usize..=512]
}

fn sizes() -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(prop_oneof![4 => 1usize..=48, 1 => 49usize..=600], 1..60)
}

/// Chunk list oldest first, so lists taken before and after growth line up
/// index by index
fn oldest_first(arena: &Arena) -> Vec<ChunkInfo> {
    let mut chunks = arena.chunks();
    chunks.reverse();
    chunks
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn used_never_decreases_and_stays_bounded(chunk_size in chunk_size(), sizes in sizes()) {
        let arena = Arena::new(chunk_size).unwrap();
        let mut before = oldest_first(&arena);

        for size in sizes {
            arena.alloc(size).unwrap();
            let after = oldest_first(&arena);

            prop_assert!(after.len() >= before.len());
            for (old, new) in before.iter().zip(&after) {
                prop_assert_eq!(old.capacity, new.capacity);
                prop_assert!(new.used >= old.used);
            }
            for chunk in &after {
                prop_assert!(chunk.used <= chunk.capacity);
                prop_assert!(chunk.capacity >= chunk_size);
            }
            before = after;
        }
    }

    #[test]
    fn blocks_are_disjoint_and_stable(chunk_size in chunk_size(), sizes in sizes()) {
        let arena = Arena::new(chunk_size).unwrap();
        let mut blocks = Vec::with_capacity(sizes.len());

        for (i, &size) in sizes.iter().enumerate() {
            let ptr = arena.alloc(size).unwrap();
            let bytes = pattern(i as u8, size);
            unsafe { ptr.as_ptr().copy_from_nonoverlapping(bytes.as_ptr(), size) };
            blocks.push((ptr.as_ptr() as usize, size, bytes));
        }

        let mut ranges: Vec<(usize, usize)> =
            blocks.iter().map(|(start, size, _)| (*start, start + size)).collect();
        ranges.sort_unstable();
        for pair in ranges.windows(2) {
            prop_assert!(pair[0].1 <= pair[1].0, "overlap: {:?}", pair);
        }

        for (start, size, bytes) in &blocks {
            let actual = unsafe { std::slice::from_raw_parts(*start as *const u8, *size) };
            prop_assert_eq!(actual, bytes.as_slice());
        }
    }

    #[test]
    fn zero_size_never_mutates(chunk_size in chunk_size(), sizes in sizes()) {
        let arena = Arena::new(chunk_size).unwrap();
        for size in sizes {
            arena.alloc(size).unwrap();
        }

        let chunks = arena.chunks();
        let stats = arena.stats_snapshot();
        prop_assert_eq!(arena.alloc(0), Err(ArenaError::ZeroSized));
        prop_assert_eq!(arena.chunks(), chunks);
        prop_assert_eq!(arena.stats_snapshot(), stats);
    }

    #[test]
    fn double_reset_equals_single_reset(chunk_size in chunk_size(), sizes in sizes()) {
        let mut once = Arena::new(chunk_size).unwrap();
        let mut twice = Arena::new(chunk_size).unwrap();
        for &size in &sizes {
            once.alloc(size).unwrap();
            twice.alloc(size).unwrap();
        }

        once.reset();
        twice.reset();
        twice.reset();

        prop_assert_eq!(once.chunks(), twice.chunks());
        prop_assert!(once.chunks().iter().all(|chunk| chunk.used == 0));
    }

    #[test]
    fn reset_arena_replays_like_fresh(
        chunk_size in chunk_size(),
        fill_ratio in 0.0f64..=1.0,
        sizes in sizes(),
    ) {
        let mut reused = Arena::new(chunk_size).unwrap();
        let fill = (chunk_size as f64 * fill_ratio) as usize;
        if fill > 0 {
            reused.alloc(fill).unwrap();
        }
        reused.reset();

        let fresh = Arena::new(chunk_size).unwrap();
        prop_assert_eq!(reused.chunks(), fresh.chunks());

        for &size in &sizes {
            reused.alloc(size).unwrap();
            fresh.alloc(size).unwrap();
            prop_assert_eq!(reused.chunks(), fresh.chunks());
        }
    }
}
