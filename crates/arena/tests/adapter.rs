//! The arena seen through the generic allocator interface

#![allow(unsafe_code)]

mod common;

use std::alloc::Layout;

use nebula_arena::allocator::TrackedAllocator;
use nebula_arena::{Allocator, Arena, ArenaAllocator, ArenaConfig};
use pretty_assertions::assert_eq;

use common::pattern;

/// Allocator-generic consumer: a byte buffer that doubles on overflow
fn fill_growing_buffer<A: Allocator>(allocator: &A, bytes: &[u8]) -> Vec<u8> {
    let mut layout = Layout::from_size_align(4, 1).unwrap();
    let mut block = unsafe { allocator.allocate(layout).unwrap() }.cast::<u8>();

    for (len, byte) in bytes.iter().enumerate() {
        if len == layout.size() {
            let grown = Layout::from_size_align(layout.size() * 2, 1).unwrap();
            block = unsafe { allocator.reallocate(block, layout, grown).unwrap() }.cast();
            layout = grown;
        }
        unsafe { block.as_ptr().add(len).write(*byte) };
    }

    let out = unsafe { std::slice::from_raw_parts(block.as_ptr(), bytes.len()) }.to_vec();
    unsafe { allocator.deallocate(block, layout) };
    out
}

#[test]
fn generic_code_runs_on_an_arena() {
    let arena = Arena::new(64).unwrap();
    let input = pattern(3, 100);

    assert_eq!(fill_growing_buffer(&arena.as_allocator(), &input), input);
    // 4 + 8 + 16 + 32 + 64 + 128, nothing handed back.
    assert_eq!(arena.stats().bytes_requested(), 252);
}

#[test]
fn adapter_is_copy_and_shares_the_arena() {
    let arena = Arena::new(64).unwrap();
    let first = ArenaAllocator::new(&arena);
    let second = first;

    unsafe {
        first.allocate(Layout::new::<u32>()).unwrap();
        second.allocate(Layout::new::<u32>()).unwrap();
    }
    assert_eq!(arena.used(), 8);
    assert!(std::ptr::eq(first.arena(), second.arena()));
}

#[test]
fn arena_nested_inside_arena() {
    let tracked: TrackedAllocator = TrackedAllocator::default();
    let outer = Arena::with_allocator(ArenaConfig::new().with_chunk_size(1024), &tracked).unwrap();

    {
        let inner =
            Arena::with_allocator(ArenaConfig::new().with_chunk_size(64), outer.as_allocator())
                .unwrap();
        let text = inner.alloc_str("stored in the outer arena").unwrap();
        assert!(outer.contains(text.as_ptr()));
        inner.alloc(200).unwrap();
        assert_eq!(inner.chunk_count(), 2);
    }

    // Inner chunks were "freed" into the outer arena, which ignores frees.
    assert_eq!(outer.used(), 64 + 200);
    assert_eq!(tracked.live_blocks(), 1);

    drop(outer);
    assert!(!tracked.has_leaks());
}
