//! Reallocation counts across long append sequences.

use phibuf_buffer::{BufferConfig, RawBuffer};
use phibuf_core::PHI;
use phibuf_test_utils::{raw_i32s, read_i32s, FailingAllocator};

/// Growth steps from the default capacity until `n` elements fit.
fn expected_steps(n: usize) -> usize {
    let mut cap = BufferConfig::DEFAULT_INITIAL_CAPACITY;
    let mut steps = 0;
    while cap < n {
        cap = (PHI * cap as f64).round() as usize;
        steps += 1;
    }
    steps
}

#[test]
fn reallocations_are_logarithmic_in_appends() {
    for n in [1usize, 8, 9, 100, 10_000, 100_000] {
        let alloc = FailingAllocator::new();
        let mut buf = raw_i32s(&[], alloc.clone()).unwrap();
        for v in 0..n as i32 {
            buf.append(&v.to_ne_bytes(), 4).unwrap();
        }
        assert_eq!(buf.len(), n);
        assert_eq!(alloc.reallocations(), expected_steps(n), "n = {n}");
        // log_φ(100_000 / 8) ≈ 19.6
        assert!(alloc.reallocations() <= 21);
    }
}

#[test]
fn values_survive_every_reallocation() {
    let alloc = FailingAllocator::new();
    let mut buf = raw_i32s(&[], alloc.clone()).unwrap();
    for v in 0..5_000i32 {
        buf.append(&v.to_ne_bytes(), 4).unwrap();
    }
    assert_eq!(read_i32s(&buf), (0..5_000).collect::<Vec<_>>());
}

#[test]
fn bulk_insert_reallocates_once() {
    let alloc = FailingAllocator::new();
    let mut buf = raw_i32s(&[1, 2], alloc.clone()).unwrap();
    let run: Vec<i32> = (0..1_000).collect();
    buf.insert(bytemuck::cast_slice(&run), 1, run.len(), 4)
        .unwrap();
    assert_eq!(alloc.reallocations(), 1);
    assert!(buf.capacity() >= 1_002);
}

#[test]
fn copy_preserves_capacity_for_follow_up_growth() {
    let src = raw_i32s(&[1, 2, 3], FailingAllocator::new()).unwrap();
    let alloc = FailingAllocator::new();
    let mut copy = RawBuffer::new_in(BufferConfig::new(), 4, alloc.clone()).unwrap();
    copy.copy_from(&src, 4).unwrap();
    assert_eq!(copy.capacity(), 8);
    for v in 0..5i32 {
        copy.append(&v.to_ne_bytes(), 4).unwrap();
    }
    // Spare capacity carried over, so filling it needs no reallocation.
    assert_eq!(alloc.reallocations(), 0);
}
