//! Capacity growth planning.
//!
//! The next capacity is computed once in `f64` as
//! `round(growth_factor * capacity)` and then validated in integer terms:
//! a result that is not finite, does not fit in `usize`, or fails to exceed
//! the current capacity is an overflow. Rust float arithmetic never traps,
//! so no floating-point environment has to be saved or restored around the
//! multiplication.
//!
//! Byte sizes are derived with checked multiplication and must form a valid
//! [`Layout`], which caps a block at `isize::MAX` bytes.

use std::alloc::Layout;

use phibuf_core::BufferError;

use crate::config::BufferConfig;

/// `usize::MAX as f64` rounds up to 2^64, so anything at or above it is
/// out of range.
const USIZE_LIMIT: f64 = usize::MAX as f64;

/// Capacity after one growth step, or `None` on overflow.
///
/// Growing from zero yields `config.min_capacity`.
pub fn next_capacity(capacity: usize, config: &BufferConfig) -> Option<usize> {
    if capacity == 0 {
        return Some(config.min_capacity);
    }
    let grown = (config.growth_factor * capacity as f64).round();
    if !grown.is_finite() || grown >= USIZE_LIMIT {
        return None;
    }
    let grown = grown as usize;
    (grown > capacity).then_some(grown)
}

/// Smallest capacity reachable from `capacity` by whole growth steps that
/// holds at least `required` elements.
///
/// Returns `capacity` unchanged when it already suffices. Each step is
/// checked individually, so `None` means some step on the way overflowed.
pub fn capacity_for(capacity: usize, required: usize, config: &BufferConfig) -> Option<usize> {
    let mut n = capacity;
    while n < required {
        n = next_capacity(n, config)?;
    }
    Some(n)
}

/// Layout of a block holding `capacity` elements of `elem_size` bytes.
///
/// # Errors
///
/// [`BufferError::ZeroElementSize`] for a zero element size, and
/// [`BufferError::CapacityOverflow`] when the byte size overflows `usize`
/// or exceeds `isize::MAX` once rounded up to `align`.
pub fn block_layout(
    capacity: usize,
    elem_size: usize,
    align: usize,
) -> Result<Layout, BufferError> {
    if elem_size == 0 {
        return Err(BufferError::ZeroElementSize);
    }
    let overflow = BufferError::CapacityOverflow {
        capacity,
        elem_size,
    };
    let Some(bytes) = capacity.checked_mul(elem_size) else {
        return Err(overflow);
    };
    Layout::from_size_align(bytes, align).map_err(|_| overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use phibuf_core::PHI;

    fn config() -> BufferConfig {
        BufferConfig::new()
    }

    #[test]
    fn grows_from_zero_to_min_capacity() {
        assert_eq!(next_capacity(0, &config()), Some(4));
        let custom = config().with_min_capacity(16);
        assert_eq!(next_capacity(0, &custom), Some(16));
    }

    #[test]
    fn golden_ratio_sequence_from_default() {
        let cfg = config();
        let mut cap = 8;
        let mut seen = vec![cap];
        for _ in 0..5 {
            cap = next_capacity(cap, &cfg).unwrap();
            seen.push(cap);
        }
        assert_eq!(seen, vec![8, 13, 21, 34, 55, 89]);
    }

    #[test]
    fn small_capacities_always_grow() {
        let cfg = config();
        for cap in 1..1000usize {
            let next = next_capacity(cap, &cfg).unwrap();
            assert!(next > cap, "{cap} -> {next}");
            assert_eq!(next, (PHI * cap as f64).round() as usize);
        }
    }

    #[test]
    fn growth_near_usize_max_overflows() {
        let cfg = config();
        assert_eq!(next_capacity(usize::MAX, &cfg), None);
        assert_eq!(next_capacity(usize::MAX / 3 * 2, &cfg), None);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn growth_just_below_limit_succeeds() {
        // 2^63 * φ < 2^64, so one more step still fits.
        let cap = 1usize << 63;
        let next = next_capacity(cap, &config()).unwrap();
        assert!(next > cap);
    }

    #[test]
    fn capacity_for_returns_current_when_sufficient() {
        assert_eq!(capacity_for(8, 8, &config()), Some(8));
        assert_eq!(capacity_for(8, 3, &config()), Some(8));
    }

    #[test]
    fn capacity_for_takes_multiple_steps() {
        // 8 -> 13 -> 21 -> 34
        assert_eq!(capacity_for(8, 30, &config()), Some(34));
        assert_eq!(capacity_for(0, 5, &config()), Some(6));
    }

    #[test]
    fn capacity_for_unreachable_target_is_none() {
        assert_eq!(capacity_for(8, usize::MAX, &config()), None);
    }

    #[test]
    fn block_layout_scales_by_elem_size() {
        let layout = block_layout(10, 4, 16).unwrap();
        assert_eq!(layout.size(), 40);
        assert_eq!(layout.align(), 16);
    }

    #[test]
    fn block_layout_rejects_zero_elem_size() {
        assert_eq!(block_layout(10, 0, 8), Err(BufferError::ZeroElementSize));
    }

    #[test]
    fn block_layout_detects_multiplication_overflow() {
        assert_eq!(
            block_layout(usize::MAX / 2, 4, 8),
            Err(BufferError::CapacityOverflow {
                capacity: usize::MAX / 2,
                elem_size: 4,
            })
        );
    }

    #[test]
    fn block_layout_rejects_sizes_above_isize_max() {
        let cap = (isize::MAX as usize) / 2 + 1;
        assert!(matches!(
            block_layout(cap, 2, 8),
            Err(BufferError::CapacityOverflow { .. })
        ));
    }
}
