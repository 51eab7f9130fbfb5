//! Benchmark workloads for phibuf.
//!
//! Provides deterministic inputs shared by the benchmarks:
//!
//! - [`sequential_values`]: `0..n` as `u32`
//! - [`scattered_positions`]: seeded insertion points for a growing buffer
//! - [`filled_buffer`]: a buffer pre-loaded with `n` values

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use phibuf_buffer::{BufferConfig, BufferError, GrowableBuffer};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// `0..n` as `u32` values.
pub fn sequential_values(n: usize) -> Vec<u32> {
    (0..n as u32).collect()
}

/// `count` insertion positions for a buffer that starts with `start_len`
/// elements and grows by one per insertion. Position `i` is uniform in
/// `0..=start_len + i`, so each is valid at the time it is used.
pub fn scattered_positions(start_len: usize, count: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|i| rng.random_range(0..=start_len + i))
        .collect()
}

/// A buffer holding `0..n` under `config`.
pub fn filled_buffer(n: usize, config: BufferConfig) -> Result<GrowableBuffer<u32>, BufferError> {
    let mut buf = GrowableBuffer::with_config(config)?;
    buf.extend_from_slice(&sequential_values(n))?;
    Ok(buf)
}
