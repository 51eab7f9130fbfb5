//! Well-known mathematical constants.
//!
//! Written out to 15 decimal places. [`PHI`] is the default growth factor
//! of every phibuf buffer.

#![allow(clippy::approx_constant)]

/// Archimedes' constant (π).
pub const PI: f64 = 3.141592653589793;

/// The full circle constant (2π).
pub const TWO_PI: f64 = 6.283185307179586;

/// Euler's number (e).
pub const E: f64 = 2.718281828459045;

/// The golden ratio (φ = (1 + √5) / 2).
///
/// By one measure φ is the optimal growth factor: a freed block becomes
/// reusable after only two reallocations, the theoretical minimum. Whether
/// that reuse happens depends on the allocator and on how much contiguous
/// memory is free.
pub const PHI: f64 = 1.618033988749895;

/// √2.
pub const SQRT_2: f64 = 1.414213562373095;

/// ln(2).
pub const LN_2: f64 = 0.693147180559945;

/// ln(10).
pub const LN_10: f64 = 2.302585092994046;
