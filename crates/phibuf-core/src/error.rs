//! Error types for phibuf.
//!
//! Every fallible buffer operation returns [`BufferError`]. A failed
//! operation never mutates the buffer, so all of these are recoverable:
//! the caller may retry, shrink the request, or give up.

use std::error::Error;
use std::fmt;

/// Errors from buffer allocation and growth.
#[derive(Clone, Debug, PartialEq)]
pub enum BufferError {
    /// The allocator could not satisfy a request for a block.
    AllocationFailed {
        /// Size of the block that was requested, in bytes.
        bytes: usize,
    },
    /// The requested capacity cannot be represented, either as an element
    /// count or as a byte size.
    CapacityOverflow {
        /// Capacity (in elements) at the time growth was attempted.
        capacity: usize,
        /// Element size the capacity was scaled by.
        elem_size: usize,
    },
    /// An element size of zero was supplied.
    ZeroElementSize,
    /// The buffer configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed { bytes } => {
                write!(f, "allocation of {bytes} bytes failed")
            }
            Self::CapacityOverflow {
                capacity,
                elem_size,
            } => {
                write!(
                    f,
                    "capacity overflow: cannot grow beyond {capacity} elements of {elem_size} bytes"
                )
            }
            Self::ZeroElementSize => write!(f, "element size must be non-zero"),
            Self::Config(e) => write!(f, "invalid buffer config: {e}"),
        }
    }
}

impl Error for BufferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for BufferError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Errors from buffer configuration validation.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The growth factor is NaN or infinite.
    GrowthFactorNotFinite {
        /// The rejected factor.
        factor: f64,
    },
    /// The growth factor would not grow a one-element buffer.
    ///
    /// `round(factor * 1)` must exceed 1, so the factor must be at least 1.5.
    GrowthFactorTooSmall {
        /// The rejected factor.
        factor: f64,
    },
    /// The capacity used when growing an empty buffer is zero.
    ZeroMinCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GrowthFactorNotFinite { factor } => {
                write!(f, "growth factor must be finite, got {factor}")
            }
            Self::GrowthFactorTooSmall { factor } => {
                write!(f, "growth factor must be at least 1.5, got {factor}")
            }
            Self::ZeroMinCapacity => write!(f, "minimum capacity must be non-zero"),
        }
    }
}

impl Error for ConfigError {}
