//! phibuf: growable contiguous buffers with golden-ratio growth.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the phibuf sub-crates. For most users, adding `phibuf` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use phibuf::prelude::*;
//!
//! // Typed: the element size comes from the type.
//! let mut buf = GrowableBuffer::<i32>::with_default_capacity()?;
//! buf.extend_from_slice(&[10, 20, 30, 40])?;
//! buf.insert_slice(2, &[99, 98])?;
//! assert_eq!(buf.as_slice(), &[10, 20, 99, 98, 30, 40]);
//! buf.remove_range(1..3);
//! assert_eq!(buf.as_slice(), &[10, 98, 30, 40]);
//!
//! // Untyped: the caller passes the element size on every call.
//! let mut raw = RawBuffer::with_default_capacity(4)?;
//! for v in 0..9i32 {
//!     raw.append(&v.to_ne_bytes(), 4)?;
//! }
//! assert_eq!(raw.len(), 9);
//! assert_eq!(raw.capacity(), 13); // round(8 * φ)
//! assert_eq!(raw.read_value::<i32>(8), 8);
//! # Ok::<(), BufferError>(())
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`buffer`] | `phibuf-buffer` | Raw and typed buffers, config, growth, allocators |
//! | [`types`] | `phibuf-core` | Math constants and error types |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Buffers, configuration, growth planning and allocators (`phibuf-buffer`).
pub use phibuf_buffer as buffer;

/// Constants and error types (`phibuf-core`).
///
/// [`types::constants::PHI`] is the default growth factor.
pub use phibuf_core as types;

/// Common imports for typical phibuf usage.
///
/// ```rust
/// use phibuf::prelude::*;
/// ```
pub mod prelude {
    pub use phibuf_buffer::{
        BlockAllocator, BufferConfig, CopyCapacity, GrowableBuffer, Global, RawBuffer,
    };
    pub use phibuf_core::{BufferError, ConfigError, PHI};
}
