//! Growable contiguous buffers with golden-ratio growth.
//!
//! Two layers share one block-management core:
//!
//! ```text
//! GrowableBuffer<T>   (typed front end, element size fixed by T)
//! └── RawBuffer        (type-erased, element size passed on every call)
//!     ├── growth       (next-capacity planning, overflow checks)
//!     └── BlockAllocator (Global, or a test allocator)
//! ```
//!
//! Every fallible operation returns a [`BufferError`] and leaves the
//! buffer exactly as it was before the call. Nothing aborts the process
//! on allocation failure or capacity overflow.
//!
//! # Unsafe code
//!
//! `unsafe` is confined to `allocator.rs` and `raw.rs`. The typed layer
//! reinterprets bytes through `bytemuck` and forbids `unsafe` itself.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod allocator;
pub mod buffer;
pub mod config;
pub mod growth;
pub mod raw;

// Public re-exports for the primary API surface.
pub use allocator::{BlockAllocator, Global};
pub use buffer::GrowableBuffer;
pub use config::{BufferConfig, CopyCapacity};
pub use phibuf_core::{BufferError, ConfigError};
pub use raw::RawBuffer;
