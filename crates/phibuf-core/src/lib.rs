//! Core constants and error types for phibuf.
//!
//! This is the leaf crate with zero internal dependencies. It holds the
//! named mathematical constants the buffer's growth policy is built from,
//! and the error types shared by every layer of the workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod constants;
pub mod error;

pub use constants::PHI;
pub use error::{BufferError, ConfigError};
