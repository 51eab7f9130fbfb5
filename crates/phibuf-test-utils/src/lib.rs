//! Test utilities for phibuf development.
//!
//! Provides [`FailingAllocator`], a [`BlockAllocator`] that counts every
//! request and refuses them on demand, plus small helpers for moving
//! `i32` test data in and out of a [`RawBuffer`].

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{i32_bytes, raw_i32s, read_i32s, FailingAllocator};
pub use phibuf_buffer::{BlockAllocator, RawBuffer};
