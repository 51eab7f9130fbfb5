//! Block allocation seam.
//!
//! [`RawBuffer`](crate::RawBuffer) never calls the global allocator
//! directly; it goes through a [`BlockAllocator`]. Production code uses
//! [`Global`]. Tests plug in an allocator that refuses requests on demand
//! to exercise the failure paths.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// Source of raw memory blocks for a buffer.
///
/// Failure is reported as `None`, never by panicking or aborting.
///
/// # Safety
///
/// Implementors must return blocks that are valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, and exclusively
/// owned by the caller until passed back to [`reallocate`] or
/// [`deallocate`] on the same allocator. On a failed [`reallocate`] the
/// original block must remain valid and untouched.
///
/// [`reallocate`]: BlockAllocator::reallocate
/// [`deallocate`]: BlockAllocator::deallocate
pub unsafe trait BlockAllocator {
    /// Allocate a block for `layout`.
    ///
    /// `layout.size()` is never zero.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Resize a block to `new_size` bytes, keeping its alignment.
    ///
    /// The first `min(old.size(), new_size)` bytes are preserved.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator with layout `old`,
    /// and `new_size` must be non-zero and form a valid layout with
    /// `old.align()`.
    unsafe fn reallocate(&self, ptr: NonNull<u8>, old: Layout, new_size: usize)
        -> Option<NonNull<u8>>;

    /// Release a block.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator with `layout`, and
    /// must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The process-wide allocator behind `std::alloc`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Global;

// SAFETY: forwards to the registered global allocator, which upholds the
// block contract for non-zero-sized layouts.
unsafe impl BlockAllocator for Global {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert!(layout.size() != 0);
        // SAFETY: layout has non-zero size (trait contract).
        NonNull::new(unsafe { alloc::alloc(layout) })
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        debug_assert!(new_size != 0);
        // SAFETY: caller guarantees ptr/old came from this allocator and
        // that new_size is non-zero and valid for old.align().
        NonNull::new(unsafe { alloc::realloc(ptr.as_ptr(), old, new_size) })
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller guarantees ptr/layout came from this allocator.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_allocate_write_release() {
        let layout = Layout::from_size_align(64, 16).unwrap();
        let ptr = Global.allocate(layout).unwrap();
        assert_eq!(ptr.as_ptr() as usize % 16, 0);
        unsafe {
            ptr.as_ptr().write_bytes(0xAB, 64);
            Global.deallocate(ptr, layout);
        }
    }

    #[test]
    fn global_reallocate_preserves_prefix() {
        let layout = Layout::from_size_align(8, 8).unwrap();
        let ptr = Global.allocate(layout).unwrap();
        unsafe {
            for i in 0..8u8 {
                ptr.as_ptr().add(i as usize).write(i);
            }
            let grown = Global.reallocate(ptr, layout, 32).unwrap();
            for i in 0..8u8 {
                assert_eq!(grown.as_ptr().add(i as usize).read(), i);
            }
            Global.deallocate(grown, Layout::from_size_align(32, 8).unwrap());
        }
    }
}
