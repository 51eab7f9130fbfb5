//! Reusable allocator and data fixtures.
//!
//! - [`FailingAllocator`]: delegates to [`Global`], counts calls, and can be
//!   armed to fail after a given number of successful requests.
//! - [`i32_bytes`] / [`read_i32s`] / [`raw_i32s`]: shuttle `i32` test data
//!   through the untyped API.

use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;
use std::rc::Rc;

use phibuf_buffer::{BlockAllocator, BufferConfig, BufferError, Global, RawBuffer};

#[derive(Debug, Default)]
struct Counters {
    /// Successful requests left before failing; `None` never fails.
    budget: Cell<Option<usize>>,
    allocations: Cell<usize>,
    reallocations: Cell<usize>,
    deallocations: Cell<usize>,
    failures: Cell<usize>,
    live_bytes: Cell<usize>,
}

/// Counting allocator that fails deterministically when armed.
///
/// Clones share counters, so a test can keep one handle while the buffer
/// owns another. Allocation and reallocation requests consume the budget;
/// frees never fail.
#[derive(Clone, Debug, Default)]
pub struct FailingAllocator {
    counters: Rc<Counters>,
}

impl FailingAllocator {
    /// An allocator that never fails until armed.
    pub fn new() -> Self {
        Self::default()
    }

    /// An allocator that lets `n` requests succeed, then fails the rest.
    pub fn failing_after(n: usize) -> Self {
        let alloc = Self::new();
        alloc.fail_after(n);
        alloc
    }

    /// Let `n` more requests succeed, then fail every request after.
    pub fn fail_after(&self, n: usize) {
        self.counters.budget.set(Some(n));
    }

    /// Fail the next request and every one after it.
    pub fn fail_now(&self) {
        self.fail_after(0);
    }

    /// Stop failing.
    pub fn disarm(&self) {
        self.counters.budget.set(None);
    }

    pub fn allocations(&self) -> usize {
        self.counters.allocations.get()
    }

    pub fn reallocations(&self) -> usize {
        self.counters.reallocations.get()
    }

    pub fn deallocations(&self) -> usize {
        self.counters.deallocations.get()
    }

    /// Number of refused requests.
    pub fn failures(&self) -> usize {
        self.counters.failures.get()
    }

    /// Bytes currently held in blocks handed out by this allocator.
    pub fn live_bytes(&self) -> usize {
        self.counters.live_bytes.get()
    }

    /// Consume one unit of budget; false when the request must fail.
    fn admit(&self) -> bool {
        match self.counters.budget.get() {
            None => true,
            Some(0) => {
                self.counters.failures.set(self.failures() + 1);
                false
            }
            Some(n) => {
                self.counters.budget.set(Some(n - 1));
                true
            }
        }
    }
}

// SAFETY: every block comes from and returns to `Global`, which upholds
// the contract; refusing a request only returns `None` early.
#[allow(unsafe_code)]
unsafe impl BlockAllocator for FailingAllocator {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if !self.admit() {
            return None;
        }
        let ptr = Global.allocate(layout)?;
        self.counters.allocations.set(self.allocations() + 1);
        self.counters
            .live_bytes
            .set(self.live_bytes() + layout.size());
        Some(ptr)
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        if !self.admit() {
            return None;
        }
        // SAFETY: forwarded unchanged from our caller, who upholds the
        // contract for blocks we obtained from Global.
        let new = unsafe { Global.reallocate(ptr, old, new_size) }?;
        self.counters.reallocations.set(self.reallocations() + 1);
        self.counters
            .live_bytes
            .set(self.live_bytes() - old.size() + new_size);
        Some(new)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.counters.deallocations.set(self.deallocations() + 1);
        self.counters
            .live_bytes
            .set(self.live_bytes() - layout.size());
        // SAFETY: as for reallocate.
        unsafe { Global.deallocate(ptr, layout) }
    }
}

/// View `i32` values as the bytes the untyped API expects.
pub fn i32_bytes(values: &[i32]) -> &[u8] {
    bytemuck::cast_slice(values)
}

/// Read every element of a 4-byte-element buffer as `i32`.
pub fn read_i32s<A: BlockAllocator>(buf: &RawBuffer<A>) -> Vec<i32> {
    buf.as_bytes(4)
        .chunks_exact(4)
        .map(bytemuck::pod_read_unaligned)
        .collect()
}

/// A default-capacity `i32` buffer on `alloc`, pre-filled with `values`.
pub fn raw_i32s(
    values: &[i32],
    alloc: FailingAllocator,
) -> Result<RawBuffer<FailingAllocator>, BufferError> {
    let mut buf = RawBuffer::new_in(BufferConfig::new(), std::mem::align_of::<i32>(), alloc)?;
    buf.default_init(4)?;
    buf.extend(i32_bytes(values), values.len(), 4)?;
    Ok(buf)
}
