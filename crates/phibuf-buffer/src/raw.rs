//! Type-erased growable buffer.
//!
//! A [`RawBuffer`] owns one heap block and tracks its logical `size` and
//! allocated `capacity`, both in element units. The buffer carries no type
//! information: every call that touches element storage takes the byte
//! size of one element, and callers must pass the same size for the whole
//! lifetime of a block. Passing a different size is caught and panics
//! rather than reading outside the block.
//!
//! Range arguments (`pos`, `from`, `to`) are asserted against the current
//! size. A violated range is a caller bug and panics.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::fmt;
use std::ptr::{self, NonNull};

use log::{debug, trace};
use phibuf_core::BufferError;

use crate::allocator::{BlockAllocator, Global};
use crate::config::{BufferConfig, CopyCapacity};
use crate::growth;

/// Alignment of blocks allocated by the untyped constructors.
///
/// Large enough for every primitive type, so element bytes can be
/// reinterpreted in place.
pub const DEFAULT_ALIGN: usize = 16;

/// The live heap block and the layout it was allocated with.
#[derive(Clone, Copy)]
struct Block {
    ptr: NonNull<u8>,
    layout: Layout,
}

/// A growable contiguous buffer of fixed-size, untyped elements.
///
/// A block is held exactly when `capacity > 0`, and `size <= capacity`
/// always holds. Any operation that returns an error leaves the block,
/// size and capacity exactly as they were.
pub struct RawBuffer<A: BlockAllocator = Global> {
    block: Option<Block>,
    size: usize,
    capacity: usize,
    align: usize,
    config: BufferConfig,
    alloc: A,
}

// SAFETY: the block is exclusively owned by the buffer and never shared,
// so moving the buffer moves sole ownership of the block with it.
unsafe impl<A: BlockAllocator + Send> Send for RawBuffer<A> {}

impl RawBuffer<Global> {
    /// Create an empty buffer with the default config. Does not allocate.
    pub fn new() -> Self {
        Self {
            block: None,
            size: 0,
            capacity: 0,
            align: DEFAULT_ALIGN,
            config: BufferConfig::new(),
            alloc: Global,
        }
    }

    /// Create a buffer with room for `capacity` elements of `elem_size`
    /// bytes.
    pub fn with_capacity(capacity: usize, elem_size: usize) -> Result<Self, BufferError> {
        let mut buf = Self::new();
        buf.init(capacity, elem_size)?;
        Ok(buf)
    }

    /// Create a buffer with the default initial capacity (8 elements).
    pub fn with_default_capacity(elem_size: usize) -> Result<Self, BufferError> {
        let mut buf = Self::new();
        buf.default_init(elem_size)?;
        Ok(buf)
    }
}

impl Default for RawBuffer<Global> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: BlockAllocator> RawBuffer<A> {
    /// Create an empty buffer with an explicit config, block alignment and
    /// allocator. Does not allocate.
    ///
    /// # Errors
    ///
    /// [`BufferError::Config`] if `config` fails validation.
    ///
    /// # Panics
    ///
    /// Panics if `align` is not a power of two.
    pub fn new_in(config: BufferConfig, align: usize, alloc: A) -> Result<Self, BufferError> {
        assert!(align.is_power_of_two(), "alignment must be a power of two");
        config.validate()?;
        Ok(Self {
            block: None,
            size: 0,
            capacity: 0,
            align,
            config,
            alloc,
        })
    }

    /// Create a buffer with room for `capacity` elements, using an explicit
    /// config, block alignment and allocator.
    pub fn with_capacity_in(
        capacity: usize,
        elem_size: usize,
        config: BufferConfig,
        align: usize,
        alloc: A,
    ) -> Result<Self, BufferError> {
        let mut buf = Self::new_in(config, align, alloc)?;
        buf.init(capacity, elem_size)?;
        Ok(buf)
    }

    /// (Re)initialize the buffer with a fresh block of `capacity` elements.
    ///
    /// The new block is allocated before anything else changes. On success
    /// any previous block is released and `size` becomes 0; on failure the
    /// buffer is untouched. A `capacity` of 0 yields the empty state with
    /// no allocation.
    pub fn init(&mut self, capacity: usize, elem_size: usize) -> Result<(), BufferError> {
        let layout = growth::block_layout(capacity, elem_size, self.align)?;
        if capacity == 0 {
            self.reset();
            return Ok(());
        }
        let ptr = self.alloc.allocate(layout).ok_or_else(|| {
            debug!("initial allocation of {} bytes failed", layout.size());
            BufferError::AllocationFailed {
                bytes: layout.size(),
            }
        })?;
        trace!("allocated block for {capacity} elements of {elem_size} bytes");
        self.release();
        self.block = Some(Block { ptr, layout });
        self.size = 0;
        self.capacity = capacity;
        Ok(())
    }

    /// [`init`](Self::init) with the configured initial capacity.
    pub fn default_init(&mut self, elem_size: usize) -> Result<(), BufferError> {
        self.init(self.config.initial_capacity, elem_size)
    }

    /// Free the block and return to the empty state.
    ///
    /// Idempotent. The buffer stays usable and may be re-initialized.
    pub fn reset(&mut self) {
        self.release();
        self.size = 0;
        self.capacity = 0;
    }

    /// Number of occupied element slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// True when no slots are occupied.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of allocated element slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Alignment of the backing block in bytes.
    #[inline]
    pub fn align(&self) -> usize {
        self.align
    }

    /// The buffer's configuration.
    #[inline]
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// The allocator backing this buffer.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Pointer to the start of the block, or `None` when capacity is 0.
    #[inline]
    pub fn as_ptr(&self) -> Option<NonNull<u8>> {
        self.block.map(|b| b.ptr)
    }

    /// The occupied elements as bytes (`len() * elem_size` of them).
    pub fn as_bytes(&self, elem_size: usize) -> &[u8] {
        self.check_elem_size(elem_size);
        match self.block {
            // SAFETY: the first size * elem_size bytes of the block are
            // initialized, and the block lives as long as &self.
            Some(b) => unsafe {
                std::slice::from_raw_parts(b.ptr.as_ptr(), self.size * elem_size)
            },
            None => &[],
        }
    }

    /// The occupied elements as mutable bytes.
    pub fn as_bytes_mut(&mut self, elem_size: usize) -> &mut [u8] {
        self.check_elem_size(elem_size);
        match self.block {
            // SAFETY: as in as_bytes, and &mut self gives exclusive access.
            Some(b) => unsafe {
                std::slice::from_raw_parts_mut(b.ptr.as_ptr(), self.size * elem_size)
            },
            None => &mut [],
        }
    }

    /// Bytes of the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn element(&self, index: usize, elem_size: usize) -> &[u8] {
        assert!(index < self.size, "index {index} out of range for size {}", self.size);
        let start = index * elem_size;
        &self.as_bytes(elem_size)[start..start + elem_size]
    }

    /// Append one element, growing by one step when full.
    ///
    /// # Panics
    ///
    /// Panics if `elem.len() != elem_size`.
    pub fn append(&mut self, elem: &[u8], elem_size: usize) -> Result<(), BufferError> {
        assert_eq!(elem.len(), elem_size, "element must be elem_size bytes");
        self.check_elem_size(elem_size);
        if self.size == self.capacity {
            let new_capacity = growth::next_capacity(self.capacity, &self.config)
                .ok_or_else(|| self.overflow(elem_size))?;
            self.resize_block(new_capacity, elem_size)?;
        }
        let base = self.base_ptr();
        // SAFETY: size < capacity, so slot `size` lies inside the block;
        // elem is a separate borrow and cannot overlap it.
        unsafe {
            ptr::copy_nonoverlapping(elem.as_ptr(), base.add(self.size * elem_size), elem_size);
        }
        self.size += 1;
        Ok(())
    }

    /// Insert `src_len` elements from `src` at index `pos`, shifting the
    /// tail `[pos, len())` right.
    ///
    /// Capacity grows by as many whole growth steps as needed, each checked
    /// for overflow, with a single reallocation to the final capacity.
    ///
    /// # Panics
    ///
    /// Panics if `pos > len()` or `src.len() != src_len * elem_size`.
    pub fn insert(
        &mut self,
        src: &[u8],
        pos: usize,
        src_len: usize,
        elem_size: usize,
    ) -> Result<(), BufferError> {
        assert!(pos <= self.size, "insert position {pos} beyond size {}", self.size);
        assert_eq!(
            Some(src.len()),
            src_len.checked_mul(elem_size),
            "source must hold src_len elements"
        );
        self.check_elem_size(elem_size);
        if src_len == 0 {
            return Ok(());
        }
        self.reserve(src_len, elem_size)?;

        let base = self.base_ptr();
        let at = pos * elem_size;
        let gap = src.len();
        let tail = (self.size - pos) * elem_size;
        // SAFETY: capacity >= size + src_len, so both the shifted tail and
        // the gap lie inside the block. The tail move may overlap itself,
        // which ptr::copy handles; src is a separate borrow.
        unsafe {
            ptr::copy(base.add(at), base.add(at + gap), tail);
            ptr::copy_nonoverlapping(src.as_ptr(), base.add(at), gap);
        }
        self.size += src_len;
        Ok(())
    }

    /// Append `src_len` elements from `src`. Same as inserting at `len()`.
    pub fn extend(
        &mut self,
        src: &[u8],
        src_len: usize,
        elem_size: usize,
    ) -> Result<(), BufferError> {
        self.insert(src, self.size, src_len, elem_size)
    }

    /// Remove the elements in `[from, to)`, shifting the tail left.
    ///
    /// Capacity is unchanged. A no-op when `from == to`.
    ///
    /// # Panics
    ///
    /// Panics unless `from <= to <= len()`.
    pub fn remove(&mut self, from: usize, to: usize, elem_size: usize) {
        assert!(from <= to, "range start {from} after end {to}");
        assert!(to <= self.size, "range end {to} beyond size {}", self.size);
        self.check_elem_size(elem_size);
        if from == to {
            return;
        }
        let base = self.base_ptr();
        let tail = (self.size - to) * elem_size;
        // SAFETY: [to, size) lies inside the block and moves to start at
        // from < to; ptr::copy handles the overlap.
        unsafe {
            ptr::copy(base.add(to * elem_size), base.add(from * elem_size), tail);
        }
        self.size -= to - from;
    }

    /// Ensure room for `additional` more elements.
    ///
    /// Grows by whole growth steps from the current capacity.
    pub fn reserve(&mut self, additional: usize, elem_size: usize) -> Result<(), BufferError> {
        self.check_elem_size(elem_size);
        let overflow = || self.overflow(elem_size);
        let required = self.size.checked_add(additional).ok_or_else(overflow)?;
        let target =
            growth::capacity_for(self.capacity, required, &self.config).ok_or_else(overflow)?;
        self.resize_block(target, elem_size)
    }

    /// Reallocate the block down to exactly `len()` elements.
    ///
    /// An empty buffer releases its block and ends with capacity 0; a
    /// zero-byte reallocation is never requested.
    pub fn shrink_to_fit(&mut self, elem_size: usize) -> Result<(), BufferError> {
        self.check_elem_size(elem_size);
        if self.size == 0 {
            self.reset();
            return Ok(());
        }
        self.resize_block(self.size, elem_size)
    }

    /// Make `self` an independent copy of `src`.
    ///
    /// Under [`CopyCapacity::Preserve`] (the default) the copy gets
    /// `src`'s full capacity; under [`CopyCapacity::Fit`] it gets
    /// `src.len()`. The policy is read from `self`'s config. An empty
    /// `self` gets a fresh block, otherwise its block is reallocated. On
    /// failure `self` is untouched.
    pub fn copy_from<B: BlockAllocator>(
        &mut self,
        src: &RawBuffer<B>,
        elem_size: usize,
    ) -> Result<(), BufferError> {
        self.check_elem_size(elem_size);
        let bytes = src.as_bytes(elem_size);
        let target = match self.config.copy_capacity {
            CopyCapacity::Preserve => src.capacity,
            CopyCapacity::Fit => src.size,
        };
        if self.block.is_none() {
            self.init(target, elem_size)?;
        } else if target == 0 {
            self.reset();
        } else {
            self.resize_block(target, elem_size)?;
        }
        if !bytes.is_empty() {
            // SAFETY: target >= src.size, so the block holds bytes.len()
            // bytes; src is a different buffer with its own block.
            unsafe {
                ptr::copy_nonoverlapping(bytes.as_ptr(), self.base_ptr(), bytes.len());
            }
        }
        self.size = src.size;
        Ok(())
    }

    /// Deep-copy into a new buffer with the same config, alignment and a
    /// clone of the allocator.
    pub fn try_clone(&self, elem_size: usize) -> Result<Self, BufferError>
    where
        A: Clone,
    {
        let mut copy = Self::new_in(self.config, self.align, self.alloc.clone())?;
        copy.copy_from(self, elem_size)?;
        Ok(copy)
    }

    /// Append a plain-old-data value, using its size as the element size.
    pub fn append_value<T: bytemuck::NoUninit>(&mut self, value: &T) -> Result<(), BufferError> {
        self.append(bytemuck::bytes_of(value), std::mem::size_of::<T>())
    }

    /// Read the element at `index` as a plain-old-data value.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn read_value<T: bytemuck::AnyBitPattern>(&self, index: usize) -> T {
        bytemuck::pod_read_unaligned(self.element(index, std::mem::size_of::<T>()))
    }

    /// Move the block to `new_capacity` elements (non-zero).
    ///
    /// On allocator refusal the old block stays valid and nothing changes.
    fn resize_block(&mut self, new_capacity: usize, elem_size: usize) -> Result<(), BufferError> {
        if new_capacity == self.capacity {
            return Ok(());
        }
        debug_assert!(new_capacity != 0);
        let layout = growth::block_layout(new_capacity, elem_size, self.align)?;
        let ptr = match self.block {
            None => self.alloc.allocate(layout),
            // SAFETY: b was allocated by self.alloc with b.layout; the new
            // size is non-zero and validated against the same alignment.
            Some(b) => unsafe { self.alloc.reallocate(b.ptr, b.layout, layout.size()) },
        };
        let Some(ptr) = ptr else {
            debug!(
                "reallocation from {} to {} elements ({} bytes) failed",
                self.capacity,
                new_capacity,
                layout.size()
            );
            return Err(BufferError::AllocationFailed {
                bytes: layout.size(),
            });
        };
        trace!(
            "reallocated block from {} to {} elements of {elem_size} bytes",
            self.capacity,
            new_capacity
        );
        self.block = Some(Block { ptr, layout });
        self.capacity = new_capacity;
        Ok(())
    }

    /// Start of the block. Only called when capacity > 0.
    fn base_ptr(&self) -> *mut u8 {
        self.block.map_or(NonNull::dangling().as_ptr(), |b| b.ptr.as_ptr())
    }

    fn release(&mut self) {
        if let Some(b) = self.block.take() {
            // SAFETY: b came from self.alloc with b.layout and is dropped
            // from self before release returns.
            unsafe { self.alloc.deallocate(b.ptr, b.layout) };
        }
    }

    /// Panics if `elem_size` disagrees with the layout of the live block.
    fn check_elem_size(&self, elem_size: usize) {
        if let Some(b) = self.block {
            assert_eq!(
                self.capacity.checked_mul(elem_size),
                Some(b.layout.size()),
                "element size {elem_size} does not match the buffer's block"
            );
        }
    }

    fn overflow(&self, elem_size: usize) -> BufferError {
        debug!(
            "capacity overflow growing {} elements of {elem_size} bytes",
            self.capacity
        );
        BufferError::CapacityOverflow {
            capacity: self.capacity,
            elem_size,
        }
    }
}

impl<A: BlockAllocator> Drop for RawBuffer<A> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<A: BlockAllocator> fmt::Debug for RawBuffer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBuffer")
            .field("size", &self.size)
            .field("capacity", &self.capacity)
            .field("align", &self.align)
            .field("block_bytes", &self.block.map_or(0, |b| b.layout.size()))
            .finish()
    }
}
