//! Typed front end over [`RawBuffer`].
//!
//! [`GrowableBuffer<T>`] fixes the element size and block alignment from
//! `T`, so callers never pass sizes. Elements are moved as raw bytes, which
//! is why `T` must be [`bytemuck::Pod`]: any bit pattern copied in can be
//! read back out, and there is no drop glue to run.

#![forbid(unsafe_code)]

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Bound, Deref, DerefMut, RangeBounds};

use bytemuck::Pod;
use phibuf_core::BufferError;

use crate::allocator::{BlockAllocator, Global};
use crate::config::BufferConfig;
use crate::raw::RawBuffer;

/// A growable contiguous buffer of `T`.
///
/// Growth follows the buffer's [`BufferConfig`] (golden-ratio growth by
/// default). Fallible operations return [`BufferError`] and leave the
/// buffer unchanged on failure. Index and range arguments are checked and
/// panic when out of bounds.
pub struct GrowableBuffer<T, A: BlockAllocator = Global> {
    raw: RawBuffer<A>,
    _marker: PhantomData<T>,
}

impl<T: Pod> GrowableBuffer<T, Global> {
    /// Create an empty buffer. Does not allocate.
    pub fn new() -> Self {
        Self::new_in(BufferConfig::new(), Global).expect("default config is valid")
    }

    /// Create a buffer with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Result<Self, BufferError> {
        Self::with_capacity_in(capacity, BufferConfig::new(), Global)
    }

    /// Create a buffer with the default initial capacity (8 elements).
    pub fn with_default_capacity() -> Result<Self, BufferError> {
        Self::with_capacity(BufferConfig::DEFAULT_INITIAL_CAPACITY)
    }

    /// Create an empty buffer with a custom config.
    pub fn with_config(config: BufferConfig) -> Result<Self, BufferError> {
        Self::new_in(config, Global)
    }

    /// Create a buffer holding a copy of `values`, with the default
    /// initial capacity or more.
    pub fn try_from_slice(values: &[T]) -> Result<Self, BufferError> {
        let mut buf = Self::with_default_capacity()?;
        buf.extend_from_slice(values)?;
        Ok(buf)
    }
}

impl<T: Pod> Default for GrowableBuffer<T, Global> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Pod, A: BlockAllocator> GrowableBuffer<T, A> {
    const ELEM_SIZE: usize = {
        assert!(
            std::mem::size_of::<T>() != 0,
            "zero-sized element types are not supported"
        );
        std::mem::size_of::<T>()
    };

    /// Create an empty buffer with an explicit config and allocator.
    pub fn new_in(config: BufferConfig, alloc: A) -> Result<Self, BufferError> {
        let _ = Self::ELEM_SIZE;
        Ok(Self {
            raw: RawBuffer::new_in(config, std::mem::align_of::<T>(), alloc)?,
            _marker: PhantomData,
        })
    }

    /// Create a buffer with room for `capacity` elements, using an explicit
    /// config and allocator.
    pub fn with_capacity_in(
        capacity: usize,
        config: BufferConfig,
        alloc: A,
    ) -> Result<Self, BufferError> {
        let mut buf = Self::new_in(config, alloc)?;
        buf.raw.init(capacity, Self::ELEM_SIZE)?;
        Ok(buf)
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// True when the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Number of elements the buffer can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// The buffer's configuration.
    pub fn config(&self) -> &BufferConfig {
        self.raw.config()
    }

    /// The underlying type-erased buffer.
    pub fn as_raw(&self) -> &RawBuffer<A> {
        &self.raw
    }

    /// The elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        if self.raw.is_empty() {
            return &[];
        }
        bytemuck::cast_slice(self.raw.as_bytes(Self::ELEM_SIZE))
    }

    /// The elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        if self.raw.is_empty() {
            return &mut [];
        }
        bytemuck::cast_slice_mut(self.raw.as_bytes_mut(Self::ELEM_SIZE))
    }

    /// Append one element.
    pub fn push(&mut self, value: T) -> Result<(), BufferError> {
        self.raw.append(bytemuck::bytes_of(&value), Self::ELEM_SIZE)
    }

    /// Insert `values` at `pos`, shifting later elements right.
    ///
    /// # Panics
    ///
    /// Panics if `pos > len()`.
    pub fn insert_slice(&mut self, pos: usize, values: &[T]) -> Result<(), BufferError> {
        self.raw.insert(
            bytemuck::cast_slice(values),
            pos,
            values.len(),
            Self::ELEM_SIZE,
        )
    }

    /// Append all of `values`.
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<(), BufferError> {
        self.raw
            .extend(bytemuck::cast_slice(values), values.len(), Self::ELEM_SIZE)
    }

    /// Remove the elements in `range`, shifting later elements left.
    /// Capacity is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the range is reversed, extends past `len()`, or has a bound
    /// that cannot be made exclusive without overflowing `usize`.
    pub fn remove_range<R: RangeBounds<usize>>(&mut self, range: R) {
        let len = self.len();
        let from = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s
                .checked_add(1)
                .unwrap_or_else(|| panic!("attempted to index slice from after maximum usize")),
            Bound::Unbounded => 0,
        };
        let to = match range.end_bound() {
            Bound::Included(&e) => e
                .checked_add(1)
                .unwrap_or_else(|| panic!("attempted to index slice up to maximum usize")),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => len,
        };
        assert!(
            from <= to && to <= len,
            "range {from}..{to} out of bounds for length {len}"
        );
        self.raw.remove(from, to, Self::ELEM_SIZE);
    }

    /// Ensure room for `additional` more elements.
    pub fn reserve(&mut self, additional: usize) -> Result<(), BufferError> {
        self.raw.reserve(additional, Self::ELEM_SIZE)
    }

    /// Reallocate down to exactly `len()` elements. An empty buffer
    /// releases its block.
    pub fn shrink_to_fit(&mut self) -> Result<(), BufferError> {
        self.raw.shrink_to_fit(Self::ELEM_SIZE)
    }

    /// Remove all elements and release the block.
    pub fn reset(&mut self) {
        self.raw.reset();
    }

    /// Deep copy, reserving capacity per the config's copy policy.
    pub fn try_clone(&self) -> Result<Self, BufferError>
    where
        A: Clone,
    {
        Ok(Self {
            raw: self.raw.try_clone(Self::ELEM_SIZE)?,
            _marker: PhantomData,
        })
    }

    /// Overwrite `self` with a deep copy of `src`. On failure `self` is
    /// unchanged.
    pub fn clone_from_buffer<B: BlockAllocator>(
        &mut self,
        src: &GrowableBuffer<T, B>,
    ) -> Result<(), BufferError> {
        self.raw.copy_from(&src.raw, Self::ELEM_SIZE)
    }
}

impl<T: Pod, A: BlockAllocator> Deref for GrowableBuffer<T, A> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Pod, A: BlockAllocator> DerefMut for GrowableBuffer<T, A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Pod + fmt::Debug, A: BlockAllocator> fmt::Debug for GrowableBuffer<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CopyCapacity;

    type Point = [f32; 2];

    #[test]
    fn push_nine_values_past_default_capacity() {
        let mut buf = GrowableBuffer::<i32>::with_default_capacity().unwrap();
        for v in 0..9 {
            buf.push(v).unwrap();
        }
        assert_eq!(buf.len(), 9);
        assert!(buf.capacity() >= 9);
        assert_eq!(buf.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn new_does_not_allocate() {
        let buf = GrowableBuffer::<u64>::new();
        assert_eq!(buf.capacity(), 0);
        assert!(buf.as_slice().is_empty());
    }

    #[test]
    fn insert_slice_into_middle() {
        let mut buf = GrowableBuffer::try_from_slice(&[10, 20, 30, 40]).unwrap();
        buf.insert_slice(2, &[99, 98]).unwrap();
        assert_eq!(buf.as_slice(), &[10, 20, 99, 98, 30, 40]);
    }

    #[test]
    fn insert_at_len_matches_extend() {
        let mut a = GrowableBuffer::try_from_slice(&[1u16, 2]).unwrap();
        let mut b = GrowableBuffer::try_from_slice(&[1u16, 2]).unwrap();
        a.insert_slice(2, &[3, 4, 5]).unwrap();
        b.extend_from_slice(&[3, 4, 5]).unwrap();
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn remove_range_variants() {
        let mut buf = GrowableBuffer::try_from_slice(&[1, 2, 3, 4, 5]).unwrap();
        buf.remove_range(1..3);
        assert_eq!(buf.as_slice(), &[1, 4, 5]);
        buf.remove_range(..=0);
        assert_eq!(buf.as_slice(), &[4, 5]);
        buf.remove_range(..);
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 8);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn remove_range_past_len_panics() {
        let mut buf = GrowableBuffer::try_from_slice(&[1, 2, 3]).unwrap();
        buf.remove_range(2..5);
    }

    #[test]
    #[should_panic(expected = "up to maximum usize")]
    fn remove_range_inclusive_to_usize_max_panics() {
        let mut buf = GrowableBuffer::try_from_slice(&[1, 2, 3]).unwrap();
        buf.remove_range(..=usize::MAX);
    }

    #[test]
    #[should_panic(expected = "after maximum usize")]
    fn remove_range_excluded_start_at_usize_max_panics() {
        let mut buf = GrowableBuffer::try_from_slice(&[1, 2, 3]).unwrap();
        buf.remove_range((Bound::Excluded(usize::MAX), Bound::Unbounded));
    }

    #[test]
    fn remove_range_excluded_start_bound() {
        let mut buf = GrowableBuffer::try_from_slice(&[1, 2, 3, 4]).unwrap();
        buf.remove_range((Bound::Excluded(0), Bound::Included(1)));
        assert_eq!(buf.as_slice(), &[1, 3, 4]);
    }

    #[test]
    fn array_elements_round_trip() {
        let mut buf = GrowableBuffer::<Point>::new();
        buf.push([1.0, 2.0]).unwrap();
        buf.insert_slice(0, &[[-1.0, 0.5]]).unwrap();
        assert_eq!(buf[0], [-1.0, 0.5]);
        assert_eq!(buf[1], [1.0, 2.0]);
        assert_eq!(buf.as_raw().len(), 2);
    }

    #[test]
    fn deref_mut_writes_through() {
        let mut buf = GrowableBuffer::try_from_slice(&[1.0f64, 2.0]).unwrap();
        buf[1] = 5.0;
        buf.as_mut_slice()[0] = 4.0;
        assert_eq!(buf.as_slice(), &[4.0, 5.0]);
    }

    #[test]
    fn shrink_to_fit_then_grow() {
        let mut buf = GrowableBuffer::try_from_slice(&[1u8, 2, 3]).unwrap();
        buf.shrink_to_fit().unwrap();
        assert_eq!(buf.capacity(), 3);
        buf.push(4).unwrap();
        // round(3 * φ) = 5
        assert_eq!(buf.capacity(), 5);
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn try_clone_is_independent() {
        let src = GrowableBuffer::try_from_slice(&[1i64, 2, 3]).unwrap();
        let mut copy = src.try_clone().unwrap();
        assert_eq!(copy.capacity(), src.capacity());
        copy[0] = 100;
        assert_eq!(src.as_slice(), &[1, 2, 3]);
        assert_eq!(copy.as_slice(), &[100, 2, 3]);
    }

    #[test]
    fn clone_from_buffer_with_fit_policy() {
        let src = GrowableBuffer::try_from_slice(&[7u32; 10]).unwrap();
        let config = BufferConfig::new().with_copy_capacity(CopyCapacity::Fit);
        let mut dest = GrowableBuffer::<u32>::with_config(config).unwrap();
        dest.clone_from_buffer(&src).unwrap();
        assert_eq!(dest.capacity(), 10);
        assert_eq!(dest.as_slice(), src.as_slice());
    }

    #[test]
    fn block_alignment_follows_element_type() {
        let buf = GrowableBuffer::<u64>::with_capacity(3).unwrap();
        assert_eq!(buf.as_raw().align(), std::mem::align_of::<u64>());
    }

    #[test]
    fn reset_releases_block() {
        let mut buf = GrowableBuffer::try_from_slice(&[1, 2, 3]).unwrap();
        buf.reset();
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn debug_lists_elements() {
        let buf = GrowableBuffer::try_from_slice(&[1, 2]).unwrap();
        assert_eq!(format!("{buf:?}"), "[1, 2]");
    }

    #[test]
    fn invalid_config_rejected() {
        let config = BufferConfig::new().with_min_capacity(0);
        assert!(GrowableBuffer::<i32>::with_config(config).is_err());
    }
}
