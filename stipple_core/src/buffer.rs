// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Growable typed buffer with explicit logical length.
//!
//! [`TypedBuffer`] keeps a backing store whose length is the buffer's
//! *capacity* and a separate logical length. Truncation ([`pop`](TypedBuffer::pop),
//! [`clear`](TypedBuffer::clear)) only moves the logical length, so a buffer
//! that is cleared and refilled every frame stops allocating once it has seen
//! its peak size.
//!
//! The same type backs opcode storage (`u8`), operand storage (`f64`) and the
//! various scratch stacks used by the encoder and interpreter.

use alloc::vec::Vec;

/// Smallest capacity allocated on first growth.
const MIN_CAPACITY: usize = 16;

/// A resizable contiguous buffer of plain numeric values.
#[derive(Clone, Debug, Default)]
pub struct TypedBuffer<T> {
    storage: Vec<T>,
    len: usize,
}

impl<T: Copy + Default> TypedBuffer<T> {
    /// Creates an empty buffer without allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            storage: Vec::new(),
            len: 0,
        }
    }

    /// Creates an empty buffer with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut storage = Vec::new();
        storage.resize(capacity, T::default());
        Self { storage, len: 0 }
    }

    /// Number of live elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no live elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the backing store can hold without growing.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Appends one element, doubling the capacity when full.
    #[inline]
    pub fn push(&mut self, value: T) {
        if self.len == self.storage.len() {
            self.grow_to(self.len + 1);
        }
        self.storage[self.len] = value;
        self.len += 1;
    }

    /// Appends several elements with a single capacity check.
    ///
    /// Fixed-arity instructions use this to write all of their operands at
    /// once.
    #[inline]
    pub fn push_multiple(&mut self, values: &[T]) {
        let end = self.len + values.len();
        if end > self.storage.len() {
            self.grow_to(end);
        }
        self.storage[self.len..end].copy_from_slice(values);
        self.len = end;
    }

    /// Drops the last `count` elements. Clamps at zero; never deallocates.
    #[inline]
    pub fn pop(&mut self, count: usize) {
        self.len = self.len.saturating_sub(count);
    }

    /// Resets the logical length to zero, keeping the capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Returns the live elements.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.storage[..self.len]
    }

    /// Returns the whole backing store, including stale elements past
    /// [`len`](Self::len).
    #[inline]
    #[must_use]
    pub fn storage(&self) -> &[T] {
        &self.storage
    }

    /// Returns the element at `index` if it is live.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.as_slice().get(index).copied()
    }

    /// Returns the last live element.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.as_slice().last().copied()
    }

    /// Returns the last `n` live elements, or `None` if fewer are live.
    #[inline]
    #[must_use]
    pub fn last_n(&self, n: usize) -> Option<&[T]> {
        if n > self.len {
            return None;
        }
        Some(&self.storage[self.len - n..self.len])
    }

    /// Grows the backing store to at least `min_capacity`.
    fn grow_to(&mut self, min_capacity: usize) {
        let doubled = self.storage.len().saturating_mul(2);
        let new_capacity = doubled.max(min_capacity).max(MIN_CAPACITY);
        self.storage.resize(new_capacity, T::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_read_back() {
        let mut buf = TypedBuffer::<u8>::new();
        buf.push(3);
        buf.push(7);
        assert_eq!(buf.as_slice(), &[3, 7]);
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.last(), Some(7));
    }

    #[test]
    fn growth_doubles_capacity() {
        let mut buf = TypedBuffer::<u32>::new();
        for i in 0..16 {
            buf.push(i);
        }
        assert_eq!(buf.capacity(), 16);
        buf.push(16);
        assert_eq!(buf.capacity(), 32);
        assert_eq!(buf.len(), 17);
    }

    #[test]
    fn push_multiple_grows_to_fit() {
        let mut buf = TypedBuffer::<f64>::new();
        let big = [1.0; 40];
        buf.push_multiple(&big);
        assert_eq!(buf.len(), 40);
        assert!(buf.capacity() >= 40);
        buf.push_multiple(&[2.0, 3.0]);
        assert_eq!(buf.last_n(2), Some(&[2.0, 3.0][..]));
    }

    #[test]
    fn pop_clamps_at_zero() {
        let mut buf = TypedBuffer::<u8>::new();
        buf.push_multiple(&[1, 2, 3]);
        buf.pop(2);
        assert_eq!(buf.as_slice(), &[1]);
        buf.pop(10);
        assert!(buf.is_empty());
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut buf = TypedBuffer::<f32>::with_capacity(64);
        buf.push_multiple(&[1.0; 50]);
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 64);
        // Stale values remain visible through the raw storage view.
        assert_eq!(buf.storage()[0], 1.0);
        assert_eq!(buf.get(0), None);
    }

    #[test]
    fn last_n_rejects_short_buffers() {
        let mut buf = TypedBuffer::<u8>::new();
        buf.push(1);
        assert!(buf.last_n(2).is_none());
        assert_eq!(buf.last_n(0), Some(&[][..]));
    }
}
