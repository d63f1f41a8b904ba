//! Typed Column Container
//!
//! A container is an ordered list of fixed-capacity buffers that together
//! hold one column's values. Every buffer except possibly the last is full,
//! so locating an element is arithmetic on the chunk size rather than a
//! search, and buffers are never reordered.
//!
//! Buffers are held behind `Arc` and shared between containers after a
//! `clone()`, which therefore costs O(#buffers). Writers go through
//! `get_or_create_mutable_buffer`, which copies a buffer only when another
//! container still holds it (copy-on-write), so a clone never observes writes
//! made to the original or vice versa.

use crate::buffer::Buffer;
use crate::error::Result;
use crate::value::Element;
use log::trace;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct TypedContainer<T: Element> {
    buffers: Vec<Arc<Buffer<T>>>,
    chunk_size: usize,
    len: usize,
    null_count: usize,
}

impl<T: Element> TypedContainer<T> {
    /// Panics if `chunk_size` is zero.
    pub fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be positive");
        TypedContainer {
            buffers: Vec::new(),
            chunk_size,
            len: 0,
            null_count: 0,
        }
    }

    pub fn from_options<I>(chunk_size: usize, values: I) -> Self
    where
        I: IntoIterator<Item = Option<T>>,
    {
        let mut container = Self::new(chunk_size);
        for v in values {
            container.append(v);
        }
        container
    }

    pub fn from_values<I>(chunk_size: usize, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::from_options(chunk_size, values.into_iter().map(Some))
    }

    /// Assemble a container from buffers built by a kernel.
    ///
    /// All buffers but the last must be full at `chunk_size`.
    pub(crate) fn from_buffers(chunk_size: usize, buffers: Vec<Buffer<T>>) -> Self {
        debug_assert!(buffers
            .iter()
            .rev()
            .skip(1)
            .all(|b| b.len() == chunk_size));
        let len = buffers.iter().map(Buffer::len).sum();
        let null_count = buffers.iter().map(Buffer::null_count).sum();
        TypedContainer {
            buffers: buffers.into_iter().map(Arc::new).collect(),
            chunk_size,
            len,
            null_count,
        }
    }

    pub fn nulls(chunk_size: usize, len: usize) -> Self {
        Self::from_options(chunk_size, std::iter::repeat_with(|| None).take(len))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn null_count(&self) -> usize {
        self.null_count
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn buffers(&self) -> impl Iterator<Item = &Buffer<T>> + '_ {
        self.buffers.iter().map(|b| b.as_ref())
    }

    pub fn buffer(&self, chunk: usize) -> &Buffer<T> {
        &self.buffers[chunk]
    }

    /// True when another container still references this chunk.
    pub fn is_shared(&self, chunk: usize) -> bool {
        Arc::strong_count(&self.buffers[chunk]) > 1
    }

    /// Map a global index to (chunk, offset). Panics when out of range.
    #[inline]
    fn locate(&self, index: usize) -> (usize, usize) {
        assert!(
            index < self.len,
            "index {} out of range [0, {})",
            index,
            self.len
        );
        (index / self.chunk_size, index % self.chunk_size)
    }

    pub fn append(&mut self, value: Option<T>) {
        let needs_chunk = self.buffers.last().map_or(true, |b| b.is_full());
        if needs_chunk {
            trace!(
                "allocating {} chunk #{} (capacity {})",
                T::ELEMENT_TYPE,
                self.buffers.len(),
                self.chunk_size
            );
            self.buffers.push(Arc::new(Buffer::new(self.chunk_size)));
        }
        if value.is_none() {
            self.null_count += 1;
        }
        let last = self.buffers.len() - 1;
        Self::materialize(&mut self.buffers[last]).push(value);
        self.len += 1;
    }

    /// `None` for a null element. Panics when out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        let (chunk, offset) = self.locate(index);
        self.buffers[chunk].get(offset)
    }

    #[inline]
    pub fn is_valid(&self, index: usize) -> bool {
        let (chunk, offset) = self.locate(index);
        self.buffers[chunk].is_valid(offset)
    }

    pub fn set(&mut self, index: usize, value: Option<T>) {
        let (chunk, offset) = self.locate(index);
        self.get_or_create_mutable_buffer(chunk).set(offset, value);
    }

    fn materialize(slot: &mut Arc<Buffer<T>>) -> &mut Buffer<T> {
        if Arc::strong_count(slot) > 1 {
            trace!(
                "copy-on-write: materializing shared {} chunk of {} elements",
                T::ELEMENT_TYPE,
                slot.len()
            );
        }
        Arc::make_mut(slot)
    }

    /// Exclusive, writable access to one chunk.
    ///
    /// If the chunk is shared with another container it is copied first. The
    /// returned guard folds any change in the chunk's null count back into
    /// the container's cached total when it is dropped.
    pub fn get_or_create_mutable_buffer(&mut self, chunk: usize) -> MutableBuffer<'_, T> {
        let buffer = Self::materialize(&mut self.buffers[chunk]);
        let before = buffer.null_count();
        MutableBuffer {
            buffer,
            null_count: &mut self.null_count,
            before,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&T>> + '_ {
        self.buffers.iter().flat_map(|b| b.iter())
    }

    /// Copy into a container with a different chunk size.
    pub fn rechunk(&self, chunk_size: usize) -> Self {
        Self::from_options(chunk_size, self.iter().map(|v| v.cloned()))
    }

    /// Apply `f` to every non-null element, keeping nulls and chunk layout.
    pub fn try_map<U, F>(&self, mut f: F) -> Result<TypedContainer<U>>
    where
        U: Element,
        F: FnMut(&T) -> Result<U>,
    {
        let mut buffers = Vec::with_capacity(self.buffers.len());
        for buffer in &self.buffers {
            let mut values = Vec::with_capacity(buffer.len());
            for (i, v) in buffer.values().iter().enumerate() {
                if buffer.is_valid(i) {
                    values.push(f(v)?);
                } else {
                    values.push(U::default());
                }
            }
            buffers.push(Arc::new(Buffer::from_parts(
                values,
                buffer.validity().clone(),
                self.chunk_size,
            )));
        }
        Ok(TypedContainer {
            buffers,
            chunk_size: self.chunk_size,
            len: self.len,
            null_count: self.null_count,
        })
    }

    /// Copy of `len` elements starting at `start`. Panics when out of range.
    pub fn slice(&self, start: usize, len: usize) -> Self {
        assert!(
            start + len <= self.len,
            "slice [{}, {}) out of range [0, {})",
            start,
            start + len,
            self.len
        );
        Self::from_options(
            self.chunk_size,
            (start..start + len).map(|i| self.get(i).cloned()),
        )
    }

    /// Keep the elements whose position yields `true` from `keep`.
    pub fn filter<I>(&self, keep: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        Self::from_options(
            self.chunk_size,
            self.iter()
                .zip(keep)
                .filter(|(_, k)| *k)
                .map(|(v, _)| v.cloned()),
        )
    }
}

/// Writable view of one chunk handed out by
/// [`TypedContainer::get_or_create_mutable_buffer`].
pub struct MutableBuffer<'a, T: Element> {
    buffer: &'a mut Buffer<T>,
    null_count: &'a mut usize,
    before: usize,
}

impl<T: Element> Deref for MutableBuffer<'_, T> {
    type Target = Buffer<T>;

    fn deref(&self) -> &Buffer<T> {
        self.buffer
    }
}

impl<T: Element> DerefMut for MutableBuffer<'_, T> {
    fn deref_mut(&mut self) -> &mut Buffer<T> {
        self.buffer
    }
}

impl<T: Element> Drop for MutableBuffer<'_, T> {
    fn drop(&mut self) {
        let after = self.buffer.null_count();
        *self.null_count = *self.null_count + after - self.before;
    }
}
