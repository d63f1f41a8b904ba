//! One fixed-capacity chunk of a column.
//!
//! A `Buffer` is contiguous storage of `T` paired one-to-one with a
//! `ValidityBitmap` of the same logical length. It is append-only until it
//! reaches its capacity; after that only element writes are allowed. Null
//! slots hold `T::default()` so the value slice stays dense.

use crate::bitmap::ValidityBitmap;
use crate::value::Element;

#[derive(Debug, Clone, PartialEq)]
pub struct Buffer<T: Element> {
    values: Vec<T>,
    validity: ValidityBitmap,
    capacity: usize,
}

impl<T: Element> Buffer<T> {
    pub fn new(capacity: usize) -> Self {
        Buffer {
            values: Vec::new(),
            validity: ValidityBitmap::new(),
            capacity,
        }
    }

    /// Build a buffer from parallel values and validity.
    ///
    /// Slots marked null are reset to the default value.
    pub(crate) fn from_parts(mut values: Vec<T>, validity: ValidityBitmap, capacity: usize) -> Self {
        debug_assert_eq!(values.len(), validity.len());
        debug_assert!(values.len() <= capacity);
        if validity.null_count() > 0 {
            for (i, v) in values.iter_mut().enumerate() {
                if !validity.get(i) {
                    *v = T::default();
                }
            }
        }
        Buffer {
            values,
            validity,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.values.len() >= self.capacity
    }

    pub fn null_count(&self) -> usize {
        self.validity.null_count()
    }

    /// Append a value or a null. Panics when the buffer is full.
    pub fn push(&mut self, value: Option<T>) {
        assert!(!self.is_full(), "buffer is at capacity {}", self.capacity);
        match value {
            Some(v) => {
                self.values.push(v);
                self.validity.push(true);
            }
            None => {
                self.values.push(T::default());
                self.validity.push(false);
            }
        }
    }

    /// `None` when the slot is null. Panics when out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        if self.validity.get(index) {
            Some(&self.values[index])
        } else {
            None
        }
    }

    pub fn set(&mut self, index: usize, value: Option<T>) {
        match value {
            Some(v) => {
                self.values[index] = v;
                self.validity.set(index, true);
            }
            None => {
                self.values[index] = T::default();
                self.validity.set(index, false);
            }
        }
    }

    #[inline]
    pub fn is_valid(&self, index: usize) -> bool {
        self.validity.get(index)
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn validity(&self) -> &ValidityBitmap {
        &self.validity
    }

    /// Split borrow used by the kernels: writable values and validity together.
    pub fn parts_mut(&mut self) -> (&mut [T], &mut ValidityBitmap) {
        (&mut self.values, &mut self.validity)
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&T>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }
}
