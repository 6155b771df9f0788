use alloc::vec::Vec;
use core::{cmp::max, mem};

use crate::{element::Element, error::Error};

/// Largest element count a single allocation may hold.
pub(crate) const fn max_capacity<T>() -> usize {
    let size = mem::size_of::<T>();
    if size == 0 {
        usize::MAX
    } else {
        isize::MAX as usize / size
    }
}

/// Capacity to grow to when `required` elements do not fit in `capacity`.
pub(crate) fn grown_capacity<T>(capacity: usize, required: usize) -> usize {
    let grown = (capacity / 2)
        .saturating_add(capacity)
        .saturating_add(1)
        .min(max_capacity::<T>());
    max(grown, required)
}

/// The growable store shared by every view of a graph.
///
/// Its live length is the length of the root view. Reallocation always
/// allocates a fresh store before releasing the previous one, so a failed
/// allocation leaves the buffer untouched.
pub(crate) struct Buffer<T> {
    store: Vec<T>,
}

impl<T: Element> Buffer<T> {
    pub(crate) const fn new() -> Self {
        Self { store: Vec::new() }
    }

    fn allocate(capacity: usize) -> Result<Vec<T>, Error> {
        if capacity > max_capacity::<T>() {
            return Err(Error::InvalidCapacity);
        }
        let mut store = Vec::new();
        store
            .try_reserve_exact(capacity)
            .map_err(|_| Error::AllocError)?;
        Ok(store)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Result<Self, Error> {
        Ok(Self {
            store: Self::allocate(capacity)?,
        })
    }

    pub(crate) fn from_slice(values: &[T]) -> Result<Self, Error> {
        let mut store = Self::allocate(values.len())?;
        store.extend_from_slice(values);
        Ok(Self { store })
    }

    pub(crate) fn from_vec(store: Vec<T>) -> Self {
        Self { store }
    }

    pub(crate) fn len(&self) -> usize {
        self.store.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub(crate) fn as_ptr(&self) -> *const T {
        self.store.as_ptr()
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        &self.store
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.store
    }

    fn replace_store(&mut self, capacity: usize) -> Result<(), Error> {
        let mut store = Self::allocate(capacity)?;
        store.extend_from_slice(&self.store);
        self.store = store;
        Ok(())
    }

    /// Grows the store to hold at least `min_capacity` elements.
    ///
    /// Returns the new capacity if the store was reallocated.
    pub(crate) fn ensure_capacity(&mut self, min_capacity: usize) -> Result<Option<usize>, Error> {
        let capacity = self.capacity();
        if capacity >= min_capacity {
            return Ok(None);
        }
        if min_capacity > max_capacity::<T>() {
            return Err(Error::InvalidCapacity);
        }
        self.replace_store(grown_capacity::<T>(capacity, min_capacity))?;
        Ok(Some(self.capacity()))
    }

    /// Shrinks the store to its live length.
    ///
    /// Returns `true` if the store was reallocated.
    pub(crate) fn trim_to_size(&mut self) -> Result<bool, Error> {
        if self.capacity() == self.len() {
            return Ok(false);
        }
        if self.store.is_empty() {
            self.store = Vec::new();
            return Ok(true);
        }
        self.replace_store(self.len())?;
        Ok(true)
    }

    /// Opens a gap at `at` and copies `values` into it.
    ///
    /// Capacity must already have been ensured.
    pub(crate) fn insert_slice(&mut self, at: usize, values: &[T]) {
        debug_assert!(self.capacity() - self.len() >= values.len());
        self.store.extend_from_slice(values);
        self.store[at..].rotate_right(values.len());
    }

    /// Closes the gap `start..end`.
    pub(crate) fn remove_range(&mut self, start: usize, end: usize) {
        let len = self.len();
        self.store.copy_within(end..len, start);
        self.store.truncate(len - (end - start));
    }
}
