use core::fmt;

use crate::{element::Element, error::Error, list::ViewList, utils::UnwrapOrPanic};

/// Fail-fast bidirectional cursor over a [`ViewList`].
///
/// The cursor records the change counter of the view graph when it is
/// created. Every positioning or mutating call first checks the counter, and
/// fails with [`Error::ConcurrentModification`] if the graph was structurally
/// modified in the meantime, through any of its views. Changes made through
/// the cursor itself resynchronize it.
///
/// The cursor sits between two elements: [`try_next`](Self::try_next)
/// returns the element after it, [`try_previous`](Self::try_previous) the
/// element before it.
pub struct Cursor<T: Element> {
    list: ViewList<T>,
    expected_mod_count: u64,
    next: usize,
    last_returned: Option<usize>,
}

impl<T: Element> Cursor<T> {
    pub(crate) fn new(list: ViewList<T>, next: usize) -> Self {
        Self {
            expected_mod_count: list.mod_count(),
            list,
            next,
            last_returned: None,
        }
    }

    fn check(&self) -> Result<(), Error> {
        if self.list.mod_count() != self.expected_mod_count {
            return Err(Error::ConcurrentModification);
        }
        Ok(())
    }

    fn resync(&mut self) {
        self.expected_mod_count = self.list.mod_count();
    }

    pub fn has_next(&self) -> bool {
        self.next < self.list.len()
    }

    pub fn has_previous(&self) -> bool {
        self.next > 0
    }

    /// Index of the element the next call to `try_next` would return.
    pub fn next_index(&self) -> usize {
        self.next
    }

    pub fn previous_index(&self) -> Option<usize> {
        self.next.checked_sub(1)
    }

    pub fn try_next(&mut self) -> Result<Option<T>, Error> {
        self.check()?;
        let value = match self.list.get(self.next) {
            Some(value) => value,
            None => return Ok(None),
        };
        self.last_returned = Some(self.next);
        self.next += 1;
        Ok(Some(value))
    }

    pub fn try_previous(&mut self) -> Result<Option<T>, Error> {
        self.check()?;
        let index = match self.next.checked_sub(1) {
            Some(index) => index,
            None => return Ok(None),
        };
        let value = self.list.try_get(index)?;
        self.last_returned = Some(index);
        self.next = index;
        Ok(Some(value))
    }

    /// Replaces the element last returned by `try_next` or `try_previous`.
    pub fn set(&mut self, value: T) -> Result<(), Error> {
        self.check()?;
        let index = self.last_returned.ok_or(Error::IllegalState)?;
        self.list.try_set(index, value)?;
        Ok(())
    }

    /// Inserts `value` before the cursor; a following `try_previous` returns it.
    pub fn add(&mut self, value: T) -> Result<(), Error> {
        self.check()?;
        self.list.try_insert(self.next, value)?;
        self.next += 1;
        self.last_returned = None;
        self.resync();
        Ok(())
    }

    /// Removes the element last returned by `try_next` or `try_previous`.
    pub fn remove(&mut self) -> Result<T, Error> {
        self.check()?;
        let index = self.last_returned.take().ok_or(Error::IllegalState)?;
        let value = self.list.try_remove(index)?;
        if index < self.next {
            self.next -= 1;
        }
        self.resync();
        Ok(value)
    }
}

/// The iterator is not fused: moving the cursor back with
/// [`Cursor::try_previous`] after `None` resumes the iteration.
///
/// # Panics
///
/// `next` panics if the graph was structurally modified since the cursor
/// last synchronized; use [`Cursor::try_next`] to handle it.
impl<T: Element> Iterator for Cursor<T> {
    type Item = T;

    #[track_caller]
    fn next(&mut self) -> Option<Self::Item> {
        self.try_next().unwrap_or_panic()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.check().is_err() {
            return (0, Some(0));
        }
        let remaining = self.list.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl<T: Element> fmt::Debug for Cursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("list", &self.list)
            .field("next", &self.next)
            .field("last_returned", &self.last_returned)
            .finish()
    }
}

/// Fail-fast iterator walking a [`ViewList`] backwards.
pub struct RevCursor<T: Element>(Cursor<T>);

impl<T: Element> RevCursor<T> {
    pub(crate) fn new(cursor: Cursor<T>) -> Self {
        Self(cursor)
    }

    pub fn try_next(&mut self) -> Result<Option<T>, Error> {
        self.0.try_previous()
    }

    pub fn into_cursor(self) -> Cursor<T> {
        self.0
    }
}

impl<T: Element> Iterator for RevCursor<T> {
    type Item = T;

    #[track_caller]
    fn next(&mut self) -> Option<Self::Item> {
        self.try_next().unwrap_or_panic()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.0.check().is_err() {
            return (0, Some(0));
        }
        (self.0.next, Some(self.0.next))
    }
}

impl<T: Element> fmt::Debug for RevCursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RevCursor").field(&self.0).finish()
    }
}
