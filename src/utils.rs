use core::{
    fmt,
    ops::{Bound, RangeBounds},
};

use crate::error::Error;

/// Resolves `range` against a view of length `len`, as `(start, end)`.
pub(crate) fn start_end(len: usize, range: impl RangeBounds<usize>) -> Result<(usize, usize), Error> {
    let start = match range.start_bound() {
        Bound::Included(&n) => Some(n),
        Bound::Excluded(&n) => n.checked_add(1),
        Bound::Unbounded => Some(0),
    };
    let end = match range.end_bound() {
        Bound::Included(&n) => n.checked_add(1),
        Bound::Excluded(&n) => Some(n),
        Bound::Unbounded => Some(len),
    };
    match (start, end) {
        (Some(start), Some(end)) if start <= end && end <= len => Ok((start, end)),
        (start, end) => Err(Error::InvalidRange {
            start: start.unwrap_or(usize::MAX),
            end: end.unwrap_or(usize::MAX),
            len,
        }),
    }
}

pub(crate) fn debug_list<T: fmt::Debug>(slice: &[T], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(slice).finish()
}

#[cold]
#[track_caller]
pub(crate) fn panic_error(error: Error) -> ! {
    match error {
        Error::AllocError => alloc::alloc::handle_alloc_error(core::alloc::Layout::new::<()>()),
        error => panic!("{error}"),
    }
}

#[cold]
pub(crate) fn panic_dangling_node() -> ! {
    panic!("view node released while still referenced")
}

pub(crate) trait UnwrapOrPanic<T> {
    fn unwrap_or_panic(self) -> T;
}

impl<T> UnwrapOrPanic<T> for Result<T, Error> {
    #[inline(always)]
    #[track_caller]
    fn unwrap_or_panic(self) -> T {
        match self {
            Ok(value) => value,
            Err(error) => panic_error(error),
        }
    }
}
