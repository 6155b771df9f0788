//! The errors.

use core::fmt;

/// Error returned by the fallible (`try_*`) operations of [`ViewList`] and [`Cursor`].
///
/// [`ViewList`]: crate::ViewList
/// [`Cursor`]: crate::Cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The index is outside `[0, len)`, or outside `[0, len]` for an insertion.
    IndexOutOfRange { index: usize, len: usize },
    /// The range bounds are reversed or exceed `[0, len]`.
    InvalidRange { start: usize, end: usize, len: usize },
    /// The view graph was structurally modified since the cursor last synchronized.
    ///
    /// The modification may have been made through any view of the graph,
    /// not only through the one the cursor iterates.
    ConcurrentModification,
    /// The requested capacity exceeds the buffer maximum (`isize::MAX` bytes).
    InvalidCapacity,
    /// The memory allocator returned an error.
    AllocError,
    /// A cursor `set` or `remove` was not preceded by `next` or `previous`.
    IllegalState,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Self::InvalidRange { start, end, len } => {
                write!(f, "invalid range {start}..{end} for length {len}")
            }
            Self::ConcurrentModification => f.write_str("concurrent modification"),
            Self::InvalidCapacity => f.write_str("invalid capacity"),
            Self::AllocError => f.write_str("allocation error"),
            Self::IllegalState => f.write_str("illegal cursor state"),
        }
    }
}

#[cfg(feature = "std")]
const _: () = {
    extern crate std;
    impl std::error::Error for Error {}
};

impl Error {
    pub(crate) fn index(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }
}
