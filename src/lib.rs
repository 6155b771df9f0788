//! Resizable lists of primitives supporting live, zero-copy sub-list views.
//!
//! A [`ViewList`] created with a constructor owns a growable buffer. Views
//! derived from it with [`ViewList::sub_view`], and views derived from those,
//! form a graph over that single buffer: a structural change made through any
//! view (insertion, removal, reallocation, trim) is reflected in every other
//! view of the graph, and invalidates the outstanding [`Cursor`]s of all of
//! them.
#![no_std]
extern crate alloc;

mod buffer;
mod cursor;
pub mod element;
pub mod error;
mod graph;
mod list;
mod macros;
#[cfg(feature = "serde")]
mod serde;
mod utils;

pub use crate::{
    cursor::{Cursor, RevCursor},
    element::Element,
    error::Error,
    list::ViewList,
};

pub type LongList = ViewList<i64>;
pub type IntList = ViewList<i32>;
pub type DoubleList = ViewList<f64>;
