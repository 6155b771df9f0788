use alloc::{rc::Rc, vec::Vec};
use core::{
    cell::{Ref, RefCell, RefMut},
    cmp, fmt,
    hash::{Hash, Hasher},
    ops::{Range, RangeBounds},
};

use crate::{
    buffer::Buffer,
    cursor::{Cursor, RevCursor},
    element::Element,
    error::Error,
    graph::{Graph, NodeId},
    utils::{debug_list, panic_error, start_end, UnwrapOrPanic},
};

/// A resizable list of primitives, or a live view over a range of one.
///
/// Every list created with a constructor is the root of a view graph.
/// [`sub_view`](Self::sub_view) derives a new list sharing the same buffer,
/// without copying: insertions and removals made through any view of the
/// graph are visible, correctly offset, through every other view.
///
/// ```
/// use view_list::LongList;
///
/// let mut list = LongList::from_slice(&[10, 20, 30, 40, 50]);
/// let view = list.sub_view(1..4);
/// assert_eq!(view, [20, 30, 40]);
///
/// list.insert(0, 99);
/// assert_eq!(list, [99, 10, 20, 30, 40, 50]);
/// assert_eq!(view, [20, 30, 40]);
/// assert!(view.shares_buffer_with(&list));
/// ```
///
/// Views are single-threaded handles, external synchronization is required
/// to share a graph between threads.
pub struct ViewList<T: Element> {
    shared: Rc<Shared<T>>,
    node: NodeId,
}

struct Shared<T> {
    graph: RefCell<Graph<T>>,
    // nodes whose handle was dropped while the graph was borrowed, released
    // on the next mutable borrow
    released: RefCell<Vec<NodeId>>,
}

impl<T: Element> ViewList<T> {
    fn from_buffer(buffer: Buffer<T>) -> Self {
        Self {
            shared: Rc::new(Shared {
                graph: RefCell::new(Graph::new(buffer)),
                released: RefCell::new(Vec::new()),
            }),
            node: Graph::<T>::ROOT,
        }
    }

    fn graph(&self) -> Ref<'_, Graph<T>> {
        self.shared.graph.borrow()
    }

    fn graph_mut(&self) -> RefMut<'_, Graph<T>> {
        let mut graph = self.shared.graph.borrow_mut();
        for node in self.shared.released.take() {
            graph.release(node);
        }
        graph
    }

    /// Another handle on the same node.
    pub(crate) fn share(&self) -> Self {
        self.graph_mut().acquire(self.node);
        Self {
            shared: self.shared.clone(),
            node: self.node,
        }
    }

    pub fn new() -> Self {
        Self::from_buffer(Buffer::new())
    }

    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        Ok(Self::from_buffer(Buffer::with_capacity(capacity)?))
    }

    #[cfg(feature = "oom-handling")]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::try_with_capacity(capacity).unwrap_or_panic()
    }

    pub fn try_from_slice(values: &[T]) -> Result<Self, Error> {
        Ok(Self::from_buffer(Buffer::from_slice(values)?))
    }

    #[cfg(feature = "oom-handling")]
    pub fn from_slice(values: &[T]) -> Self {
        Self::try_from_slice(values).unwrap_or_panic()
    }

    pub fn len(&self) -> usize {
        self.graph().len(self.node)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity of the buffer shared by the whole graph.
    pub fn capacity(&self) -> usize {
        self.graph().buffer().capacity()
    }

    /// Returns `true` if the list was not derived from another one.
    pub fn is_root(&self) -> bool {
        self.graph().is_root(self.node)
    }

    /// Absolute bounds of this view in the shared buffer.
    pub fn window(&self) -> Range<usize> {
        let (from, to) = self.graph().window(self.node);
        from..to
    }

    /// Start of the shared buffer; it changes when the buffer is reallocated.
    pub fn buffer_ptr(&self) -> *const T {
        self.graph().buffer().as_ptr()
    }

    /// Returns `true` if both lists belong to the same view graph.
    pub fn shares_buffer_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    /// Counter bumped by every structural change of the graph, whichever
    /// view it was made through.
    pub fn mod_count(&self) -> u64 {
        self.graph().mod_count()
    }

    /// Calls `f` with the contiguous elements of the view.
    ///
    /// # Panics
    ///
    /// Panics if `f` modifies the graph through another view. Views dropped
    /// in `f` are released on the next mutable access to the graph.
    pub fn with_slice<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(self.graph().slice(self.node))
    }

    /// Calls `f` with the mutable elements of the view.
    ///
    /// Updating values is not a structural change, cursors stay valid.
    ///
    /// # Panics
    ///
    /// Panics if `f` accesses the graph through another view.
    pub fn with_slice_mut<R>(&mut self, f: impl FnOnce(&mut [T]) -> R) -> R {
        f(self.graph_mut().slice_mut(self.node))
    }

    #[cfg(feature = "bytemuck")]
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        self.with_slice(|slice| f(bytemuck::cast_slice(slice)))
    }

    pub fn try_get(&self, index: usize) -> Result<T, Error> {
        self.graph().get(self.node, index)
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.try_get(index).ok()
    }

    pub fn first(&self) -> Option<T> {
        self.get(0)
    }

    pub fn last(&self) -> Option<T> {
        self.with_slice(|slice| slice.last().copied())
    }

    pub fn contains(&self, value: T) -> bool {
        self.index_of(value).is_some()
    }

    pub fn index_of(&self, value: T) -> Option<usize> {
        self.with_slice(|slice| slice.iter().position(|x| *x == value))
    }

    pub fn last_index_of(&self, value: T) -> Option<usize> {
        self.with_slice(|slice| slice.iter().rposition(|x| *x == value))
    }

    /// Binary searches a view sorted by [`Element::total_cmp`].
    pub fn binary_search(&self, value: T) -> Result<usize, usize> {
        self.with_slice(|slice| slice.binary_search_by(|x| x.total_cmp(&value)))
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.with_slice(<[T]>::to_vec)
    }

    /// # Panics
    ///
    /// Panics if `dst` has not the same length as the view.
    pub fn copy_to_slice(&self, dst: &mut [T]) {
        self.with_slice(|slice| dst.copy_from_slice(slice));
    }

    pub fn try_set(&mut self, index: usize, value: T) -> Result<T, Error> {
        self.graph_mut().set(self.node, index, value)
    }

    /// Replaces the element at `index`, returning the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[track_caller]
    pub fn set(&mut self, index: usize, value: T) -> T {
        self.try_set(index, value).unwrap_or_panic()
    }

    pub fn try_swap(&mut self, a: usize, b: usize) -> Result<(), Error> {
        let mut graph = self.graph_mut();
        let slice = graph.slice_mut(self.node);
        let len = slice.len();
        for index in [a, b] {
            if index >= len {
                return Err(Error::index(index, len));
            }
        }
        slice.swap(a, b);
        Ok(())
    }

    #[track_caller]
    pub fn swap(&mut self, a: usize, b: usize) {
        self.try_swap(a, b).unwrap_or_panic();
    }

    pub fn fill(&mut self, value: T) {
        self.with_slice_mut(|slice| slice.fill(value));
    }

    pub fn reverse(&mut self) {
        self.with_slice_mut(<[T]>::reverse);
    }

    pub fn sort(&mut self) {
        self.with_slice_mut(|slice| slice.sort_unstable_by(T::total_cmp));
    }

    /// Sorts the view with a comparator.
    ///
    /// The comparator runs on a copy of the elements, the graph stays
    /// accessible from it.
    ///
    /// # Panics
    ///
    /// Panics if the graph was structurally modified while sorting.
    pub fn sort_by(&mut self, mut compare: impl FnMut(&T, &T) -> cmp::Ordering) {
        self.rewrite(|values| values.sort_by(|a, b| compare(a, b)));
    }

    /// Replaces each element with the result of `f`.
    ///
    /// # Panics
    ///
    /// Panics if the graph was structurally modified by `f`.
    pub fn replace_all(&mut self, mut f: impl FnMut(T) -> T) {
        self.rewrite(|values| values.iter_mut().for_each(|x| *x = f(*x)));
    }

    fn rewrite(&mut self, f: impl FnOnce(&mut [T])) {
        let mod_count = self.mod_count();
        let mut values = self.to_vec();
        f(&mut values);
        if self.mod_count() != mod_count {
            panic_error(Error::ConcurrentModification);
        }
        self.with_slice_mut(|slice| slice.copy_from_slice(&values));
    }

    pub fn try_insert_all(&mut self, index: usize, values: &[T]) -> Result<(), Error> {
        self.graph_mut().insert(self.node, index, values)
    }

    pub fn try_insert(&mut self, index: usize, value: T) -> Result<(), Error> {
        self.try_insert_all(index, &[value])
    }

    pub fn try_extend_from_slice(&mut self, values: &[T]) -> Result<(), Error> {
        let len = self.len();
        self.try_insert_all(len, values)
    }

    pub fn try_push(&mut self, value: T) -> Result<(), Error> {
        self.try_extend_from_slice(&[value])
    }

    pub fn try_remove(&mut self, index: usize) -> Result<T, Error> {
        let value = self.try_get(index)?;
        self.graph_mut()
            .remove_range(self.node, index, index + 1)?;
        Ok(value)
    }

    /// Removes the element at `index`, shifting the following ones to the left.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[track_caller]
    pub fn remove(&mut self, index: usize) -> T {
        self.try_remove(index).unwrap_or_panic()
    }

    pub fn pop(&mut self) -> Option<T> {
        let len = self.len();
        len.checked_sub(1).and_then(|last| self.try_remove(last).ok())
    }

    pub fn try_remove_range(&mut self, range: impl RangeBounds<usize>) -> Result<(), Error> {
        let (start, end) = start_end(self.len(), range)?;
        self.graph_mut().remove_range(self.node, start, end)
    }

    #[track_caller]
    pub fn remove_range(&mut self, range: impl RangeBounds<usize>) {
        self.try_remove_range(range).unwrap_or_panic();
    }

    pub fn truncate(&mut self, len: usize) {
        if len < self.len() {
            self.remove_range(len..);
        }
    }

    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Removes the first occurrence of `value`, returning whether it was found.
    pub fn remove_value(&mut self, value: T) -> bool {
        match self.index_of(value) {
            Some(index) => {
                self.remove(index);
                true
            }
            None => false,
        }
    }

    /// Retains only the elements for which `f` returns `true`.
    ///
    /// Each run of consecutive removed elements is removed with a single
    /// structural change. Returns whether the view was modified.
    ///
    /// # Panics
    ///
    /// Panics if the graph was structurally modified by `f`.
    pub fn retain(&mut self, mut f: impl FnMut(T) -> bool) -> bool {
        let mod_count = self.mod_count();
        let values = self.to_vec();
        let mut runs = Vec::new();
        let mut run_start = None;
        for (index, value) in values.iter().enumerate() {
            match (f(*value), run_start) {
                (false, None) => run_start = Some(index),
                (true, Some(start)) => {
                    runs.push(start..index);
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            runs.push(start..values.len());
        }
        if self.mod_count() != mod_count {
            panic_error(Error::ConcurrentModification);
        }
        for run in runs.iter().rev() {
            self.remove_range(run.clone());
        }
        !runs.is_empty()
    }

    /// Removes every element contained in `values`.
    pub fn remove_all(&mut self, values: &[T]) -> bool {
        self.retain(|x| !values.contains(&x))
    }

    /// Removes every element not contained in `values`.
    pub fn retain_all(&mut self, values: &[T]) -> bool {
        self.retain(|x| values.contains(&x))
    }

    pub fn try_sub_view(&self, range: impl RangeBounds<usize>) -> Result<Self, Error> {
        let mut graph = self.graph_mut();
        let (start, end) = start_end(graph.len(self.node), range)?;
        let node = graph.sub_view(self.node, start, end);
        Ok(Self {
            shared: self.shared.clone(),
            node,
        })
    }

    /// Creates a view over `range`, sharing the buffer of this list.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    #[track_caller]
    pub fn sub_view(&self, range: impl RangeBounds<usize>) -> Self {
        self.try_sub_view(range).unwrap_or_panic()
    }

    pub fn try_split_view(&self, at: usize) -> Result<(Self, Self), Error> {
        Ok((self.try_sub_view(..at)?, self.try_sub_view(at..)?))
    }

    /// Creates two adjacent views, over `..at` and `at..`.
    #[track_caller]
    pub fn split_view(&self, at: usize) -> (Self, Self) {
        self.try_split_view(at).unwrap_or_panic()
    }

    /// Ensures this view can grow to `capacity` elements without reallocating
    /// the shared buffer.
    pub fn try_ensure_capacity(&mut self, capacity: usize) -> Result<(), Error> {
        self.graph_mut().ensure_capacity(self.node, capacity)
    }

    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.graph_mut().reserve(self.node, additional)
    }

    /// Shrinks the shared buffer to the length of the root list.
    pub fn try_trim_to_size(&mut self) -> Result<(), Error> {
        self.graph_mut().trim_to_size(self.node)
    }

    /// Copies the view into a new, independent root list.
    pub fn try_deep_clone(&self) -> Result<Self, Error> {
        self.with_slice(Self::try_from_slice)
    }

    pub fn cursor(&self) -> Cursor<T> {
        Cursor::new(self.share(), 0)
    }

    pub fn try_cursor_at(&self, index: usize) -> Result<Cursor<T>, Error> {
        let len = self.len();
        if index > len {
            return Err(Error::index(index, len));
        }
        Ok(Cursor::new(self.share(), index))
    }

    #[track_caller]
    pub fn cursor_at(&self, index: usize) -> Cursor<T> {
        self.try_cursor_at(index).unwrap_or_panic()
    }

    /// Fail-fast iterator over the elements.
    pub fn iter(&self) -> Cursor<T> {
        self.cursor()
    }

    /// Fail-fast iterator over the elements, from the last one.
    pub fn iter_rev(&self) -> RevCursor<T> {
        RevCursor::new(Cursor::new(self.share(), self.len()))
    }
}

#[cfg(feature = "oom-handling")]
impl<T: Element> ViewList<T> {
    /// Inserts `value` at `index`, shifting the following elements to the right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    #[track_caller]
    pub fn insert(&mut self, index: usize, value: T) {
        self.try_insert(index, value).unwrap_or_panic();
    }

    /// Inserts all `values` at `index` with a single structural change.
    #[track_caller]
    pub fn insert_all(&mut self, index: usize, values: &[T]) {
        self.try_insert_all(index, values).unwrap_or_panic();
    }

    pub fn extend_from_slice(&mut self, values: &[T]) {
        self.try_extend_from_slice(values).unwrap_or_panic();
    }

    pub fn push(&mut self, value: T) {
        self.try_push(value).unwrap_or_panic();
    }

    pub fn ensure_capacity(&mut self, capacity: usize) {
        self.try_ensure_capacity(capacity).unwrap_or_panic();
    }

    pub fn reserve(&mut self, additional: usize) {
        self.try_reserve(additional).unwrap_or_panic();
    }

    pub fn trim_to_size(&mut self) {
        self.try_trim_to_size().unwrap_or_panic();
    }

    pub fn deep_clone(&self) -> Self {
        self.try_deep_clone().unwrap_or_panic()
    }
}

impl<T: Element> Drop for ViewList<T> {
    fn drop(&mut self) {
        match self.shared.graph.try_borrow_mut() {
            Ok(mut graph) => {
                for node in self.shared.released.take() {
                    graph.release(node);
                }
                graph.release(self.node);
            }
            // dropped from a `with_slice` callback
            Err(_) => self.shared.released.borrow_mut().push(self.node),
        }
    }
}

/// Deep copy for a root list, aliasing view for a sub-view.
///
/// Cloning a root allocates a new buffer and yields an independent graph.
/// Cloning a sub-view yields another view over the same window, attached to
/// the same parent: writes through the clone are visible through the
/// original graph. Use [`deep_clone`](ViewList::deep_clone) for a snapshot.
#[cfg(feature = "oom-handling")]
impl<T: Element> Clone for ViewList<T> {
    fn clone(&self) -> Self {
        let alias = self.graph_mut().alias(self.node);
        match alias {
            Some(node) => Self {
                shared: self.shared.clone(),
                node,
            },
            None => self.deep_clone(),
        }
    }
}

impl<T: Element> Default for ViewList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> fmt::Debug for ViewList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_slice(|slice| debug_list(slice, f))
    }
}

impl<T: Element> Hash for ViewList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.with_slice(|slice| {
            state.write_usize(slice.len());
            slice.iter().for_each(|x| x.hash_into(state));
        });
    }
}

impl<T: Element> PartialEq for ViewList<T> {
    fn eq(&self, other: &ViewList<T>) -> bool {
        other.with_slice(|other| self == other)
    }
}

impl<T: Element + Eq> Eq for ViewList<T> {}

impl<T: Element> PartialOrd for ViewList<T> {
    fn partial_cmp(&self, other: &ViewList<T>) -> Option<cmp::Ordering> {
        other.with_slice(|other| self.with_slice(|this| this.partial_cmp(other)))
    }
}

impl<T: Element> PartialEq<[T]> for ViewList<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.with_slice(|slice| slice == other)
    }
}

impl<'a, T: Element> PartialEq<&'a [T]> for ViewList<T> {
    fn eq(&self, other: &&'a [T]) -> bool {
        *self == **other
    }
}

impl<T: Element, const N: usize> PartialEq<[T; N]> for ViewList<T> {
    fn eq(&self, other: &[T; N]) -> bool {
        *self == other[..]
    }
}

impl<'a, T: Element, const N: usize> PartialEq<&'a [T; N]> for ViewList<T> {
    fn eq(&self, other: &&'a [T; N]) -> bool {
        *self == other[..]
    }
}

impl<T: Element> PartialEq<Vec<T>> for ViewList<T> {
    fn eq(&self, other: &Vec<T>) -> bool {
        *self == **other
    }
}

impl<T: Element> PartialEq<ViewList<T>> for Vec<T> {
    fn eq(&self, other: &ViewList<T>) -> bool {
        *other == **self
    }
}

impl<T: Element> From<Vec<T>> for ViewList<T> {
    fn from(value: Vec<T>) -> Self {
        Self::from_buffer(Buffer::from_vec(value))
    }
}

#[cfg(feature = "oom-handling")]
impl<'a, T: Element> From<&'a [T]> for ViewList<T> {
    fn from(value: &'a [T]) -> Self {
        Self::from_slice(value)
    }
}

#[cfg(feature = "oom-handling")]
impl<T: Element, const N: usize> From<[T; N]> for ViewList<T> {
    fn from(value: [T; N]) -> Self {
        Self::from_slice(&value)
    }
}

#[cfg(feature = "oom-handling")]
impl<T: Element> Extend<T> for ViewList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let values = iter.into_iter().collect::<Vec<_>>();
        self.extend_from_slice(&values);
    }
}

#[cfg(feature = "oom-handling")]
impl<'a, T: Element> Extend<&'a T> for ViewList<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T: Element> FromIterator<T> for ViewList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter().collect::<Vec<_>>().into()
    }
}

impl<'a, T: Element> IntoIterator for &'a ViewList<T> {
    type Item = T;
    type IntoIter = Cursor<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
