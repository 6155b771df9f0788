//! The view graph: one arena per root list, holding the shared buffer and
//! every view window derived from it.
//!
//! Views are nodes addressed by [`NodeId`]. A node only stores its absolute
//! window into the buffer and its graph links: `parent`, the next sibling
//! created from the same parent, and the head of its own children chain.
//! Since the buffer lives in the arena, every node observes the same buffer
//! by construction; structural changes go through [`Graph::update_state`],
//! which walks the whole graph from the root and shifts every window.

use alloc::{vec, vec::Vec};

use crate::{
    buffer::Buffer,
    element::Element,
    error::Error,
    macros::{debug, trace},
    utils::panic_dangling_node,
};

pub(crate) type NodeId = usize;

#[derive(Debug)]
struct Node {
    from: usize,
    // `None` while the root has never been sub-viewed, the root length is then
    // the buffer length.
    to: Option<usize>,
    parent: Option<NodeId>,
    sibling_next: Option<NodeId>,
    child_head: Option<NodeId>,
    handles: usize,
}

impl Node {
    fn new(from: usize, to: usize, parent: NodeId, sibling_next: Option<NodeId>) -> Self {
        Self {
            from,
            to: Some(to),
            parent: Some(parent),
            sibling_next,
            child_head: None,
            handles: 1,
        }
    }
}

/// New window of a node after inserting `n` elements at absolute index `at`.
///
/// `contains_origin` is set for the node the insertion was made through and
/// for its ancestors: they grow even when `at` is their end bound.
fn shift_on_insert(
    (from, to): (usize, usize),
    at: usize,
    n: usize,
    contains_origin: bool,
) -> (usize, usize) {
    if contains_origin {
        (from, to + n)
    } else if at <= from {
        (from + n, to + n)
    } else if at < to {
        (from, to + n)
    } else {
        (from, to)
    }
}

/// New position of a window bound after removing absolute range `start..end`.
fn shift_on_remove(bound: usize, start: usize, end: usize) -> usize {
    if bound <= start {
        bound
    } else if bound >= end {
        bound - (end - start)
    } else {
        start
    }
}

pub(crate) struct Graph<T> {
    buffer: Buffer<T>,
    nodes: Vec<Option<Node>>,
    free: Vec<NodeId>,
    mod_count: u64,
}

impl<T: Element> Graph<T> {
    pub(crate) const ROOT: NodeId = 0;

    pub(crate) fn new(buffer: Buffer<T>) -> Self {
        let root = Node {
            from: 0,
            to: None,
            parent: None,
            sibling_next: None,
            child_head: None,
            handles: 1,
        };
        Self {
            buffer,
            nodes: vec![Some(root)],
            free: Vec::new(),
            mod_count: 0,
        }
    }

    fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(id) {
            Some(Some(node)) => node,
            _ => panic_dangling_node(),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id) {
            Some(Some(node)) => node,
            _ => panic_dangling_node(),
        }
    }

    pub(crate) fn buffer(&self) -> &Buffer<T> {
        &self.buffer
    }

    pub(crate) fn mod_count(&self) -> u64 {
        self.mod_count
    }

    pub(crate) fn is_root(&self, id: NodeId) -> bool {
        self.node(id).parent.is_none()
    }

    /// Absolute `(from, to)` bounds of the node window.
    pub(crate) fn window(&self, id: NodeId) -> (usize, usize) {
        let node = self.node(id);
        (node.from, node.to.unwrap_or(self.buffer.len()))
    }

    pub(crate) fn len(&self, id: NodeId) -> usize {
        let (from, to) = self.window(id);
        to - from
    }

    pub(crate) fn slice(&self, id: NodeId) -> &[T] {
        let (from, to) = self.window(id);
        &self.buffer.as_slice()[from..to]
    }

    pub(crate) fn slice_mut(&mut self, id: NodeId) -> &mut [T] {
        let (from, to) = self.window(id);
        &mut self.buffer.as_mut_slice()[from..to]
    }

    pub(crate) fn acquire(&mut self, id: NodeId) {
        self.node_mut(id).handles += 1;
    }

    /// Drops a handle on `id`, releasing the node once it has neither handles
    /// nor children. Releasing a node may in turn release its parent.
    pub(crate) fn release(&mut self, id: NodeId) {
        self.node_mut(id).handles -= 1;
        let mut id = id;
        loop {
            let node = self.node(id);
            if node.handles > 0 || node.child_head.is_some() {
                return;
            }
            // the root stays until the graph itself is dropped
            let parent = match node.parent {
                Some(parent) => parent,
                None => return,
            };
            self.unlink(parent, id);
            self.nodes[id] = None;
            self.free.push(id);
            trace!(node = id, "released view node");
            id = parent;
        }
    }

    fn unlink(&mut self, parent: NodeId, id: NodeId) {
        let next = self.node(id).sibling_next;
        if self.node(parent).child_head == Some(id) {
            self.node_mut(parent).child_head = next;
            return;
        }
        let mut current = self.node(parent).child_head;
        while let Some(sibling) = current {
            if self.node(sibling).sibling_next == Some(id) {
                self.node_mut(sibling).sibling_next = next;
                return;
            }
            current = self.node(sibling).sibling_next;
        }
    }

    fn link(&mut self, parent: NodeId, from: usize, to: usize) -> NodeId {
        let node = Node::new(from, to, parent, self.node(parent).child_head);
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        self.node_mut(parent).child_head = Some(id);
        id
    }

    /// Creates a child view over the local range `start..end` of `id`.
    ///
    /// An unbounded root is first frozen to its current length.
    pub(crate) fn sub_view(&mut self, id: NodeId, start: usize, end: usize) -> NodeId {
        let (from, to) = self.window(id);
        debug_assert!(start <= end && from + end <= to);
        let node = self.node_mut(id);
        if node.to.is_none() {
            node.to = Some(to);
        }
        let child = self.link(id, from + start, from + end);
        trace!(parent = id, node = child, from = from + start, to = from + end, "created sub-view");
        child
    }

    /// Creates a node with the same window as `id`, as a sibling of `id`.
    ///
    /// Returns `None` for the root, which has no parent to attach the alias to.
    pub(crate) fn alias(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        let (from, to) = self.window(id);
        Some(self.link(parent, from, to))
    }

    fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = vec![id];
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self.node(parent).parent;
        }
        ancestors
    }

    /// Restores the graph consistency after a change made through `origin`.
    ///
    /// `delta` elements were inserted (positive) or removed (negative) at
    /// absolute index `index`. A zero delta stands for a change of the buffer
    /// identity, which leaves every window in place. In every case the change
    /// counter is bumped, so outstanding cursors of every view are invalidated.
    pub(crate) fn update_state(&mut self, origin: NodeId, index: usize, delta: isize) -> usize {
        self.mod_count = self.mod_count.wrapping_add(1);
        if delta == 0 {
            return index;
        }
        let n = delta.unsigned_abs();
        let ancestors = self.ancestors(origin);
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            let contains_origin = ancestors.contains(&id);
            let node = self.node(id);
            let (parent, sibling_next, child_head) =
                (node.parent, node.sibling_next, node.child_head);
            if let Some(to) = node.to {
                let (mut from, mut to) = if delta > 0 {
                    shift_on_insert((node.from, to), index, n, contains_origin)
                } else {
                    (
                        shift_on_remove(node.from, index, index + n),
                        shift_on_remove(to, index, index + n),
                    )
                };
                // an empty window at its parent's end must not slide past it;
                // the parent was already updated
                if let Some(parent) = parent {
                    let (parent_from, parent_to) = self.window(parent);
                    from = from.clamp(parent_from, parent_to);
                    to = to.clamp(from, parent_to);
                }
                let node = self.node_mut(id);
                node.from = from;
                node.to = Some(to);
            }
            // pre-order: children before the next sibling
            if let Some(sibling) = sibling_next {
                stack.push(sibling);
            }
            if let Some(child) = child_head {
                stack.push(child);
            }
        }
        trace!(origin, index, delta, "propagated structural change");
        index
    }

    fn replace_buffer(&mut self, id: NodeId) {
        self.update_state(id, 0, 0);
    }

    /// Ensures the shared buffer can hold `capacity` elements overall.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub(crate) fn reserve_total(&mut self, id: NodeId, capacity: usize) -> Result<(), Error> {
        let old_capacity = self.buffer.capacity();
        if let Some(new_capacity) = self.buffer.ensure_capacity(capacity)? {
            debug!(old_capacity, new_capacity, "reallocated shared buffer");
            self.replace_buffer(id);
        }
        Ok(())
    }

    /// Ensures the view `id` can grow to `capacity` elements without reallocation.
    pub(crate) fn ensure_capacity(&mut self, id: NodeId, capacity: usize) -> Result<(), Error> {
        let outside = self.buffer.len() - self.len(id);
        let total = outside
            .checked_add(capacity)
            .ok_or(Error::InvalidCapacity)?;
        self.reserve_total(id, total)
    }

    pub(crate) fn reserve(&mut self, id: NodeId, additional: usize) -> Result<(), Error> {
        let total = self
            .buffer
            .len()
            .checked_add(additional)
            .ok_or(Error::InvalidCapacity)?;
        self.reserve_total(id, total)
    }

    pub(crate) fn trim_to_size(&mut self, id: NodeId) -> Result<(), Error> {
        if self.buffer.trim_to_size()? {
            debug!(capacity = self.buffer.capacity(), "trimmed shared buffer");
            self.replace_buffer(id);
        }
        Ok(())
    }

    pub(crate) fn get(&self, id: NodeId, index: usize) -> Result<T, Error> {
        let slice = self.slice(id);
        slice
            .get(index)
            .copied()
            .ok_or_else(|| Error::index(index, slice.len()))
    }

    /// Replaces an element; not a structural change.
    pub(crate) fn set(&mut self, id: NodeId, index: usize, value: T) -> Result<T, Error> {
        let slice = self.slice_mut(id);
        let len = slice.len();
        let slot = slice.get_mut(index).ok_or(Error::index(index, len))?;
        Ok(core::mem::replace(slot, value))
    }

    pub(crate) fn insert(&mut self, id: NodeId, index: usize, values: &[T]) -> Result<(), Error> {
        let (from, to) = self.window(id);
        if index > to - from {
            return Err(Error::index(index, to - from));
        }
        if values.is_empty() {
            return Ok(());
        }
        self.reserve(id, values.len())?;
        let at = from + index;
        self.buffer.insert_slice(at, values);
        self.update_state(id, at, values.len() as isize);
        Ok(())
    }

    pub(crate) fn remove_range(&mut self, id: NodeId, start: usize, end: usize) -> Result<(), Error> {
        let (from, to) = self.window(id);
        if start > end || end > to - from {
            return Err(Error::InvalidRange {
                start,
                end,
                len: to - from,
            });
        }
        if start == end {
            return Ok(());
        }
        self.buffer.remove_range(from + start, from + end);
        self.update_state(id, from + start, -((end - start) as isize));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    fn graph(values: &[i64]) -> Graph<i64> {
        Graph::new(Buffer::from_slice(values).unwrap())
    }

    impl<T: Element> Graph<T> {
        pub(crate) fn live_nodes(&self) -> Vec<NodeId> {
            (0..self.nodes.len())
                .filter(|&id| self.nodes[id].is_some())
                .collect()
        }

        fn assert_consistent(&self) {
            for id in self.live_nodes() {
                let (from, to) = self.window(id);
                assert!(from <= to, "node {id}: {from} > {to}");
                assert!(to <= self.buffer.len());
                if let Some(parent) = self.node(id).parent {
                    let (parent_from, parent_to) = self.window(parent);
                    assert!(parent_from <= from && to <= parent_to, "node {id} escapes {parent}");
                }
            }
            assert_eq!(self.window(Self::ROOT), (0, self.buffer.len()));
        }
    }

    #[test]
    fn sub_view_freezes_root() {
        let mut graph = graph(&[10, 20, 30, 40, 50]);
        assert_eq!(graph.node(Graph::<i64>::ROOT).to, None);
        let s = graph.sub_view(Graph::<i64>::ROOT, 1, 4);
        assert_eq!(graph.node(Graph::<i64>::ROOT).to, Some(5));
        assert_eq!(graph.slice(s), [20, 30, 40]);
        assert_eq!(graph.node(Graph::<i64>::ROOT).child_head, Some(s));
    }

    #[test]
    fn insert_before_window_shifts_it() {
        let mut graph = graph(&[10, 20, 30, 40, 50]);
        let s = graph.sub_view(Graph::<i64>::ROOT, 1, 4);
        graph.insert(Graph::<i64>::ROOT, 0, &[99]).unwrap();
        assert_eq!(graph.window(s), (2, 5));
        assert_eq!(graph.slice(s), [20, 30, 40]);
        assert_eq!(graph.slice(Graph::<i64>::ROOT), [99, 10, 20, 30, 40, 50]);
        graph.assert_consistent();
    }

    #[test]
    fn append_through_child_grows_ancestors() {
        let mut graph = graph(&[1, 2, 3, 4]);
        let root = Graph::<i64>::ROOT;
        let a = graph.sub_view(root, 1, 4);
        let b = graph.sub_view(a, 1, 3);
        let sibling = graph.sub_view(root, 0, 1);
        graph.insert(b, 2, &[7, 8]).unwrap();
        assert_eq!(graph.slice(b), [3, 4, 7, 8]);
        assert_eq!(graph.slice(a), [2, 3, 4, 7, 8]);
        assert_eq!(graph.slice(root), [1, 2, 3, 4, 7, 8]);
        assert_eq!(graph.slice(sibling), [1]);
        graph.assert_consistent();
    }

    #[test]
    fn insert_at_window_end_from_outside_does_not_grow() {
        let mut graph = graph(&[1, 2, 3, 4]);
        let root = Graph::<i64>::ROOT;
        let left = graph.sub_view(root, 0, 2);
        let right = graph.sub_view(root, 2, 4);
        graph.insert(right, 0, &[9]).unwrap();
        assert_eq!(graph.slice(left), [1, 2]);
        assert_eq!(graph.slice(right), [9, 3, 4]);
        graph.insert(left, 2, &[8]).unwrap();
        assert_eq!(graph.slice(left), [1, 2, 8]);
        assert_eq!(graph.slice(right), [9, 3, 4]);
        graph.assert_consistent();
    }

    #[test]
    fn empty_child_at_parent_end_is_not_shifted_out() {
        let mut graph = graph(&[1, 2, 3, 4]);
        let root = Graph::<i64>::ROOT;
        let parent = graph.sub_view(root, 0, 2);
        let child = graph.sub_view(parent, 2, 2);
        let sibling = graph.sub_view(root, 2, 4);
        graph.insert(sibling, 0, &[9]).unwrap();
        assert_eq!(graph.window(parent), (0, 2));
        assert_eq!(graph.window(child), (2, 2));
        assert_eq!(graph.window(sibling), (2, 5));
        graph.assert_consistent();
    }

    #[test]
    fn remove_overlapping_range_clamps_windows() {
        let mut graph = graph(&[0, 1, 2, 3, 4, 5, 6, 7]);
        let root = Graph::<i64>::ROOT;
        let a = graph.sub_view(root, 2, 5);
        let b = graph.sub_view(root, 4, 7);
        let c = graph.sub_view(b, 2, 3);
        graph.remove_range(root, 3, 5).unwrap();
        assert_eq!(graph.slice(a), [2]);
        assert_eq!(graph.slice(b), [5, 6]);
        assert_eq!(graph.slice(c), [6]);
        graph.remove_range(b, 0, 2).unwrap();
        assert_eq!(graph.window(c), (3, 3));
        assert_eq!(graph.slice(root), [0, 1, 2, 7]);
        graph.assert_consistent();
    }

    #[test]
    fn reallocation_bumps_counter_only() {
        let mut graph = graph(&[1, 2, 3]);
        let root = Graph::<i64>::ROOT;
        let s = graph.sub_view(root, 1, 3);
        let count = graph.mod_count();
        graph.reserve(s, 100).unwrap();
        assert_eq!(graph.mod_count(), count + 1);
        assert_eq!(graph.window(s), (1, 3));
        graph.reserve(s, 1).unwrap();
        assert_eq!(graph.mod_count(), count + 1);
        graph.trim_to_size(root).unwrap();
        assert_eq!(graph.mod_count(), count + 2);
        assert_eq!(graph.buffer().capacity(), 3);
    }

    #[test]
    fn failed_reservation_leaves_graph_untouched() {
        let mut graph = graph(&[1, 2, 3]);
        let s = graph.sub_view(Graph::<i64>::ROOT, 0, 2);
        let count = graph.mod_count();
        assert_eq!(graph.ensure_capacity(s, usize::MAX), Err(Error::InvalidCapacity));
        assert_eq!(graph.mod_count(), count);
        assert_eq!(graph.window(s), (0, 2));
    }

    #[test]
    fn release_unlinks_and_reuses_slots() {
        let mut graph = graph(&[1, 2, 3, 4]);
        let root = Graph::<i64>::ROOT;
        let a = graph.sub_view(root, 0, 2);
        let b = graph.sub_view(root, 1, 3);
        let c = graph.sub_view(b, 0, 1);
        graph.release(b);
        // `b` still has a child
        assert!(graph.nodes[b].is_some());
        graph.release(c);
        assert!(graph.nodes[c].is_none());
        assert!(graph.nodes[b].is_none());
        assert_eq!(graph.node(root).child_head, Some(a));
        assert_eq!(graph.node(a).sibling_next, None);
        let d = graph.sub_view(a, 1, 2);
        assert!(d == b || d == c);
        graph.insert(d, 0, &[5]).unwrap();
        assert_eq!(graph.slice(a), [1, 5, 2]);
        graph.assert_consistent();
    }

    #[test]
    fn alias_shares_parent() {
        let mut graph = graph(&[1, 2, 3, 4]);
        let root = Graph::<i64>::ROOT;
        assert_eq!(graph.alias(root), None);
        let s = graph.sub_view(root, 1, 3);
        let alias = graph.alias(s).unwrap();
        assert_eq!(graph.window(alias), graph.window(s));
        assert_eq!(graph.node(alias).parent, Some(root));
        graph.set(alias, 0, 20).unwrap();
        assert_eq!(graph.get(s, 0), Ok(20));
    }

    #[test]
    fn index_errors() {
        let mut graph = graph(&[1, 2]);
        let root = Graph::<i64>::ROOT;
        assert_eq!(graph.get(root, 2), Err(Error::index(2, 2)));
        assert_eq!(graph.set(root, 5, 0), Err(Error::index(5, 2)));
        assert_eq!(graph.insert(root, 3, &[0]), Err(Error::index(3, 2)));
        assert!(graph.remove_range(root, 1, 3).is_err());
        assert_eq!(graph.mod_count(), 0);
    }
}
