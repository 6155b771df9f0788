use view_list::{Error, LongList};

#[test]
fn forward_and_backward() {
    let list = LongList::from_slice(&[1, 2, 3]);
    assert_eq!(list.iter().collect::<Vec<_>>(), [1, 2, 3]);
    assert_eq!(list.iter_rev().collect::<Vec<_>>(), [3, 2, 1]);
    let mut cursor = list.cursor_at(1);
    assert_eq!(cursor.previous_index(), Some(0));
    assert_eq!(cursor.try_next(), Ok(Some(2)));
    assert_eq!(cursor.try_previous(), Ok(Some(2)));
    assert_eq!(cursor.try_previous(), Ok(Some(1)));
    assert_eq!(cursor.try_previous(), Ok(None));
    assert!(!cursor.has_previous());
    assert!(cursor.has_next());
    assert!(list.try_cursor_at(4).is_err());
}

#[test]
fn cursor_over_sub_view() {
    let root = LongList::from_slice(&[1, 2, 3, 4, 5]);
    let view = root.sub_view(1..4);
    let mut iter = view.iter();
    assert_eq!(iter.size_hint(), (3, Some(3)));
    assert_eq!(iter.by_ref().take(2).collect::<Vec<_>>(), [2, 3]);
    assert_eq!(iter.next(), Some(4));
    assert_eq!(iter.next(), None);
}

// a structural change through the root invalidates cursors of its sub-views
#[test]
fn fails_on_change_through_parent() {
    let mut root = LongList::from_slice(&[1, 2, 3, 4]);
    let view = root.sub_view(1..3);
    let mut cursor = view.cursor();
    assert_eq!(cursor.try_next(), Ok(Some(2)));
    root.insert(0, 0);
    assert_eq!(cursor.try_next(), Err(Error::ConcurrentModification));
    assert_eq!(cursor.try_previous(), Err(Error::ConcurrentModification));
    assert_eq!(cursor.set(9), Err(Error::ConcurrentModification));
    assert_eq!(cursor.add(9), Err(Error::ConcurrentModification));
    assert_eq!(cursor.remove(), Err(Error::ConcurrentModification));
}

#[test]
fn fails_on_change_through_sibling() {
    let root = LongList::from_slice(&[1, 2, 3, 4]);
    let left = root.sub_view(..2);
    let mut right = root.sub_view(2..);
    let mut cursor = left.cursor();
    right.remove(0);
    assert_eq!(cursor.try_next(), Err(Error::ConcurrentModification));
}

#[test]
fn fails_on_reallocation() {
    let mut root = LongList::from_slice(&[1, 2]);
    let view = root.sub_view(..);
    let mut cursor = view.cursor();
    root.reserve(64);
    assert_eq!(cursor.try_next(), Err(Error::ConcurrentModification));
}

#[test]
fn value_updates_keep_cursors_valid() {
    let mut root = LongList::from_slice(&[1, 2, 3]);
    let mut cursor = root.cursor();
    root.set(1, 20);
    root.sort();
    assert_eq!(cursor.try_next(), Ok(Some(1)));
    assert_eq!(cursor.try_next(), Ok(Some(3)));
}

#[test]
#[should_panic(expected = "concurrent modification")]
fn iterator_panics_on_concurrent_change() {
    let mut list = LongList::from_slice(&[1, 2, 3]);
    let mut iter = list.iter();
    iter.next();
    list.push(4);
    iter.next();
}

#[test]
fn mutations_through_cursor() {
    let root = LongList::from_slice(&[1, 2, 3, 4, 5]);
    let other = root.sub_view(4..);
    let view = root.sub_view(..4);
    let mut cursor = view.cursor();
    while let Some(value) = cursor.try_next().unwrap() {
        if value % 2 == 0 {
            cursor.remove().unwrap();
        } else {
            cursor.set(value * 10).unwrap();
            cursor.add(value * 10 + 1).unwrap();
        }
    }
    assert_eq!(view, [10, 11, 30, 31]);
    assert_eq!(other, [5]);
    assert_eq!(root, [10, 11, 30, 31, 5]);
    assert_eq!(cursor.try_previous(), Ok(Some(31)));
    assert_eq!(cursor.next_index(), 3);
}

#[test]
fn cursor_state_errors() {
    let list = LongList::from_slice(&[1, 2]);
    let mut cursor = list.cursor();
    assert_eq!(cursor.remove(), Err(Error::IllegalState));
    assert_eq!(cursor.set(0), Err(Error::IllegalState));
    cursor.try_next().unwrap();
    cursor.remove().unwrap();
    assert_eq!(cursor.remove(), Err(Error::IllegalState));
    cursor.add(7).unwrap();
    assert_eq!(cursor.set(0), Err(Error::IllegalState));
    assert_eq!(list, [7, 2]);
}

#[test]
fn backward_removal() {
    let list = LongList::from_slice(&[1, 2, 3]);
    let mut cursor = list.iter_rev().into_cursor();
    assert_eq!(cursor.try_previous(), Ok(Some(3)));
    assert_eq!(cursor.remove(), Ok(3));
    assert_eq!(cursor.try_previous(), Ok(Some(2)));
    assert_eq!(cursor.next_index(), 1);
    assert_eq!(list, [1, 2]);
}

// moving back after exhaustion resumes the iteration
#[test]
fn iteration_resumes_after_moving_back() {
    let list = LongList::from_slice(&[1, 2]);
    let mut cursor = list.cursor();
    assert_eq!(cursor.by_ref().count(), 2);
    assert_eq!(cursor.next(), None);
    assert_eq!(cursor.try_previous(), Ok(Some(2)));
    assert_eq!(cursor.next(), Some(2));
    assert_eq!(cursor.next(), None);
}

#[test]
fn cursor_keeps_view_alive() {
    let root = LongList::from_slice(&[1, 2, 3]);
    let cursor = root.sub_view(1..).cursor();
    assert_eq!(cursor.collect::<Vec<_>>(), [2, 3]);
}
