// This module implements InsertionSet, the batching utility phases use to insert many
// elements into an ordered sequence (typically a block's instruction vector) without
// invalidating the indices other analyses computed against it. Insertions are staged against
// pre-edit indices and committed by a single execute call. execute stably sorts the pending
// insertions by index, so insertions sharing an index land in the order they were appended,
// checks every insertion's order and bounds before touching the target, and then builds the
// result in one merge pass over the original elements and the insertions. A failing execute
// leaves the target untouched and keeps every pending insertion, now in sorted order.

//! Batched, stable insertion into ordered sequences.

use super::error::{AirError, AirResult};

/// An element waiting to be inserted before the element currently at `index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion<T> {
    index: usize,
    element: T,
}

impl<T> Insertion<T> {
    pub fn new(index: usize, element: T) -> Self {
        Self { index, element }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn element(&self) -> &T {
        &self.element
    }
}

#[derive(Debug, Clone)]
pub struct InsertionSet<T> {
    insertions: Vec<Insertion<T>>,
}

impl<T> Default for InsertionSet<T> {
    fn default() -> Self {
        Self {
            insertions: Vec::new(),
        }
    }
}

impl<T> InsertionSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `element` for insertion before original position `index`.
    pub fn append(&mut self, index: usize, element: T) {
        self.insertions.push(Insertion::new(index, element));
    }

    pub fn append_insertion(&mut self, insertion: Insertion<T>) {
        self.insertions.push(insertion);
    }

    pub fn len(&self) -> usize {
        self.insertions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty()
    }

    pub fn insertions(&self) -> &[Insertion<T>] {
        &self.insertions
    }

    /// Apply every pending insertion to `target`, returning how many were
    /// inserted.
    pub fn execute(&mut self, target: &mut Vec<T>) -> AirResult<usize> {
        // sort_by_key is stable: ties keep append order.
        self.insertions.sort_by_key(Insertion::index);
        if self.insertions.is_empty() {
            return Ok(0);
        }

        let original_len = target.len();
        for k in (0..self.insertions.len()).rev() {
            let index = self.insertions[k].index;
            if k > 0 && index < self.insertions[k - 1].index {
                return Err(AirError::InsertionOrderViolation {
                    index,
                    previous: self.insertions[k - 1].index,
                });
            }
            if index > original_len {
                return Err(AirError::OutOfBoundsInsertion {
                    index,
                    len: original_len,
                });
            }
        }

        let count = self.insertions.len();
        log::trace!("inserting {count} elements into a sequence of {original_len}");

        let mut merged = Vec::with_capacity(original_len + count);
        let mut originals = std::mem::take(target).into_iter();
        let mut consumed = 0;
        for Insertion { index, element } in self.insertions.drain(..) {
            merged.extend(originals.by_ref().take(index - consumed));
            consumed = index;
            merged.push(element);
        }
        merged.extend(originals);
        *target = merged;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_at_both_ends() {
        let mut target = vec![1, 2, 3];
        let mut set = InsertionSet::new();
        set.append(3, 40);
        set.append(0, 0);
        assert_eq!(set.execute(&mut target), Ok(2));
        assert_eq!(target, vec![0, 1, 2, 3, 40]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_into_empty_target() {
        let mut target: Vec<&str> = Vec::new();
        let mut set = InsertionSet::new();
        set.append_insertion(Insertion::new(0, "a"));
        set.append(0, "b");
        assert_eq!(set.execute(&mut target), Ok(2));
        assert_eq!(target, vec!["a", "b"]);
    }

    #[test]
    fn test_failed_execute_leaves_everything_alone() {
        let mut target = vec![1, 2];
        let mut set = InsertionSet::new();
        set.append(1, 10);
        set.append(5, 50);
        assert_eq!(
            set.execute(&mut target),
            Err(AirError::OutOfBoundsInsertion { index: 5, len: 2 })
        );
        assert_eq!(target, vec![1, 2]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_failed_execute_keeps_insertions_sorted() {
        let mut short = vec!['a'];
        let mut set = InsertionSet::new();
        set.append(3, 'z');
        set.append(1, 'x');
        set.append(1, 'y');
        assert!(set.execute(&mut short).is_err());
        assert_eq!(short, vec!['a']);
        let order: Vec<_> = set.insertions().iter().map(|i| (i.index(), *i.element())).collect();
        assert_eq!(order, vec![(1, 'x'), (1, 'y'), (3, 'z')]);

        let mut long = vec!['a', 'b', 'c'];
        assert_eq!(set.execute(&mut long), Ok(3));
        assert_eq!(long, vec!['a', 'x', 'y', 'b', 'c', 'z']);
    }

    #[test]
    fn test_set_is_reusable() {
        let mut target = vec!['x'];
        let mut set = InsertionSet::new();
        set.append(1, 'y');
        set.execute(&mut target).unwrap();
        set.append(0, 'w');
        set.execute(&mut target).unwrap();
        assert_eq!(target, vec!['w', 'x', 'y']);
    }
}
