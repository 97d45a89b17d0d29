//! Vetoable list - a [`ReactiveList`] whose mutations must be approved.
//!
//! Before any mutation is committed the hook receives:
//!
//! - the elements proposed for addition, and
//! - the index ranges about to be removed, as a flat `[start, end)` pair list
//!   (always even length, ranges ascending and non-overlapping).
//!
//! Returning `Err` aborts the mutation. The underlying list is left exactly as
//! it was and the error goes back to the caller.
//!
//! # Example
//!
//! ```
//! use cellgraph::collections::VetoableList;
//! use cellgraph::VetoError;
//!
//! let list = VetoableList::new(|added: &[i32], _removed: &[usize]| {
//!     if added.iter().any(|v| *v < 0) {
//!         return Err(VetoError::Rejected("negative".into()));
//!     }
//!     Ok(())
//! });
//!
//! assert!(list.push(3).is_ok());
//! assert!(list.push(-1).is_err());
//! assert_eq!(list.to_vec(), vec![3]);
//! ```

use std::fmt;

use super::reactive_list::{Change, ListenerId, ReactiveList};
use crate::error::VetoError;

type Hook<T> = Box<dyn Fn(&[T], &[usize]) -> Result<(), VetoError>>;

/// Reactive list guarded by a proposed-change hook.
pub struct VetoableList<T> {
    list: ReactiveList<T>,
    hook: Hook<T>,
}

/// Flat `[start, end)` pairs covering every element matching `remove`.
///
/// Adjacent matches coalesce into one range.
pub fn removal_ranges<T>(items: &[T], mut remove: impl FnMut(&T) -> bool) -> Vec<usize> {
    let mut ranges = Vec::new();
    let mut start = None;
    for (index, item) in items.iter().enumerate() {
        match (remove(item), start) {
            (true, None) => start = Some(index),
            (false, Some(begin)) => {
                ranges.push(begin);
                ranges.push(index);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(begin) = start {
        ranges.push(begin);
        ranges.push(items.len());
    }
    ranges
}

impl<T: Clone + PartialEq + 'static> VetoableList<T> {
    /// Create an empty list guarded by `hook`.
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&[T], &[usize]) -> Result<(), VetoError> + 'static,
    {
        Self {
            list: ReactiveList::new(),
            hook: Box::new(hook),
        }
    }

    fn propose(&self, added: &[T], removed: &[usize]) -> Result<(), VetoError> {
        debug_assert!(removed.len() % 2 == 0);
        (self.hook)(added, removed)
    }

    // -------------------------------------------------------------------------
    // Read-only delegation
    // -------------------------------------------------------------------------

    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Change<T>) + 'static,
    {
        self.list.add_listener(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.list.remove_listener(id)
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.list.get(index)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.list.contains(value)
    }

    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.list.index_of(value)
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.list.to_vec()
    }

    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        self.list.with(f)
    }

    // -------------------------------------------------------------------------
    // Guarded mutations
    // -------------------------------------------------------------------------

    pub fn push(&self, value: T) -> Result<(), VetoError> {
        self.propose(std::slice::from_ref(&value), &[])?;
        self.list.push(value);
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&self, index: usize, value: T) -> Result<(), VetoError> {
        assert!(index <= self.len(), "insert index {index} out of bounds");
        self.propose(std::slice::from_ref(&value), &[])?;
        self.list.insert(index, value);
        Ok(())
    }

    pub fn extend<I>(&self, values: I) -> Result<bool, VetoError>
    where
        I: IntoIterator<Item = T>,
    {
        let values: Vec<T> = values.into_iter().collect();
        if values.is_empty() {
            return Ok(false);
        }
        self.propose(&values, &[])?;
        Ok(self.list.extend(values))
    }

    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_all<I>(&self, index: usize, values: I) -> Result<bool, VetoError>
    where
        I: IntoIterator<Item = T>,
    {
        assert!(index <= self.len(), "insert index {index} out of bounds");
        let values: Vec<T> = values.into_iter().collect();
        if values.is_empty() {
            return Ok(false);
        }
        self.propose(&values, &[])?;
        Ok(self.list.insert_all(index, values))
    }

    /// Remove the first element equal to `value`. Absent values are not
    /// proposed to the hook.
    pub fn remove(&self, value: &T) -> Result<bool, VetoError> {
        let Some(index) = self.index_of(value) else {
            return Ok(false);
        };
        self.propose(&[], &[index, index + 1])?;
        self.list.remove_at(index);
        Ok(true)
    }

    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove_at(&self, index: usize) -> Result<T, VetoError> {
        assert!(index < self.len(), "remove index {index} out of bounds");
        self.propose(&[], &[index, index + 1])?;
        Ok(self.list.remove_at(index))
    }

    pub fn remove_all(&self, values: &[T]) -> Result<bool, VetoError> {
        let ranges = self.with(|items| removal_ranges(items, |item| values.contains(item)));
        if ranges.is_empty() {
            return Ok(false);
        }
        self.propose(&[], &ranges)?;
        Ok(self.list.remove_all(values))
    }

    pub fn retain_all(&self, values: &[T]) -> Result<bool, VetoError> {
        let ranges = self.with(|items| removal_ranges(items, |item| !values.contains(item)));
        if ranges.is_empty() {
            return Ok(false);
        }
        self.propose(&[], &ranges)?;
        Ok(self.list.retain_all(values))
    }

    pub fn clear(&self) -> Result<(), VetoError> {
        let len = self.len();
        if len == 0 {
            return Ok(());
        }
        self.propose(&[], &[0, len])?;
        self.list.clear();
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn set(&self, index: usize, value: T) -> Result<T, VetoError> {
        assert!(index < self.len(), "set index {index} out of bounds");
        self.propose(std::slice::from_ref(&value), &[index, index + 1])?;
        Ok(self.list.set(index, value))
    }
}

impl<T: fmt::Debug> fmt::Debug for VetoableList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VetoableList")
            .field("list", &self.list)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    type Proposal = (Vec<i32>, Vec<usize>);

    fn recording_list() -> (VetoableList<i32>, Rc<RefCell<Vec<Proposal>>>) {
        let proposals = Rc::new(RefCell::new(Vec::new()));
        let proposals_clone = proposals.clone();
        let list = VetoableList::new(move |added: &[i32], removed: &[usize]| {
            proposals_clone
                .borrow_mut()
                .push((added.to_vec(), removed.to_vec()));
            Ok(())
        });
        (list, proposals)
    }

    #[test]
    fn test_removal_ranges_coalesce() {
        let items = [1, 2, 3, 4, 5, 6];
        let ranges = removal_ranges(&items, |v| matches!(v, 2 | 3 | 5 | 6));
        assert_eq!(ranges, vec![1, 3, 4, 6]);
        assert!(removal_ranges(&items, |_| false).is_empty());
    }

    #[test]
    fn test_hook_sees_additions() {
        let (list, proposals) = recording_list();
        list.push(1).unwrap();
        list.extend([2, 3]).unwrap();

        let proposals = proposals.borrow();
        assert_eq!(proposals[0], (vec![1], vec![]));
        assert_eq!(proposals[1], (vec![2, 3], vec![]));
    }

    #[test]
    fn test_hook_sees_removed_ranges() {
        let (list, proposals) = recording_list();
        list.extend([1, 2, 3, 4]).unwrap();
        proposals.borrow_mut().clear();

        list.remove_all(&[2, 4]).unwrap();
        list.clear().unwrap();

        let proposals = proposals.borrow();
        assert_eq!(proposals[0], (vec![], vec![1, 2, 3, 4]));
        assert_eq!(proposals[1], (vec![], vec![0, 2]));
    }

    #[test]
    fn test_remove_absent_skips_hook() {
        let (list, proposals) = recording_list();
        assert_eq!(list.remove(&9), Ok(false));
        assert!(proposals.borrow().is_empty());
    }

    #[test]
    fn test_veto_blocks_mutation() {
        let list = VetoableList::new(|added: &[i32], removed: &[usize]| {
            if added.contains(&13) || !removed.is_empty() {
                Err(VetoError::Rejected("no".into()))
            } else {
                Ok(())
            }
        });
        let notified = Rc::new(Cell::new(0));
        let notified_clone = notified.clone();
        list.add_listener(move |_| notified_clone.set(notified_clone.get() + 1));

        list.extend([1, 2]).unwrap();
        assert_eq!(notified.get(), 1);

        assert_eq!(list.push(13), Err(VetoError::Rejected("no".into())));
        assert!(list.remove(&1).is_err());
        assert!(list.clear().is_err());
        assert!(list.set(0, 5).is_err());

        assert_eq!(list.to_vec(), vec![1, 2]);
        assert_eq!(notified.get(), 1);
    }
}
