//! Reactive list - an ordered `Vec` with change notification.
//!
//! Every structural mutation builds one [`Change`] (added + removed elements)
//! and hands it to each listener before the mutating call returns. Mutations
//! that leave the list as it was (removing a missing element, clearing an
//! empty list, setting an equal value) notify nobody.
//!
//! The item borrow is always released before listeners run, so a listener can
//! read this list and mutate any other list without tripping `RefCell`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

// =============================================================================
// CHANGE
// =============================================================================

/// A batched description of one mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Change<T> {
    added: Vec<T>,
    removed: Vec<T>,
}

impl<T> Change<T> {
    pub(crate) fn new(added: Vec<T>, removed: Vec<T>) -> Self {
        Self { added, removed }
    }

    /// Elements that entered the list.
    pub fn added(&self) -> &[T] {
        &self.added
    }

    /// Elements that left the list.
    pub fn removed(&self) -> &[T] {
        &self.removed
    }

    pub fn was_added(&self) -> bool {
        !self.added.is_empty()
    }

    pub fn was_removed(&self) -> bool {
        !self.removed.is_empty()
    }

    fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

// =============================================================================
// LIST
// =============================================================================

/// Handle returned by [`ReactiveList::add_listener`].
pub type ListenerId = usize;

type Listener<T> = Rc<dyn Fn(&Change<T>)>;

/// Ordered collection that notifies listeners of every structural change.
pub struct ReactiveList<T> {
    items: RefCell<Vec<T>>,
    listeners: RefCell<Vec<(ListenerId, Listener<T>)>>,
    next_listener: Cell<ListenerId>,
}

impl<T: Clone + PartialEq + 'static> ReactiveList<T> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Wrap an existing vector. No notification is sent for the initial items.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: RefCell::new(items),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
        }
    }

    // -------------------------------------------------------------------------
    // Listeners
    // -------------------------------------------------------------------------

    /// Register a change listener. Returns an id for [`remove_listener`](Self::remove_listener).
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Change<T>) + 'static,
    {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Unregister a listener. Returns false if the id was unknown.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    fn notify(&self, change: Change<T>) {
        if change.is_empty() {
            return;
        }
        // Snapshot so listeners may add/remove listeners while we iterate.
        let listeners: Vec<Listener<T>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&change);
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Clone of the element at `index`, if any.
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.borrow().get(index).cloned()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.items.borrow().contains(value)
    }

    /// Index of the first element equal to `value`.
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.items.borrow().iter().position(|item| item == value)
    }

    /// Snapshot of the current contents.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    /// Run `f` against the current contents without cloning them.
    ///
    /// `f` must not mutate this list.
    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.items.borrow())
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Append one element.
    pub fn push(&self, value: T) {
        self.items.borrow_mut().push(value.clone());
        self.notify(Change::new(vec![value], Vec::new()));
    }

    /// Insert one element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&self, index: usize, value: T) {
        self.items.borrow_mut().insert(index, value.clone());
        self.notify(Change::new(vec![value], Vec::new()));
    }

    /// Append every element of `values`. Returns true if anything was added.
    pub fn extend<I>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = T>,
    {
        let added: Vec<T> = values.into_iter().collect();
        if added.is_empty() {
            return false;
        }
        self.items.borrow_mut().extend(added.iter().cloned());
        self.notify(Change::new(added, Vec::new()));
        true
    }

    /// Insert every element of `values` starting at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_all<I>(&self, index: usize, values: I) -> bool
    where
        I: IntoIterator<Item = T>,
    {
        let added: Vec<T> = values.into_iter().collect();
        if added.is_empty() {
            return false;
        }
        {
            let mut items = self.items.borrow_mut();
            let tail = items.split_off(index);
            items.extend(added.iter().cloned());
            items.extend(tail);
        }
        self.notify(Change::new(added, Vec::new()));
        true
    }

    /// Remove the first element equal to `value`.
    pub fn remove(&self, value: &T) -> bool {
        let removed = {
            let mut items = self.items.borrow_mut();
            match items.iter().position(|item| item == value) {
                Some(index) => items.remove(index),
                None => return false,
            }
        };
        self.notify(Change::new(Vec::new(), vec![removed]));
        true
    }

    /// Remove and return the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove_at(&self, index: usize) -> T {
        let removed = self.items.borrow_mut().remove(index);
        self.notify(Change::new(Vec::new(), vec![removed.clone()]));
        removed
    }

    /// Remove every element contained in `values`.
    pub fn remove_all(&self, values: &[T]) -> bool {
        self.remove_where(|item| values.contains(item))
    }

    /// Keep only the elements contained in `values`.
    pub fn retain_all(&self, values: &[T]) -> bool {
        self.remove_where(|item| !values.contains(item))
    }

    fn remove_where(&self, mut predicate: impl FnMut(&T) -> bool) -> bool {
        let removed = {
            let mut items = self.items.borrow_mut();
            let mut removed = Vec::new();
            items.retain(|item| {
                if predicate(item) {
                    removed.push(item.clone());
                    false
                } else {
                    true
                }
            });
            removed
        };
        if removed.is_empty() {
            return false;
        }
        self.notify(Change::new(Vec::new(), removed));
        true
    }

    /// Remove everything.
    pub fn clear(&self) {
        let removed = std::mem::take(&mut *self.items.borrow_mut());
        self.notify(Change::new(Vec::new(), removed));
    }

    /// Replace the element at `index`, returning the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn set(&self, index: usize, value: T) -> T {
        let previous = std::mem::replace(&mut self.items.borrow_mut()[index], value.clone());
        if previous != value {
            self.notify(Change::new(vec![value], vec![previous.clone()]));
        }
        previous
    }
}

impl<T: Clone + PartialEq + 'static> Default for ReactiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for ReactiveList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveList")
            .field("items", &self.items.borrow())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn recording(list: &ReactiveList<i32>) -> Rc<RefCell<Vec<Change<i32>>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = log.clone();
        list.add_listener(move |change| log_clone.borrow_mut().push(change.clone()));
        log
    }

    #[test]
    fn test_push_notifies_once() {
        let list = ReactiveList::new();
        let log = recording(&list);

        list.push(1);

        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].added(), &[1]);
        assert!(!log[0].was_removed());
    }

    #[test]
    fn test_extend_batches_into_single_change() {
        let list = ReactiveList::new();
        let log = recording(&list);

        assert!(list.extend([1, 2, 3]));
        assert!(!list.extend(Vec::new()));

        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0].added(), &[1, 2, 3]);
        assert_eq!(list.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_insert_all_keeps_order() {
        let list = ReactiveList::from_vec(vec![1, 4]);
        list.insert_all(1, [2, 3]);
        assert_eq!(list.to_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_remove_missing_is_silent() {
        let list = ReactiveList::from_vec(vec![1, 2]);
        let log = recording(&list);

        assert!(!list.remove(&7));
        assert!(log.borrow().is_empty());

        assert!(list.remove(&2));
        assert_eq!(log.borrow()[0].removed(), &[2]);
    }

    #[test]
    fn test_remove_at_reports_removed_element() {
        let list = ReactiveList::from_vec(vec![10, 20, 30]);
        let log = recording(&list);

        assert_eq!(list.remove_at(1), 20);
        assert_eq!(log.borrow()[0].removed(), &[20]);
        assert_eq!(list.to_vec(), vec![10, 30]);
    }

    #[test]
    fn test_remove_all_and_retain_all() {
        let list = ReactiveList::from_vec(vec![1, 2, 3, 4, 5]);
        let log = recording(&list);

        assert!(list.remove_all(&[2, 4]));
        assert_eq!(list.to_vec(), vec![1, 3, 5]);
        assert!(list.retain_all(&[3]));
        assert_eq!(list.to_vec(), vec![3]);

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].removed(), &[2, 4]);
        assert_eq!(log[1].removed(), &[1, 5]);
    }

    #[test]
    fn test_clear_reports_previous_contents() {
        let list = ReactiveList::from_vec(vec![1, 2]);
        let log = recording(&list);

        list.clear();
        list.clear();

        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0].removed(), &[1, 2]);
        assert!(list.is_empty());
    }

    #[test]
    fn test_set_equal_value_is_silent() {
        let list = ReactiveList::from_vec(vec![1, 2]);
        let log = recording(&list);

        assert_eq!(list.set(0, 1), 1);
        assert!(log.borrow().is_empty());

        assert_eq!(list.set(0, 9), 1);
        assert_eq!(log.borrow()[0].added(), &[9]);
        assert_eq!(log.borrow()[0].removed(), &[1]);
    }

    #[test]
    fn test_listener_sees_committed_state() {
        let list = Rc::new(ReactiveList::new());
        let seen = Rc::new(Cell::new(0));

        let list_clone = list.clone();
        let seen_clone = seen.clone();
        list.add_listener(move |_| seen_clone.set(list_clone.len()));

        list.extend([1, 2, 3]);
        assert_eq!(seen.get(), 3);
    }

    #[test]
    fn test_remove_listener() {
        let list = ReactiveList::new();
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        let id = list.add_listener(move |_| count_clone.set(count_clone.get() + 1));
        list.push(1);
        assert!(list.remove_listener(id));
        assert!(!list.remove_listener(id));
        list.push(2);

        assert_eq!(count.get(), 1);
    }
}
