//! Deferred work.
//!
//! Some reactions must not run inside the host notification that triggered
//! them (re-showing a window from inside its own close event, for one). They
//! go on a [`TaskQueue`] that the host drains once per cycle.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use cellgraph::TaskQueue;
//!
//! let queue = TaskQueue::new();
//! let ran = Rc::new(Cell::new(false));
//! let ran_clone = ran.clone();
//! queue.schedule(move || ran_clone.set(true));
//!
//! assert!(!ran.get());
//! queue.run_pending();
//! assert!(ran.get());
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

type Task = Box<dyn FnOnce()>;

/// Shared FIFO of deferred closures. Clones share the same queue.
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<F>(&self, task: F)
    where
        F: FnOnce() + 'static,
    {
        self.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Run the tasks queued before this call. Tasks they schedule wait for
    /// the next call. Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let batch: Vec<Task> = self.tasks.borrow_mut().drain(..).collect();
        let count = batch.len();
        for task in batch {
            task();
        }
        if count > 0 {
            tracing::trace!(count, "ran pending tasks");
        }
        count
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue").field("pending", &self.len()).finish()
    }
}
