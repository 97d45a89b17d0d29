//! Observable collections.
//!
//! - [`ReactiveList`] - ordered list that reports every structural change to
//!   its listeners, synchronously and exactly once per mutation.
//! - [`VetoableList`] - decorator over a `ReactiveList` that asks a hook for
//!   permission before each mutation is committed.
//!
//! Both are single-threaded and interior-mutable: every method takes `&self`,
//! so a listener may freely mutate *other* lists while it runs.

mod reactive_list;
mod vetoable;

pub use reactive_list::{Change, ListenerId, ReactiveList};
pub use vetoable::{VetoableList, removal_ranges};
