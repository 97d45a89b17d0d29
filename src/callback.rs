//! Callback plumbing shared by nodes, scenes and displays.
//!
//! User callbacks may return `()` or any `Result<(), E>` whose error converts
//! into [`CallbackError`]. They are stored type-erased in a [`CallbackSlot`]
//! and invoked through [`fire`], the single place where a failing callback is
//! caught, logged and swallowed. A returned error and a panic are treated the
//! same way: neither reaches the caller, and the surrounding dispatch or
//! render carries on.
//!
//! # Example
//!
//! ```
//! use cellgraph::{ClickKind, ItemBuilder, Pixel};
//!
//! let item = ItemBuilder::new(Pixel::of("stone")).build();
//!
//! // Unit-returning callback
//! item.on_click(|_ctx| {});
//!
//! // Fallible callback; an Err is logged, never propagated
//! item.on_left_click(|ctx| {
//!     if ctx.kind == ClickKind::Left {
//!         return Err("left clicks are not allowed here");
//!     }
//!     Ok(())
//! });
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// Error type a callback may return.
pub type CallbackError = Box<dyn std::error::Error>;

/// Return types accepted from user callbacks.
pub trait CallbackOutput {
    fn into_result(self) -> Result<(), CallbackError>;
}

impl CallbackOutput for () {
    fn into_result(self) -> Result<(), CallbackError> {
        Ok(())
    }
}

impl<E: Into<CallbackError>> CallbackOutput for Result<(), E> {
    fn into_result(self) -> Result<(), CallbackError> {
        self.map_err(Into::into)
    }
}

/// Type-erased callback over a context `C`.
pub(crate) type Callback<C> = Rc<dyn Fn(&mut C) -> Result<(), CallbackError>>;

/// Contexts that can name the grid cell they concern, for log fields.
pub trait CellLocation {
    fn cell(&self) -> Option<(usize, usize)> {
        None
    }
}

// =============================================================================
// SLOT
// =============================================================================

/// Optional, replaceable callback.
pub(crate) struct CallbackSlot<C> {
    callback: RefCell<Option<Callback<C>>>,
}

impl<C: 'static> CallbackSlot<C> {
    pub(crate) fn new() -> Self {
        Self {
            callback: RefCell::new(None),
        }
    }

    pub(crate) fn set<F, R>(&self, f: F)
    where
        F: Fn(&mut C) -> R + 'static,
        R: CallbackOutput,
    {
        *self.callback.borrow_mut() = Some(Rc::new(move |ctx: &mut C| f(ctx).into_result()));
    }

    pub(crate) fn clear(&self) {
        self.callback.borrow_mut().take();
    }

    /// Clone the callback out so the slot is not borrowed while it runs.
    pub(crate) fn get(&self) -> Option<Callback<C>> {
        self.callback.borrow().clone()
    }
}

impl<C> fmt::Debug for CallbackSlot<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.callback.borrow().is_some() {
            "Some(<callback>)"
        } else {
            "None"
        })
    }
}

// =============================================================================
// FIRE
// =============================================================================

/// Invoke the callback in `slot`, if any, swallowing and logging failures.
pub(crate) fn fire<C: CellLocation + 'static>(name: &'static str, slot: &CallbackSlot<C>, ctx: &mut C) {
    let Some(callback) = slot.get() else {
        return;
    };
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback(ctx)));
    let cell = ctx.cell();
    let slot_x = cell.map(|(x, _)| x);
    let slot_y = cell.map(|(_, y)| y);
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            tracing::error!(callback = name, slot_x, slot_y, error = %err, "callback returned an error");
        }
        Err(payload) => {
            tracing::error!(
                callback = name,
                slot_x,
                slot_y,
                panic = panic_message(payload.as_ref()),
                "callback panicked"
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}
