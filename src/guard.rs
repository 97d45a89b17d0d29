//! Reentrancy flags that reset themselves on drop.

use std::cell::Cell;

/// Holds a `Cell<bool>` at `true` until dropped, including during unwinding.
pub(crate) struct FlagGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> FlagGuard<'a> {
    /// Raise `flag`, or return `None` if it is already raised.
    pub(crate) fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            return None;
        }
        Some(Self { flag })
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}
