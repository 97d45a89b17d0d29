//! Platform seams.
//!
//! A [`Host`] is whatever actually shows grids to viewers (a game server, a
//! terminal, a test harness). It hands out [`Surface`]s, the fixed-size cell
//! buffers a display renders into, and presents them to viewers.

use std::fmt;

use crate::scene::PresentedCell;
use crate::types::ViewerId;

/// Host-assigned identity of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// A fixed-size, titled cell buffer owned by one display.
pub trait Surface {
    fn id(&self) -> SurfaceId;

    /// Number of cells.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn title(&self) -> String;

    /// Copy of every cell, in row-major order.
    fn contents(&self) -> Vec<Option<PresentedCell>>;

    /// Overwrite cells from the start; extra input is ignored, missing input
    /// leaves the remaining cells untouched.
    fn set_contents(&mut self, contents: &[Option<PresentedCell>]);

    /// Out-of-range indices are ignored.
    fn set_cell(&mut self, index: usize, cell: Option<PresentedCell>);

    fn clear(&mut self);

    /// Viewers currently looking at this surface.
    fn viewers(&self) -> Vec<ViewerId>;
}

/// The platform a display is shown on.
pub trait Host {
    fn create_surface(&self, width: usize, height: usize, title: &str) -> Box<dyn Surface>;

    /// Present `surface` to `viewer`, replacing whatever they were viewing.
    fn open(&self, viewer: ViewerId, surface: &dyn Surface);

    /// Close whatever `viewer` is viewing.
    fn close(&self, viewer: ViewerId);

    /// Remove and return the item the viewer is holding in their pointer.
    fn take_held(&self, viewer: ViewerId) -> Option<PresentedCell>;

    /// Put an item back into the viewer's pointer.
    fn restore_held(&self, viewer: ViewerId, item: Option<PresentedCell>);
}
