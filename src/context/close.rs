use super::Cancelable;
use crate::callback::CellLocation;
use crate::display::Display;
use crate::scene::Scene;
use crate::types::{CloseReason, ViewerId};

/// A viewer's window closed. Canceling re-shows the display on the next
/// task cycle.
#[derive(Debug, Clone)]
pub struct CloseContext {
    pub display: Display,
    pub scene: Option<Scene>,
    pub viewer: ViewerId,
    pub reason: CloseReason,
    canceled: bool,
}

impl CloseContext {
    pub fn new(display: Display, viewer: ViewerId, reason: CloseReason) -> Self {
        Self {
            scene: display.scene(),
            display,
            viewer,
            reason,
            canceled: false,
        }
    }
}

impl Cancelable for CloseContext {
    fn is_canceled(&self) -> bool {
        self.canceled
    }

    fn set_canceled(&mut self, canceled: bool) {
        self.canceled = canceled;
    }
}

impl CellLocation for CloseContext {}
