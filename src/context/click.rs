use std::ops::Deref;

use super::Consumable;
use crate::callback::CellLocation;
use crate::display::Display;
use crate::scene::{Node, Scene};
use crate::types::{ClickFlags, ClickKind, GuiArea, ViewerId};

/// Any click on a display, including clicks outside the window.
#[derive(Debug, Clone)]
pub struct ClickContext {
    pub display: Option<Display>,
    pub scene: Option<Scene>,
    pub area: GuiArea,
    pub kind: ClickKind,
    pub hotbar_button: Option<u8>,
    pub viewer: ViewerId,
}

impl ClickContext {
    pub fn flags(&self) -> ClickFlags {
        self.kind.flags()
    }

    pub fn is_left_click(&self) -> bool {
        self.kind.is_left()
    }

    pub fn is_right_click(&self) -> bool {
        self.kind.is_right()
    }

    pub fn is_shift_click(&self) -> bool {
        self.kind.is_shift()
    }

    pub fn is_hotbar_click(&self) -> bool {
        self.hotbar_button.is_some()
    }
}

impl CellLocation for ClickContext {}

/// A click on a grid cell.
#[derive(Debug, Clone)]
pub struct SlotClickContext {
    pub click: ClickContext,
    pub slot_x: usize,
    pub slot_y: usize,
}

impl Deref for SlotClickContext {
    type Target = ClickContext;

    fn deref(&self) -> &ClickContext {
        &self.click
    }
}

impl CellLocation for SlotClickContext {
    fn cell(&self) -> Option<(usize, usize)> {
        Some((self.slot_x, self.slot_y))
    }
}

/// A click delivered to one node of a bubbling chain.
///
/// `source` is the node that was hit; `target` is the node whose callbacks
/// are running.
#[derive(Debug, Clone)]
pub struct NodeClickContext {
    pub slot: SlotClickContext,
    pub source: Node,
    pub target: Node,
    consumed: bool,
}

impl NodeClickContext {
    pub fn new(slot: SlotClickContext, source: Node) -> Self {
        Self {
            slot,
            target: source.clone(),
            source,
            consumed: false,
        }
    }

    /// Same click, retargeted. The consumed flag carries over.
    pub fn copy_for(&self, target: &Node) -> Self {
        Self {
            slot: self.slot.clone(),
            source: self.source.clone(),
            target: target.clone(),
            consumed: self.consumed,
        }
    }
}

impl Deref for NodeClickContext {
    type Target = SlotClickContext;

    fn deref(&self) -> &SlotClickContext {
        &self.slot
    }
}

impl Consumable for NodeClickContext {
    fn is_consumed(&self) -> bool {
        self.consumed
    }

    fn consume(&mut self) {
        self.consumed = true;
    }
}

impl CellLocation for NodeClickContext {
    fn cell(&self) -> Option<(usize, usize)> {
        self.slot.cell()
    }
}
