//! Core Types - shared value types for the scene graph and displays.
//!
//! Everything here is a small `Copy` value: geometry helpers, click
//! classification, dirty flags and viewer identity.

use std::fmt;

// =============================================================================
// Geometry
// =============================================================================

/// Padding on the four sides of a composite, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Insets {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Insets {
    pub const ZERO: Insets = Insets::new(0, 0, 0, 0);

    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Same padding on every side.
    pub const fn uniform(all: i32) -> Self {
        Self::new(all, all, all, all)
    }

    /// `vertical` for top/bottom, `horizontal` for left/right.
    pub const fn symmetric(vertical: i32, horizontal: i32) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// Left + right.
    pub const fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    /// Top + bottom.
    pub const fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}

/// Primary axis of a flow layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

// =============================================================================
// Clicks
// =============================================================================

/// Which part of the window a click landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuiArea {
    /// The display grid itself.
    Top,
    /// The viewer's own cells below the display grid.
    Bottom,
    /// Outside the window entirely.
    Outside,
}

bitflags::bitflags! {
    /// Button/modifier classification of a click.
    ///
    /// Dispatch fires the left, right and shift callbacks according to
    /// these bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct ClickFlags: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const SHIFT = 1 << 2;
    }
}

/// How the viewer clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickKind {
    Left,
    ShiftLeft,
    Right,
    ShiftRight,
    Middle,
    /// A number key moved the cell to/from the viewer's hotbar.
    NumberKey,
    DoubleClick,
    Drop,
    ControlDrop,
    Creative,
    SwapOffhand,
    WindowBorderLeft,
    WindowBorderRight,
    Unknown,
}

impl ClickKind {
    pub fn flags(self) -> ClickFlags {
        let mut flags = ClickFlags::empty();
        if self.is_left() {
            flags |= ClickFlags::LEFT;
        }
        if self.is_right() {
            flags |= ClickFlags::RIGHT;
        }
        if self.is_shift() {
            flags |= ClickFlags::SHIFT;
        }
        flags
    }

    pub fn is_left(self) -> bool {
        matches!(
            self,
            Self::Left | Self::ShiftLeft | Self::DoubleClick | Self::Creative
        )
    }

    pub fn is_right(self) -> bool {
        matches!(self, Self::Right | Self::ShiftRight)
    }

    pub fn is_shift(self) -> bool {
        matches!(self, Self::ShiftLeft | Self::ShiftRight)
    }
}

/// Identity of a viewer as assigned by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewerId(pub u64);

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "viewer#{}", self.0)
    }
}

/// A raw click as reported by the host.
///
/// `raw_slot` is the host's flat cell index, ignored for
/// [`GuiArea::Outside`] clicks. [`Display::handle_click`](crate::Display::handle_click)
/// decodes it into grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    pub viewer: ViewerId,
    pub area: GuiArea,
    pub kind: ClickKind,
    pub raw_slot: usize,
    /// Hotbar slot 0..=8 for [`ClickKind::NumberKey`] clicks.
    pub hotbar_button: Option<u8>,
}

impl ClickEvent {
    /// Plain click on the display grid.
    pub fn top(viewer: ViewerId, kind: ClickKind, raw_slot: usize) -> Self {
        Self {
            viewer,
            area: GuiArea::Top,
            kind,
            raw_slot,
            hotbar_button: None,
        }
    }

    /// Click outside the window.
    pub fn outside(viewer: ViewerId, kind: ClickKind) -> Self {
        Self {
            viewer,
            area: GuiArea::Outside,
            kind,
            raw_slot: 0,
            hotbar_button: None,
        }
    }

    pub fn with_hotbar_button(mut self, button: u8) -> Self {
        self.hotbar_button = Some(button);
        self
    }
}

// =============================================================================
// Display state
// =============================================================================

bitflags::bitflags! {
    /// Parts of a display that must be refreshed on the next `show`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct DirtyFlags: u8 {
        /// Cell contents must be re-rendered from the scene.
        const CONTENT = 1 << 0;
        /// Title changed; the surface must be recreated.
        const TITLE = 1 << 1;
        /// Row count changed; the surface must be recreated.
        const ROWS = 1 << 2;
    }
}

/// Why a viewer's window closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    /// The viewer closed the window themselves.
    Viewer,
    /// Application code closed it.
    Program,
    /// Another window replaced it.
    OpenNew,
    Disconnect,
    Unknown,
}

impl CloseReason {
    pub fn is_viewer_initiated(self) -> bool {
        matches!(self, Self::Viewer)
    }
}
