//! Terminal host - shows one display grid in a crossterm terminal.
//!
//! A terminal has exactly one viewer. Each cell is drawn [`CELL_WIDTH`]
//! columns wide: two characters of the content type followed by the count,
//! bold when the cell glows. The title sits on the row above the grid.
//!
//! # API
//!
//! - [`TerminalHost`] - [`Host`] drawing to stdout (or any writer)
//! - [`Frame`] - where the grid sits on screen, and screen-to-slot mapping
//! - [`EventTranslator`] - crossterm events to [`ClickEvent`](crate::ClickEvent)s
//! - [`TerminalSession`] - raw mode + alternate screen + mouse capture,
//!   undone on drop
//!
//! # Example
//!
//! ```no_run
//! use std::rc::Rc;
//! use cellgraph::terminal::{TerminalHost, TerminalSession};
//! use cellgraph::{Display, DisplayKind, TaskQueue};
//!
//! let _session = TerminalSession::enter().unwrap();
//! let host = TerminalHost::new();
//! let display = Display::new(DisplayKind::Chest { rows: 3 }, "Shop", Rc::new(host.clone()), TaskQueue::new()).unwrap();
//! display.show(host.viewer());
//! ```

mod input;

pub use input::{EventTranslator, TerminalEvent, TerminalSession, poll_event};

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{Clear, ClearType};

use crate::display::{Host, Surface, SurfaceId};
use crate::scene::PresentedCell;
use crate::types::ViewerId;

/// Terminal columns per grid cell.
pub const CELL_WIDTH: u16 = 4;

// =============================================================================
// FRAME
// =============================================================================

/// Screen placement of the grid. Row `origin_row` holds the title; cell rows
/// start right below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub origin_col: u16,
    pub origin_row: u16,
    pub width: usize,
    pub height: usize,
}

impl Frame {
    pub fn new(origin_col: u16, origin_row: u16, width: usize, height: usize) -> Self {
        Self {
            origin_col,
            origin_row,
            width,
            height,
        }
    }

    /// Flat slot under screen position `(column, row)`, if it is on the grid.
    pub fn slot_at(&self, column: u16, row: u16) -> Option<usize> {
        let x = column.checked_sub(self.origin_col)? / CELL_WIDTH;
        let y = row.checked_sub(self.origin_row + 1)?;
        let (x, y) = (x as usize, y as usize);
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    /// Screen position of the top-left corner of `slot`.
    pub fn cell_origin(&self, slot: usize) -> (u16, u16) {
        let width = self.width.max(1);
        let x = (slot % width) as u16;
        let y = (slot / width) as u16;
        (self.origin_col + x * CELL_WIDTH, self.origin_row + 1 + y)
    }
}

/// Text drawn for one cell, always [`CELL_WIDTH`] characters.
pub fn cell_label(cell: Option<&PresentedCell>) -> String {
    let Some(cell) = cell else {
        return " .  ".to_string();
    };
    let mut label: String = cell.content.as_str().chars().take(2).collect();
    while label.chars().count() < 2 {
        label.push(' ');
    }
    match cell.count {
        Some(count) if count > 1 => label.push_str(&format!("{count:>2}")),
        _ => label.push_str("  "),
    }
    label
}

/// Draw a whole grid: title line, then every cell.
pub fn draw_grid<W: Write>(
    out: &mut W,
    frame: Frame,
    title: &str,
    cells: &[Option<PresentedCell>],
) -> io::Result<()> {
    queue!(
        out,
        MoveTo(frame.origin_col, frame.origin_row),
        Clear(ClearType::CurrentLine),
        Print(title)
    )?;
    for (slot, cell) in cells.iter().enumerate() {
        let (col, row) = frame.cell_origin(slot);
        let glow = cell.as_ref().is_some_and(|cell| cell.glow);
        queue!(out, MoveTo(col, row))?;
        if glow {
            queue!(out, SetAttribute(Attribute::Bold))?;
        }
        queue!(out, Print(cell_label(cell.as_ref())))?;
        if glow {
            queue!(out, SetAttribute(Attribute::Reset))?;
        }
    }
    out.flush()
}

// =============================================================================
// HOST
// =============================================================================

struct TerminalState {
    viewer: ViewerId,
    origin: (u16, u16),
    next_surface: u64,
    sizes: HashMap<SurfaceId, (usize, usize)>,
    open: Option<SurfaceId>,
    held: Option<PresentedCell>,
    out: Box<dyn Write>,
}

impl TerminalState {
    fn frame_for(&self, id: SurfaceId) -> Option<Frame> {
        let (width, height) = *self.sizes.get(&id)?;
        Some(Frame::new(self.origin.0, self.origin.1, width, height))
    }

    fn redraw(&mut self, id: SurfaceId, title: &str, cells: &[Option<PresentedCell>]) {
        if self.open != Some(id) {
            return;
        }
        let Some(frame) = self.frame_for(id) else {
            return;
        };
        if let Err(err) = draw_grid(&mut self.out, frame, title, cells) {
            tracing::warn!(error = %err, surface = %id, "terminal draw failed");
        }
    }
}

/// [`Host`] for a single terminal viewer. Clones share state.
#[derive(Clone)]
pub struct TerminalHost {
    state: Rc<RefCell<TerminalState>>,
}

impl TerminalHost {
    /// Draw to stdout, grid at the top-left corner.
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    pub fn with_writer(out: impl Write + 'static) -> Self {
        Self {
            state: Rc::new(RefCell::new(TerminalState {
                viewer: ViewerId(0),
                origin: (0, 0),
                next_surface: 0,
                sizes: HashMap::new(),
                open: None,
                held: None,
                out: Box::new(out),
            })),
        }
    }

    /// The one viewer this terminal stands for.
    pub fn viewer(&self) -> ViewerId {
        self.state.borrow().viewer
    }

    /// Move the grid on screen. Takes effect on the next draw.
    pub fn set_origin(&self, col: u16, row: u16) {
        self.state.borrow_mut().origin = (col, row);
    }

    /// Geometry of the grid currently shown, if any.
    pub fn frame(&self) -> Option<Frame> {
        let state = self.state.borrow();
        state.frame_for(state.open?)
    }
}

impl Default for TerminalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for TerminalHost {
    fn create_surface(&self, width: usize, height: usize, title: &str) -> Box<dyn Surface> {
        let id = {
            let mut state = self.state.borrow_mut();
            state.next_surface += 1;
            let id = SurfaceId(state.next_surface);
            state.sizes.insert(id, (width, height));
            id
        };
        Box::new(TerminalSurface {
            id,
            title: title.to_string(),
            cells: vec![None; width * height],
            state: self.state.clone(),
        })
    }

    fn open(&self, viewer: ViewerId, surface: &dyn Surface) {
        let mut state = self.state.borrow_mut();
        if viewer != state.viewer {
            tracing::warn!(%viewer, "terminal host only serves its own viewer");
            return;
        }
        if let Err(err) = queue!(&mut state.out, Clear(ClearType::All)) {
            tracing::warn!(error = %err, "terminal clear failed");
        }
        state.open = Some(surface.id());
        state.redraw(surface.id(), &surface.title(), &surface.contents());
    }

    fn close(&self, viewer: ViewerId) {
        let mut state = self.state.borrow_mut();
        if viewer != state.viewer || state.open.take().is_none() {
            return;
        }
        let out = &mut state.out;
        if let Err(err) = queue!(out, Clear(ClearType::All)).and_then(|()| out.flush()) {
            tracing::warn!(error = %err, "terminal clear failed");
        }
    }

    fn take_held(&self, viewer: ViewerId) -> Option<PresentedCell> {
        let mut state = self.state.borrow_mut();
        (viewer == state.viewer).then(|| state.held.take()).flatten()
    }

    fn restore_held(&self, viewer: ViewerId, item: Option<PresentedCell>) {
        let mut state = self.state.borrow_mut();
        if viewer == state.viewer {
            state.held = item;
        }
    }
}

/// Surface created by [`TerminalHost`]. Redraws itself while open.
pub struct TerminalSurface {
    id: SurfaceId,
    title: String,
    cells: Vec<Option<PresentedCell>>,
    state: Rc<RefCell<TerminalState>>,
}

impl TerminalSurface {
    fn redraw(&self) {
        self.state.borrow_mut().redraw(self.id, &self.title, &self.cells);
    }
}

impl Surface for TerminalSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn len(&self) -> usize {
        self.cells.len()
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn contents(&self) -> Vec<Option<PresentedCell>> {
        self.cells.clone()
    }

    fn set_contents(&mut self, contents: &[Option<PresentedCell>]) {
        for (cell, value) in self.cells.iter_mut().zip(contents) {
            *cell = value.clone();
        }
        self.redraw();
    }

    fn set_cell(&mut self, index: usize, cell: Option<PresentedCell>) {
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = cell;
            self.redraw();
        }
    }

    fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
        self.redraw();
    }

    fn viewers(&self) -> Vec<ViewerId> {
        let state = self.state.borrow();
        if state.open == Some(self.id) {
            vec![state.viewer]
        } else {
            Vec::new()
        }
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.sizes.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    #[test]
    fn test_cell_label() {
        assert_eq!(cell_label(None), " .  ");
        assert_eq!(cell_label(Some(&PresentedCell::plain("apple"))), "ap  ");
        assert_eq!(cell_label(Some(&PresentedCell::plain("x").with_count(1))), "x   ");
        assert_eq!(cell_label(Some(&PresentedCell::plain("stone").with_count(64))), "st64");
        assert_eq!(cell_label(Some(&PresentedCell::plain("stone").with_count(7))), "st 7");
    }

    #[test]
    fn test_frame_slot_mapping() {
        let frame = Frame::new(2, 1, 9, 3);
        assert_eq!(frame.slot_at(2, 2), Some(0));
        assert_eq!(frame.slot_at(5, 2), Some(0));
        assert_eq!(frame.slot_at(6, 2), Some(1));
        assert_eq!(frame.slot_at(2, 4), Some(18));
        assert_eq!(frame.slot_at(1, 2), None);
        assert_eq!(frame.slot_at(2, 1), None);
        assert_eq!(frame.slot_at(2 + 9 * CELL_WIDTH, 2), None);
        assert_eq!(frame.slot_at(2, 5), None);
        assert_eq!(frame.cell_origin(10), (6, 3));
    }

    #[test]
    fn test_draws_only_open_surface() {
        let buf = SharedBuf::default();
        let host = TerminalHost::with_writer(buf.clone());
        let mut surface = host.create_surface(2, 1, "Title");

        surface.set_cell(0, Some(PresentedCell::plain("gold")));
        assert!(buf.text().is_empty());
        assert!(host.frame().is_none());

        host.open(host.viewer(), surface.as_ref());
        let text = buf.text();
        assert!(text.contains("Title"));
        assert!(text.contains("go  "));
        assert_eq!(surface.viewers(), vec![host.viewer()]);
        assert_eq!(host.frame(), Some(Frame::new(0, 0, 2, 1)));

        host.close(host.viewer());
        assert!(surface.viewers().is_empty());
    }

    #[test]
    fn test_other_viewers_ignored() {
        let host = TerminalHost::with_writer(SharedBuf::default());
        let surface = host.create_surface(1, 1, "t");
        host.open(ViewerId(42), surface.as_ref());
        assert!(surface.viewers().is_empty());

        host.restore_held(ViewerId(42), Some(PresentedCell::plain("a")));
        assert_eq!(host.take_held(ViewerId(42)), None);
        host.restore_held(host.viewer(), Some(PresentedCell::plain("a")));
        assert_eq!(host.take_held(host.viewer()), Some(PresentedCell::plain("a")));
    }
}
