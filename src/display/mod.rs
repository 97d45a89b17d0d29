//! Display - a scene bound to a fixed-size grid shown to viewers.
//!
//! A display owns one [`Surface`] obtained from its [`Host`] and keeps it in
//! sync with its [`Scene`] lazily: mutations only raise [`DirtyFlags`], and
//! the next [`show`](Display::show) decides how much work to do.
//!
//! # Cycle
//!
//! - `show(viewer)` - skip if the viewer already sees a clean display;
//!   otherwise recreate the surface on TITLE/ROWS, restore the previous
//!   contents if CONTENT is clean, or run a full `render`, then present
//! - `render()` - fire render callbacks (cancelable), lay out the root, and
//!   resolve every cell as override > tree > scene background
//! - `update()` - `show` to every current viewer, keeping the item they hold
//!
//! # Host notifications
//!
//! - `handle_click(event)` - display callbacks, then scene dispatch for
//!   clicks on the grid
//! - `handle_close(viewer, reason)` - close callback; a canceled close
//!   re-shows on the next [`TaskQueue`] cycle, a viewer-initiated close
//!   falls back to the parent display
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use cellgraph::{Display, DisplayKind, MemoryHost, Node, Pixel, Scene, TaskQueue, ViewerId};
//!
//! let host = MemoryHost::new();
//! let display = Display::new(DisplayKind::Chest { rows: 1 }, "Menu", Rc::new(host.clone()), TaskQueue::new()).unwrap();
//!
//! let root = Node::pane();
//! root.resize(9, 1);
//! root.add_child(Node::item(Pixel::of("apple"))).unwrap();
//! display.set_scene(Some(Scene::with_root(root)));
//!
//! display.show(ViewerId(1));
//! assert!(!display.is_dirty());
//! assert_eq!(display.viewers(), vec![ViewerId(1)]);
//! ```

mod memory;
mod scheduler;
mod storage;
mod surface;

pub use memory::{MemoryHost, MemorySurface};
pub use scheduler::TaskQueue;
pub use storage::Storage;
pub use surface::{Host, Surface, SurfaceId};

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::callback::{self, CallbackOutput, CallbackSlot};
use crate::context::{Cancelable, ClickContext, CloseContext, RenderContext, SlotClickContext};
use crate::error::{Error, Result};
use crate::guard::FlagGuard;
use crate::scene::{PresentedCell, Scene};
use crate::types::{ClickEvent, CloseReason, DirtyFlags, GuiArea, ViewerId};

/// Largest chest row count.
pub const MAX_CHEST_ROWS: usize = 6;

// =============================================================================
// KIND
// =============================================================================

/// Grid shape of a display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayKind {
    /// 9 x `rows`, rows in `1..=6`.
    Chest { rows: usize },
    /// 5 x 1.
    Hopper,
    /// 9 x 3.
    ShulkerBox,
}

impl DisplayKind {
    pub fn width(self) -> usize {
        match self {
            DisplayKind::Chest { .. } | DisplayKind::ShulkerBox => 9,
            DisplayKind::Hopper => 5,
        }
    }

    pub fn height(self) -> usize {
        match self {
            DisplayKind::Chest { rows } => rows,
            DisplayKind::Hopper => 1,
            DisplayKind::ShulkerBox => 3,
        }
    }

    /// Number of cells.
    pub fn cell_count(self) -> usize {
        self.width() * self.height()
    }

    pub fn name(self) -> &'static str {
        match self {
            DisplayKind::Chest { .. } => "chest",
            DisplayKind::Hopper => "hopper",
            DisplayKind::ShulkerBox => "shulker_box",
        }
    }

    fn validate(self) -> Result<()> {
        match self {
            DisplayKind::Chest { rows } if !(1..=MAX_CHEST_ROWS).contains(&rows) => {
                Err(Error::InvalidRows { rows })
            }
            _ => Ok(()),
        }
    }
}

// =============================================================================
// DISPLAY
// =============================================================================

/// Shared handle to a display.
#[derive(Clone)]
pub struct Display(pub(crate) Rc<DisplayInner>);

pub(crate) struct DisplayInner {
    kind: Cell<DisplayKind>,
    title: RefCell<String>,
    host: Rc<dyn Host>,
    tasks: TaskQueue,
    surface: RefCell<Box<dyn Surface>>,
    scene: RefCell<Option<Scene>>,
    parent: RefCell<Option<Display>>,
    storage: RefCell<Storage>,

    dirty: Cell<DirtyFlags>,
    updating: Cell<bool>,
    rendering: Cell<bool>,

    on_click: CallbackSlot<ClickContext>,
    on_slot_click: CallbackSlot<SlotClickContext>,
    on_outside_click: CallbackSlot<ClickContext>,
    on_close: CallbackSlot<CloseContext>,
    on_render: CallbackSlot<RenderContext>,
}

impl Display {
    /// Create a display and its surface. Content starts dirty, so the first
    /// `show` renders.
    pub fn new(kind: DisplayKind, title: impl Into<String>, host: Rc<dyn Host>, tasks: TaskQueue) -> Result<Self> {
        kind.validate()?;
        let title = title.into();
        let surface = host.create_surface(kind.width(), kind.height(), &title);
        Ok(Display(Rc::new(DisplayInner {
            kind: Cell::new(kind),
            title: RefCell::new(title),
            host,
            tasks,
            surface: RefCell::new(surface),
            scene: RefCell::new(None),
            parent: RefCell::new(None),
            storage: RefCell::new(Storage::new()),
            dirty: Cell::new(DirtyFlags::CONTENT),
            updating: Cell::new(false),
            rendering: Cell::new(false),
            on_click: CallbackSlot::new(),
            on_slot_click: CallbackSlot::new(),
            on_outside_click: CallbackSlot::new(),
            on_close: CallbackSlot::new(),
            on_render: CallbackSlot::new(),
        })))
    }

    /// Shorthand for a chest display.
    pub fn chest(rows: usize, title: impl Into<String>, host: Rc<dyn Host>, tasks: TaskQueue) -> Result<Self> {
        Self::new(DisplayKind::Chest { rows }, title, host, tasks)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn kind(&self) -> DisplayKind {
        self.0.kind.get()
    }

    pub fn width(&self) -> usize {
        self.kind().width()
    }

    pub fn height(&self) -> usize {
        self.kind().height()
    }

    pub fn title(&self) -> String {
        self.0.title.borrow().clone()
    }

    pub fn scene(&self) -> Option<Scene> {
        self.0.scene.borrow().clone()
    }

    pub fn parent(&self) -> Option<Display> {
        self.0.parent.borrow().clone()
    }

    /// Display shown when a viewer closes this one themselves.
    pub fn set_parent(&self, parent: Option<Display>) {
        *self.0.parent.borrow_mut() = parent;
    }

    pub fn tasks(&self) -> &TaskQueue {
        &self.0.tasks
    }

    /// Id of the current surface. Changes whenever the surface is recreated.
    pub fn surface_id(&self) -> SurfaceId {
        self.0.surface.borrow().id()
    }

    /// Copy of the current surface cells.
    pub fn contents(&self) -> Vec<Option<PresentedCell>> {
        self.0.surface.borrow().contents()
    }

    pub fn viewers(&self) -> Vec<ViewerId> {
        self.0.surface.borrow().viewers()
    }

    pub fn is_viewing(&self, viewer: ViewerId) -> bool {
        self.viewers().contains(&viewer)
    }

    /// Run `f` against this display's storage.
    ///
    /// `f` must not call back into this display's storage.
    pub fn with_storage<R>(&self, f: impl FnOnce(&mut Storage) -> R) -> R {
        f(&mut self.0.storage.borrow_mut())
    }

    pub fn is_updating(&self) -> bool {
        self.0.updating.get()
    }

    pub fn is_rendering(&self) -> bool {
        self.0.rendering.get()
    }

    // -------------------------------------------------------------------------
    // Dirty flags
    // -------------------------------------------------------------------------

    pub fn is_dirty(&self) -> bool {
        !self.0.dirty.get().is_empty()
    }

    pub fn is_dirty_flag(&self, flag: DirtyFlags) -> bool {
        self.0.dirty.get().contains(flag)
    }

    pub fn dirty_flags(&self) -> DirtyFlags {
        self.0.dirty.get()
    }

    pub(crate) fn mark_dirty(&self, flags: DirtyFlags) {
        self.0.dirty.set(self.0.dirty.get() | flags);
    }

    fn clear_dirty(&self, flags: DirtyFlags) {
        self.0.dirty.set(self.0.dirty.get() - flags);
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Bind `scene` (unbinding the previous one), then update viewers.
    pub fn set_scene(&self, scene: Option<Scene>) {
        let current = self.scene();
        if current == scene {
            return;
        }
        if let Some(old) = current {
            old.set_display(Weak::new());
        }
        if let Some(new_scene) = &scene {
            if let Some(other) = new_scene.display() {
                other.0.scene.borrow_mut().take();
                other.mark_dirty(DirtyFlags::CONTENT);
            }
            new_scene.set_display(Rc::downgrade(&self.0));
        }
        *self.0.scene.borrow_mut() = scene;
        self.mark_dirty(DirtyFlags::CONTENT);
        self.update();
    }

    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        if *self.0.title.borrow() == title {
            return;
        }
        *self.0.title.borrow_mut() = title;
        self.mark_dirty(DirtyFlags::TITLE);
        self.update();
    }

    /// Change a chest's row count.
    pub fn set_rows(&self, rows: usize) -> Result<()> {
        let kind = self.kind();
        let DisplayKind::Chest { rows: current } = kind else {
            return Err(Error::FixedRows { kind: kind.name() });
        };
        let new_kind = DisplayKind::Chest { rows };
        new_kind.validate()?;
        if current == rows {
            return Ok(());
        }
        self.0.kind.set(new_kind);
        self.mark_dirty(DirtyFlags::ROWS);
        self.update();
        Ok(())
    }

    /// Mark content dirty; optionally push the change to viewers now.
    pub fn request_render(&self, update: bool) {
        self.mark_dirty(DirtyFlags::CONTENT);
        if update {
            self.update();
        }
    }

    // -------------------------------------------------------------------------
    // Callbacks
    // -------------------------------------------------------------------------

    /// Every click, including clicks outside the window.
    pub fn on_click<F, R>(&self, f: F)
    where
        F: Fn(&mut ClickContext) -> R + 'static,
        R: CallbackOutput,
    {
        self.0.on_click.set(f);
    }

    /// Clicks on a cell, top or bottom area.
    pub fn on_slot_click<F, R>(&self, f: F)
    where
        F: Fn(&mut SlotClickContext) -> R + 'static,
        R: CallbackOutput,
    {
        self.0.on_slot_click.set(f);
    }

    pub fn on_outside_click<F, R>(&self, f: F)
    where
        F: Fn(&mut ClickContext) -> R + 'static,
        R: CallbackOutput,
    {
        self.0.on_outside_click.set(f);
    }

    /// Cancel the context to keep the viewer on this display.
    pub fn on_close<F, R>(&self, f: F)
    where
        F: Fn(&mut CloseContext) -> R + 'static,
        R: CallbackOutput,
    {
        self.0.on_close.set(f);
    }

    /// Runs before the scene's render callback. Cancel to skip the pass.
    pub fn on_render<F, R>(&self, f: F)
    where
        F: Fn(&mut RenderContext) -> R + 'static,
        R: CallbackOutput,
    {
        self.0.on_render.set(f);
    }

    // -------------------------------------------------------------------------
    // Render / show / update
    // -------------------------------------------------------------------------

    /// Present this display to `viewer`, doing only the work the dirty flags
    /// call for.
    pub fn show(&self, viewer: ViewerId) {
        let inner = &self.0;
        let dirty = inner.dirty.get();
        if dirty.is_empty() && self.is_viewing(viewer) {
            return;
        }

        let snapshot = inner.surface.borrow().contents();
        if dirty.intersects(DirtyFlags::TITLE | DirtyFlags::ROWS) {
            self.recreate_surface();
        }

        let len = inner.surface.borrow().len();
        if !dirty.contains(DirtyFlags::CONTENT) && len <= snapshot.len() {
            tracing::debug!(%viewer, cells = len, "restoring previous contents");
            inner.surface.borrow_mut().set_contents(&snapshot[..len]);
        } else if !self.render() {
            tracing::debug!(%viewer, "render did not complete; content stays dirty");
        }
        // TITLE/ROWS raised by a render callback stay dirty for the next show.
        self.clear_dirty(dirty & (DirtyFlags::TITLE | DirtyFlags::ROWS));

        let surface = inner.surface.borrow();
        inner.host.open(viewer, &**surface);
    }

    fn recreate_surface(&self) {
        let kind = self.kind();
        let surface = self
            .0
            .host
            .create_surface(kind.width(), kind.height(), &self.0.title.borrow());
        tracing::debug!(kind = kind.name(), surface = %surface.id(), "recreated surface");
        *self.0.surface.borrow_mut() = surface;
    }

    /// Render the scene into the surface. Returns false if the pass was
    /// canceled or another render is in progress; CONTENT then stays dirty.
    pub fn render(&self) -> bool {
        let inner = &self.0;
        let Some(_guard) = FlagGuard::acquire(&inner.rendering) else {
            return false;
        };

        let scene = self
            .scene()
            .filter(|scene| scene.root().is_some() || scene.background().is_some());
        let Some(scene) = scene else {
            inner.surface.borrow_mut().clear();
            self.clear_dirty(DirtyFlags::CONTENT);
            return true;
        };

        let (width, height) = (self.width(), self.height());
        let mut ctx = RenderContext::new(Some(self.clone()), Some(scene.clone()), width, height);
        callback::fire("on_render", &inner.on_render, &mut ctx);
        scene.fire_render(&mut ctx);
        if ctx.is_canceled() {
            tracing::debug!("render canceled by callback");
            return false;
        }

        let root = scene.root();
        let background = scene.background();
        if let Some(root) = &root {
            root.layout();
        }

        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let (cx, cy) = (x as i32, y as i32);
                let pixel = ctx
                    .override_at(x, y)
                    .cloned()
                    .or_else(|| {
                        root.as_ref()
                            .and_then(|root| root.render_at(cx - root.layout_x(), cy - root.layout_y()))
                    })
                    .or_else(|| background.as_ref().and_then(|bg| bg.pixel_at(cx, cy)));
                cells.push(pixel.and_then(|pixel| pixel.render(&ctx.for_pixel(x, y))));
            }
        }
        inner.surface.borrow_mut().set_contents(&cells);
        self.clear_dirty(DirtyFlags::CONTENT);
        tracing::debug!(width, height, elapsed = ?ctx.render_time(), "rendered");
        true
    }

    /// `show` to every current viewer, preserving the item each one holds.
    pub fn update(&self) {
        let Some(_guard) = FlagGuard::acquire(&self.0.updating) else {
            return;
        };
        for viewer in self.viewers() {
            let held = self.0.host.take_held(viewer);
            self.show(viewer);
            self.0.host.restore_held(viewer, held);
        }
    }

    /// Close the window of `viewer` if it is showing this display.
    ///
    /// The host reports the resulting close through `handle_close` as usual.
    pub fn close(&self, viewer: ViewerId) {
        if self.is_viewing(viewer) {
            self.0.host.close(viewer);
        }
    }

    pub fn close_all(&self) {
        for viewer in self.viewers() {
            self.0.host.close(viewer);
        }
    }

    // -------------------------------------------------------------------------
    // Host notifications
    // -------------------------------------------------------------------------

    /// Route a host click through the display callbacks and, for grid
    /// clicks, into the scene.
    pub fn handle_click(&self, event: ClickEvent) {
        let inner = &self.0;
        let click = ClickContext {
            display: Some(self.clone()),
            scene: self.scene(),
            area: event.area,
            kind: event.kind,
            hotbar_button: event.hotbar_button,
            viewer: event.viewer,
        };

        callback::fire("on_click", &inner.on_click, &mut click.clone());

        if event.area == GuiArea::Outside {
            callback::fire("on_outside_click", &inner.on_outside_click, &mut click.clone());
            return;
        }

        let width = self.width();
        let slot_x = event.raw_slot % width;
        let slot_y = event.raw_slot / width;
        let mut slot_ctx = SlotClickContext {
            click: click.clone(),
            slot_x,
            slot_y,
        };
        callback::fire("on_slot_click", &inner.on_slot_click, &mut slot_ctx);

        if event.area == GuiArea::Top {
            if let Some(scene) = self.scene() {
                scene.dispatch(click, slot_x, slot_y);
            }
        }
    }

    /// React to a viewer's window closing.
    pub fn handle_close(&self, viewer: ViewerId, reason: CloseReason) {
        if self.is_updating() {
            tracing::trace!(%viewer, "close during update ignored");
            return;
        }

        let mut ctx = CloseContext::new(self.clone(), viewer, reason);
        callback::fire("on_close", &self.0.on_close, &mut ctx);

        if ctx.is_canceled() {
            tracing::debug!(%viewer, "close canceled; re-showing next cycle");
            let display = self.clone();
            self.0.tasks.schedule(move || display.show(viewer));
        } else if reason.is_viewer_initiated() {
            if let Some(parent) = self.parent() {
                tracing::debug!(%viewer, "returning to parent display");
                self.0.tasks.schedule(move || parent.show(viewer));
            }
        }
    }
}

impl PartialEq for Display {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Display {}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display")
            .field("kind", &self.kind())
            .field("title", &self.0.title.borrow())
            .field("dirty", &self.dirty_flags())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Background, Node, Pixel};
    use crate::types::ClickKind;

    const VIEWER: ViewerId = ViewerId(1);

    fn setup(rows: usize) -> (Display, MemoryHost) {
        let host = MemoryHost::new();
        let display = Display::chest(rows, "Test", Rc::new(host.clone()), TaskQueue::new()).unwrap();
        (display, host)
    }

    fn scene_with_item(at: (i32, i32), name: &'static str) -> (Scene, Node) {
        let root = Node::pane();
        root.resize(9, 6);
        let item = Node::item(Pixel::of(name));
        item.relocate(at.0, at.1);
        root.add_child(item.clone()).unwrap();
        (Scene::with_root(root), item)
    }

    #[test]
    fn test_kind_sizes() {
        assert_eq!(DisplayKind::Chest { rows: 4 }.cell_count(), 36);
        assert_eq!((DisplayKind::Hopper.width(), DisplayKind::Hopper.height()), (5, 1));
        assert_eq!(DisplayKind::ShulkerBox.cell_count(), 27);
    }

    #[test]
    fn test_invalid_rows() {
        let host: Rc<dyn Host> = Rc::new(MemoryHost::new());
        assert_eq!(
            Display::chest(0, "x", host.clone(), TaskQueue::new()).unwrap_err(),
            Error::InvalidRows { rows: 0 }
        );
        assert_eq!(
            Display::chest(7, "x", host.clone(), TaskQueue::new()).unwrap_err(),
            Error::InvalidRows { rows: 7 }
        );

        let hopper = Display::new(DisplayKind::Hopper, "h", host, TaskQueue::new()).unwrap();
        assert_eq!(hopper.set_rows(2), Err(Error::FixedRows { kind: "hopper" }));
    }

    #[test]
    fn test_new_display_starts_content_dirty() {
        let (display, _) = setup(1);
        assert_eq!(display.dirty_flags(), DirtyFlags::CONTENT);
    }

    #[test]
    fn test_render_resolves_override_tree_background() {
        let (display, _) = setup(1);
        let (scene, _) = scene_with_item((1, 0), "item");
        scene.set_background(Some(Background::fill(Pixel::of("bg"))));
        scene.on_render(|ctx| ctx.set_override(2, 0, Pixel::of("pinned")));
        display.set_scene(Some(scene));

        assert!(display.render());
        let contents = display.contents();
        assert_eq!(contents[0], Some(PresentedCell::plain("bg").with_count(1)));
        assert_eq!(contents[1], Some(PresentedCell::plain("item").with_count(1)));
        assert_eq!(contents[2], Some(PresentedCell::plain("pinned").with_count(1)));
        assert!(!display.is_dirty_flag(DirtyFlags::CONTENT));
    }

    #[test]
    fn test_render_without_content_clears() {
        let (display, _) = setup(1);
        let (scene, _) = scene_with_item((0, 0), "item");
        display.set_scene(Some(scene.clone()));
        display.render();
        assert!(display.contents()[0].is_some());

        scene.set_root(None);
        assert!(display.is_dirty_flag(DirtyFlags::CONTENT));
        assert!(display.render());
        assert!(display.contents().iter().all(Option::is_none));
    }

    #[test]
    fn test_canceled_render_keeps_content_dirty() {
        let (display, host) = setup(1);
        let (scene, _) = scene_with_item((0, 0), "item");
        display.set_scene(Some(scene));
        display.on_render(|ctx| ctx.cancel());

        display.show(VIEWER);

        assert!(display.is_dirty_flag(DirtyFlags::CONTENT));
        assert!(display.contents()[0].is_none());
        assert_eq!(host.viewing(VIEWER), Some(display.surface_id()));
    }

    #[test]
    fn test_show_is_idempotent_when_clean() {
        let (display, host) = setup(1);
        let (scene, _) = scene_with_item((0, 0), "item");
        display.set_scene(Some(scene));

        display.show(VIEWER);
        display.show(VIEWER);

        assert_eq!(host.opens().len(), 1);
        assert!(!display.is_dirty());
    }

    #[test]
    fn test_title_change_recreates_surface_and_keeps_contents() {
        let (display, host) = setup(1);
        let (scene, _) = scene_with_item((0, 0), "item");
        display.set_scene(Some(scene));
        display.show(VIEWER);
        let before = display.surface_id();
        let renders = Rc::new(Cell::new(0));
        let renders_clone = renders.clone();
        display.on_render(move |_ctx| renders_clone.set(renders_clone.get() + 1));

        display.set_title("Renamed");

        assert_ne!(display.surface_id(), before);
        assert_eq!(renders.get(), 0);
        assert_eq!(display.contents()[0], Some(PresentedCell::plain("item").with_count(1)));
        assert_eq!(host.viewing(VIEWER), Some(display.surface_id()));
        assert!(!display.is_dirty());
    }

    #[test]
    fn test_growing_rows_renders() {
        let (display, _) = setup(1);
        let (scene, _) = scene_with_item((0, 1), "low");
        display.set_scene(Some(scene));
        display.show(VIEWER);

        display.set_rows(2).unwrap();

        assert_eq!(display.height(), 2);
        assert_eq!(display.contents().len(), 18);
        assert_eq!(display.contents()[9], Some(PresentedCell::plain("low").with_count(1)));
    }

    #[test]
    fn test_update_preserves_held_item() {
        let (display, host) = setup(1);
        display.show(VIEWER);
        host.set_held(VIEWER, Some(PresentedCell::plain("torch")));

        display.request_render(true);

        assert_eq!(host.held(VIEWER), Some(PresentedCell::plain("torch")));
        assert!(!display.is_dirty());
    }

    #[test]
    fn test_layout_request_marks_display_dirty() {
        let (display, _) = setup(1);
        let (scene, item) = scene_with_item((0, 0), "item");
        display.set_scene(Some(scene));
        display.render();
        assert!(!display.is_dirty());

        item.parent().unwrap().add_child(Node::item(Pixel::of("more"))).unwrap();
        assert!(display.is_dirty_flag(DirtyFlags::CONTENT));
    }

    #[test]
    fn test_click_routing() {
        let (display, _) = setup(2);
        let (scene, item) = scene_with_item((3, 1), "item");
        display.set_scene(Some(scene));

        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        display.on_click(move |_ctx| l.borrow_mut().push("click".to_string()));
        let l = log.clone();
        display.on_slot_click(move |ctx| l.borrow_mut().push(format!("slot {},{}", ctx.slot_x, ctx.slot_y)));
        let l = log.clone();
        display.on_outside_click(move |_ctx| l.borrow_mut().push("outside".to_string()));
        let l = log.clone();
        item.on_click(move |_ctx| l.borrow_mut().push("item".to_string()));

        display.handle_click(ClickEvent::top(VIEWER, ClickKind::Left, 12));
        display.handle_click(ClickEvent::outside(VIEWER, ClickKind::Left));
        display.handle_click(ClickEvent {
            area: GuiArea::Bottom,
            ..ClickEvent::top(VIEWER, ClickKind::Left, 12)
        });

        assert_eq!(
            *log.borrow(),
            vec!["click", "slot 3,1", "item", "click", "outside", "click", "slot 3,1"]
        );
    }

    #[test]
    fn test_close_during_update_ignored() {
        let (display, _) = setup(1);
        let closes = Rc::new(Cell::new(0));
        let closes_clone = closes.clone();
        display.on_close(move |_ctx| closes_clone.set(closes_clone.get() + 1));

        display.show(VIEWER);
        let during = display.clone();
        display.on_render(move |_ctx| during.handle_close(VIEWER, CloseReason::OpenNew));
        display.request_render(true);

        assert_eq!(closes.get(), 0);
        display.handle_close(VIEWER, CloseReason::Viewer);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_render_callback_cannot_reenter_render() {
        let (display, _) = setup(1);
        let (scene, item) = scene_with_item((0, 0), "item");
        let root = item.parent().unwrap();
        display.set_scene(Some(scene));
        display.show(VIEWER);

        let passes = Rc::new(Cell::new(0));
        let inner_result = Rc::new(Cell::new(None));
        let passes_clone = passes.clone();
        let inner_clone = inner_result.clone();
        display.on_render(move |ctx| {
            passes_clone.set(passes_clone.get() + 1);
            if passes_clone.get() > 1 {
                return;
            }
            let late = Node::item(Pixel::of("late"));
            late.relocate(1, 0);
            root.add_child(late).unwrap();
            let display = ctx.display.clone().unwrap();
            display.request_render(true);
            inner_clone.set(Some(display.render()));
        });
        display.request_render(true);

        assert_eq!(inner_result.get(), Some(false));
        assert_eq!(passes.get(), 1);
        assert_eq!(display.contents()[1], Some(PresentedCell::plain("late").with_count(1)));
        assert!(!display.is_rendering());
    }

    #[test]
    fn test_rows_changed_while_rendering_applies_next_show() {
        let (display, host) = setup(1);
        let (scene, _) = scene_with_item((0, 1), "low");
        display.set_scene(Some(scene));
        display.on_render(|ctx| {
            if let Some(display) = &ctx.display {
                display.set_rows(2).unwrap();
            }
        });

        display.show(VIEWER);
        assert_eq!(display.height(), 2);
        assert!(display.is_dirty_flag(DirtyFlags::ROWS));

        display.show(VIEWER);
        assert_eq!(display.contents().len(), 18);
        assert_eq!(display.contents()[9], Some(PresentedCell::plain("low").with_count(1)));
        assert_eq!(host.viewing(VIEWER), Some(display.surface_id()));
        assert!(!display.is_dirty());
    }

    #[test]
    fn test_title_changed_while_rendering_applies_next_show() {
        let (display, host) = setup(1);
        let (scene, _) = scene_with_item((0, 0), "item");
        display.set_scene(Some(scene));
        display.on_render(|ctx| {
            if let Some(display) = &ctx.display {
                display.set_title("New");
            }
        });

        display.show(VIEWER);
        let first = display.surface_id();
        assert!(display.is_dirty_flag(DirtyFlags::TITLE));

        display.show(VIEWER);
        assert_ne!(display.surface_id(), first);
        assert_eq!(host.viewing(VIEWER), Some(display.surface_id()));
        assert!(!display.is_dirty());
    }

    #[test]
    fn test_viewer_close_returns_to_parent() {
        let host = MemoryHost::new();
        let tasks = TaskQueue::new();
        let parent = Display::chest(1, "Parent", Rc::new(host.clone()), tasks.clone()).unwrap();
        let child = Display::chest(1, "Child", Rc::new(host.clone()), tasks.clone()).unwrap();
        child.set_parent(Some(parent.clone()));

        child.show(VIEWER);
        host.close(VIEWER);
        child.handle_close(VIEWER, CloseReason::Program);
        tasks.run_pending();
        assert_eq!(host.viewing(VIEWER), None);

        child.show(VIEWER);
        host.close(VIEWER);
        child.handle_close(VIEWER, CloseReason::Viewer);
        assert_eq!(host.viewing(VIEWER), None);
        tasks.run_pending();
        assert_eq!(host.viewing(VIEWER), Some(parent.surface_id()));
    }

    #[test]
    fn test_set_scene_moves_between_displays() {
        let (first, _) = setup(1);
        let (second, _) = setup(1);
        let (scene, _) = scene_with_item((0, 0), "item");

        first.set_scene(Some(scene.clone()));
        second.set_scene(Some(scene.clone()));

        assert!(first.scene().is_none());
        assert_eq!(second.scene(), Some(scene.clone()));
        assert_eq!(scene.display(), Some(second));
    }

    #[test]
    fn test_storage_access() {
        let (display, _) = setup(1);
        display.with_storage(|storage| storage.register("page", Some(2u8)));
        assert_eq!(display.with_storage(|storage| storage.get::<u8>("page")), Ok(Some(2)));
    }
}
