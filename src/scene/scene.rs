//! Scene - binds a root composite and a background to a display, and turns
//! grid clicks into bubbling node callbacks.
//!
//! # Dispatch
//!
//! 1. Hit-test the root at the click position (root-relative).
//! 2. Build the chain: the hit node, then each ancestor whose bounds contain
//!    the accumulated position. Ancestors that fail the check are skipped;
//!    the walk always reaches the root.
//! 3. For each chain member fire `on_click`, then left/right/shift per the
//!    click kind, then hotbar if a hotbar button is set.
//!
//! Consuming the context is advisory. Every chain member runs.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::background::Background;
use super::node::Node;
use crate::callback::{self, CallbackOutput, CallbackSlot};
use crate::context::{ClickContext, NodeClickContext, RenderContext, SlotClickContext};
use crate::display::{Display, DisplayInner, Storage};
use crate::types::DirtyFlags;

/// Shared handle to a scene.
#[derive(Clone)]
pub struct Scene(pub(crate) Rc<SceneInner>);

pub(crate) struct SceneInner {
    root: RefCell<Option<Node>>,
    background: RefCell<Option<Background>>,
    on_render: CallbackSlot<RenderContext>,
    display: RefCell<Weak<DisplayInner>>,
    storage: RefCell<Storage>,
}

impl Scene {
    pub fn new() -> Self {
        Scene(Rc::new(SceneInner {
            root: RefCell::new(None),
            background: RefCell::new(None),
            on_render: CallbackSlot::new(),
            display: RefCell::new(Weak::new()),
            storage: RefCell::new(Storage::new()),
        }))
    }

    /// A scene with `root` already set.
    pub fn with_root(root: Node) -> Self {
        let scene = Self::new();
        scene.set_root(Some(root));
        scene
    }

    // -------------------------------------------------------------------------
    // Root / background
    // -------------------------------------------------------------------------

    pub fn root(&self) -> Option<Node> {
        self.0.root.borrow().clone()
    }

    /// Replace the root. The old root's subtree loses its scene link; the new
    /// root is detached from any parent and its subtree gains this scene.
    pub fn set_root(&self, root: Option<Node>) {
        let current = self.root();
        if current == root {
            return;
        }
        if let Some(old) = current {
            old.set_scene_link(&Weak::new());
        }
        if let Some(new_root) = &root {
            if let Some(parent) = new_root.parent() {
                if let Err(err) = parent.remove_child(new_root) {
                    tracing::warn!(error = %err, "could not detach new scene root from its parent");
                }
            }
            // A root of another scene moves here.
            if let Some(other) = new_root.scene() {
                if other != *self {
                    other.0.root.borrow_mut().take();
                    other.mark_display_dirty();
                }
            }
            new_root.set_scene_link(&Rc::downgrade(&self.0));
        }
        *self.0.root.borrow_mut() = root;
        self.mark_display_dirty();
    }

    pub fn background(&self) -> Option<Background> {
        self.0.background.borrow().clone()
    }

    /// Background in display coordinates, behind the root.
    pub fn set_background(&self, background: Option<Background>) {
        *self.0.background.borrow_mut() = background;
        self.mark_display_dirty();
    }

    // -------------------------------------------------------------------------
    // Display link
    // -------------------------------------------------------------------------

    /// The display currently showing this scene.
    pub fn display(&self) -> Option<Display> {
        self.0.display.borrow().upgrade().map(Display)
    }

    pub(crate) fn set_display(&self, display: Weak<DisplayInner>) {
        *self.0.display.borrow_mut() = display;
    }

    fn mark_display_dirty(&self) {
        if let Some(display) = self.display() {
            display.mark_dirty(DirtyFlags::CONTENT);
        }
    }

    /// Run `f` against this scene's storage. The store travels with the
    /// scene when it moves between displays.
    pub fn with_storage<R>(&self, f: impl FnOnce(&mut Storage) -> R) -> R {
        f(&mut self.0.storage.borrow_mut())
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    pub fn lookup(&self, id: &str) -> Option<Node> {
        self.root()?.lookup(id)
    }

    pub fn lookup_all(&self, id: &str) -> Vec<Node> {
        self.root()
            .map(|root| root.lookup_all(id))
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Callbacks
    // -------------------------------------------------------------------------

    /// Fired at the start of every render of a display showing this scene,
    /// after the display's own render callback.
    pub fn on_render<F, R>(&self, f: F)
    where
        F: Fn(&mut RenderContext) -> R + 'static,
        R: CallbackOutput,
    {
        self.0.on_render.set(f);
    }

    pub(crate) fn fire_render(&self, ctx: &mut RenderContext) {
        callback::fire("on_render", &self.0.on_render, ctx);
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    /// Deliver a click on display cell `(slot_x, slot_y)` to the tree.
    pub fn dispatch(&self, click: ClickContext, slot_x: usize, slot_y: usize) {
        let Some(root) = self.root() else {
            return;
        };
        let local_x = slot_x as i32 - root.layout_x();
        let local_y = slot_y as i32 - root.layout_y();
        let Some(hit) = root.hit_test(local_x, local_y) else {
            return;
        };

        let chain = bubble_chain(&hit);
        tracing::debug!(slot_x, slot_y, chain = chain.len(), "dispatching click");

        let slot = SlotClickContext {
            click: ClickContext {
                scene: Some(self.clone()),
                ..click
            },
            slot_x,
            slot_y,
        };
        let mut ctx = NodeClickContext::new(slot, hit);
        for node in &chain {
            ctx = ctx.copy_for(node);
            node.fire_click(&mut ctx);
        }
    }
}

/// The hit node followed by every ancestor that contains the accumulated
/// position.
fn bubble_chain(hit: &Node) -> Vec<Node> {
    let mut chain = vec![hit.clone()];
    let mut x = hit.layout_x();
    let mut y = hit.layout_y();
    let mut parent = hit.parent();
    while let Some(ancestor) = parent {
        if ancestor.contains_local(x, y) {
            chain.push(ancestor.clone());
        }
        x += ancestor.layout_x();
        y += ancestor.layout_y();
        parent = ancestor.parent();
    }
    chain
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Scene {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Scene {}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("root", &self.0.root.borrow())
            .field("background", &self.0.background.borrow().is_some())
            .field("bound", &(self.0.display.borrow().strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Consumable;
    use crate::scene::Pixel;
    use crate::types::{ClickKind, GuiArea, ViewerId};
    use std::cell::Cell;

    fn click(kind: ClickKind) -> ClickContext {
        ClickContext {
            display: None,
            scene: None,
            area: GuiArea::Top,
            kind,
            hotbar_button: None,
            viewer: ViewerId(1),
        }
    }

    fn pane(w: i32, h: i32) -> Node {
        let pane = Node::pane();
        pane.resize(w, h);
        pane
    }

    fn record(node: &Node, name: &'static str, log: &Rc<RefCell<Vec<String>>>) {
        let generic = log.clone();
        node.on_click(move |_ctx| generic.borrow_mut().push(format!("{name}:click")));
        let left = log.clone();
        node.on_left_click(move |_ctx| left.borrow_mut().push(format!("{name}:left")));
        let right = log.clone();
        node.on_right_click(move |_ctx| right.borrow_mut().push(format!("{name}:right")));
        let shift = log.clone();
        node.on_shift_click(move |_ctx| shift.borrow_mut().push(format!("{name}:shift")));
        let hotbar = log.clone();
        node.on_hotbar_click(move |_ctx| hotbar.borrow_mut().push(format!("{name}:hotbar")));
    }

    #[test]
    fn test_set_root_propagates_scene() {
        let root = pane(3, 3);
        let child = Node::item(Pixel::of("a"));
        root.add_child(child.clone()).unwrap();

        let scene = Scene::with_root(root.clone());
        assert_eq!(child.scene(), Some(scene.clone()));
        assert!(root.is_scene_root());

        let late = Node::item(Pixel::of("b"));
        root.add_child(late.clone()).unwrap();
        assert_eq!(late.scene(), Some(scene.clone()));

        scene.set_root(None);
        assert!(child.scene().is_none());
        assert!(late.scene().is_none());
    }

    #[test]
    fn test_removed_child_loses_scene() {
        let root = pane(3, 3);
        let child = Node::item(Pixel::of("a"));
        root.add_child(child.clone()).unwrap();
        let _scene = Scene::with_root(root.clone());

        root.remove_child(&child).unwrap();
        assert!(child.scene().is_none());
    }

    #[test]
    fn test_adding_scene_root_as_child_unsets_root() {
        let root = pane(2, 2);
        let scene = Scene::with_root(root.clone());
        let holder = pane(3, 3);

        holder.add_child(root.clone()).unwrap();

        assert!(scene.root().is_none());
        assert!(root.scene().is_none());
        assert_eq!(root.parent(), Some(holder));
    }

    #[test]
    fn test_scene_storage_is_separate_from_display() {
        let host = crate::display::MemoryHost::new();
        let display =
            Display::chest(1, "t", Rc::new(host), crate::display::TaskQueue::new()).unwrap();
        let scene = Scene::new();
        scene.with_storage(|storage| storage.register("page", Some(2u32)));
        display.set_scene(Some(scene.clone()));

        assert_eq!(
            display.with_storage(|storage| storage.get::<u32>("page")),
            Err(crate::error::Error::StorageMissing { id: "page".into() })
        );
        let page = display
            .scene()
            .map(|scene| scene.with_storage(|storage| storage.get::<u32>("page")));
        assert_eq!(page, Some(Ok(Some(2))));
    }

    #[test]
    fn test_bubbles_leaf_to_root() {
        let root = pane(9, 3);
        let mid = pane(3, 2);
        mid.relocate(2, 1);
        let leaf = Node::item(Pixel::of("leaf"));
        leaf.relocate(1, 0);
        mid.add_child(leaf.clone()).unwrap();
        root.add_child(mid.clone()).unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        record(&leaf, "leaf", &log);
        record(&mid, "mid", &log);
        record(&root, "root", &log);
        // Consumption does not stop bubbling.
        let generic = log.clone();
        leaf.on_click(move |ctx| {
            generic.borrow_mut().push("leaf:click".into());
            ctx.consume();
        });

        let scene = Scene::with_root(root);
        scene.dispatch(click(ClickKind::Left), 3, 1);

        assert_eq!(
            *log.borrow(),
            vec!["leaf:click", "leaf:left", "mid:click", "mid:left", "root:click", "root:left"]
        );
    }

    #[test]
    fn test_callback_order_per_node() {
        let root = pane(1, 1);
        let log = Rc::new(RefCell::new(Vec::new()));
        record(&root, "root", &log);
        let scene = Scene::with_root(root);

        let mut ctx = click(ClickKind::ShiftRight);
        ctx.hotbar_button = Some(3);
        scene.dispatch(ctx, 0, 0);

        assert_eq!(*log.borrow(), vec!["root:click", "root:right", "root:shift", "root:hotbar"]);
    }

    #[test]
    fn test_context_source_target_and_consumed() {
        let root = pane(2, 1);
        let leaf = Node::item(Pixel::of("leaf"));
        root.add_child(leaf.clone()).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        leaf.on_click(|ctx| ctx.consume());
        let seen_clone = seen.clone();
        root.on_click(move |ctx| {
            seen_clone
                .borrow_mut()
                .push((ctx.source.clone(), ctx.target.clone(), ctx.is_consumed(), ctx.slot_x));
        });

        let scene = Scene::with_root(root.clone());
        scene.dispatch(click(ClickKind::Middle), 0, 0);

        assert_eq!(*seen.borrow(), vec![(leaf, root, true, 0)]);
    }

    #[test]
    fn test_ancestor_outside_bounds_is_skipped() {
        // mid is 1x1 but holds a child at (2, 0) with clipping off.
        let root = pane(9, 1);
        let mid = pane(1, 1);
        mid.set_clipping(false);
        let leaf = Node::item(Pixel::of("leaf"));
        leaf.relocate(2, 0);
        mid.add_child(leaf.clone()).unwrap();
        root.add_child(mid.clone()).unwrap();

        let hits = Rc::new(Cell::new(0));
        for node in [&leaf, &mid, &root] {
            let hits = hits.clone();
            node.on_click(move |_ctx| hits.set(hits.get() + 1));
        }

        let scene = Scene::with_root(root);
        scene.dispatch(click(ClickKind::Left), 2, 0);

        // leaf + root; mid does not contain (2, 0).
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_failing_callback_does_not_stop_chain() {
        let root = pane(1, 1);
        let leaf = Node::item(Pixel::of("leaf"));
        root.add_child(leaf.clone()).unwrap();
        leaf.on_click(|_ctx| Err::<(), _>("broken"));
        let reached = Rc::new(Cell::new(false));
        let reached_clone = reached.clone();
        root.on_click(move |_ctx| reached_clone.set(true));

        Scene::with_root(root).dispatch(click(ClickKind::Left), 0, 0);
        assert!(reached.get());
    }

    #[test]
    fn test_no_root_or_miss_is_noop() {
        Scene::new().dispatch(click(ClickKind::Left), 0, 0);

        let root = pane(1, 1);
        let fired = Rc::new(Cell::new(false));
        let fired_clone = fired.clone();
        root.on_click(move |_ctx| fired_clone.set(true));
        Scene::with_root(root).dispatch(click(ClickKind::Left), 4, 4);
        assert!(!fired.get());
    }
}
