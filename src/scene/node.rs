//! Node - a positioned element of the scene tree.
//!
//! A [`Node`] is a cheap `Rc` handle. Cloning it clones the handle, and two
//! handles are equal iff they point at the same node. There are two kinds:
//!
//! - **Item** - a 1x1 leaf that shows a single [`Pixel`]
//! - **Composite** - a resizable container with children, padding, an
//!   optional background and a [`Layout`](super::Layout) strategy (see
//!   `composite.rs`)
//!
//! Every node carries a position (`layout_x/y`), a translation that layout
//! strategies add when placing it, visibility and clipping flags, an optional
//! id for [`lookup`](Node::lookup), and up to five click callbacks.
//!
//! # API
//!
//! - `Node::item(pixel)` / `ItemBuilder` - leaf construction
//! - `Node::pane()`, `vbox`, `hbox`, `flow` - composite construction
//! - `parent()`, `scene()`, `ancestors()` - tree navigation
//! - `on_click`, `on_left_click`, `on_right_click`, `on_shift_click`,
//!   `on_hotbar_click` - click callbacks, fired by scene dispatch

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use super::composite::CompositeState;
use super::pixel::Pixel;
use super::scene::{Scene, SceneInner};
use crate::callback::{self, CallbackOutput, CallbackSlot};
use crate::context::NodeClickContext;

// =============================================================================
// HANDLE
// =============================================================================

/// Shared handle to a scene-tree node.
#[derive(Clone)]
pub struct Node(pub(crate) Rc<NodeInner>);

pub(crate) struct NodeInner {
    layout_x: Cell<i32>,
    layout_y: Cell<i32>,
    translate_x: Cell<i32>,
    translate_y: Cell<i32>,
    visible: Cell<bool>,
    clipping: Cell<bool>,
    id: RefCell<Option<String>>,

    parent: RefCell<Weak<NodeInner>>,
    scene: RefCell<Weak<SceneInner>>,

    on_click: CallbackSlot<NodeClickContext>,
    on_left_click: CallbackSlot<NodeClickContext>,
    on_right_click: CallbackSlot<NodeClickContext>,
    on_shift_click: CallbackSlot<NodeClickContext>,
    on_hotbar_click: CallbackSlot<NodeClickContext>,

    pub(crate) kind: NodeKind,
}

/// Closed set of node kinds.
pub(crate) enum NodeKind {
    Item(RefCell<Pixel>),
    Composite(CompositeState),
}

impl NodeInner {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            layout_x: Cell::new(0),
            layout_y: Cell::new(0),
            translate_x: Cell::new(0),
            translate_y: Cell::new(0),
            visible: Cell::new(true),
            clipping: Cell::new(true),
            id: RefCell::new(None),
            parent: RefCell::new(Weak::new()),
            scene: RefCell::new(Weak::new()),
            on_click: CallbackSlot::new(),
            on_left_click: CallbackSlot::new(),
            on_right_click: CallbackSlot::new(),
            on_shift_click: CallbackSlot::new(),
            on_hotbar_click: CallbackSlot::new(),
            kind,
        }
    }
}

impl Node {
    /// A 1x1 leaf showing `pixel`.
    pub fn item(pixel: Pixel) -> Self {
        Node(Rc::new(NodeInner::new(NodeKind::Item(RefCell::new(pixel)))))
    }

    pub fn is_item(&self) -> bool {
        matches!(self.0.kind, NodeKind::Item(_))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.0.kind, NodeKind::Composite(_))
    }

    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------

    pub fn layout_x(&self) -> i32 {
        self.0.layout_x.get()
    }

    pub fn layout_y(&self) -> i32 {
        self.0.layout_y.get()
    }

    pub fn set_layout_x(&self, x: i32) {
        self.0.layout_x.set(x);
    }

    pub fn set_layout_y(&self, y: i32) {
        self.0.layout_y.set(y);
    }

    /// Move to `(x, y)` in the parent's coordinate space.
    pub fn relocate(&self, x: i32, y: i32) {
        self.set_layout_x(x);
        self.set_layout_y(y);
    }

    pub fn translate_x(&self) -> i32 {
        self.0.translate_x.get()
    }

    pub fn translate_y(&self) -> i32 {
        self.0.translate_y.get()
    }

    /// Offset added by the parent's layout strategy. Changing it re-lays out
    /// the parent.
    pub fn set_translate_x(&self, x: i32) {
        if self.0.translate_x.replace(x) != x {
            self.request_parent_layout();
        }
    }

    pub fn set_translate_y(&self, y: i32) {
        if self.0.translate_y.replace(y) != y {
            self.request_parent_layout();
        }
    }

    pub fn width(&self) -> i32 {
        match &self.0.kind {
            NodeKind::Item(_) => 1,
            NodeKind::Composite(state) => state.width.get(),
        }
    }

    pub fn height(&self) -> i32 {
        match &self.0.kind {
            NodeKind::Item(_) => 1,
            NodeKind::Composite(state) => state.height.get(),
        }
    }

    /// Whether `(x, y)`, relative to this node's origin, is inside it.
    pub fn contains_local(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width() && y < self.height()
    }

    // -------------------------------------------------------------------------
    // Flags
    // -------------------------------------------------------------------------

    /// Invisible nodes are skipped when rendering but still receive clicks.
    pub fn is_visible(&self) -> bool {
        self.0.visible.get()
    }

    pub fn set_visible(&self, visible: bool) {
        self.0.visible.set(visible);
    }

    /// Clipping composites ignore content and hits outside their bounds.
    /// Items always clip.
    pub fn is_clipping(&self) -> bool {
        match self.0.kind {
            NodeKind::Item(_) => true,
            NodeKind::Composite(_) => self.0.clipping.get(),
        }
    }

    pub fn set_clipping(&self, clipping: bool) {
        self.0.clipping.set(clipping);
    }

    pub fn id(&self) -> Option<String> {
        self.0.id.borrow().clone()
    }

    pub fn set_id(&self, id: impl Into<String>) {
        *self.0.id.borrow_mut() = Some(id.into());
    }

    pub fn clear_id(&self) {
        self.0.id.borrow_mut().take();
    }

    // -------------------------------------------------------------------------
    // Item content
    // -------------------------------------------------------------------------

    /// The pixel an item shows. `None` for composites.
    pub fn pixel(&self) -> Option<Pixel> {
        match &self.0.kind {
            NodeKind::Item(pixel) => Some(pixel.borrow().clone()),
            NodeKind::Composite(_) => None,
        }
    }

    /// Replace an item's pixel. No-op on composites.
    pub fn set_pixel(&self, pixel: Pixel) {
        if let NodeKind::Item(slot) = &self.0.kind {
            *slot.borrow_mut() = pixel;
        }
    }

    // -------------------------------------------------------------------------
    // Tree links
    // -------------------------------------------------------------------------

    pub fn parent(&self) -> Option<Node> {
        self.0.parent.borrow().upgrade().map(Node)
    }

    /// Parent, grandparent, ... up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Node> {
        std::iter::successors(self.parent(), Node::parent)
    }

    /// Topmost ancestor, or `self` when unattached.
    pub fn root(&self) -> Node {
        self.ancestors().last().unwrap_or_else(|| self.clone())
    }

    pub fn scene(&self) -> Option<Scene> {
        self.0.scene.borrow().upgrade().map(Scene)
    }

    pub(crate) fn set_parent_link(&self, parent: Option<&Node>) {
        *self.0.parent.borrow_mut() = parent.map(|p| Rc::downgrade(&p.0)).unwrap_or_default();
    }

    pub(crate) fn scene_link(&self) -> Weak<SceneInner> {
        self.0.scene.borrow().clone()
    }

    /// Point this node and every descendant at `scene`.
    pub(crate) fn set_scene_link(&self, scene: &Weak<SceneInner>) {
        *self.0.scene.borrow_mut() = scene.clone();
        if let Some(children) = self.children() {
            for child in children.to_vec() {
                child.set_scene_link(scene);
            }
        }
    }

    fn request_parent_layout(&self) {
        if let Some(parent) = self.parent() {
            parent.request_layout();
        }
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    /// First node in this subtree (pre-order, self first) with the given id.
    pub fn lookup(&self, id: &str) -> Option<Node> {
        if self.0.id.borrow().as_deref() == Some(id) {
            return Some(self.clone());
        }
        self.children()?
            .to_vec()
            .iter()
            .find_map(|child| child.lookup(id))
    }

    /// Every node in this subtree with the given id, in pre-order.
    pub fn lookup_all(&self, id: &str) -> Vec<Node> {
        let mut found = Vec::new();
        self.collect_by_id(id, &mut found);
        found
    }

    fn collect_by_id(&self, id: &str, found: &mut Vec<Node>) {
        if self.0.id.borrow().as_deref() == Some(id) {
            found.push(self.clone());
        }
        if let Some(children) = self.children() {
            for child in children.to_vec() {
                child.collect_by_id(id, found);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Click callbacks
    // -------------------------------------------------------------------------

    /// Fired for every click that reaches this node.
    pub fn on_click<F, R>(&self, f: F)
    where
        F: Fn(&mut NodeClickContext) -> R + 'static,
        R: CallbackOutput,
    {
        self.0.on_click.set(f);
    }

    pub fn on_left_click<F, R>(&self, f: F)
    where
        F: Fn(&mut NodeClickContext) -> R + 'static,
        R: CallbackOutput,
    {
        self.0.on_left_click.set(f);
    }

    pub fn on_right_click<F, R>(&self, f: F)
    where
        F: Fn(&mut NodeClickContext) -> R + 'static,
        R: CallbackOutput,
    {
        self.0.on_right_click.set(f);
    }

    pub fn on_shift_click<F, R>(&self, f: F)
    where
        F: Fn(&mut NodeClickContext) -> R + 'static,
        R: CallbackOutput,
    {
        self.0.on_shift_click.set(f);
    }

    /// Fired when the click carries a hotbar button.
    pub fn on_hotbar_click<F, R>(&self, f: F)
    where
        F: Fn(&mut NodeClickContext) -> R + 'static,
        R: CallbackOutput,
    {
        self.0.on_hotbar_click.set(f);
    }

    /// Remove every click callback.
    pub fn clear_click_callbacks(&self) {
        self.0.on_click.clear();
        self.0.on_left_click.clear();
        self.0.on_right_click.clear();
        self.0.on_shift_click.clear();
        self.0.on_hotbar_click.clear();
    }

    /// Run this node's callbacks for one chain step of a dispatch.
    pub(crate) fn fire_click(&self, ctx: &mut NodeClickContext) {
        let inner = &self.0;
        callback::fire("on_click", &inner.on_click, ctx);
        if ctx.is_left_click() {
            callback::fire("on_left_click", &inner.on_left_click, ctx);
        }
        if ctx.is_right_click() {
            callback::fire("on_right_click", &inner.on_right_click, ctx);
        }
        if ctx.is_shift_click() {
            callback::fire("on_shift_click", &inner.on_shift_click, ctx);
        }
        if ctx.is_hotbar_click() {
            callback::fire("on_hotbar_click", &inner.on_hotbar_click, ctx);
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.0.kind {
            NodeKind::Item(_) => "Item",
            NodeKind::Composite(_) => "Composite",
        };
        f.debug_struct("Node")
            .field("kind", &kind)
            .field("id", &self.0.id.borrow())
            .field("layout", &(self.layout_x(), self.layout_y()))
            .field("size", &(self.width(), self.height()))
            .finish()
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Fluent construction of item nodes.
///
/// ```
/// use cellgraph::{ItemBuilder, Pixel};
///
/// let button = ItemBuilder::new(Pixel::of("lever").with_title("Toggle"))
///     .at(4, 2)
///     .id("toggle")
///     .on_left_click(|_ctx| {})
///     .build();
///
/// assert_eq!((button.layout_x(), button.layout_y()), (4, 2));
/// assert_eq!(button.id().as_deref(), Some("toggle"));
/// ```
pub struct ItemBuilder {
    node: Node,
}

impl ItemBuilder {
    pub fn new(pixel: Pixel) -> Self {
        Self {
            node: Node::item(pixel),
        }
    }

    pub fn at(self, x: i32, y: i32) -> Self {
        self.node.relocate(x, y);
        self
    }

    pub fn translate(self, x: i32, y: i32) -> Self {
        self.node.0.translate_x.set(x);
        self.node.0.translate_y.set(y);
        self
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.node.set_id(id);
        self
    }

    pub fn visible(self, visible: bool) -> Self {
        self.node.set_visible(visible);
        self
    }

    pub fn on_click<F, R>(self, f: F) -> Self
    where
        F: Fn(&mut NodeClickContext) -> R + 'static,
        R: CallbackOutput,
    {
        self.node.on_click(f);
        self
    }

    pub fn on_left_click<F, R>(self, f: F) -> Self
    where
        F: Fn(&mut NodeClickContext) -> R + 'static,
        R: CallbackOutput,
    {
        self.node.on_left_click(f);
        self
    }

    pub fn on_right_click<F, R>(self, f: F) -> Self
    where
        F: Fn(&mut NodeClickContext) -> R + 'static,
        R: CallbackOutput,
    {
        self.node.on_right_click(f);
        self
    }

    pub fn on_shift_click<F, R>(self, f: F) -> Self
    where
        F: Fn(&mut NodeClickContext) -> R + 'static,
        R: CallbackOutput,
    {
        self.node.on_shift_click(f);
        self
    }

    pub fn on_hotbar_click<F, R>(self, f: F) -> Self
    where
        F: Fn(&mut NodeClickContext) -> R + 'static,
        R: CallbackOutput,
    {
        self.node.on_hotbar_click(f);
        self
    }

    pub fn build(self) -> Node {
        self.node
    }
}
