//! Composite nodes - containers with children, padding, background and a
//! layout strategy.
//!
//! The child list is a [`VetoableList`] guarded against duplicates and
//! cycles. A listener on it keeps the tree consistent:
//!
//! - an added child is detached from its previous parent (one removal
//!   notification there), linked to this composite and given its scene
//! - an added child that was a scene root is first unset from that scene
//! - a removed child loses its parent and scene links
//! - either way the composite requests a layout
//!
//! Insertion order is z-order: the last child paints on top and is hit first.
//!
//! # Example
//!
//! ```
//! use cellgraph::{Node, Pixel};
//!
//! let column = Node::vbox(0);
//! column.resize(1, 3);
//! let a = Node::item(Pixel::of("a"));
//! let b = Node::item(Pixel::of("b"));
//! column.add_child(a.clone()).unwrap();
//! column.add_child(b.clone()).unwrap();
//! column.layout();
//!
//! assert_eq!(b.layout_y(), 1);
//! assert_eq!(column.hit_test(0, 1), Some(b));
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::background::Background;
use super::layout::{ChildExtent, Layout};
use super::node::{Node, NodeInner, NodeKind};
use super::pixel::Pixel;
use crate::collections::{Change, VetoableList};
use crate::error::{Error, Result, VetoError};
use crate::guard::FlagGuard;
use crate::types::{DirtyFlags, Insets, Orientation};

/// State only composites carry.
pub(crate) struct CompositeState {
    pub(crate) children: VetoableList<Node>,
    background: RefCell<Option<Background>>,
    pub(crate) width: Cell<i32>,
    pub(crate) height: Cell<i32>,
    padding: Cell<Insets>,
    layout: Cell<Layout>,
    needs_layout: Cell<bool>,
    performing_layout: Cell<bool>,
}

fn in_ranges(index: usize, ranges: &[usize]) -> bool {
    ranges
        .chunks_exact(2)
        .any(|range| (range[0]..range[1]).contains(&index))
}

/// Veto hook of every child list: no duplicates, no cycles.
fn check_children(owner: &Weak<NodeInner>, added: &[Node], removed: &[usize]) -> std::result::Result<(), VetoError> {
    let Some(owner) = owner.upgrade().map(Node) else {
        return Ok(());
    };
    let kept: Vec<Node> = owner
        .children()
        .map(|children| {
            children.with(|items| {
                items
                    .iter()
                    .enumerate()
                    .filter(|(index, _)| !in_ranges(*index, removed))
                    .map(|(_, node)| node.clone())
                    .collect()
            })
        })
        .unwrap_or_default();

    for (index, child) in added.iter().enumerate() {
        if kept.contains(child) || added[..index].contains(child) {
            return Err(VetoError::DuplicateChild);
        }
        if *child == owner || owner.ancestors().any(|ancestor| ancestor == *child) {
            return Err(VetoError::Cycle);
        }
    }
    Ok(())
}

impl Node {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// An empty composite using `layout`.
    pub fn composite(layout: Layout) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<NodeInner>| {
            let owner = weak.clone();
            let children = VetoableList::new(move |added: &[Node], removed: &[usize]| {
                check_children(&owner, added, removed)
            });
            NodeInner::new(NodeKind::Composite(CompositeState {
                children,
                background: RefCell::new(None),
                width: Cell::new(0),
                height: Cell::new(0),
                padding: Cell::new(Insets::ZERO),
                layout: Cell::new(layout),
                needs_layout: Cell::new(true),
                performing_layout: Cell::new(false),
            }))
        });

        let node = Node(inner);
        if let NodeKind::Composite(state) = &node.0.kind {
            let owner = Rc::downgrade(&node.0);
            state.children.add_listener(move |change| {
                if let Some(owner) = owner.upgrade() {
                    Node(owner).on_children_changed(change);
                }
            });
        }
        node
    }

    /// Free-positioning composite.
    pub fn pane() -> Self {
        Self::composite(Layout::Free)
    }

    /// Single column, `spacing` cells between children.
    pub fn vbox(spacing: i32) -> Self {
        Self::composite(Layout::VBox { spacing })
    }

    /// Single row, `spacing` cells between children.
    pub fn hbox(spacing: i32) -> Self {
        Self::composite(Layout::HBox { spacing })
    }

    /// Wrapping flow along `orientation`.
    pub fn flow(orientation: Orientation, h_gap: i32, v_gap: i32) -> Self {
        Self::composite(Layout::Flow {
            orientation,
            h_gap,
            v_gap,
        })
    }

    pub(crate) fn composite_state(&self) -> Option<&CompositeState> {
        match &self.0.kind {
            NodeKind::Composite(state) => Some(state),
            NodeKind::Item(_) => None,
        }
    }

    // -------------------------------------------------------------------------
    // Children
    // -------------------------------------------------------------------------

    /// The child list. `None` for items.
    pub fn children(&self) -> Option<&VetoableList<Node>> {
        self.composite_state().map(|state| &state.children)
    }

    /// Append `child`, detaching it from any previous parent.
    pub fn add_child(&self, child: Node) -> Result<()> {
        let children = self.children().ok_or(Error::NotComposite)?;
        children.push(child)?;
        Ok(())
    }

    pub fn add_children<I>(&self, children: I) -> Result<()>
    where
        I: IntoIterator<Item = Node>,
    {
        let list = self.children().ok_or(Error::NotComposite)?;
        list.extend(children)?;
        Ok(())
    }

    /// Returns `Ok(false)` if `child` was not a child of this composite.
    pub fn remove_child(&self, child: &Node) -> Result<bool> {
        let children = self.children().ok_or(Error::NotComposite)?;
        Ok(children.remove(child)?)
    }

    fn on_children_changed(&self, change: &Change<Node>) {
        for child in change.added() {
            let old_parent = child.parent();
            if old_parent.as_ref() == Some(self) {
                continue;
            }
            if let Some(old_parent) = old_parent {
                if let Some(siblings) = old_parent.children() {
                    if let Err(err) = siblings.remove(child) {
                        tracing::warn!(error = %err, "could not detach child from previous parent");
                    }
                }
            } else if let Some(scene) = child.scene() {
                if scene.root().as_ref() == Some(child) {
                    scene.set_root(None);
                }
            }
            child.set_parent_link(Some(self));
            child.set_scene_link(&self.scene_link());
        }

        for child in change.removed() {
            if child.parent().as_ref() == Some(self) {
                child.set_parent_link(None);
                child.set_scene_link(&Weak::new());
            }
        }

        self.request_layout();
    }

    // -------------------------------------------------------------------------
    // Size, padding, strategy, background
    // -------------------------------------------------------------------------

    /// Set width. No-op on items.
    pub fn set_width(&self, width: i32) {
        if let Some(state) = self.composite_state() {
            if state.width.replace(width) != width {
                self.request_layout();
            }
        }
    }

    /// Set height. No-op on items.
    pub fn set_height(&self, height: i32) {
        if let Some(state) = self.composite_state() {
            if state.height.replace(height) != height {
                self.request_layout();
            }
        }
    }

    pub fn resize(&self, width: i32, height: i32) {
        self.set_width(width);
        self.set_height(height);
    }

    pub fn resize_relocate(&self, x: i32, y: i32, width: i32, height: i32) {
        self.relocate(x, y);
        self.resize(width, height);
    }

    pub fn padding(&self) -> Insets {
        self.composite_state()
            .map(|state| state.padding.get())
            .unwrap_or_default()
    }

    pub fn set_padding(&self, padding: Insets) {
        if let Some(state) = self.composite_state() {
            if state.padding.replace(padding) != padding {
                self.request_layout();
            }
        }
    }

    /// Layout strategy. `None` for items.
    pub fn layout_strategy(&self) -> Option<Layout> {
        self.composite_state().map(|state| state.layout.get())
    }

    pub fn set_layout_strategy(&self, layout: Layout) {
        if let Some(state) = self.composite_state() {
            if state.layout.replace(layout) != layout {
                self.request_layout();
            }
        }
    }

    pub fn background(&self) -> Option<Background> {
        self.composite_state()?.background.borrow().clone()
    }

    pub fn set_background(&self, background: Option<Background>) {
        if let Some(state) = self.composite_state() {
            *state.background.borrow_mut() = background;
        }
    }

    // -------------------------------------------------------------------------
    // Layout scheduling
    // -------------------------------------------------------------------------

    pub fn needs_layout(&self) -> bool {
        self.composite_state()
            .is_some_and(|state| state.needs_layout.get())
    }

    /// A composite with no parent that a scene holds as its root.
    pub fn is_scene_root(&self) -> bool {
        self.is_composite() && self.parent().is_none() && self.scene().is_some()
    }

    /// Mark this composite and every ancestor for layout. A scene root also
    /// marks its display's content dirty.
    pub fn request_layout(&self) {
        if let Some(state) = self.composite_state() {
            state.needs_layout.set(true);
            if self.is_scene_root() {
                if let Some(display) = self.scene().and_then(|scene| scene.display()) {
                    display.mark_dirty(DirtyFlags::CONTENT);
                }
            }
        }
        if let Some(parent) = self.parent() {
            parent.request_layout();
        }
    }

    /// Position children if a layout was requested, then recurse.
    pub fn layout(&self) {
        let Some(state) = self.composite_state() else {
            return;
        };
        if !state.needs_layout.get() {
            return;
        }
        let Some(_guard) = FlagGuard::acquire(&state.performing_layout) else {
            return;
        };
        state.needs_layout.set(false);

        let children = state.children.to_vec();
        let extents: Vec<ChildExtent> = children
            .iter()
            .map(|child| ChildExtent {
                width: child.width(),
                height: child.height(),
                translate_x: child.translate_x(),
                translate_y: child.translate_y(),
            })
            .collect();
        let layout = state.layout.get();
        if let Some(positions) =
            layout.place(state.width.get(), state.height.get(), state.padding.get(), &extents)
        {
            for (child, (x, y)) in children.iter().zip(positions) {
                child.relocate(x, y);
            }
        }
        tracing::trace!(?layout, children = children.len(), "layout pass");

        for child in &children {
            child.layout();
        }
    }

    // -------------------------------------------------------------------------
    // Hit-test / render composition
    // -------------------------------------------------------------------------

    /// Topmost node at `(x, y)`, relative to this node's origin.
    ///
    /// Visibility is ignored: invisible nodes still receive clicks.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<Node> {
        let in_bounds = self.contains_local(x, y);
        let Some(state) = self.composite_state() else {
            return in_bounds.then(|| self.clone());
        };
        if !in_bounds && self.is_clipping() {
            return None;
        }
        let children = state.children.to_vec();
        if children.is_empty() {
            return in_bounds.then(|| self.clone());
        }
        children
            .iter()
            .rev()
            .find_map(|child| child.hit_test(x - child.layout_x(), y - child.layout_y()))
            .or_else(|| Some(self.clone()))
    }

    /// The non-empty pixel this subtree shows at `(x, y)`, relative to this
    /// node's origin.
    pub fn render_at(&self, x: i32, y: i32) -> Option<Pixel> {
        if !self.is_visible() {
            return None;
        }
        let in_bounds = self.contains_local(x, y);
        let Some(state) = self.composite_state() else {
            return in_bounds
                .then(|| self.pixel())
                .flatten()
                .filter(|pixel| !pixel.is_empty());
        };
        if !in_bounds && self.is_clipping() {
            return None;
        }
        let from_children = state
            .children
            .to_vec()
            .iter()
            .rev()
            .filter(|child| child.is_visible())
            .find_map(|child| child.render_at(x - child.layout_x(), y - child.layout_y()));
        if from_children.is_some() {
            return from_children;
        }
        if !in_bounds {
            return None;
        }
        let background = state.background.borrow().clone()?;
        background.pixel_at(x, y).filter(|pixel| !pixel.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &'static str) -> Node {
        Node::item(Pixel::of(name))
    }

    fn sized_pane(w: i32, h: i32) -> Node {
        let pane = Node::pane();
        pane.resize(w, h);
        pane
    }

    fn change_counter(node: &Node) -> Rc<RefCell<(usize, usize)>> {
        let counts = Rc::new(RefCell::new((0, 0)));
        let counts_clone = counts.clone();
        node.children().unwrap().add_listener(move |change| {
            let mut counts = counts_clone.borrow_mut();
            counts.0 += change.added().len();
            counts.1 += change.removed().len();
        });
        counts
    }

    #[test]
    fn test_add_child_sets_parent() {
        let pane = sized_pane(3, 3);
        let child = item("a");
        pane.add_child(child.clone()).unwrap();
        assert_eq!(child.parent(), Some(pane.clone()));
        assert_eq!(pane.children().unwrap().len(), 1);
    }

    #[test]
    fn test_items_reject_children() {
        let leaf = item("a");
        assert_eq!(leaf.add_child(item("b")), Err(Error::NotComposite));
        assert!(leaf.children().is_none());
    }

    #[test]
    fn test_reparenting_keeps_single_ownership() {
        let a = sized_pane(3, 3);
        let b = sized_pane(3, 3);
        let child = item("x");
        a.add_child(child.clone()).unwrap();

        let a_counts = change_counter(&a);
        let b_counts = change_counter(&b);

        b.add_child(child.clone()).unwrap();

        assert_eq!(child.parent(), Some(b.clone()));
        assert!(!a.children().unwrap().contains(&child));
        assert!(b.children().unwrap().contains(&child));
        assert_eq!(*a_counts.borrow(), (0, 1));
        assert_eq!(*b_counts.borrow(), (1, 0));
    }

    #[test]
    fn test_duplicate_child_vetoed() {
        let pane = sized_pane(3, 3);
        let child = item("a");
        pane.add_child(child.clone()).unwrap();
        assert_eq!(
            pane.add_child(child.clone()),
            Err(Error::Vetoed(VetoError::DuplicateChild))
        );
        assert_eq!(pane.children().unwrap().len(), 1);
    }

    #[test]
    fn test_cycle_vetoed() {
        let outer = sized_pane(3, 3);
        let inner = sized_pane(2, 2);
        outer.add_child(inner.clone()).unwrap();

        assert_eq!(inner.add_child(outer.clone()), Err(Error::Vetoed(VetoError::Cycle)));
        assert_eq!(outer.add_child(outer.clone()), Err(Error::Vetoed(VetoError::Cycle)));
        assert!(inner.children().unwrap().is_empty());
    }

    #[test]
    fn test_set_same_child_in_place_allowed() {
        let pane = sized_pane(3, 3);
        let child = item("a");
        pane.add_child(child.clone()).unwrap();
        assert!(pane.children().unwrap().set(0, child.clone()).is_ok());
        assert_eq!(child.parent(), Some(pane));
    }

    #[test]
    fn test_remove_child_clears_parent() {
        let pane = sized_pane(3, 3);
        let child = item("a");
        pane.add_child(child.clone()).unwrap();
        assert_eq!(pane.remove_child(&child), Ok(true));
        assert!(child.parent().is_none());
        assert_eq!(pane.remove_child(&child), Ok(false));
    }

    #[test]
    fn test_child_changes_request_layout() {
        let outer = sized_pane(3, 3);
        let inner = sized_pane(2, 2);
        outer.add_child(inner.clone()).unwrap();
        outer.layout();
        assert!(!outer.needs_layout());
        assert!(!inner.needs_layout());

        inner.add_child(item("a")).unwrap();
        assert!(inner.needs_layout());
        assert!(outer.needs_layout());
    }

    #[test]
    fn test_setters_request_layout() {
        let pane = sized_pane(3, 3);
        let child = item("a");
        pane.add_child(child.clone()).unwrap();
        pane.layout();

        pane.resize(3, 3);
        assert!(!pane.needs_layout());
        pane.set_padding(Insets::uniform(1));
        assert!(pane.needs_layout());

        pane.layout();
        child.set_translate_x(1);
        assert!(pane.needs_layout());
    }

    #[test]
    fn test_hit_test_topmost_first() {
        let pane = sized_pane(3, 3);
        let below = item("below");
        let above = item("above");
        pane.add_children([below.clone(), above.clone()]).unwrap();
        below.relocate(1, 1);
        above.relocate(1, 1);

        assert_eq!(pane.hit_test(1, 1), Some(above));
        assert_eq!(pane.hit_test(0, 0), Some(pane.clone()));
        assert_eq!(pane.hit_test(5, 5), None);
    }

    #[test]
    fn test_empty_composite_hits_only_in_bounds() {
        let pane = sized_pane(2, 2);
        pane.set_clipping(false);
        assert_eq!(pane.hit_test(1, 1), Some(pane.clone()));
        assert_eq!(pane.hit_test(3, 3), None);
    }

    #[test]
    fn test_hit_render_asymmetry_for_invisible_child() {
        let pane = sized_pane(3, 1);
        pane.set_background(Some(Background::fill(Pixel::of("bg"))));
        let hidden = item("hidden");
        hidden.relocate(1, 0);
        hidden.set_visible(false);
        pane.add_child(hidden.clone()).unwrap();

        assert_eq!(pane.hit_test(1, 0), Some(hidden));
        assert_eq!(pane.render_at(1, 0), Some(Pixel::of("bg")));
    }

    #[test]
    fn test_render_falls_back_to_background() {
        let pane = sized_pane(2, 1);
        pane.set_background(Some(Background::checkerboard(Pixel::of("b"), Pixel::of("w"))));
        let child = item("x");
        pane.add_child(child).unwrap();

        assert_eq!(pane.render_at(0, 0), Some(Pixel::of("x")));
        assert_eq!(pane.render_at(1, 0), Some(Pixel::of("w")));
        assert_eq!(pane.render_at(2, 0), None);
    }

    #[test]
    fn test_clipping_off_renders_overflow() {
        let outer = sized_pane(4, 1);
        let inner = sized_pane(1, 1);
        inner.set_clipping(false);
        let child = item("x");
        child.relocate(2, 0);
        inner.add_child(child).unwrap();
        outer.add_child(inner.clone()).unwrap();

        assert_eq!(outer.render_at(2, 0), Some(Pixel::of("x")));
        inner.set_clipping(true);
        assert_eq!(outer.render_at(2, 0), None);
    }

    #[test]
    fn test_nested_layout_positions() {
        let row = Node::hbox(1);
        row.resize(9, 1);
        let column = Node::vbox(0);
        column.resize(1, 2);
        let a = item("a");
        let b = item("b");
        column.add_children([a.clone(), b.clone()]).unwrap();
        let c = item("c");
        row.add_children([column.clone(), c.clone()]).unwrap();

        row.layout();

        assert_eq!((column.layout_x(), column.layout_y()), (0, 0));
        assert_eq!((c.layout_x(), c.layout_y()), (2, 0));
        assert_eq!((b.layout_x(), b.layout_y()), (0, 1));
        assert!(!column.needs_layout());
    }

    #[test]
    fn test_lookup() {
        let root = sized_pane(3, 3);
        let inner = sized_pane(1, 1);
        let a = item("a");
        a.set_id("target");
        let b = item("b");
        b.set_id("target");
        inner.add_child(b.clone()).unwrap();
        root.add_children([a.clone(), inner]).unwrap();

        assert_eq!(root.lookup("target"), Some(a.clone()));
        assert_eq!(root.lookup_all("target"), vec![a, b]);
        assert_eq!(root.lookup("missing"), None);
    }
}
