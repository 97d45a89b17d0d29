//! Headless host.
//!
//! [`MemoryHost`] keeps surfaces as plain vectors and records who is viewing
//! what. It never raises close events by itself; embedders (and tests) call
//! [`Display::handle_close`](crate::Display::handle_close) when their own
//! platform reports one.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::surface::{Host, Surface, SurfaceId};
use crate::scene::PresentedCell;
use crate::types::ViewerId;

#[derive(Debug, Default)]
struct Registry {
    next_surface: u64,
    viewing: HashMap<ViewerId, SurfaceId>,
    held: HashMap<ViewerId, PresentedCell>,
    opens: Vec<(ViewerId, SurfaceId)>,
}

/// In-memory [`Host`]. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    registry: Rc<RefCell<Registry>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface `viewer` is looking at, if any.
    pub fn viewing(&self, viewer: ViewerId) -> Option<SurfaceId> {
        self.registry.borrow().viewing.get(&viewer).copied()
    }

    /// Every `open` call so far, in order.
    pub fn opens(&self) -> Vec<(ViewerId, SurfaceId)> {
        self.registry.borrow().opens.clone()
    }

    pub fn held(&self, viewer: ViewerId) -> Option<PresentedCell> {
        self.registry.borrow().held.get(&viewer).cloned()
    }

    /// Put `item` in the viewer's pointer.
    pub fn set_held(&self, viewer: ViewerId, item: Option<PresentedCell>) {
        let mut registry = self.registry.borrow_mut();
        match item {
            Some(item) => registry.held.insert(viewer, item),
            None => registry.held.remove(&viewer),
        };
    }
}

impl Host for MemoryHost {
    fn create_surface(&self, width: usize, height: usize, title: &str) -> Box<dyn Surface> {
        let id = {
            let mut registry = self.registry.borrow_mut();
            registry.next_surface += 1;
            SurfaceId(registry.next_surface)
        };
        Box::new(MemorySurface {
            id,
            title: title.to_string(),
            cells: vec![None; width * height],
            registry: self.registry.clone(),
        })
    }

    fn open(&self, viewer: ViewerId, surface: &dyn Surface) {
        let mut registry = self.registry.borrow_mut();
        registry.viewing.insert(viewer, surface.id());
        registry.opens.push((viewer, surface.id()));
    }

    fn close(&self, viewer: ViewerId) {
        self.registry.borrow_mut().viewing.remove(&viewer);
    }

    fn take_held(&self, viewer: ViewerId) -> Option<PresentedCell> {
        self.registry.borrow_mut().held.remove(&viewer)
    }

    fn restore_held(&self, viewer: ViewerId, item: Option<PresentedCell>) {
        self.set_held(viewer, item);
    }
}

/// Surface created by [`MemoryHost`].
#[derive(Debug)]
pub struct MemorySurface {
    id: SurfaceId,
    title: String,
    cells: Vec<Option<PresentedCell>>,
    registry: Rc<RefCell<Registry>>,
}

impl Surface for MemorySurface {
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
    }

    fn set_cell(&mut self, index: usize, cell: Option<PresentedCell>) {
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = cell;
        }
    }

    fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
    }

    fn viewers(&self) -> Vec<ViewerId> {
        let mut viewers: Vec<ViewerId> = self
            .registry
            .borrow()
            .viewing
            .iter()
            .filter(|(_, surface)| **surface == self.id)
            .map(|(viewer, _)| *viewer)
            .collect();
        viewers.sort();
        viewers
    }
}
