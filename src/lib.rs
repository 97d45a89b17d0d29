//! # cellgraph
//!
//! Retained-mode scene graph for fixed-size cell grids.
//!
//! A [`Display`] is a grid of `width x height` cells shown to viewers through
//! a [`Host`]. Its contents come from a [`Scene`]: a tree of [`Node`]s where
//! items occupy exactly one cell and composites lay out their children and
//! paint a background underneath them. Clicks travel the other way: the host
//! reports a raw slot, the display resolves it to a cell, and the scene
//! bubbles the click from the hit item up through its ancestors.
//!
//! ## Architecture
//!
//! ```text
//! Host ──► Display ──► Scene ──► root Node ──► children ...
//!            │  ▲                    │
//!            │  └── dirty flags ◄────┘ (request_layout)
//!            └──► Surface (presented cells)
//! ```
//!
//! Everything is single-threaded. Handles are cheap `Rc` clones; parent and
//! back links are weak, so dropping the display drops the tree.
//!
//! ## Modules
//!
//! - [`scene`] - nodes, layout strategies, pixels, backgrounds, scenes
//! - [`display`] - displays, hosts and surfaces, storage, the task queue
//! - [`context`] - values handed to click, render and close callbacks
//! - [`collections`] - observable and vetoable lists
//! - [`types`] - geometry and event value types
//! - [`terminal`] - crossterm host (feature `terminal`)
//!
//! ## Example
//!
//! ```
//! use cellgraph::{Display, DisplayKind, MemoryHost, Node, Pixel, Scene, TaskQueue, ViewerId};
//! use std::rc::Rc;
//!
//! let host = MemoryHost::new();
//! let display = Display::new(
//!     DisplayKind::Chest { rows: 1 },
//!     "Menu",
//!     Rc::new(host.clone()),
//!     TaskQueue::new(),
//! )
//! .unwrap();
//!
//! let row = Node::hbox(0);
//! row.resize(9, 1);
//! row.add_child(Node::item(Pixel::of("apple"))).unwrap();
//! row.add_child(Node::item(Pixel::of("bread"))).unwrap();
//! display.set_scene(Some(Scene::with_root(row)));
//!
//! display.show(ViewerId(1));
//! let contents = display.contents();
//! assert_eq!(contents[0].as_ref().unwrap().content.as_str(), "apple");
//! assert_eq!(contents[1].as_ref().unwrap().content.as_str(), "bread");
//! assert!(host.viewing(ViewerId(1)).is_some());
//! ```

pub mod callback;
pub mod collections;
pub mod context;
pub mod display;
pub mod error;
mod guard;
pub mod scene;
#[cfg(feature = "terminal")]
pub mod terminal;
pub mod types;

pub use types::*;

pub use callback::{CallbackError, CallbackOutput, CellLocation};
pub use context::{
    Cancelable, ClickContext, CloseContext, Consumable, NodeClickContext, PixelRenderContext,
    RenderContext, SlotClickContext,
};
pub use display::{
    Display, DisplayKind, Host, MAX_CHEST_ROWS, MemoryHost, MemorySurface, Storage, Surface,
    SurfaceId, TaskQueue,
};
pub use error::{Error, Result, VetoError};
pub use scene::{
    Background, ChildExtent, ContentType, ItemBuilder, Layout, Lore, MAX_COUNT, Node, Pixel,
    PresentedCell, Scene, StaticLore,
};
