//! Scene graph.
//!
//! - [`Node`] - shared handle to an item (1x1 leaf) or a composite
//!   (container with children, padding, background, layout strategy)
//! - [`Layout`] - pure placement strategies (free, vbox, hbox, flow)
//! - [`Scene`] - root + background, bound to at most one display; routes
//!   clicks into bubbling node callbacks
//! - [`Pixel`] / [`Lore`] - cell content and its descriptive lines
//! - [`Background`] - coordinate-to-pixel fill function

mod background;
mod composite;
mod layout;
mod node;
mod pixel;
#[allow(clippy::module_inception)]
mod scene;

pub use background::Background;
pub use layout::{ChildExtent, Layout};
pub use node::{ItemBuilder, Node};
pub use pixel::{ContentType, Lore, MAX_COUNT, Pixel, PresentedCell, StaticLore};
pub use scene::Scene;
