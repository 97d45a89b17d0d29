//! Contexts handed to callbacks.
//!
//! | Context | Fired by | Flag |
//! |---|---|---|
//! | [`ClickContext`] | `Display::on_click`, `on_outside_click` | - |
//! | [`SlotClickContext`] | `Display::on_slot_click` | - |
//! | [`NodeClickContext`] | node click callbacks | [`Consumable`] |
//! | [`CloseContext`] | `Display::on_close` | [`Cancelable`] |
//! | [`RenderContext`] | `Display::on_render`, `Scene::on_render` | [`Cancelable`] |
//! | [`PixelRenderContext`] | [`Lore`](crate::Lore) | - |
//!
//! Richer contexts deref to the poorer ones, so `ctx.kind` or `ctx.viewer`
//! work on every click context.

mod click;
mod close;
mod render;

pub use click::{ClickContext, NodeClickContext, SlotClickContext};
pub use close::CloseContext;
pub use render::{PixelRenderContext, RenderContext};

/// Contexts whose action can be called off by a callback.
pub trait Cancelable {
    fn is_canceled(&self) -> bool;

    fn set_canceled(&mut self, canceled: bool);

    fn cancel(&mut self) {
        self.set_canceled(true);
    }
}

/// Contexts a callback can mark as handled.
///
/// Consumption is advisory; it does not stop bubbling.
pub trait Consumable {
    fn is_consumed(&self) -> bool;

    fn consume(&mut self);
}
