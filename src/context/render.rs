use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::Cancelable;
use crate::callback::CellLocation;
use crate::display::Display;
use crate::error::{Error, Result};
use crate::scene::{Pixel, Scene};

/// One render pass of a display.
///
/// Render callbacks run before any cell is resolved. They may cancel the pass
/// (the display stays dirty) or pin individual cells through overrides, which
/// win over both the scene tree and the background.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub display: Option<Display>,
    pub scene: Option<Scene>,
    started: Instant,
    width: usize,
    height: usize,
    overrides: HashMap<usize, Pixel>,
    canceled: bool,
}

impl RenderContext {
    pub fn new(display: Option<Display>, scene: Option<Scene>, width: usize, height: usize) -> Self {
        Self {
            display,
            scene,
            started: Instant::now(),
            width,
            height,
            overrides: HashMap::new(),
            canceled: false,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(Error::CellOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y * self.width + x)
    }

    /// Pin cell `(x, y)` to `pixel` for this pass.
    pub fn set_override(&mut self, x: usize, y: usize, pixel: Pixel) -> Result<()> {
        let index = self.index(x, y)?;
        self.overrides.insert(index, pixel);
        Ok(())
    }

    pub fn remove_override(&mut self, x: usize, y: usize) -> Option<Pixel> {
        let index = self.index(x, y).ok()?;
        self.overrides.remove(&index)
    }

    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    pub fn override_at(&self, x: usize, y: usize) -> Option<&Pixel> {
        let index = self.index(x, y).ok()?;
        self.overrides.get(&index)
    }

    pub fn render_start(&self) -> Instant {
        self.started
    }

    /// Time elapsed since the pass began.
    pub fn render_time(&self) -> Duration {
        self.started.elapsed()
    }

    /// Per-cell context for resolving the pixel at `(x, y)`.
    pub fn for_pixel(&self, x: usize, y: usize) -> PixelRenderContext {
        PixelRenderContext {
            display: self.display.clone(),
            scene: self.scene.clone(),
            started: self.started,
            slot_x: x,
            slot_y: y,
        }
    }
}

impl Cancelable for RenderContext {
    fn is_canceled(&self) -> bool {
        self.canceled
    }

    fn set_canceled(&mut self, canceled: bool) {
        self.canceled = canceled;
    }
}

impl CellLocation for RenderContext {}

/// Context for rendering a single cell. Handed to [`Lore`](crate::Lore).
#[derive(Debug, Clone)]
pub struct PixelRenderContext {
    pub display: Option<Display>,
    pub scene: Option<Scene>,
    started: Instant,
    slot_x: usize,
    slot_y: usize,
}

impl PixelRenderContext {
    /// Context for a cell rendered outside any display pass.
    pub fn detached(slot_x: usize, slot_y: usize) -> Self {
        Self {
            display: None,
            scene: None,
            started: Instant::now(),
            slot_x,
            slot_y,
        }
    }

    pub fn slot_x(&self) -> usize {
        self.slot_x
    }

    pub fn slot_y(&self) -> usize {
        self.slot_y
    }

    /// Start of the pass this cell belongs to.
    pub fn render_start(&self) -> Instant {
        self.started
    }

    pub fn render_time(&self) -> Duration {
        self.started.elapsed()
    }
}
