//! Pixel - the content of one grid cell.
//!
//! A [`Pixel`] is a plain value: content type, stack count, glow, title and
//! optional [`Lore`]. It only becomes a [`PresentedCell`] (what a surface
//! actually shows) when rendered against a [`PixelRenderContext`].
//!
//! # Example
//!
//! ```
//! use cellgraph::{Pixel, StaticLore};
//!
//! let pixel = Pixel::of("diamond")
//!     .with_count(3)
//!     .with_title("Treasure")
//!     .with_lore(StaticLore::new(["Shiny", "Rare"]))
//!     .with_glow(true);
//!
//! assert_eq!(pixel.count(), 3);
//! assert!(!pixel.is_empty());
//! assert!(Pixel::empty().is_empty());
//! ```

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use crate::context::PixelRenderContext;

/// Largest count that renders as an explicit number.
pub const MAX_COUNT: i32 = 64;

// =============================================================================
// CONTENT TYPE
// =============================================================================

/// Identifier of what a cell shows. The empty identifier means "nothing".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ContentType(Cow<'static, str>);

impl ContentType {
    pub const EMPTY: ContentType = ContentType(Cow::Borrowed(""));

    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&'static str> for ContentType {
    fn from(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }
}

impl From<String> for ContentType {
    fn from(id: String) -> Self {
        Self(Cow::Owned(id))
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// LORE
// =============================================================================

/// Source of a cell's descriptive lines.
///
/// Called once per render of a pixel that carries it. The iterator is
/// consumed immediately.
pub trait Lore {
    fn lines<'a>(&'a self, ctx: &PixelRenderContext) -> Box<dyn Iterator<Item = String> + 'a>;
}

impl<F> Lore for F
where
    F: Fn(&PixelRenderContext) -> Vec<String>,
{
    fn lines<'a>(&'a self, ctx: &PixelRenderContext) -> Box<dyn Iterator<Item = String> + 'a> {
        Box::new(self(ctx).into_iter())
    }
}

/// Fixed lines, independent of the render.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StaticLore(Vec<String>);

impl StaticLore {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(lines.into_iter().map(Into::into).collect())
    }
}

impl Lore for StaticLore {
    fn lines<'a>(&'a self, _ctx: &PixelRenderContext) -> Box<dyn Iterator<Item = String> + 'a> {
        Box::new(self.0.iter().cloned())
    }
}

// =============================================================================
// PIXEL
// =============================================================================

/// Cell content value object.
#[derive(Clone)]
pub struct Pixel {
    content: ContentType,
    count: i32,
    glow: bool,
    title: Option<String>,
    lore: Option<Rc<dyn Lore>>,
}

impl Pixel {
    /// A pixel with the given content and no decorations.
    pub fn of(content: impl Into<ContentType>) -> Self {
        Self {
            content: content.into(),
            count: 1,
            glow: false,
            title: None,
            lore: None,
        }
    }

    /// A pixel that renders to nothing.
    pub fn empty() -> Self {
        Self::of(ContentType::EMPTY)
    }

    /// A pixel with an empty title, hiding the host's default name.
    pub fn blank(content: impl Into<ContentType>) -> Self {
        Self::of(content).with_title("")
    }

    pub fn with_count(mut self, count: i32) -> Self {
        self.count = count;
        self
    }

    pub fn with_glow(mut self, glow: bool) -> Self {
        self.glow = glow;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_lore(mut self, lore: impl Lore + 'static) -> Self {
        self.lore = Some(Rc::new(lore));
        self
    }

    pub fn with_shared_lore(mut self, lore: Rc<dyn Lore>) -> Self {
        self.lore = Some(lore);
        self
    }

    pub fn content(&self) -> &ContentType {
        &self.content
    }

    pub fn count(&self) -> i32 {
        self.count
    }

    pub fn glow(&self) -> bool {
        self.glow
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn lore(&self) -> Option<&Rc<dyn Lore>> {
        self.lore.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Resolve to what a surface shows. Empty pixels render to `None`.
    pub fn render(&self, ctx: &PixelRenderContext) -> Option<PresentedCell> {
        if self.is_empty() {
            return None;
        }
        let count = (1..=MAX_COUNT)
            .contains(&self.count)
            .then(|| self.count as u8);
        let lore = self
            .lore
            .as_ref()
            .map(|lore| lore.lines(ctx).collect())
            .unwrap_or_default();
        Some(PresentedCell {
            content: self.content.clone(),
            count,
            glow: self.glow,
            title: self.title.clone(),
            lore,
        })
    }
}

impl fmt::Debug for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pixel")
            .field("content", &self.content)
            .field("count", &self.count)
            .field("glow", &self.glow)
            .field("title", &self.title)
            .field("lore", &self.lore.is_some())
            .finish()
    }
}

impl PartialEq for Pixel {
    fn eq(&self, other: &Self) -> bool {
        let same_lore = match (&self.lore, &other.lore) {
            (None, None) => true,
            (Some(a), Some(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            _ => false,
        };
        self.content == other.content
            && self.count == other.count
            && self.glow == other.glow
            && self.title == other.title
            && same_lore
    }
}

/// A rendered cell as handed to a [`Surface`](crate::display::Surface).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedCell {
    pub content: ContentType,
    /// `None` means the host's default (no count shown).
    pub count: Option<u8>,
    pub glow: bool,
    pub title: Option<String>,
    pub lore: Vec<String>,
}

impl PresentedCell {
    /// Plain cell with only a content type.
    pub fn plain(content: impl Into<ContentType>) -> Self {
        Self {
            content: content.into(),
            count: None,
            glow: false,
            title: None,
            lore: Vec::new(),
        }
    }

    pub fn with_count(mut self, count: u8) -> Self {
        self.count = Some(count);
        self
    }
}
