//! Background - a pure function from cell coordinates to a pixel.
//!
//! Composites evaluate it in their own coordinate space; a scene evaluates it
//! in display coordinates for cells nothing else covers.

use std::fmt;
use std::rc::Rc;

use super::pixel::Pixel;

#[derive(Clone)]
pub struct Background(Rc<dyn Fn(i32, i32) -> Option<Pixel>>);

impl Background {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(i32, i32) -> Option<Pixel> + 'static,
    {
        Self(Rc::new(f))
    }

    /// Same pixel everywhere.
    pub fn fill(pixel: Pixel) -> Self {
        Self::new(move |_, _| Some(pixel.clone()))
    }

    /// `primary` where `x + y` is even, `secondary` elsewhere.
    pub fn checkerboard(primary: Pixel, secondary: Pixel) -> Self {
        Self::new(move |x, y| {
            if (x + y).rem_euclid(2) == 0 {
                Some(primary.clone())
            } else {
                Some(secondary.clone())
            }
        })
    }

    pub fn pixel_at(&self, x: i32, y: i32) -> Option<Pixel> {
        (self.0)(x, y)
    }
}

impl fmt::Debug for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Background(<fn>)")
    }
}
