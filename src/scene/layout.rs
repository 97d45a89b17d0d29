//! Layout strategies.
//!
//! A [`Layout`] is a value stored on each composite. Placement is a pure
//! function of the composite's size and padding plus each child's extent and
//! translation; the composite applies the returned positions.
//!
//! # Strategies
//!
//! - `Free` - children keep whatever position they were given
//! - `VBox` - one column, top to bottom, `spacing` cells apart
//! - `HBox` - one row, left to right, `spacing` cells apart
//! - `Flow` - fill the primary axis, wrap onto a new line/column when the
//!   next child would overflow it
//!
//! # Example
//!
//! ```
//! use cellgraph::{ChildExtent, Insets, Layout, Orientation};
//!
//! let flow = Layout::Flow { orientation: Orientation::Horizontal, h_gap: 0, v_gap: 0 };
//! let cell = ChildExtent::sized(1, 1);
//! let placed = flow.place(2, 2, Insets::ZERO, &[cell, cell, cell]).unwrap();
//! assert_eq!(placed, vec![(0, 0), (1, 0), (0, 1)]);
//! ```

use crate::types::{Insets, Orientation};

/// Placement strategy of a composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    Free,
    VBox {
        spacing: i32,
    },
    HBox {
        spacing: i32,
    },
    Flow {
        orientation: Orientation,
        h_gap: i32,
        v_gap: i32,
    },
}

/// What a strategy needs to know about one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChildExtent {
    pub width: i32,
    pub height: i32,
    pub translate_x: i32,
    pub translate_y: i32,
}

impl ChildExtent {
    pub fn sized(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

impl Layout {
    /// Positions for `children`, in order. `None` for [`Layout::Free`].
    pub fn place(
        &self,
        width: i32,
        height: i32,
        padding: Insets,
        children: &[ChildExtent],
    ) -> Option<Vec<(i32, i32)>> {
        match *self {
            Layout::Free => None,
            Layout::VBox { spacing } => Some(stack(padding, children, spacing, Orientation::Vertical)),
            Layout::HBox { spacing } => Some(stack(padding, children, spacing, Orientation::Horizontal)),
            Layout::Flow {
                orientation,
                h_gap,
                v_gap,
            } => Some(flow(width, height, padding, children, orientation, h_gap, v_gap)),
        }
    }
}

// =============================================================================
// STACK (VBox / HBox)
// =============================================================================

fn stack(padding: Insets, children: &[ChildExtent], spacing: i32, axis: Orientation) -> Vec<(i32, i32)> {
    let mut x = padding.left;
    let mut y = padding.top;
    children
        .iter()
        .map(|child| {
            let position = (x + child.translate_x, y + child.translate_y);
            match axis {
                Orientation::Vertical => y += child.height + spacing,
                Orientation::Horizontal => x += child.width + spacing,
            }
            position
        })
        .collect()
}

// =============================================================================
// FLOW
// =============================================================================

fn flow(
    width: i32,
    height: i32,
    padding: Insets,
    children: &[ChildExtent],
    orientation: Orientation,
    h_gap: i32,
    v_gap: i32,
) -> Vec<(i32, i32)> {
    let horizontal = orientation == Orientation::Horizontal;
    let max_length = if horizontal {
        width - padding.horizontal()
    } else {
        height - padding.vertical()
    };

    let mut x = padding.left;
    let mut y = padding.top;
    // Primary extent used on the current line, and its thickest child.
    let mut length = 0;
    let mut cross_extent = 0;

    let mut placed = Vec::with_capacity(children.len());
    for child in children {
        let (child_length, child_cross) = if horizontal {
            (child.width, child.height)
        } else {
            (child.height, child.width)
        };
        let cursor = if horizontal { x } else { y };

        // The first child of a line never wraps.
        if length > 0 && cursor + child_length > max_length {
            if horizontal {
                x = padding.left;
                y += cross_extent + v_gap;
            } else {
                y = padding.top;
                x += cross_extent + h_gap;
            }
            length = 0;
            cross_extent = 0;
        }

        placed.push((x + child.translate_x, y + child.translate_y));
        cross_extent = cross_extent.max(child_cross);
        length += child_length;
        if horizontal {
            x += child_length + h_gap;
        } else {
            y += child_length + v_gap;
        }
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(n: usize) -> Vec<ChildExtent> {
        vec![ChildExtent::sized(1, 1); n]
    }

    #[test]
    fn test_free_keeps_positions() {
        assert_eq!(Layout::Free.place(9, 6, Insets::ZERO, &cells(3)), None);
    }

    #[test]
    fn test_vbox_spacing_and_translation() {
        let mut children = cells(3);
        children[1].translate_x = 2;
        let placed = Layout::VBox { spacing: 1 }
            .place(9, 6, Insets::new(1, 0, 0, 3), &children)
            .unwrap();
        assert_eq!(placed, vec![(3, 1), (5, 3), (3, 5)]);
    }

    #[test]
    fn test_hbox_uses_child_widths() {
        let children = vec![ChildExtent::sized(2, 1), ChildExtent::sized(3, 1), ChildExtent::sized(1, 1)];
        let placed = Layout::HBox { spacing: 0 }.place(9, 1, Insets::ZERO, &children).unwrap();
        assert_eq!(placed, vec![(0, 0), (2, 0), (5, 0)]);
    }

    #[test]
    fn test_flow_wraps_to_next_line() {
        let flow = Layout::Flow {
            orientation: Orientation::Horizontal,
            h_gap: 0,
            v_gap: 0,
        };
        let placed = flow.place(2, 2, Insets::ZERO, &cells(3)).unwrap();
        assert_eq!(placed, vec![(0, 0), (1, 0), (0, 1)]);
    }

    #[test]
    fn test_flow_first_child_of_line_never_wraps() {
        let flow = Layout::Flow {
            orientation: Orientation::Horizontal,
            h_gap: 0,
            v_gap: 0,
        };
        let wide = ChildExtent::sized(5, 1);
        let placed = flow.place(2, 4, Insets::ZERO, &[wide, wide]).unwrap();
        assert_eq!(placed, vec![(0, 0), (0, 1)]);
    }

    #[test]
    fn test_flow_vertical_with_gaps() {
        let flow = Layout::Flow {
            orientation: Orientation::Vertical,
            h_gap: 1,
            v_gap: 0,
        };
        let children = vec![
            ChildExtent::sized(2, 1),
            ChildExtent::sized(1, 1),
            ChildExtent::sized(1, 1),
        ];
        let placed = flow.place(9, 2, Insets::ZERO, &children).unwrap();
        // Third child wraps; the column advances by the widest child (2) + gap.
        assert_eq!(placed, vec![(0, 0), (0, 1), (3, 0)]);
    }

    #[test]
    fn test_flow_cross_extent_resets_per_line() {
        let flow = Layout::Flow {
            orientation: Orientation::Horizontal,
            h_gap: 0,
            v_gap: 0,
        };
        let children = vec![
            ChildExtent::sized(1, 3),
            ChildExtent::sized(1, 1),
            ChildExtent::sized(1, 1),
        ];
        let placed = flow.place(1, 9, Insets::ZERO, &children).unwrap();
        assert_eq!(placed, vec![(0, 0), (0, 3), (0, 4)]);
    }
}
