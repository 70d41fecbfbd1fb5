//! Core geometry types
//!
//! All coordinates here are abstract layout units with a lower-left origin
//! and y growing upwards. Conversion to pixels belongs to the render surface.

use serde::Serialize;

/// Rectangle in layout units
///
/// `(x, y)` is the lower-left corner. Width and height are never negative
/// for rectangles produced by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Creates a new rectangle
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Returns the right edge coordinate
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Returns the top edge coordinate
    pub fn top(&self) -> f32 {
        self.y + self.h
    }

    /// Returns true if this rectangle contains the given point
    pub fn contains_point(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.top()
    }

    /// Length of the shared vertical extent of two rectangles, 0.0 when they
    /// only touch or are disjoint
    pub fn vertical_overlap(&self, other: &Rect) -> f32 {
        let bottom = self.y.max(other.y);
        let top = self.top().min(other.top());
        (top - bottom).max(0.0)
    }

    /// Returns the bounding box that contains both rectangles
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.x.min(other.x);
        let bottom = self.y.min(other.y);
        let right = self.right().max(other.right());
        let top = self.top().max(other.top());

        Rect::new(left, bottom, right - left, top - bottom)
    }

    /// Grows the rectangle by `margin` on every side
    pub fn expand(&self, margin: f32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.w + 2.0 * margin,
            self.h + 2.0 * margin,
        )
    }

    /// Returns the area in square layout units
    pub fn area(&self) -> f32 {
        self.w * self.h
    }
}
