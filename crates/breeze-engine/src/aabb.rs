//! Axis-aligned bounding boxes.

use crate::components::ScreenRect;

/// Axis-aligned bounding box in play-field coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Aabb {
    /// Construct a box.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box covering an integer screen rectangle.
    pub fn from_rect(rect: ScreenRect) -> Self {
        Self::new(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
        )
    }

    /// Integer rectangle for pixel work. Fractions are truncated.
    pub fn to_rect(self) -> ScreenRect {
        ScreenRect::new(
            self.x as i32,
            self.y as i32,
            self.width as i32,
            self.height as i32,
        )
    }

    /// Open-interval overlap: boxes that only share an edge or a corner do
    /// not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}
