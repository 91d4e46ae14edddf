//! Viewport geometry shared by the pointer, layout and presenters.
//!
//! All coordinates are viewport pixels with the origin at the top-left
//! corner, `x` growing right and `y` growing down.

use serde::{Deserialize, Serialize};

/// A position in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position
    pub x: f32,
    /// Vertical position
    pub y: f32,
}

impl Point {
    /// Create a point
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned box, the same shape a layout pass reports for an element
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Rect {
    /// Create a box from its left/top corner and size
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Create a box of the given size centered on `center`
    pub fn centered_on(center: Point, width: f32, height: f32) -> Self {
        Self::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            width,
            height,
        )
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Center of the box
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Whether `point` lies inside the box.
    ///
    /// The left/top edges are inclusive and the right/bottom edges exclusive,
    /// so two boxes sharing an edge never both contain a point on it.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x < self.right()
            && point.y >= self.top
            && point.y < self.bottom()
    }

    /// Grow the box by `amount` on every side
    pub fn inflate(&self, amount: f32) -> Self {
        Self::new(
            self.left - amount,
            self.top - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    /// Move the box by the given offset
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.left + dx, self.top + dy, self.width, self.height)
    }

    /// A box with no area or non-finite coordinates cannot be framed
    pub fn is_degenerate(&self) -> bool {
        let finite = self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite();
        !finite || self.width <= 0.0 || self.height <= 0.0
    }

    /// Whether two boxes overlap with a non-zero area
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}

/// Size of the visible area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Viewport {
    /// Create a viewport
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The viewport as a box anchored at the origin
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}
