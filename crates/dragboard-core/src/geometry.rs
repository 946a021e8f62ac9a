#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Uses pointer-space pixel coordinates (f32, origin at top-left), matching
//! what a host rendering layer reports for item bounding boxes.

/// A pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An item bounding rectangle for hit testing and midpoint resolution.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: f32,
    /// Top edge (inclusive).
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top edge (inclusive). Alias for `self.y`.
    #[inline]
    pub const fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Vertical midpoint, the before/after boundary for drop resolution.
    #[inline]
    pub fn mid_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Check if the rectangle has zero (or negative) area.
    ///
    /// Detached or unmeasured elements commonly report zero-size rects
    /// under virtualization; such rects are unusable for hit testing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a vertical coordinate falls within `[top, bottom)`.
    #[inline]
    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.y && y < self.bottom()
    }
}
