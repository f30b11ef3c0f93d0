//! Geometry primitives
//!
//! Plain `Copy` value types for scroll bookkeeping. Every quantity the
//! refresh controller reasons about lives on a single scroll [`Axis`], so the
//! types expose axis projections (`along`, `leading`, `trailing`) instead of
//! hard-coding vertical scrolling.
//!
//! Values are never rounded or snapped: what you store is what you read back.

use serde::{Deserialize, Serialize};

// ============================================================================
// Axis
// ============================================================================

/// The scroll axis a control is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Top-to-bottom scrolling (default)
    #[default]
    Vertical,
    /// Left-to-right scrolling
    Horizontal,
}

impl Axis {
    /// The perpendicular axis
    pub fn cross(self) -> Axis {
        match self {
            Axis::Vertical => Axis::Horizontal,
            Axis::Horizontal => Axis::Vertical,
        }
    }
}

// ============================================================================
// Point / Size / Rect
// ============================================================================

/// A 2-D position (content offsets, frame origins)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component on the given axis
    pub fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Vertical => self.y,
            Axis::Horizontal => self.x,
        }
    }

    /// Copy with the component on `axis` replaced
    pub fn with_along(mut self, axis: Axis, value: f32) -> Self {
        match axis {
            Axis::Vertical => self.y = value,
            Axis::Horizontal => self.x = value,
        }
        self
    }
}

/// A 2-D extent
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Extent along the given axis (height for vertical scrolling)
    pub fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Vertical => self.height,
            Axis::Horizontal => self.width,
        }
    }

    /// Copy with the extent along `axis` replaced
    pub fn with_along(mut self, axis: Axis, value: f32) -> Self {
        match axis {
            Axis::Vertical => self.height = value,
            Axis::Horizontal => self.width = value,
        }
        self
    }
}

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Origin coordinate + extent along `axis`
    pub fn max_along(&self, axis: Axis) -> f32 {
        self.origin.along(axis) + self.size.along(axis)
    }
}

// ============================================================================
// Edge Insets
// ============================================================================

/// Four-sided padding around a container's content
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeInsets {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl EdgeInsets {
    pub const ZERO: EdgeInsets = EdgeInsets {
        top: 0.0,
        left: 0.0,
        bottom: 0.0,
        right: 0.0,
    };

    pub const fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Insets with only the vertical sides set
    pub const fn vertical(top: f32, bottom: f32) -> Self {
        Self {
            top,
            left: 0.0,
            bottom,
            right: 0.0,
        }
    }

    /// Inset at the start of `axis` (top or left)
    pub fn leading(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Vertical => self.top,
            Axis::Horizontal => self.left,
        }
    }

    /// Inset at the end of `axis` (bottom or right)
    pub fn trailing(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Vertical => self.bottom,
            Axis::Horizontal => self.right,
        }
    }

    pub fn set_leading(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::Vertical => self.top = value,
            Axis::Horizontal => self.left = value,
        }
    }

    pub fn set_trailing(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::Vertical => self.bottom = value,
            Axis::Horizontal => self.right = value,
        }
    }

    pub fn with_leading(mut self, axis: Axis, value: f32) -> Self {
        self.set_leading(axis, value);
        self
    }

    pub fn with_trailing(mut self, axis: Axis, value: f32) -> Self {
        self.set_trailing(axis, value);
        self
    }

    /// Sum of both insets along `axis`
    pub fn total(&self, axis: Axis) -> f32 {
        self.leading(axis) + self.trailing(axis)
    }
}
