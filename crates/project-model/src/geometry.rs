//! Pixel-space geometry: sizes, points, and crop rectangles.
//!
//! All rounding used by the layout engine lives here so both layout
//! variants agree on it:
//! - fractional sizes truncate toward zero,
//! - aspect-preserving resizes use integer floor division,
//! - centering offsets floor, and may be negative when the inner
//!   extent protrudes past the outer one.

use serde::{Deserialize, Serialize};

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// Output resolution of a render. Both components must be non-zero.
pub type Resolution = Size;

impl Size {
    /// Vertical 1080x1920 target used for Shorts.
    pub const VERTICAL_HD: Size = Size {
        width: 1080,
        height: 1920,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// `fraction` of the height, truncated toward zero.
    pub fn height_fraction(&self, fraction: f64) -> u32 {
        (self.height as f64 * fraction) as u32
    }

    /// Uniformly resize so the height becomes `height`.
    pub fn scale_to_height(&self, height: u32) -> Size {
        let width = if self.height == 0 {
            0
        } else {
            (self.width as u64 * height as u64 / self.height as u64) as u32
        };
        Size { width, height }
    }

    /// Uniformly resize so the width becomes `width`.
    pub fn scale_to_width(&self, width: u32) -> Size {
        let height = if self.width == 0 {
            0
        } else {
            (self.height as u64 * width as u64 / self.width as u64) as u32
        };
        Size { width, height }
    }

    /// The full-frame rectangle of this size.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Offset that centers `inner` within `outer`, floored.
pub fn centered_offset(outer: u32, inner: u32) -> i32 {
    (outer as i64 - inner as i64).div_euclid(2) as i32
}

/// A pixel position. Negative values place a layer partly off-canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A crop rectangle given by its corners, `(x1, y1)` inclusive and
/// `(x2, y2)` exclusive, in source-frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Rectangle of `size` with its top-left corner at `origin`.
    pub fn from_origin(origin: Point, size: Size) -> Self {
        Self {
            x1: origin.x,
            y1: origin.y,
            x2: origin.x + size.width as i32,
            y2: origin.y + size.height as i32,
        }
    }

    /// Clamp against a frame of `frame` size.
    ///
    /// The start edges are kept strictly inside the frame and the end
    /// edges may touch it. Clamping is idempotent. A result may still be
    /// degenerate; check [`Rect::is_degenerate`].
    pub fn clamp_to(&self, frame: Size) -> Rect {
        let w = frame.width as i32;
        let h = frame.height as i32;
        Rect {
            x1: self.x1.min(w - 1).max(0),
            y1: self.y1.min(h - 1).max(0),
            x2: self.x2.min(w).max(0),
            y2: self.y2.min(h).max(0),
        }
    }

    /// True when the rectangle has no area.
    pub fn is_degenerate(&self) -> bool {
        self.x2 <= self.x1 || self.y2 <= self.y1
    }

    /// Clamp against `frame` and return `None` when nothing usable remains.
    pub fn clamp_nondegenerate(&self, frame: Size) -> Option<Rect> {
        let clamped = self.clamp_to(frame);
        if clamped.is_degenerate() {
            None
        } else {
            Some(clamped)
        }
    }

    pub fn width(&self) -> u32 {
        (self.x2 - self.x1).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.y2 - self.y1).max(0) as u32
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Whether the rectangle lies entirely inside a frame of `frame` size.
    pub fn is_within(&self, frame: Size) -> bool {
        self.x1 >= 0
            && self.y1 >= 0
            && self.x2 <= frame.width as i32
            && self.y2 <= frame.height as i32
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})-({}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}
