//! Layout-space geometry primitives.
//!
//! Everything the pane lays out or draws is expressed in DIPs (1/96 inch
//! logical units); the presentation seam converts to physical pixels at the
//! last possible moment using the monitor scale. Keeping the two spaces in
//! distinct types (`DipRect` vs `PxRect`) makes an accidental mixed-space
//! computation a compile error instead of a blurry frame.
//!
//! Invariants:
//! * `DipRect`/`PxRect` are half-open in neither axis: `right`/`bottom` are
//!   inclusive extents of the covered area; an empty rect has
//!   `right <= left || bottom <= top`.
//! * `intersect` of disjoint rects yields an empty rect, never a negative
//!   extent that later arithmetic could misread.
//! * Conversions round conservatively: DIP→px dirty regions round outward
//!   (floor origin, ceil extent) so a repaint never misses a partially
//!   covered pixel.

/// Scale factor between DIP space and physical pixels (96 DPI == 1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(pub f32);

impl Scale {
    pub const IDENTITY: Scale = Scale(1.0);

    pub fn from_dpi(dpi: u32) -> Self {
        Scale(dpi as f32 / 96.0)
    }

    #[inline]
    pub fn dip_from_px(&self, px: i32) -> f32 {
        px as f32 / self.0
    }

    #[inline]
    pub fn px_from_dip(&self, dip: f32) -> i32 {
        (dip * self.0).round() as i32
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DipPoint {
    pub x: f32,
    pub y: f32,
}

impl DipPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DipSize {
    pub width: f32,
    pub height: f32,
}

impl DipSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Axis-aligned rectangle in DIP space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DipRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl DipRect {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn from_origin_size(origin: DipPoint, size: DipSize) -> Self {
        Self {
            left: origin.x,
            top: origin.y,
            right: origin.x + size.width,
            bottom: origin.y + size.height,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    pub fn center(&self) -> DipPoint {
        DipPoint::new((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    pub fn contains(&self, p: DipPoint) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }

    pub fn intersects(&self, other: &DipRect) -> bool {
        !(other.right < self.left
            || other.left > self.right
            || other.bottom < self.top
            || other.top > self.bottom)
    }

    pub fn intersect(&self, other: &DipRect) -> DipRect {
        let r = DipRect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        };
        if r.is_empty() { DipRect::default() } else { r }
    }

    pub fn union(&self, other: &DipRect) -> DipRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        DipRect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    pub fn translate(&self, dx: f32, dy: f32) -> DipRect {
        DipRect {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }

    pub fn inflate(&self, dx: f32, dy: f32) -> DipRect {
        DipRect {
            left: self.left - dx,
            top: self.top - dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }

    /// Outward-rounded pixel rect: any pixel partially covered in DIP space
    /// is included.
    pub fn to_px_outward(&self, scale: Scale) -> PxRect {
        PxRect {
            left: (self.left * scale.0).floor() as i32,
            top: (self.top * scale.0).floor() as i32,
            right: (self.right * scale.0).ceil() as i32,
            bottom: (self.bottom * scale.0).ceil() as i32,
        }
    }
}

/// Axis-aligned rectangle in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PxRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PxRect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Clamp to a client area of the given size anchored at the origin.
    pub fn clamp_to(&self, width: i32, height: i32) -> PxRect {
        let r = PxRect {
            left: self.left.max(0),
            top: self.top.max(0),
            right: self.right.min(width),
            bottom: self.bottom.min(height),
        };
        if r.is_empty() { PxRect::default() } else { r }
    }

    pub fn to_dip(&self, scale: Scale) -> DipRect {
        DipRect {
            left: self.left as f32 / scale.0,
            top: self.top as f32 / scale.0,
            right: self.right as f32 / scale.0,
            bottom: self.bottom as f32 / scale.0,
        }
    }

    pub fn union(&self, other: &PxRect) -> PxRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        PxRect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}
