//! 2D math shared by the layout, the viewport lock and the ghost anchors.
//!
//! Coordinates are y-down. "Local" points live on the content plane; "pixel" points are
//! measured from the viewport's top-left corner. The content plane is mapped onto the
//! viewport by a translation followed by a uniform scale.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use serde::Serialize;

const SCALE_EPS: f32 = 1e-6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Builds a rect from two arbitrary corners.
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self::from_corners(origin, origin + size)
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Pulls `to` back along the segment `from -> to` onto the first crossing of `rect`.
///
/// Points already inside are returned unchanged. The result is kept one unit inside the
/// rect so it never sits exactly on the viewport border.
pub fn clamp_to_rect_along_segment(from: Vec2, to: Vec2, rect: Rect) -> Vec2 {
    if rect.contains(to) {
        return to;
    }
    const EPS: f32 = 1e-5;
    let d = to - from;
    let mut best_t = f32::INFINITY;
    let mut best = to;

    let mut try_hit = |t: f32| {
        if !(0.0..=1.0).contains(&t) {
            return;
        }
        let p = from + d * t;
        if p.x < rect.min.x - EPS
            || p.x > rect.max.x + EPS
            || p.y < rect.min.y - EPS
            || p.y > rect.max.y + EPS
        {
            return;
        }
        if t < best_t {
            best_t = t;
            best = p;
        }
    };

    if d.x.abs() > EPS {
        try_hit((rect.min.x - from.x) / d.x);
        try_hit((rect.max.x - from.x) / d.x);
    }
    if d.y.abs() > EPS {
        try_hit((rect.min.y - from.y) / d.y);
        try_hit((rect.max.y - from.y) / d.y);
    }

    Vec2::new(
        clamp_inset(best.x, rect.min.x, rect.max.x),
        clamp_inset(best.y, rect.min.y, rect.max.y),
    )
}

fn clamp_inset(value: f32, min: f32, max: f32) -> f32 {
    let lo = min + 1.0;
    let hi = max - 1.0;
    if lo > hi {
        return (min + max) * 0.5;
    }
    value.clamp(lo, hi)
}

/// Placement of the content plane inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContentTransform {
    /// Viewport pixel of content-local (0, 0).
    pub position: Vec2,
    pub scale: f32,
}

impl Default for ContentTransform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl ContentTransform {
    /// Scale with a zero guard, for divisions.
    pub fn safe_scale(&self) -> f32 {
        if self.scale.abs() > SCALE_EPS {
            self.scale
        } else {
            1.0
        }
    }

    pub fn pixel_of_local(&self, local: Vec2) -> Vec2 {
        self.position + local * self.scale
    }

    pub fn local_of_pixel(&self, pixel: Vec2) -> Vec2 {
        (pixel - self.position) / self.safe_scale()
    }

    pub fn viewport_rect_in_content(&self, viewport: Vec2) -> Rect {
        Rect::from_corners(
            self.local_of_pixel(Vec2::ZERO),
            self.local_of_pixel(viewport),
        )
    }

    pub fn pan(&mut self, delta: Vec2, canvas_scale_factor: f32) {
        let factor = if canvas_scale_factor > 0.0 {
            canvas_scale_factor
        } else {
            1.0
        };
        self.position += delta / factor;
    }

    /// Zooms by `factor` while keeping the content point under `pixel` fixed.
    ///
    /// Returns false when the clamped scale did not change.
    pub fn zoom_at(&mut self, pixel: Vec2, factor: f32, min_scale: f32, max_scale: f32) -> bool {
        let current = self.scale;
        let target = (current * factor).clamp(min_scale, max_scale.max(min_scale));
        let applied = if current != 0.0 { target / current } else { 1.0 };
        if (applied - 1.0).abs() <= SCALE_EPS {
            return false;
        }
        let before = (pixel - self.position) / self.safe_scale();
        self.scale = target;
        self.position = pixel - before * target;
        true
    }

    /// Puts content-local `local` at the viewport's pixel origin.
    pub fn center_on(&mut self, local: Vec2) {
        self.position = -local * self.safe_scale();
    }
}

/// Maps a scroll wheel event to a zoom factor; `None` for negligible input.
pub fn scroll_zoom_factor(scroll_delta: Vec2, zoom_speed: f32) -> Option<f32> {
    let d = if scroll_delta.y.abs() > 0.01 {
        scroll_delta.y
    } else {
        scroll_delta.x
    };
    if d.abs() < 0.01 {
        return None;
    }
    Some(1.0 + d * zoom_speed)
}
