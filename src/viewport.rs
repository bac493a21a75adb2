//! Viewport anchor lock and background grid phase.
//!
//! The grid is drawn as a tiled texture whose UV rect is derived from the content
//! transform. A rebuild moves nodes around on the content plane; the lock translates
//! the content so one anchor node stays at the same viewport pixel, and shifts the grid
//! phase so the grid keeps the same alignment relative to that node.

use serde::Serialize;

use crate::geometry::{ContentTransform, Vec2};

const MIN_CELL_PX: f32 = 1e-3;

/// Grid offset in tiles, on top of the transform-derived offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GridPhase {
    pub x: f32,
    pub y: f32,
}

impl GridPhase {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// UV rect for the tiled grid texture: offset and tile count per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UvRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Viewport geometry the grid math depends on.
#[derive(Debug, Clone, Copy)]
pub struct GridFrame {
    pub viewport: Vec2,
    pub cell_px: f32,
}

impl GridFrame {
    pub fn new(viewport: Vec2, cell_px: f32) -> Self {
        Self {
            viewport,
            cell_px: cell_px.max(MIN_CELL_PX),
        }
    }

    fn has_area(&self) -> bool {
        self.viewport.x > 0.0 && self.viewport.y > 0.0
    }

    fn tiles(&self, scale: f32) -> Vec2 {
        self.viewport / (self.cell_px * scale)
    }

    /// Grid coordinate (in tiles) shown at viewport pixel `pixel`.
    fn grid_coord(&self, transform: &ContentTransform, pixel: Vec2, phase: GridPhase) -> Vec2 {
        let tiles = self.tiles(transform.safe_scale());
        let origin = transform.pixel_of_local(Vec2::ZERO);
        let base = Vec2::new(
            -(origin.x / self.viewport.x) * tiles.x,
            -(origin.y / self.viewport.y) * tiles.y,
        );
        Vec2::new(
            (pixel.x / self.viewport.x) * tiles.x + base.x + phase.x,
            (pixel.y / self.viewport.y) * tiles.y + base.y + phase.y,
        )
    }

    /// UV rect for the current transform, or `None` for an empty viewport.
    ///
    /// The offset snaps to whole viewport pixels so the grid never shimmers while
    /// panning.
    pub fn uv_rect(&self, transform: &ContentTransform, phase: GridPhase) -> Option<UvRect> {
        if !self.has_area() {
            return None;
        }
        let s = transform.safe_scale();
        let u_per_px = 1.0 / (self.cell_px * s);
        let origin = transform.pixel_of_local(Vec2::ZERO);
        let u_off = (-origin.x + phase.x / u_per_px).round_ties_even() * u_per_px;
        let v_off = (-origin.y + phase.y / u_per_px).round_ties_even() * u_per_px;
        Some(UvRect {
            x: u_off,
            y: v_off,
            width: self.viewport.x * u_per_px,
            height: self.viewport.y * u_per_px,
        })
    }
}

/// State captured before a rebuild.
#[derive(Debug, Clone, Copy)]
pub struct AnchorLock {
    frame: GridFrame,
    locked_pixel: Vec2,
    grid_at_anchor: Vec2,
}

impl AnchorLock {
    /// Records where `anchor_local` is on screen and which grid coordinate sits under it.
    pub fn capture(
        frame: GridFrame,
        transform: &ContentTransform,
        phase: GridPhase,
        anchor_local: Vec2,
    ) -> Option<Self> {
        if !frame.has_area() {
            return None;
        }
        let locked_pixel = transform.position + anchor_local * transform.scale;
        Some(Self {
            frame,
            locked_pixel,
            grid_at_anchor: frame.grid_coord(transform, locked_pixel, phase),
        })
    }

    pub fn locked_pixel(&self) -> Vec2 {
        self.locked_pixel
    }

    /// Moves the content so the anchor's new local position lands on the recorded
    /// pixel, then returns the phase that keeps the recorded grid coordinate under it.
    pub fn restore(&self, transform: &mut ContentTransform, anchor_local: Vec2) -> GridPhase {
        transform.position = self.locked_pixel - anchor_local * transform.scale;
        let pixel = transform.pixel_of_local(anchor_local);
        let unphased = self.frame.grid_coord(transform, pixel, GridPhase::default());
        GridPhase {
            x: self.grid_at_anchor.x - unphased.x,
            y: self.grid_at_anchor.y - unphased.y,
        }
    }
}
