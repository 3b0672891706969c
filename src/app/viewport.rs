use eframe::egui::{Pos2, Rect, Vec2};

pub(in crate::app) const MIN_ZOOM: f32 = 0.1;
pub(in crate::app) const MAX_ZOOM: f32 = 4.0;
const ZOOM_STEP: f32 = 1.25;

/// Pan/zoom transform from simulation space to screen space. Pure
/// presentation state: it projects node positions and unprojects pointer
/// coordinates, and never touches the simulation itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct Viewport {
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Zooms by a factor while keeping the world point under `anchor`
    /// fixed on screen. Out-of-range factors are absorbed by the scale
    /// clamp rather than rejected.
    pub fn zoom_by(&mut self, factor: f32, anchor: Pos2, rect: Rect) {
        let world_before = self.unproject(rect, anchor);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = anchor - rect.center() - (world_before * self.zoom);
    }

    /// One toolbar zoom click, anchored at the canvas center.
    pub fn zoom_step(&mut self, zoom_in: bool, rect: Rect) {
        let factor = if zoom_in { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
        self.zoom_by(factor, rect.center(), rect);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn project(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.center() + self.pan + world * self.zoom
    }

    pub fn unproject(&self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center() - self.pan) / self.zoom
    }
}
