//! Pan and cursor-anchored zoom between canvas (screen) space and image space.
//!
//! Screen coordinates are relative to the canvas origin. The mapping is
//! `image = (screen - offset) / scale`.

use egui::{Pos2, Vec2};

use crate::config::ViewportConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZoomDirection {
    In,
    Out,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    scale: f32,
    offset: Vec2,
    zoom_factor: f32,
    min_scale: f32,
    max_scale: f32,
}

impl Viewport {
    pub fn new(config: &ViewportConfig) -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
            zoom_factor: config.zoom_factor,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Sets scale (clamped) and offset directly.
    pub fn set(&mut self, scale: f32, offset: Vec2) {
        self.scale = scale.clamp(self.min_scale, self.max_scale);
        self.offset = offset;
    }

    /// Back to 1:1 with the image at the canvas origin.
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.offset = Vec2::ZERO;
    }

    pub fn screen_to_image(&self, screen: Pos2) -> Pos2 {
        ((screen.to_vec2() - self.offset) / self.scale).to_pos2()
    }

    pub fn image_to_screen(&self, image: Pos2) -> Pos2 {
        (image.to_vec2() * self.scale + self.offset).to_pos2()
    }

    /// Offset for a pan gesture that grabbed at `grab` while the offset was `start_offset`.
    pub fn pan_from(&mut self, start_offset: Vec2, grab: Pos2, current: Pos2) {
        self.offset = start_offset + (current - grab);
    }

    /// One zoom step keeping the image point under `cursor` fixed on screen.
    pub fn zoom_at(&mut self, cursor: Pos2, direction: ZoomDirection) {
        let anchor = self.screen_to_image(cursor);
        let target = match direction {
            ZoomDirection::In => self.scale * self.zoom_factor,
            ZoomDirection::Out => self.scale / self.zoom_factor,
        };
        self.scale = target.clamp(self.min_scale, self.max_scale);
        self.offset = cursor.to_vec2() - anchor.to_vec2() * self.scale;
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&ViewportConfig::default())
    }
}
