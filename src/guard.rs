//! Policy deciding where new shapes may be started.

use std::sync::Arc;

use egui::Pos2;
use image::RgbaImage;

use crate::config::DrawGuardConfig;

pub trait DrawGuard {
    fn can_draw_at(&self, image_pos: Pos2) -> bool;
}

pub struct AllowAll;

impl DrawGuard for AllowAll {
    fn can_draw_at(&self, _image_pos: Pos2) -> bool {
        true
    }
}

/// Rejects near-black and near-white pixels, which on radiographs are
/// background or letterboxing rather than anatomy.
pub struct BrightnessGuard {
    image: Arc<RgbaImage>,
    min_brightness: f32,
    max_brightness: f32,
}

impl BrightnessGuard {
    pub fn new(image: Arc<RgbaImage>, config: &DrawGuardConfig) -> Self {
        Self {
            image,
            min_brightness: config.min_brightness,
            max_brightness: config.max_brightness,
        }
    }

    /// Mean RGB of the pixel under `image_pos`, or `None` outside the image.
    pub fn brightness_at(&self, image_pos: Pos2) -> Option<f32> {
        if !(image_pos.x >= 0.0 && image_pos.y >= 0.0) {
            return None;
        }
        let (x, y) = (image_pos.x.floor() as u32, image_pos.y.floor() as u32);
        let pixel = self.image.get_pixel_checked(x, y)?;
        let [r, g, b, _] = pixel.0;
        Some((r as f32 + g as f32 + b as f32) / 3.0)
    }
}

impl DrawGuard for BrightnessGuard {
    fn can_draw_at(&self, image_pos: Pos2) -> bool {
        self.brightness_at(image_pos)
            .is_some_and(|b| b > self.min_brightness && b < self.max_brightness)
    }
}

/// Guard for a freshly loaded image according to `config`.
pub fn for_image(image: Arc<RgbaImage>, config: &DrawGuardConfig) -> Box<dyn DrawGuard> {
    if config.enabled {
        Box::new(BrightnessGuard::new(image, config))
    } else {
        Box::new(AllowAll)
    }
}
