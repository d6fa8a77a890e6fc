use std::path::Path;

use image::{ImageResult, RgbImage};
use prismboy_core::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Converts a 0x00RRGGBB framebuffer to an RGB image.
pub fn frame_to_image(frame: &[u32]) -> RgbImage {
    RgbImage::from_fn(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32, |x, y| {
        let px = frame
            .get(y as usize * SCREEN_WIDTH + x as usize)
            .copied()
            .unwrap_or(0);
        image::Rgb([(px >> 16) as u8, (px >> 8) as u8, px as u8])
    })
}

pub fn save_png(frame: &[u32], path: &Path) -> ImageResult<()> {
    frame_to_image(frame).save_with_format(path, image::ImageFormat::Png)
}
