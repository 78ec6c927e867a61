//! Test fixtures: PNG images of a given size.

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// PNG whose pixels encode their own coordinates.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("Failed to encode test PNG");
    buf
}

pub fn decode_dimensions(data: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(data).expect("Response is not an image");
    (img.width(), img.height())
}
