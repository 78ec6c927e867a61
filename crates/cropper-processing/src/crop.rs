//! Fixed-margin crop

use crate::error::ProcessingError;
use crate::source::SourceImage;
use cropper_core::CropMargins;
use image::{DynamicImage, GenericImageView};

/// The result of cropping a [`SourceImage`].
#[derive(Debug, Clone)]
pub struct DerivedImage {
    image: DynamicImage,
}

impl DerivedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

/// Remove `margins.x` columns from the left and right edges and `margins.y`
/// rows from the top and bottom.
///
/// Both sides must be strictly larger than twice their margin, otherwise the
/// result would be empty and `ImageTooSmall` is returned. The source is left
/// untouched.
pub fn crop_margins(
    source: &SourceImage,
    margins: CropMargins,
) -> Result<DerivedImage, ProcessingError> {
    let (width, height) = source.dimensions();
    let min_width = margins.min_width();
    let min_height = margins.min_height();

    if width <= min_width || height <= min_height {
        return Err(ProcessingError::ImageTooSmall {
            width,
            height,
            min_width,
            min_height,
        });
    }

    let image = source
        .image()
        .crop_imm(margins.x, margins.y, width - min_width, height - min_height);

    Ok(DerivedImage { image })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    /// Every pixel encodes its own coordinates.
    fn coordinate_image(width: u32, height: u32) -> SourceImage {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x / 256) + (y / 256) * 16) as u8, 255])
        });
        SourceImage::new(DynamicImage::ImageRgba8(img))
    }

    #[test]
    fn test_crop_dimensions() {
        let source = coordinate_image(100, 100);
        let derived = crop_margins(&source, CropMargins::default()).unwrap();
        assert_eq!(derived.dimensions(), (48, 48));

        let source = coordinate_image(300, 53);
        let derived = crop_margins(&source, CropMargins::default()).unwrap();
        assert_eq!(derived.dimensions(), (248, 1));
    }

    #[test]
    fn test_crop_keeps_inner_pixels() {
        let source = coordinate_image(120, 90);
        let derived = crop_margins(&source, CropMargins::default()).unwrap();

        for (x, y, pixel) in derived.image().pixels() {
            assert_eq!(pixel, source.image().get_pixel(x + 26, y + 26));
        }
    }

    #[test]
    fn test_boundary_sizes_are_too_small() {
        for (w, h) in [(52, 100), (100, 52), (52, 52), (40, 40), (1, 1)] {
            let source = coordinate_image(w, h);
            match crop_margins(&source, CropMargins::default()) {
                Err(ProcessingError::ImageTooSmall {
                    width,
                    height,
                    min_width,
                    min_height,
                }) => {
                    assert_eq!((width, height), (w, h));
                    assert_eq!((min_width, min_height), (52, 52));
                }
                other => panic!("expected ImageTooSmall for {w}x{h}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_smallest_croppable_image() {
        let source = coordinate_image(53, 53);
        let derived = crop_margins(&source, CropMargins::default()).unwrap();
        assert_eq!(derived.dimensions(), (1, 1));
        assert_eq!(derived.image().get_pixel(0, 0), source.image().get_pixel(26, 26));
    }

    #[test]
    fn test_source_is_unchanged_and_result_deterministic() {
        let source = coordinate_image(80, 80);
        let before = source.image().to_rgba8();

        let first = crop_margins(&source, CropMargins::default()).unwrap();
        let second = crop_margins(&source, CropMargins::default()).unwrap();

        assert_eq!(source.image().to_rgba8(), before);
        assert_eq!(first.image().to_rgba8(), second.image().to_rgba8());
    }

    #[test]
    fn test_custom_margins() {
        let source = coordinate_image(30, 20);
        let derived = crop_margins(&source, CropMargins::new(5, 2)).unwrap();
        assert_eq!(derived.dimensions(), (20, 16));
        assert_eq!(derived.image().get_pixel(0, 0), source.image().get_pixel(5, 2));
    }
}
