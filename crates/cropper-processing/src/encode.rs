use crate::error::ProcessingError;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Encode an image as PNG.
///
/// Floating-point images have no PNG representation and are converted to
/// 8-bit RGBA first.
pub fn encode_png(image: &DynamicImage) -> Result<Bytes, ProcessingError> {
    let mut buf = Vec::new();

    let result = match image {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            DynamicImage::ImageRgba8(image.to_rgba8())
                .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        }
        _ => image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png),
    };

    result.map_err(|e| ProcessingError::Encode(e.to_string()))?;
    Ok(Bytes::from(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageReader, Rgb32FImage, Rgba, RgbaImage};

    #[test]
    fn test_encode_png_decodes_back() {
        let img = RgbaImage::from_pixel(7, 5, Rgba([1, 2, 3, 4]));
        let data = encode_png(&DynamicImage::ImageRgba8(img)).unwrap();

        assert!(data.starts_with(b"\x89PNG"));

        let reader = ImageReader::new(Cursor::new(&data[..]))
            .with_guessed_format()
            .unwrap();
        assert_eq!(reader.format(), Some(ImageFormat::Png));
        let decoded = reader.decode().unwrap();
        assert_eq!(decoded.dimensions(), (7, 5));
        assert_eq!(decoded.get_pixel(3, 2), Rgba([1, 2, 3, 4]));
    }

    #[test]
    fn test_encode_float_image() {
        let img = Rgb32FImage::new(4, 4);
        let data = encode_png(&DynamicImage::ImageRgb32F(img)).unwrap();
        assert!(data.starts_with(b"\x89PNG"));
    }
}
