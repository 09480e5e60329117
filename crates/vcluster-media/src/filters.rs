//! Per-frame image filters.
//!
//! Each `FrameTransform` maps to one pure function over a decoded image.
//! Frames are decoded from and re-encoded to PNG, so `Identity` is exact.

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat};
use vcluster_models::FrameTransform;

use crate::error::MediaResult;

/// Gaussian sigma used by `FrameTransform::Blur`.
const BLUR_SIGMA: f32 = 2.0;

/// 3x3 Laplacian kernel used by `FrameTransform::EdgeDetect`.
const LAPLACIAN: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];

/// Decode an encoded image (any format the `image` crate recognises).
pub fn decode_image(bytes: &[u8]) -> MediaResult<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// Encode an image as PNG.
pub fn encode_png(img: &DynamicImage) -> MediaResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageOutputFormat::Png)?;
    Ok(buf.into_inner())
}

/// Apply a transform to a decoded image.
pub fn apply_transform(transform: FrameTransform, img: DynamicImage) -> DynamicImage {
    match transform {
        FrameTransform::Identity => img,
        FrameTransform::Invert => {
            let mut img = img;
            img.invert();
            img
        }
        FrameTransform::Grayscale => DynamicImage::ImageRgb8(img.grayscale().to_rgb8()),
        FrameTransform::EdgeDetect => {
            DynamicImage::ImageRgb8(img.grayscale().filter3x3(&LAPLACIAN).to_rgb8())
        }
        FrameTransform::Blur => img.blur(BLUR_SIGMA),
        FrameTransform::Sepia => sepia(&img),
    }
}

/// Decode a PNG (or other image) frame, transform it, and re-encode as PNG.
pub fn transform_png(transform: FrameTransform, bytes: &[u8]) -> MediaResult<Vec<u8>> {
    let img = decode_image(bytes)?;
    encode_png(&apply_transform(transform, img))
}

fn sepia(img: &DynamicImage) -> DynamicImage {
    let mut rgb = img.to_rgb8();
    for pixel in rgb.pixels_mut() {
        let [r, g, b] = pixel.0.map(f32::from);
        let tone = |rw: f32, gw: f32, bw: f32| (r * rw + g * gw + b * bw).min(255.0) as u8;
        pixel.0 = [
            tone(0.393, 0.769, 0.189),
            tone(0.349, 0.686, 0.168),
            tone(0.272, 0.534, 0.131),
        ];
    }
    DynamicImage::ImageRgb8(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn sample_frame() -> DynamicImage {
        let mut img = RgbImage::new(4, 3);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 60) as u8, (y * 80) as u8, 200]);
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_identity_round_trip_is_exact() {
        let original = sample_frame();
        let png = encode_png(&original).unwrap();

        let processed = transform_png(FrameTransform::Identity, &png).unwrap();
        let decoded = decode_image(&processed).unwrap();

        assert_eq!(decoded.to_rgb8(), original.to_rgb8());
    }

    #[test]
    fn test_invert() {
        let out = apply_transform(FrameTransform::Invert, sample_frame()).to_rgb8();
        assert_eq!(out.get_pixel(1, 2), &Rgb([255 - 60, 255 - 160, 55]));
    }

    #[test]
    fn test_grayscale_has_equal_channels() {
        let out = apply_transform(FrameTransform::Grayscale, sample_frame()).to_rgb8();
        for pixel in out.pixels() {
            assert_eq!(pixel[0], pixel[1]);
            assert_eq!(pixel[1], pixel[2]);
        }
    }

    #[test]
    fn test_edge_detect_flat_image_is_black() {
        let flat = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 5, Rgb([120, 120, 120])));
        let out = apply_transform(FrameTransform::EdgeDetect, flat).to_rgb8();
        assert_eq!(out.get_pixel(2, 2), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_sepia_tone_of_white() {
        let white = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([255, 255, 255])));
        let out = apply_transform(FrameTransform::Sepia, white).to_rgb8();
        assert_eq!(out.get_pixel(0, 0), &Rgb([255, 255, 238]));
    }

    #[test]
    fn test_blur_preserves_dimensions() {
        let out = apply_transform(FrameTransform::Blur, sample_frame());
        assert_eq!((out.width(), out.height()), (4, 3));
    }

    #[test]
    fn test_transform_rejects_garbage() {
        tokio_test::assert_err!(transform_png(FrameTransform::Invert, b"not an image"));
    }
}
