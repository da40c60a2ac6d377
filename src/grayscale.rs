use image::{DynamicImage, GrayImage, Luma};

/// Luminance of an 8-bit RGB sample using ITU-R 601-2 weights
/// (0.299, 0.587, 0.114) in 16-bit fixed point, rounded to nearest.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let l = u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000;
    // The weights sum to 65536, so the shifted value is at most 255.
    (l >> 16) as u8
}

/// Converts any decoded image to a single-channel 8-bit bitmap.
///
/// Alpha is dropped. Images that are already 8-bit grayscale are copied
/// sample for sample.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }

    let rgb = image.to_rgb8();
    let mut out = GrayImage::new(rgb.width(), rgb.height());
    for (dst, src) in out.pixels_mut().zip(rgb.pixels()) {
        let [r, g, b] = src.0;
        *dst = Luma([luma(r, g, b)]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn primaries() {
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(0, 0, 0), 0);
    }

    #[test]
    fn gray_inputs_are_fixed_points() {
        for v in 0..=255u8 {
            assert_eq!(luma(v, v, v), v);
        }
    }

    #[test]
    fn one_channel_same_dimensions() {
        let img = RgbImage::from_fn(5, 3, |x, y| Rgb([(x * 40) as u8, (y * 60) as u8, 9]));
        let gray = to_grayscale(&DynamicImage::ImageRgb8(img.clone()));

        assert_eq!(gray.dimensions(), (5, 3));
        for (x, y, p) in gray.enumerate_pixels() {
            let [r, g, b] = img.get_pixel(x, y).0;
            assert_eq!(p.0[0], luma(r, g, b));
        }
    }

    #[test]
    fn alpha_is_ignored() {
        let opaque = RgbaImage::from_pixel(1, 1, Rgba([10, 200, 30, 255]));
        let clear = RgbaImage::from_pixel(1, 1, Rgba([10, 200, 30, 0]));
        assert_eq!(
            to_grayscale(&DynamicImage::ImageRgba8(opaque)),
            to_grayscale(&DynamicImage::ImageRgba8(clear))
        );
    }
}
