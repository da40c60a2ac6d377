use image::{GrayImage, Luma, RgbImage};

/// Lookup table mapping an 8-bit sample to its transformed value.
pub type Lut = [u8; 256];

pub fn identity() -> Lut {
    let mut lut = [0; 256];
    for (i, x) in lut.iter_mut().enumerate() {
        *x = i as u8;
    }
    lut
}

pub fn is_identity(lut: &Lut) -> bool {
    lut.iter().enumerate().all(|(i, &x)| usize::from(x) == i)
}

/// Replaces every sample `x` of a grayscale image with `lut[x]`.
pub fn apply_lut(image: &mut GrayImage, lut: &Lut) {
    for p in image.pixels_mut() {
        *p = Luma([lut[usize::from(p[0])]]);
    }
}

/// Applies one table per channel.
pub fn apply_rgb_luts(image: &mut RgbImage, luts: &[Lut; 3]) {
    for p in image.pixels_mut() {
        for (c, lut) in p.0.iter_mut().zip(luts) {
            *c = lut[usize::from(*c)];
        }
    }
}

/// Narrows a computed sample to `u8`, clamping out-of-range values and
/// truncating the fraction.
pub fn clamp_sample(v: f64) -> u8 {
    if v >= 255_f64 {
        return 255;
    }
    if v > 0_f64 {
        return v as u8;
    }
    0
}
