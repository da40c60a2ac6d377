use image::GrayImage;

use crate::lut::{apply_lut, clamp_sample, Lut};

/// Gammas this close to 1 leave the image unchanged and are skipped.
pub const GAMMA_EPSILON: f64 = 0.001;

/// Generates a lookup table for `(x / 255)^(1 / gamma) * 255`.
///
/// Values < 1 darken the image, values > 1 brighten it. The curve is
/// monotonically non-decreasing for any positive gamma.
pub fn generate_gamma_lut(gamma: f64) -> Lut {
    let mut lut = [0; 256];
    for (i, x) in lut.iter_mut().enumerate() {
        *x = clamp_sample((i as f64 / 255_f64).powf(1_f64 / gamma) * 255_f64);
    }
    lut
}

pub fn is_neutral(gamma: f64) -> bool {
    (gamma - 1_f64).abs() <= GAMMA_EPSILON
}

/// Applies the gamma curve to every sample in place.
pub fn gamma_remap(image: &mut GrayImage, gamma: f64) {
    if is_neutral(gamma) {
        return;
    }
    apply_lut(image, &generate_gamma_lut(gamma));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_fixed() {
        for gamma in [0.5, 0.75, 1.0, 1.8, 2.2] {
            let lut = generate_gamma_lut(gamma);
            assert_eq!(lut[0], 0, "gamma {gamma}");
            assert_eq!(lut[255], 255, "gamma {gamma}");
        }
    }

    #[test]
    fn monotonic() {
        for gamma in [0.3, 0.75, 1.5, 3.0] {
            let lut = generate_gamma_lut(gamma);
            assert!(lut.windows(2).all(|w| w[0] <= w[1]), "gamma {gamma}");
        }
    }

    #[test]
    fn darkening_curve_values() {
        let lut = generate_gamma_lut(0.75);
        // (128 / 255)^(4/3) * 255 = 101.7
        assert_eq!(lut[128], 101);
        // (23 / 255)^(4/3) * 255 = 10.3
        assert_eq!(lut[23], 10);
        assert!(lut.iter().enumerate().all(|(i, &x)| usize::from(x) <= i));
    }

    #[test]
    fn neutral_gamma_is_skipped() {
        let mut img = GrayImage::from_raw(2, 1, vec![3, 250]).unwrap();
        gamma_remap(&mut img, 1.0005);
        assert_eq!(img.into_raw(), vec![3, 250]);
    }
}
