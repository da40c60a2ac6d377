//! Histogram-based contrast stretch.
//!
//! A fraction of the darkest and lightest samples is discarded, and the
//! remaining range is linearly rescaled to fill 0-255.

use image::{DynamicImage, GrayImage, RgbImage};
use imageproc::stats::histogram;
use tracing::debug;

use crate::grayscale::to_grayscale;
use crate::lut::{apply_lut, apply_rgb_luts, clamp_sample, identity, is_identity, Lut};

/// Parameters for [`autocontrast`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutocontrastParams {
    /// Percentage of samples ignored at each end of the histogram.
    pub cutoff: f64,
    /// Stretch all colour channels with a single table derived from
    /// luminance, keeping their relative balance. Has no effect on
    /// single-channel images.
    pub preserve_tone: bool,
}

impl Default for AutocontrastParams {
    fn default() -> Self {
        Self {
            cutoff: 0.0,
            preserve_tone: false,
        }
    }
}

/// 256-bin histogram of 8-bit samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u64; 256],
    total: u64,
}

impl Histogram {
    pub fn from_counts(counts: &[u32; 256]) -> Self {
        let mut bins = [0u64; 256];
        for (bin, &count) in bins.iter_mut().zip(counts) {
            *bin = u64::from(count);
        }
        let total = bins.iter().sum();
        Self { bins, total }
    }

    pub fn from_luma(image: &GrayImage) -> Self {
        Self::from_counts(&histogram(image).channels[0])
    }

    /// One histogram per channel: red, green, blue.
    pub fn per_channel(image: &RgbImage) -> [Self; 3] {
        let hist = histogram(image);
        [0, 1, 2].map(|c| Self::from_counts(&hist.channels[c]))
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn bins(&self) -> &[u64; 256] {
        &self.bins
    }

    /// Removes `cutoff` percent of the samples from both tails.
    ///
    /// Bins are emptied from the outside in; the bin where the budget runs
    /// out is only reduced.
    pub fn trimmed(&self, cutoff: f64) -> Self {
        let mut bins = self.bins;
        if cutoff > 0.0 {
            let cut = (self.total as f64 * cutoff / 100.0).floor() as u64;
            trim_tail(bins.iter_mut(), cut);
            trim_tail(bins.iter_mut().rev(), cut);
        }
        let total = bins.iter().sum();
        Self { bins, total }
    }

    /// First and last non-empty bins.
    pub fn bounds(&self) -> Option<(u8, u8)> {
        let lo = self.bins.iter().position(|&c| c > 0)?;
        let hi = self.bins.iter().rposition(|&c| c > 0)?;
        Some((lo as u8, hi as u8))
    }
}

fn trim_tail<'a>(bins: impl Iterator<Item = &'a mut u64>, mut cut: u64) {
    for bin in bins {
        if cut == 0 {
            break;
        }
        if cut > *bin {
            cut -= *bin;
            *bin = 0;
        } else {
            *bin -= cut;
            cut = 0;
        }
    }
}

/// Builds the rescale table for a histogram.
///
/// Returns the identity when trimming leaves fewer than two distinct levels,
/// e.g. for a solid-colour image.
pub fn stretch_lut(histogram: &Histogram, cutoff: f64) -> Lut {
    let Some((lo, hi)) = histogram.trimmed(cutoff).bounds() else {
        return identity();
    };
    if hi <= lo {
        return identity();
    }

    let scale = 255_f64 / f64::from(hi - lo);
    let offset = -f64::from(lo) * scale;
    let mut lut = [0; 256];
    for (i, x) in lut.iter_mut().enumerate() {
        *x = clamp_sample(i as f64 * scale + offset);
    }
    lut
}

/// Stretches a grayscale image in place. Returns whether any sample changed.
pub fn autocontrast(image: &mut GrayImage, cutoff: f64) -> bool {
    let lut = stretch_lut(&Histogram::from_luma(image), cutoff);
    if is_identity(&lut) {
        debug!("Autocontrast is a no-op for this histogram");
        return false;
    }
    apply_lut(image, &lut);
    true
}

/// Stretches any decoded image.
///
/// Grayscale images stay grayscale; everything else is stretched as 8-bit
/// RGB, dropping alpha.
pub fn autocontrast_image(image: &DynamicImage, params: &AutocontrastParams) -> DynamicImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        let mut gray = gray.clone();
        autocontrast(&mut gray, params.cutoff);
        return DynamicImage::ImageLuma8(gray);
    }

    let mut rgb = image.to_rgb8();
    let luts = if params.preserve_tone {
        let lut = stretch_lut(&Histogram::from_luma(&to_grayscale(image)), params.cutoff);
        [lut; 3]
    } else {
        Histogram::per_channel(&rgb).map(|h| stretch_lut(&h, params.cutoff))
    };
    apply_rgb_luts(&mut rgb, &luts);
    DynamicImage::ImageRgb8(rgb)
}
