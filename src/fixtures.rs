//! Pre-renders the reference images the conversion tests compare against.
//!
//! One source image yields two files: its grayscale conversion, and that
//! grayscale image after autocontrast and a gamma curve.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use tracing::info;

use crate::autocontrast::{autocontrast_image, AutocontrastParams};
use crate::error::Result;
use crate::gamma::gamma_remap;
use crate::grayscale::to_grayscale;
use crate::io::{load_image, save_gray_png};

pub const SOURCE_NAME: &str = "wikipe-tan.png";
pub const GRAYSCALE_NAME: &str = "wikipe-tan-grayscale.png";
pub const WANT_NAME: &str = "wikipe-tan-want.png";

/// Constants of the fixture tone curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixtureSettings {
    pub cutoff: f64,
    pub preserve_tone: bool,
    pub gamma: f64,
}

pub const FIXTURE_SETTINGS: FixtureSettings = FixtureSettings {
    cutoff: 1.0,
    preserve_tone: true,
    gamma: 0.75,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixturePaths {
    pub source: PathBuf,
    pub grayscale: PathBuf,
    pub want: PathBuf,
}

impl FixturePaths {
    /// The standard file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            source: dir.join(SOURCE_NAME),
            grayscale: dir.join(GRAYSCALE_NAME),
            want: dir.join(WANT_NAME),
        }
    }
}

/// Both rendered fixtures, as written.
#[derive(Debug, Clone)]
pub struct Fixtures {
    pub grayscale: GrayImage,
    pub want: GrayImage,
}

/// 2x2 test image: red, green / blue, white.
pub fn quad_image() -> RgbImage {
    RgbImage::from_fn(2, 2, |x, y| match (x, y) {
        (0, 0) => Rgb([255, 0, 0]),
        (1, 0) => Rgb([0, 255, 0]),
        (0, 1) => Rgb([0, 0, 255]),
        _ => Rgb([255, 255, 255]),
    })
}

/// Deterministic colour gradient standing in for a photograph, with a
/// narrow tonal range so autocontrast has something to do.
pub fn sample_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let fx = x * 160 / width.max(1);
        let fy = y * 120 / height.max(1);
        Rgb([
            (40 + fx) as u8,
            (50 + fy) as u8,
            (60 + (fx + fy) / 2) as u8,
        ])
    })
}

/// Applies the fixture tone curve to a grayscale image.
pub fn tone(grayscale: &GrayImage, settings: &FixtureSettings) -> GrayImage {
    let params = AutocontrastParams {
        cutoff: settings.cutoff,
        preserve_tone: settings.preserve_tone,
    };
    let mut out =
        autocontrast_image(&DynamicImage::ImageLuma8(grayscale.clone()), &params).into_luma8();
    gamma_remap(&mut out, settings.gamma);
    out
}

/// Renders both fixtures from `paths.source` and writes them.
///
/// Nothing is written if the source cannot be decoded. If the second write
/// fails, the first file stays on disk.
pub fn generate(paths: &FixturePaths) -> Result<Fixtures> {
    let source = load_image(&paths.source)?;
    info!(
        "Loaded {} ({}x{})",
        paths.source.display(),
        source.width(),
        source.height()
    );

    let grayscale = to_grayscale(&source);
    save_gray_png(&grayscale, &paths.grayscale)?;
    info!("Wrote grayscale fixture: {}", paths.grayscale.display());

    let want = tone(&grayscale, &FIXTURE_SETTINGS);
    save_gray_png(&want, &paths.want)?;
    info!("Wrote tone fixture: {}", paths.want.display());

    Ok(Fixtures { grayscale, want })
}
