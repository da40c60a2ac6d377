//! Decoding and PNG encoding of bitmaps.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageError, ImageFormat};
use tracing::debug;

use crate::error::{Error, Result};

/// Extensions `load_image` is expected to decode.
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "webp"];

/// Checks if a path has a supported image extension.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
}

/// Decodes the image at `path`, guessing the format from its content.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let image = image::open(path).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        "Decoded {} ({}x{}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );
    Ok(image)
}

/// Writes `image` to `path` as PNG, replacing any existing file.
pub fn save_png(image: &DynamicImage, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    image
        .write_to(&mut writer, ImageFormat::Png)
        .map_err(|e| match e {
            ImageError::IoError(source) => Error::Write {
                path: path.to_path_buf(),
                source,
            },
            source => Error::Encode {
                path: path.to_path_buf(),
                source,
            },
        })?;
    writer.flush().map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Wrote {}", path.display());
    Ok(())
}

/// Convenience wrapper around [`save_png`] for single-channel bitmaps.
pub fn save_gray_png(image: &GrayImage, path: &Path) -> Result<()> {
    save_png(&DynamicImage::ImageLuma8(image.clone()), path)
}
