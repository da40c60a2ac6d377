use image::imageops::{resize, FilterType};
use image::{DynamicImage, GrayImage};
use tracing::debug;

use crate::autocontrast::autocontrast;
use crate::error::{Error, Result};
use crate::gamma::{generate_gamma_lut, is_neutral};
use crate::grayscale::to_grayscale;
use crate::lut::{apply_lut, Lut};

/// Converts an image according to given params: fit it into the bounding
/// box, stretch its histogram, then apply the gamma curve.
///
/// See also: [`ConvertParams`].
///
/// # Examples
///
/// ```
/// use maco::{convert, ConvertParams};
/// use imageproc::{assert_pixels_eq, gray_image};
///
/// let img = gray_image!(
///     1, 2, 3;
///     5, 6, 7);
///
/// let params = ConvertParams::default();
/// let img = convert(img, &params);
///
/// assert_pixels_eq!(
///     img,
///     gray_image!(
///         0,   23,  58;
///         148, 199, 255)
/// );
/// ```
pub fn convert(image: GrayImage, params: &ConvertParams) -> GrayImage {
    let (width, height) =
        resize_dimensions(image.width(), image.height(), params.width, params.height);
    let unchanged = (width, height) == image.dimensions();
    let grows = width >= image.width() && height >= image.height();
    let mut image = if unchanged || (grows && !params.upscale) {
        image
    } else {
        debug!(
            "Resizing {}x{} -> {}x{}",
            image.width(),
            image.height(),
            width,
            height
        );
        resize(&image, width, height, params.filter)
    };

    autocontrast(&mut image, params.cutoff);

    if !is_neutral(params.gamma) {
        apply_lut(&mut image, &params.gamma_lut);
    }

    image
}

/// Converts any decoded image to grayscale and then runs [`convert`].
pub fn convert_dynamic(image: &DynamicImage, params: &ConvertParams) -> GrayImage {
    convert(to_grayscale(image), params)
}

/// Defines parameters for the [`convert()`] function.
///
/// Examples
///
/// ```
/// use maco::ConvertParams;
///
/// let params = ConvertParams::builder().gamma(0.8).cutoff(10.0).build();
/// assert_eq!(params.gamma(), 0.8);
/// ```
#[derive(Debug, Clone)]
pub struct ConvertParams {
    width: u32,
    height: u32,
    upscale: bool,
    cutoff: f64,
    preserve_tone: bool,
    filter: FilterType,
    gamma: f64,
    gamma_lut: Lut,
}

impl Default for ConvertParams {
    /// Convenience method wrapping [`ConvertParamsBuilder::default()`].
    fn default() -> Self {
        ConvertParamsBuilder::default().build()
    }
}

impl ConvertParams {
    /// Returns a new [`ConvertParamsBuilder`] with default settings.
    pub fn builder() -> ConvertParamsBuilder {
        ConvertParamsBuilder::default()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn upscale(&self) -> bool {
        self.upscale
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn preserve_tone(&self) -> bool {
        self.preserve_tone
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

/// Builds [`ConvertParams`].
#[derive(Debug, Clone)]
pub struct ConvertParamsBuilder {
    width: u32,
    height: u32,
    upscale: bool,
    cutoff: f64,
    preserve_tone: bool,
    filter: FilterType,
    gamma: f64,
}

impl Default for ConvertParamsBuilder {
    /// Default values are equal to the following:
    ///
    /// ```ignore
    /// ConvertParamsBuilder {
    ///     width: 1920,
    ///     height: 1920,
    ///     upscale: false,
    ///     cutoff: 1.0,
    ///     preserve_tone: true,
    ///     filter: FilterType::CatmullRom,
    ///     gamma: 0.75,
    /// }
    /// ```
    fn default() -> Self {
        ConvertParamsBuilder {
            width: 1920,
            height: 1920,
            upscale: false,
            cutoff: 1.0,
            preserve_tone: true,
            filter: FilterType::CatmullRom,
            gamma: 0.75,
        }
    }
}

impl ConvertParamsBuilder {
    /// Sets maximum width for the output image. Aspect ratio will be preserved.
    /// Zero keeps the image's own width as the limit.
    pub fn width(&mut self, width: u32) -> &mut Self {
        self.width = width;
        self
    }

    /// Sets maximum height for the output image. Aspect ratio will be preserved.
    /// Zero keeps the image's own height as the limit.
    pub fn height(&mut self, height: u32) -> &mut Self {
        self.height = height;
        self
    }

    /// Sets whether or not an image smaller than the desired width x height should be upscaled.
    pub fn upscale(&mut self, upscale: bool) -> &mut Self {
        self.upscale = upscale;
        self
    }

    /// Sets % of the brightest and darkest pixels to ignore when stretching the histogram.
    pub fn cutoff(&mut self, cutoff: f64) -> &mut Self {
        self.cutoff = cutoff;
        self
    }

    /// Sets whether colour channels share a single stretch table.
    pub fn preserve_tone(&mut self, preserve_tone: bool) -> &mut Self {
        self.preserve_tone = preserve_tone;
        self
    }

    /// Sets resampling filter used when resizing the image.
    pub fn filter(&mut self, filter: FilterType) -> &mut Self {
        self.filter = filter;
        self
    }

    /// Sets a gamma modifier. Values < 1 darken the image, values > 1 brighten it.
    pub fn gamma(&mut self, gamma: f64) -> &mut Self {
        self.gamma = gamma;
        self
    }

    /// Checks the current values without building.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..50.0).contains(&self.cutoff) {
            return Err(Error::Config(format!(
                "cutoff must be in 0-50 (exclusive), got {}",
                self.cutoff
            )));
        }
        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            return Err(Error::Config(format!(
                "gamma must be a positive number, got {}",
                self.gamma
            )));
        }
        Ok(())
    }

    /// Builds and returns a [`ConvertParams`] instance, rejecting
    /// out-of-range values.
    pub fn try_build(&self) -> Result<ConvertParams> {
        self.validate()?;
        Ok(self.build())
    }

    /// Builds and returns a [`ConvertParams`] instance.
    pub fn build(&self) -> ConvertParams {
        ConvertParams {
            width: self.width,
            height: self.height,
            upscale: self.upscale,
            cutoff: self.cutoff,
            preserve_tone: self.preserve_tone,
            filter: self.filter,
            gamma: self.gamma,
            gamma_lut: generate_gamma_lut(self.gamma),
        }
    }
}

/// Resampling filters accepted by [`parse_filter`].
pub const FILTER_NAMES: &[&str] = &["nearest", "triangle", "catmullrom", "gaussian", "lanczos3"];

/// Looks up a resampling filter by name, ignoring case.
pub fn parse_filter(name: &str) -> Result<FilterType> {
    match name.to_lowercase().as_str() {
        "nearest" => Ok(FilterType::Nearest),
        "triangle" => Ok(FilterType::Triangle),
        "catmullrom" => Ok(FilterType::CatmullRom),
        "gaussian" => Ok(FilterType::Gaussian),
        "lanczos3" => Ok(FilterType::Lanczos3),
        other => Err(Error::Config(format!(
            "unknown filter '{other}', expected one of {}",
            FILTER_NAMES.join(", ")
        ))),
    }
}

/// Calculates the width and height an image should be resized to.
/// Preserves aspect ratio so that both dimensions are contained within the given `nx` and `ny`.
/// If `nx` or `ny` are 0, their value will by replaced by `x` or `y` respectively, allowing for
/// easier downscaling to desired size in one dimension.
pub fn resize_dimensions(x: u32, y: u32, nx: u32, ny: u32) -> (u32, u32) {
    if x == 0 || y == 0 {
        return (x, y);
    }
    let nx = if nx > 0 { nx } else { x };
    let ny = if ny > 0 { ny } else { y };

    let ratio = u64::from(x) * u64::from(ny);
    let nratio = u64::from(nx) * u64::from(y);

    let use_y = nratio <= ratio;

    let intermediate = if use_y {
        u64::from(y) * u64::from(nx) / u64::from(x)
    } else {
        u64::from(x) * u64::from(ny) / u64::from(y)
    };
    let intermediate = std::cmp::max(1, intermediate);

    if use_y {
        (nx, intermediate as u32)
    } else {
        (intermediate as u32, ny)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    macro_rules! dimensions_tests {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (x, y, nx, ny, expected) = $value;
                assert_eq!(expected, resize_dimensions(x, y, nx, ny));
            }
        )*
        }
    }

    dimensions_tests! {
        resize_dimensions_x_gt_y: (100, 100, 70, 50, (50, 50)),
        resize_dimensions_y_gt_x: (100, 100, 50, 70, (50, 50)),
        resize_dimensions_0nx: (100, 100, 0, 50, (50, 50)),
        resize_dimensions_0ny: (100, 100, 50, 0, (50, 50)),
        resize_dimensions_wide: (400, 100, 200, 200, (200, 50)),
        resize_dimensions_tall_min_one: (1, 1000, 1000, 10, (1, 10)),
        resize_dimensions_empty: (0, 0, 10, 10, (0, 0)),
    }

    fn gradient(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| Luma([(60 + (x + y) % 100) as u8]))
    }

    #[test]
    fn small_images_are_not_upscaled() {
        let out = convert(gradient(20, 10), &ConvertParams::default());
        assert_eq!(out.dimensions(), (20, 10));
    }

    #[test]
    fn upscale_when_asked() {
        let params = ConvertParams::builder()
            .width(40)
            .height(40)
            .upscale(true)
            .build();
        let out = convert(gradient(20, 10), &params);
        assert_eq!(out.dimensions(), (40, 20));
    }

    #[test]
    fn large_images_are_downscaled() {
        let params = ConvertParams::builder().width(10).height(10).build();
        let out = convert(gradient(40, 20), &params);
        assert_eq!(out.dimensions(), (10, 5));
    }

    #[test]
    fn same_width_still_shrinks_height() {
        let params = ConvertParams::builder().width(1000).height(10).build();
        let out = convert(gradient(1, 1000), &params);
        assert_eq!(out.dimensions(), (1, 10));
    }

    #[test]
    fn output_fits_the_box() {
        for (w, h) in [(1, 1000), (1000, 1), (300, 299), (7, 3000)] {
            let params = ConvertParams::builder().width(64).height(48).build();
            let out = convert(gradient(w, h), &params);
            assert!(
                out.width() <= 64 && out.height() <= 48,
                "{w}x{h} -> {:?}",
                out.dimensions()
            );
        }
    }

    #[test]
    fn neutral_params_leave_image_alone() {
        let img = GrayImage::from_raw(2, 1, vec![0, 255]).unwrap();
        let params = ConvertParams::builder().cutoff(0.0).gamma(1.0).build();
        assert_eq!(convert(img.clone(), &params), img);
    }

    #[test]
    fn validation() {
        assert!(ConvertParams::builder().try_build().is_ok());
        assert!(ConvertParams::builder().cutoff(50.0).try_build().is_err());
        assert!(ConvertParams::builder().cutoff(-1.0).try_build().is_err());
        assert!(ConvertParams::builder().gamma(0.0).try_build().is_err());
        assert!(ConvertParams::builder().gamma(f64::NAN).try_build().is_err());
    }

    #[test]
    fn filters_by_name() {
        assert_eq!(parse_filter("Lanczos3").unwrap(), FilterType::Lanczos3);
        assert_eq!(parse_filter("nearest").unwrap(), FilterType::Nearest);
        assert!(matches!(parse_filter("bicubic"), Err(Error::Config(_))));
    }
}
