//! Grayscale image preparation for low-colour displays.
//!
//! Images are fit into a bounding box, contrast-stretched and gamma
//! corrected. See [`convert()`] and [`ConvertParams`].

pub mod autocontrast;
pub mod batch;
pub mod convert;
pub mod error;
pub mod fixtures;
pub mod gamma;
pub mod grayscale;
pub mod io;
pub mod logging;
pub mod lut;
pub mod settings;

pub use autocontrast::{autocontrast, autocontrast_image, AutocontrastParams, Histogram};
pub use batch::{
    handle_removed_file, process_existing_files, process_file, run_file_watcher_with_timeout,
    ConvertConfig, Outcome,
};
pub use convert::{
    convert, convert_dynamic, parse_filter, resize_dimensions, ConvertParams, ConvertParamsBuilder,
};
pub use error::{Error, Result};
pub use gamma::{gamma_remap, generate_gamma_lut};
pub use grayscale::to_grayscale;
pub use settings::ConvertSettings;
