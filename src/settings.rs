//! Layered conversion settings.
//!
//! Priority (lowest to highest):
//! 1. [`ConvertParamsBuilder`] defaults
//! 2. a JSON parameter file
//! 3. command-line flags and `MACO_*` environment variables

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::convert::{parse_filter, ConvertParams, ConvertParamsBuilder};
use crate::error::{Error, Result};

/// Optional overrides for [`ConvertParams`].
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertSettings {
    /// Maximum output width; 0 keeps the image's own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Maximum output height; 0 keeps the image's own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Enlarge images smaller than the bounding box.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upscale: Option<bool>,
    /// Histogram cutoff in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_tone: Option<bool>,
    /// Resampling filter name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
}

impl ConvertSettings {
    /// Reads settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading parameter file: {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
            .map_err(|e| Error::Config(format!("{} in {}", e, path.display())))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Config(format!("malformed settings: {e}")))
    }

    /// Serializes the present values, in parameter-file form.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::Config(format!("unserializable settings: {e}")))
    }

    /// Merge another layer into this one.
    /// Values from `other` override values in `self` when present.
    pub fn merge(&mut self, other: Self) {
        self.width = other.width.or(self.width);
        self.height = other.height.or(self.height);
        self.upscale = other.upscale.or(self.upscale);
        self.cutoff = other.cutoff.or(self.cutoff);
        self.preserve_tone = other.preserve_tone.or(self.preserve_tone);
        self.filter = other.filter.or_else(|| self.filter.take());
        self.gamma = other.gamma.or(self.gamma);
    }

    /// Applies every present value to `builder`.
    pub fn apply(&self, builder: &mut ConvertParamsBuilder) -> Result<()> {
        if let Some(width) = self.width {
            builder.width(width);
        }
        if let Some(height) = self.height {
            builder.height(height);
        }
        if let Some(upscale) = self.upscale {
            builder.upscale(upscale);
        }
        if let Some(cutoff) = self.cutoff {
            builder.cutoff(cutoff);
        }
        if let Some(preserve_tone) = self.preserve_tone {
            builder.preserve_tone(preserve_tone);
        }
        if let Some(ref filter) = self.filter {
            builder.filter(parse_filter(filter)?);
        }
        if let Some(gamma) = self.gamma {
            builder.gamma(gamma);
        }
        Ok(())
    }

    /// Builds validated parameters on top of the defaults.
    pub fn to_params(&self) -> Result<ConvertParams> {
        debug!("Effective settings: {}", self.to_json()?);
        let mut builder = ConvertParams::builder();
        self.apply(&mut builder)?;
        let params = builder.try_build()?;
        debug!("Conversion parameters: {:?}", params);
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::imageops::FilterType;

    #[test]
    fn empty_settings_give_defaults() {
        let params = ConvertSettings::default().to_params().unwrap();
        assert_eq!(params.width(), 1920);
        assert_eq!(params.cutoff(), 1.0);
        assert_eq!(params.gamma(), 0.75);
        assert_eq!(params.filter(), FilterType::CatmullRom);
        assert!(params.preserve_tone());
    }

    #[test]
    fn later_layers_win() {
        let mut settings = ConvertSettings::from_json(r#"{"width": 800, "gamma": 1.2}"#).unwrap();
        settings.merge(ConvertSettings {
            gamma: Some(0.9),
            filter: Some("lanczos3".to_string()),
            ..Default::default()
        });

        let params = settings.to_params().unwrap();
        assert_eq!(params.width(), 800);
        assert_eq!(params.gamma(), 0.9);
        assert_eq!(params.filter(), FilterType::Lanczos3);
    }

    #[test]
    fn absent_values_do_not_erase() {
        let mut settings = ConvertSettings {
            filter: Some("nearest".to_string()),
            ..Default::default()
        };
        settings.merge(ConvertSettings::default());
        assert_eq!(settings.filter.as_deref(), Some("nearest"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_gamma = ConvertSettings {
            gamma: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(bad_gamma.to_params(), Err(Error::Config(_))));

        let bad_filter = ConvertSettings {
            filter: Some("sinc".to_string()),
            ..Default::default()
        };
        assert!(matches!(bad_filter.to_params(), Err(Error::Config(_))));
    }

    #[test]
    fn json_lists_only_present_values() {
        let settings = ConvertSettings {
            width: Some(640),
            filter: Some("triangle".to_string()),
            ..Default::default()
        };
        let json = settings.to_json().unwrap();
        assert_eq!(json, r#"{"width":640,"filter":"triangle"}"#);
        assert_eq!(ConvertSettings::from_json(&json).unwrap(), settings);
        assert_eq!(ConvertSettings::default().to_json().unwrap(), "{}");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ConvertSettings::from_json(r#"{"gama": 1.0}"#).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConvertSettings::load(&dir.path().join("params.json")).unwrap_err();
        assert!(err.to_string().contains("params.json"));
    }
}
