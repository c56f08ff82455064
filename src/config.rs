//! Configuration for AFP output.

use crate::error::{Error, Result};
use crate::fonts::FontSubsetter;
use crate::writer::structured_field::MAX_DATA_LENGTH;
use crate::writer::ResourceLevel;
use serde::{Deserialize, Serialize};

/// AFP output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AfpConfig {
    /// Device units per inch on both axes.
    pub resolution: u16,

    /// Scope of resources created without an explicit level.
    pub default_resource_level: ResourceLevel,

    /// Largest data length of one structured field.
    pub max_structured_field_data: usize,

    /// Embed font subsets instead of whole font files.
    pub subset_fonts: bool,

    /// Keep glyph 0 (`.notdef`) in every subset.
    pub include_notdef: bool,
}

impl Default for AfpConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AfpConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            resolution: 240,
            default_resource_level: ResourceLevel::Document,
            max_structured_field_data: MAX_DATA_LENGTH,
            subset_fonts: true,
            include_notdef: true,
        }
    }

    /// Parse a JSON configuration. Missing keys keep their defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use afp_oxide::config::AfpConfig;
    ///
    /// let config = AfpConfig::from_json(r#"{"resolution": 300}"#).unwrap();
    /// assert_eq!(config.resolution, 300);
    /// assert!(config.subset_fonts);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AfpConfig = serde_json::from_str(json)?;
        config.validate()
    }

    fn validate(mut self) -> Result<Self> {
        if self.resolution == 0 {
            return Err(Error::Config("resolution must be positive".into()));
        }
        self.max_structured_field_data = self.max_structured_field_data.clamp(1, MAX_DATA_LENGTH);
        Ok(self)
    }

    /// Set the resolution.
    pub fn with_resolution(mut self, resolution: u16) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the default resource level.
    pub fn with_default_resource_level(mut self, level: ResourceLevel) -> Self {
        self.default_resource_level = level;
        self
    }

    /// Set the structured field data limit, clamped to the format maximum.
    pub fn with_max_structured_field_data(mut self, max: usize) -> Self {
        self.max_structured_field_data = max.clamp(1, MAX_DATA_LENGTH);
        self
    }

    /// Embed subsets or whole fonts.
    pub fn with_subset_fonts(mut self, enable: bool) -> Self {
        self.subset_fonts = enable;
        self
    }

    /// Keep `.notdef` in subsets.
    pub fn with_include_notdef(mut self, enable: bool) -> Self {
        self.include_notdef = enable;
        self
    }

    /// A subsetter honouring `include_notdef`.
    pub fn new_subsetter(&self) -> FontSubsetter {
        if self.include_notdef {
            FontSubsetter::new()
        } else {
            FontSubsetter::without_notdef()
        }
    }
}
