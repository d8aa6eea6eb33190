use facesheet::{DetectionProfile, SheetLayout, SheetStyle, THUMBNAIL_SIZE};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;


#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}


/// Run configuration for a search
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Face detector pass
    pub face_profile: DetectionProfile,
    /// Eye detector pass
    pub eye_profile: DetectionProfile,
    /// Keep faces even when no eye was detected inside them
    pub accept_unvalidated_faces: bool,
    /// Largest side of a thumbnail in pixels
    #[schemars(range(min = 1))]
    pub thumbnail_size: u32,
    pub layout: SheetLayout,
    pub style: SheetStyle,
    /// TrueType/OpenType font used for captions
    pub font_path: Option<String>,
    /// OpenCV cascade model for the face pass
    pub face_cascade: String,
    /// OpenCV cascade model for the eye pass
    pub eye_cascade: String,
    /// Tesseract language code
    pub ocr_language: String,
    /// Adaptive threshold block size applied before OCR, if any
    pub ocr_threshold_block: Option<u32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            face_profile: DetectionProfile::face(),
            eye_profile: DetectionProfile::eye(),
            accept_unvalidated_faces: false,
            thumbnail_size: THUMBNAIL_SIZE,
            layout: SheetLayout::default(),
            style: SheetStyle::default(),
            font_path: None,
            face_cascade: "haarcascade_frontalface_default.xml".to_string(),
            eye_cascade: "haarcascade_eye.xml".to_string(),
            ocr_language: "eng".to_string(),
            ocr_threshold_block: None,
        }
    }
}

impl SearchConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(ConfigError::UnsupportedFileFormat),
        }
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Convert configuration to JSON string
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// JSON schema of the configuration file
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SearchConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = SearchConfig::from_toml("").unwrap();
        assert_eq!(config, SearchConfig::default());
        assert_eq!(config.face_profile.min_neighbors, 3);
        assert_eq!(config.eye_profile.min_size, [10, 10]);
        assert_eq!(config.layout.columns, 5);
        assert_eq!(config.eye_cascade, "haarcascade_eye.xml");
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = SearchConfig::from_toml(
            r#"
            thumbnail_size = 80
            font_path = "fonts/fanwood.ttf"

            [layout]
            columns = 4

            [eye_profile]
            min_size = [12, 12]
            max_size = [300, 300]
            scale_factor = 1.2
            min_neighbors = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.thumbnail_size, 80);
        assert_eq!(config.layout.columns, 4);
        assert_eq!(config.layout.cell_size, 100);
        assert_eq!(config.eye_profile.min_neighbors, 1);
        assert_eq!(config.face_profile, DetectionProfile::face());
        assert_eq!(config.font_path.as_deref(), Some("fonts/fanwood.ttf"));
    }

    #[test]
    fn test_json_matches_toml() {
        let config = SearchConfig {
            ocr_threshold_block: Some(25),
            ..SearchConfig::default()
        };
        let from_json = SearchConfig::from_json(&config.to_json().unwrap()).unwrap();
        let from_toml = SearchConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(from_json, config);
        assert_eq!(from_toml, config);
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            SearchConfig::from_file("search.yaml"),
            Err(ConfigError::UnsupportedFileFormat)
        ));
    }

    #[test]
    fn test_schema_lists_fields() {
        let schema = serde_json::to_value(SearchConfig::schema()).unwrap();
        let properties = &schema["properties"];
        assert!(properties.get("face_profile").is_some());
        assert!(properties.get("thumbnail_size").is_some());
    }
}
