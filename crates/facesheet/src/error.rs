use thiserror::Error;

use crate::types::{BoundingBox, DocumentStage};

#[derive(Error, Debug)]
pub enum FacesheetError {
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Malformed detection box ({x}, {y}, {width}, {height})")]
    MalformedBox { x: i64, y: i64, width: i64, height: i64 },

    #[error("Cannot crop an empty region {0:?}")]
    EmptyCrop(BoundingBox),

    #[error("{adapter} failed on document '{document}': {message}")]
    AdapterFailure {
        adapter: String,
        document: String,
        message: String,
    },

    #[error("Document '{document}' is at stage {found}, expected {expected}")]
    StageOrder {
        document: String,
        expected: DocumentStage,
        found: DocumentStage,
    },

    #[error("Invalid detection profile: {0}")]
    InvalidProfile(String),

    #[error("Thumbnail size must be > 0")]
    InvalidThumbnailSize,

    #[error("Invalid sheet layout: {0}")]
    InvalidLayout(String),

    #[error("Unusable font data: {0}")]
    Font(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FacesheetError {
    /// Shorthand for an adapter failure on a given document
    pub fn adapter(adapter: impl Into<String>, document: &str, message: impl ToString) -> Self {
        Self::AdapterFailure {
            adapter: adapter.into(),
            document: document.to_string(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FacesheetError>;
