use image::GrayImage;
use crate::{
    error::Result,
    types::{BoundingBox, DetectionProfile, Document, FaceCandidateSet, RawDetection},
};

/// Trait for image preprocessing algorithms
pub trait ImagePreprocessor: Send + Sync {
    /// Preprocess the input image (e.g., blur, threshold)
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage>;
}

/// Black-box multi-scale object detector (face or eye cascade)
pub trait ObjectDetector: Send + Sync {
    /// Run one pass over the document's grayscale raster.
    ///
    /// Boxes are returned unvalidated; callers drop malformed ones.
    fn detect(&self, document: &Document, profile: &DetectionProfile) -> Result<Vec<RawDetection>>;
}

/// Black-box OCR engine
pub trait TextExtractor: Send + Sync {
    /// Best-effort plain text of `image`, which belongs to `document`
    fn extract_text(&self, document: &Document, image: &GrayImage) -> Result<String>;
}

impl<T: TextExtractor + ?Sized> TextExtractor for Box<T> {
    fn extract_text(&self, document: &Document, image: &GrayImage) -> Result<String> {
        (**self).extract_text(document, image)
    }
}

impl<T: ObjectDetector + ?Sized> ObjectDetector for Box<T> {
    fn detect(&self, document: &Document, profile: &DetectionProfile) -> Result<Vec<RawDetection>> {
        (**self).detect(document, profile)
    }
}

/// Trait for turning raw face hits into validated faces
pub trait FaceValidator: Send + Sync {
    /// Combine face boxes with the corroborating eye boxes
    fn validate(&self, faces: &[BoundingBox], eyes: &[BoundingBox]) -> FaceCandidateSet;
}
