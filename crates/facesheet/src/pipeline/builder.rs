use tracing::warn;
use crate::{
    algorithms::{AdaptiveThresholdPreprocessor, EyeContainmentValidator, THUMBNAIL_SIZE, UnvalidatedFaces},
    error::{FacesheetError, Result},
    pipeline::{DetectorPass, SearchPipeline},
    sheet::SheetBuilder,
    traits::{FaceValidator, ImagePreprocessor, ObjectDetector, TextExtractor},
    types::DetectionProfile,
};

/// Builder for creating search pipelines with a fluent API
pub struct PipelineBuilder {
    ocr: Box<dyn TextExtractor>,
    ocr_preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    face_detector: Box<dyn ObjectDetector>,
    eye_detector: Box<dyn ObjectDetector>,
    face_profile: DetectionProfile,
    eye_profile: DetectionProfile,
    validator: Option<Box<dyn FaceValidator>>,
    sheet_builder: Option<SheetBuilder>,
    thumbnail_size: u32,
}

impl PipelineBuilder {
    /// Create a builder with the face/eye profiles and sheet layout defaults
    pub fn new<T, F, E>(ocr: T, face_detector: F, eye_detector: E) -> Self
    where
        T: TextExtractor + 'static,
        F: ObjectDetector + 'static,
        E: ObjectDetector + 'static,
    {
        Self {
            ocr: Box::new(ocr),
            ocr_preprocessors: Vec::new(),
            face_detector: Box::new(face_detector),
            eye_detector: Box::new(eye_detector),
            face_profile: DetectionProfile::face(),
            eye_profile: DetectionProfile::eye(),
            validator: None,
            sheet_builder: None,
            thumbnail_size: THUMBNAIL_SIZE,
        }
    }

    /// Add a preprocessor applied to the grayscale page before OCR
    pub fn add_ocr_preprocessor<P>(mut self, preprocessor: P) -> Self
    where
        P: ImagePreprocessor + 'static,
    {
        self.ocr_preprocessors.push(Box::new(preprocessor));
        self
    }

    /// Binarise pages with an adaptive threshold before OCR
    pub fn with_adaptive_threshold(self, block_size: u32) -> Self {
        self.add_ocr_preprocessor(AdaptiveThresholdPreprocessor { block_size })
    }

    pub fn face_profile(mut self, profile: DetectionProfile) -> Self {
        self.face_profile = profile;
        self
    }

    pub fn eye_profile(mut self, profile: DetectionProfile) -> Self {
        self.eye_profile = profile;
        self
    }

    /// Set the face validator (replaces any existing one)
    pub fn set_face_validator<V>(mut self, validator: V) -> Self
    where
        V: FaceValidator + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Keep every detected face, eyes or not
    pub fn accept_unvalidated_faces(self) -> Self {
        self.set_face_validator(UnvalidatedFaces)
    }

    pub fn sheet_builder(mut self, sheet_builder: SheetBuilder) -> Self {
        self.sheet_builder = Some(sheet_builder);
        self
    }

    pub fn thumbnail_size(mut self, size: u32) -> Self {
        self.thumbnail_size = size;
        self
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Result<SearchPipeline> {
        if self.thumbnail_size == 0 {
            return Err(FacesheetError::InvalidThumbnailSize);
        }

        self.face_profile.validate()?;
        self.eye_profile.validate()?;

        let validator = self
            .validator
            .unwrap_or_else(|| Box::new(EyeContainmentValidator));
        let sheet_builder = self.sheet_builder.unwrap_or_default();
        if self.thumbnail_size > sheet_builder.layout().cell_size {
            warn!(
                "Thumbnails ({}px) are larger than grid cells ({}px) and will overlap",
                self.thumbnail_size,
                sheet_builder.layout().cell_size
            );
        }
        if !sheet_builder.has_font() {
            warn!("No caption font configured, sheets will have blank banners");
        }

        Ok(SearchPipeline::new(
            self.ocr,
            self.ocr_preprocessors,
            DetectorPass {
                detector: self.face_detector,
                profile: self.face_profile,
            },
            DetectorPass {
                detector: self.eye_detector,
                profile: self.eye_profile,
            },
            validator,
            sheet_builder,
            self.thumbnail_size,
        ))
    }
}
