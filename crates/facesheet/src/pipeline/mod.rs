pub mod builder;

use serde::Serialize;
use tracing::{debug, info};
use crate::{
    algorithms::{crop_faces, sanitize_detections, thumbnail_all},
    error::{FacesheetError, Result},
    sheet::{ContactSheet, SheetBuilder, compositor::stack_all},
    traits::{FaceValidator, ImagePreprocessor, ObjectDetector, TextExtractor},
    types::{DetectionProfile, Document, DocumentMatch, DocumentStage},
};

/// Caption written above a document's faces
pub fn results_caption(document_id: &str) -> String {
    format!("Results found in file {}", document_id)
}

/// One detector together with the parameters it runs with
pub struct DetectorPass {
    pub detector: Box<dyn ObjectDetector>,
    pub profile: DetectionProfile,
}

/// Result of a search over a document collection
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// All per-document sheets stacked in input order; `None` when no
    /// document contained the phrase
    #[serde(skip)]
    pub sheet: Option<ContactSheet>,
    /// Every input document, in input order
    pub documents: Vec<DocumentMatch>,
}

impl SearchOutcome {
    pub fn matched_count(&self) -> usize {
        self.documents.iter().filter(|d| d.matched).count()
    }

    /// Per-document report as pretty JSON
    pub fn report_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// OCR, face detection and sheet assembly over a document collection
pub struct SearchPipeline {
    ocr: Box<dyn TextExtractor>,
    ocr_preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    face_pass: DetectorPass,
    eye_pass: DetectorPass,
    validator: Box<dyn FaceValidator>,
    sheet_builder: SheetBuilder,
    thumbnail_size: u32,
}

impl SearchPipeline {
    /// Start a pipeline around the three required adapters
    pub fn builder<T, F, E>(ocr: T, face_detector: F, eye_detector: E) -> builder::PipelineBuilder
    where
        T: TextExtractor + 'static,
        F: ObjectDetector + 'static,
        E: ObjectDetector + 'static,
    {
        builder::PipelineBuilder::new(ocr, face_detector, eye_detector)
    }

    pub(crate) fn new(
        ocr: Box<dyn TextExtractor>,
        ocr_preprocessors: Vec<Box<dyn ImagePreprocessor>>,
        face_pass: DetectorPass,
        eye_pass: DetectorPass,
        validator: Box<dyn FaceValidator>,
        sheet_builder: SheetBuilder,
        thumbnail_size: u32,
    ) -> Self {
        Self {
            ocr,
            ocr_preprocessors,
            face_pass,
            eye_pass,
            validator,
            sheet_builder,
            thumbnail_size,
        }
    }

    /// Run OCR on the (optionally preprocessed) grayscale page and record the text
    pub fn extract_text(&self, document: &mut Document) -> Result<()> {
        let mut image = document.grayscale().clone();
        for preprocessor in &self.ocr_preprocessors {
            image = preprocessor.preprocess(&image)?;
        }

        let text = self.ocr.extract_text(document, &image)?;
        debug!("'{}': {} characters of text", document.id(), text.len());
        document.record_text(text)
    }

    /// Run both detector passes, validate faces against eyes and record them
    pub fn find_faces(&self, document: &mut Document) -> Result<()> {
        let faces = self.face_pass.detector.detect(document, &self.face_pass.profile)?;
        let eyes = self.eye_pass.detector.detect(document, &self.eye_pass.profile)?;

        let faces = sanitize_detections(document.id(), faces);
        let eyes = sanitize_detections(document.id(), eyes);
        let validated = self.validator.validate(&faces, &eyes);

        info!("'{}': {} faces found", document.id(), validated.len());
        document.record_faces(validated)
    }

    /// Crop, thumbnail and lay out the recorded faces of one document
    pub fn build_document_sheet(&self, document: &Document) -> Result<ContactSheet> {
        let faces = document.faces().ok_or_else(|| FacesheetError::StageOrder {
            document: document.id().to_string(),
            expected: DocumentStage::FacesFiltered,
            found: document.stage(),
        })?;

        let crops = crop_faces(document.pixels(), faces)?;
        let thumbnails = thumbnail_all(&crops, self.thumbnail_size)?;
        self.sheet_builder
            .build_sheet(&thumbnails, &results_caption(document.id()))
    }

    /// Take one freshly ingested document through every stage.
    /// Returns its sheet when the text contains `phrase`.
    pub fn process_document(&self, document: &mut Document, phrase: &str) -> Result<Option<ContactSheet>> {
        self.extract_text(document)?;
        self.find_faces(document)?;

        if !document.contains_phrase(phrase)? {
            debug!("'{}' does not mention '{}'", document.id(), phrase);
            return Ok(None);
        }
        self.build_document_sheet(document).map(Some)
    }

    /// Search every document for `phrase` and stack the sheets of the
    /// matching ones, in input order. Any adapter failure aborts the batch.
    pub fn search(&self, documents: &mut [Document], phrase: &str) -> Result<SearchOutcome> {
        info!("Searching {} documents for '{}'", documents.len(), phrase);

        let mut sheets = Vec::new();
        let mut report = Vec::with_capacity(documents.len());

        for document in documents.iter_mut() {
            info!("Processing '{}'", document.id());
            let sheet = self.process_document(document, phrase)?;

            report.push(DocumentMatch {
                id: document.id().to_string(),
                matched: sheet.is_some(),
                faces: document
                    .faces()
                    .map(|faces| faces.as_slice().to_vec())
                    .unwrap_or_default(),
            });
            sheets.extend(sheet);
        }

        let outcome = SearchOutcome {
            sheet: stack_all(sheets),
            documents: report,
        };
        info!(
            "'{}' found in {} of {} documents",
            phrase,
            outcome.matched_count(),
            outcome.documents.len()
        );
        Ok(outcome)
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: {} OCR preprocessors, face pass {:?}, eye pass {:?}, {}px thumbnails, caption font {}",
            self.ocr_preprocessors.len(),
            self.face_pass.profile,
            self.eye_pass.profile,
            self.thumbnail_size,
            if self.sheet_builder.has_font() { "loaded" } else { "missing" }
        )
    }
}
