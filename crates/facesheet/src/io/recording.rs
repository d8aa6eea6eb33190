use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use image::GrayImage;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::{
    error::{FacesheetError, Result},
    traits::{ObjectDetector, TextExtractor},
    types::{DetectionProfile, Document, RawDetection},
};

/// Which cascade a recorded box list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    Face,
    Eye,
}

/// Detector and OCR output captured for one page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedPage {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub faces: Vec<RawDetection>,
    #[serde(default)]
    pub eyes: Vec<RawDetection>,
}

/// Detector and OCR results produced ahead of time, keyed by document id.
///
/// ```json
/// { "documents": { "a-0.png": { "text": "...", "faces": [[x, y, w, h]], "eyes": [] } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub documents: BTreeMap<String, RecordedPage>,
}

impl Recording {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn page(&self, adapter: &str, document: &Document) -> Result<&RecordedPage> {
        self.documents
            .get(document.id())
            .ok_or_else(|| FacesheetError::adapter(adapter, document.id(), "no recorded entry"))
    }
}

/// Replays recorded face or eye boxes
#[derive(Debug, Clone)]
pub struct RecordedDetector {
    recording: Arc<Recording>,
    kind: DetectorKind,
}

impl RecordedDetector {
    pub fn new(recording: Arc<Recording>, kind: DetectorKind) -> Self {
        Self { recording, kind }
    }
}

impl ObjectDetector for RecordedDetector {
    fn detect(&self, document: &Document, profile: &DetectionProfile) -> Result<Vec<RawDetection>> {
        let adapter = format!("recorded {} detector", self.kind);
        let page = self.recording.page(&adapter, document)?;
        let recorded = match self.kind {
            DetectorKind::Face => &page.faces,
            DetectorKind::Eye => &page.eyes,
        };
        // replayed hits can only honour the profile's size window
        let boxes: Vec<RawDetection> = recorded
            .iter()
            .filter(|raw| profile.admits(raw))
            .copied()
            .collect();
        debug!(
            "Replaying {} of {} {} boxes for '{}' (window {:?}..={:?})",
            boxes.len(),
            recorded.len(),
            self.kind,
            document.id(),
            profile.min_size,
            profile.max_size
        );
        Ok(boxes)
    }
}

/// Replays recorded OCR text
#[derive(Debug, Clone)]
pub struct RecordedText {
    recording: Arc<Recording>,
}

impl RecordedText {
    pub fn new(recording: Arc<Recording>) -> Self {
        Self { recording }
    }
}

impl TextExtractor for RecordedText {
    fn extract_text(&self, document: &Document, _image: &GrayImage) -> Result<String> {
        const ADAPTER: &str = "recorded OCR";
        self.recording
            .page(ADAPTER, document)?
            .text
            .clone()
            .ok_or_else(|| FacesheetError::adapter(ADAPTER, document.id(), "no recorded text"))
    }
}
