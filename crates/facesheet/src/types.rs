use image::{GrayImage, RgbImage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::{FacesheetError, Result};

/// A box exactly as a detector reported it, before validation.
///
/// Serialized as a `[x, y, width, height]` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i64; 4]", into = "[i64; 4]")]
pub struct RawDetection {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl From<[i64; 4]> for RawDetection {
    fn from([x, y, width, height]: [i64; 4]) -> Self {
        Self { x, y, width, height }
    }
}

impl From<RawDetection> for [i64; 4] {
    fn from(raw: RawDetection) -> Self {
        [raw.x, raw.y, raw.width, raw.height]
    }
}

/// Axis-aligned pixel rectangle.
///
/// Field order matters: the derived `Ord` sorts lexicographically by
/// `(x, y, width, height)`, which is the order face candidates are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FacesheetError::MalformedBox {
                x: x.into(),
                y: y.into(),
                width: width.into(),
                height: height.into(),
            });
        }
        Ok(Self { x, y, width, height })
    }

    /// Right edge (`x + width`), inclusive for containment tests
    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.width)
    }

    /// Bottom edge (`y + height`), inclusive for containment tests
    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }

    /// Closed-rectangle point test: `x <= px <= x + w` and `y <= py <= y + h`
    pub fn contains_point(&self, px: u32, py: u32) -> bool {
        let (px, py) = (u64::from(px), u64::from(py));
        u64::from(self.x) <= px && px <= self.right() && u64::from(self.y) <= py && py <= self.bottom()
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl TryFrom<RawDetection> for BoundingBox {
    type Error = FacesheetError;

    fn try_from(raw: RawDetection) -> Result<Self> {
        let malformed = || FacesheetError::MalformedBox {
            x: raw.x,
            y: raw.y,
            width: raw.width,
            height: raw.height,
        };
        let coord = |v: i64| u32::try_from(v).map_err(|_| malformed());

        if raw.width <= 0 || raw.height <= 0 {
            return Err(malformed());
        }
        Ok(Self {
            x: coord(raw.x)?,
            y: coord(raw.y)?,
            width: coord(raw.width)?,
            height: coord(raw.height)?,
        })
    }
}

/// Parameters for one multi-scale detector pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectionProfile {
    /// Smallest window considered, `[width, height]`
    pub min_size: [u32; 2],
    /// Largest window considered, `[width, height]`
    pub max_size: [u32; 2],
    /// Scale step between pyramid levels
    #[schemars(range(min = 1.01, max = 3.0))]
    pub scale_factor: f32,
    /// Overlapping hits required before a window is reported
    pub min_neighbors: u32,
}

impl DetectionProfile {
    pub const MAX_SIZE: [u32; 2] = [300, 300];

    /// Face pass: larger windows, three neighbours required
    pub fn face() -> Self {
        Self {
            min_size: [50, 50],
            max_size: Self::MAX_SIZE,
            scale_factor: 1.31,
            min_neighbors: 3,
        }
    }

    /// Eye pass: small windows, every hit reported
    pub fn eye() -> Self {
        Self {
            min_size: [10, 10],
            max_size: Self::MAX_SIZE,
            scale_factor: 1.18,
            min_neighbors: 0,
        }
    }

    /// Whether a hit of this size could come out of a pass with this
    /// profile. Non-positive sizes are let through for validation to report.
    pub fn admits(&self, raw: &RawDetection) -> bool {
        if raw.width <= 0 || raw.height <= 0 {
            return true;
        }
        let within = |value: i64, min: u32, max: u32| (i64::from(min)..=i64::from(max)).contains(&value);
        within(raw.width, self.min_size[0], self.max_size[0])
            && within(raw.height, self.min_size[1], self.max_size[1])
    }

    /// Reject profiles no multi-scale detector can run with
    pub fn validate(&self) -> Result<()> {
        if self.scale_factor.is_nan() || self.scale_factor <= 1.0 {
            return Err(FacesheetError::InvalidProfile(format!(
                "scale_factor must be > 1 (got {})",
                self.scale_factor
            )));
        }
        if self.min_size[0] > self.max_size[0] || self.min_size[1] > self.max_size[1] {
            return Err(FacesheetError::InvalidProfile(format!(
                "min_size {:?} exceeds max_size {:?}",
                self.min_size, self.max_size
            )));
        }
        Ok(())
    }
}

/// Validated faces for one document, sorted and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceCandidateSet(Vec<BoundingBox>);

impl FaceCandidateSet {
    /// Sort lexicographically and collapse equal neighbours
    pub fn from_accepted(mut accepted: Vec<BoundingBox>) -> Self {
        accepted.sort();
        accepted.dedup();
        Self(accepted)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BoundingBox> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[BoundingBox] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<BoundingBox> {
        self.0
    }
}

impl<'a> IntoIterator for &'a FaceCandidateSet {
    type Item = &'a BoundingBox;
    type IntoIter = std::slice::Iter<'a, BoundingBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// How far a document has travelled through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum DocumentStage {
    Ingested,
    TextExtracted,
    FacesFiltered,
}

/// One scanned page: color raster, derived grayscale raster and the
/// results recorded against it as the pipeline advances.
#[derive(Debug, Clone)]
pub struct Document {
    id: String,
    pixels: RgbImage,
    grayscale: GrayImage,
    text: Option<String>,
    faces: Option<FaceCandidateSet>,
    stage: DocumentStage,
}

impl Document {
    /// Ingest a page, deriving its grayscale raster
    pub fn new(id: impl Into<String>, pixels: RgbImage) -> Self {
        let grayscale = image::imageops::grayscale(&pixels);
        Self {
            id: id.into(),
            pixels,
            grayscale,
            text: None,
            faces: None,
            stage: DocumentStage::Ingested,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn grayscale(&self) -> &GrayImage {
        &self.grayscale
    }

    pub fn stage(&self) -> DocumentStage {
        self.stage
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn faces(&self) -> Option<&FaceCandidateSet> {
        self.faces.as_ref()
    }

    /// Store the OCR output. Allowed exactly once, straight after ingest.
    pub fn record_text(&mut self, text: String) -> Result<()> {
        self.advance(DocumentStage::Ingested, DocumentStage::TextExtracted)?;
        self.text = Some(text);
        Ok(())
    }

    /// Store the validated faces. Requires the text to be recorded first.
    pub fn record_faces(&mut self, faces: FaceCandidateSet) -> Result<()> {
        self.advance(DocumentStage::TextExtracted, DocumentStage::FacesFiltered)?;
        self.faces = Some(faces);
        Ok(())
    }

    /// Case-sensitive exact substring match against the recorded text
    pub fn contains_phrase(&self, phrase: &str) -> Result<bool> {
        match &self.text {
            Some(text) => Ok(text.contains(phrase)),
            None => Err(FacesheetError::StageOrder {
                document: self.id.clone(),
                expected: DocumentStage::TextExtracted,
                found: self.stage,
            }),
        }
    }

    fn advance(&mut self, expected: DocumentStage, next: DocumentStage) -> Result<()> {
        if self.stage != expected {
            return Err(FacesheetError::StageOrder {
                document: self.id.clone(),
                expected,
                found: self.stage,
            });
        }
        self.stage = next;
        Ok(())
    }
}

/// Per-document line of a search report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMatch {
    pub id: String,
    pub matched: bool,
    pub faces: Vec<BoundingBox>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_size_window() {
        let face = DetectionProfile::face();
        assert!(face.admits(&RawDetection::from([0, 0, 50, 50])));
        assert!(face.admits(&RawDetection::from([0, 0, 300, 120])));
        assert!(!face.admits(&RawDetection::from([0, 0, 49, 80])));
        assert!(!face.admits(&RawDetection::from([0, 0, 80, 301])));
        assert!(face.admits(&RawDetection::from([0, 0, 0, 80])));
    }

    #[test]
    fn test_profile_validation() {
        assert!(DetectionProfile::face().validate().is_ok());
        assert!(DetectionProfile::eye().validate().is_ok());

        let flat = DetectionProfile { scale_factor: 1.0, ..DetectionProfile::face() };
        assert!(matches!(flat.validate(), Err(FacesheetError::InvalidProfile(_))));

        let inverted = DetectionProfile { min_size: [400, 40], ..DetectionProfile::face() };
        assert!(matches!(inverted.validate(), Err(FacesheetError::InvalidProfile(_))));
    }

    #[test]
    fn test_raw_detection_validation() {
        let ok = BoundingBox::try_from(RawDetection::from([3, 4, 10, 12])).unwrap();
        assert_eq!(ok, BoundingBox { x: 3, y: 4, width: 10, height: 12 });

        for raw in [[0, 0, 0, 5], [0, 0, 5, -1], [-1, 0, 5, 5], [0, -3, 5, 5]] {
            let result = BoundingBox::try_from(RawDetection::from(raw));
            assert!(matches!(result, Err(FacesheetError::MalformedBox { .. })), "{raw:?}");
        }
    }

    #[test]
    fn test_closed_containment() {
        let face = BoundingBox::new(10, 20, 30, 40).unwrap();
        assert!(face.contains_point(10, 20));
        assert!(face.contains_point(40, 60));
        assert!(face.contains_point(25, 30));
        assert!(!face.contains_point(41, 30));
        assert!(!face.contains_point(9, 30));
        assert!(!face.contains_point(25, 61));
    }

    #[test]
    fn test_candidate_set_sorts_and_dedups() {
        let a = BoundingBox::new(5, 5, 10, 10).unwrap();
        let b = BoundingBox::new(1, 9, 10, 10).unwrap();
        let c = BoundingBox::new(1, 2, 10, 10).unwrap();
        let set = FaceCandidateSet::from_accepted(vec![a, b, a, c, b]);
        assert_eq!(set.as_slice(), &[c, b, a]);
    }

    #[test]
    fn test_document_stages_cannot_be_skipped() {
        let mut doc = Document::new("page.png", RgbImage::new(4, 4));
        assert_eq!(doc.stage(), DocumentStage::Ingested);
        assert_eq!(doc.grayscale().dimensions(), (4, 4));

        let early = doc.record_faces(FaceCandidateSet::default());
        assert!(matches!(early, Err(FacesheetError::StageOrder { .. })));
        assert!(doc.contains_phrase("x").is_err());

        doc.record_text("Chris was here".to_string()).unwrap();
        assert!(doc.record_text("again".to_string()).is_err());
        doc.record_faces(FaceCandidateSet::default()).unwrap();
        assert_eq!(doc.stage(), DocumentStage::FacesFiltered);
    }

    #[test]
    fn test_phrase_match_is_case_sensitive() {
        let mut doc = Document::new("a-0.png", RgbImage::new(1, 1));
        doc.record_text("chris is here".to_string()).unwrap();
        assert!(!doc.contains_phrase("Chris").unwrap());
        assert!(doc.contains_phrase("chris").unwrap());
    }

    #[test]
    fn test_raw_detection_serializes_as_array() {
        let raw: Vec<RawDetection> = serde_json::from_str("[[1, 2, 3, 4]]").unwrap();
        assert_eq!(raw[0], RawDetection { x: 1, y: 2, width: 3, height: 4 });
        assert_eq!(serde_json::to_string(&raw[0]).unwrap(), "[1,2,3,4]");
    }
}
