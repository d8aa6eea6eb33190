use tracing::debug;

use crate::{
    error::{FacesheetError, Result},
    traits::ObjectDetector,
    types::{DetectionProfile, Document, RawDetection},
};

/// `detect_multi_scale` arguments for one pass, taken from a [`DetectionProfile`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeParams {
    pub scale_factor: f64,
    pub min_neighbors: i32,
    /// `(width, height)`
    pub min_size: (i32, i32),
    /// `(width, height)`
    pub max_size: (i32, i32),
}

impl CascadeParams {
    pub fn from_profile(profile: &DetectionProfile) -> Result<Self> {
        profile.validate()?;

        let int = |value: u32, field: &str| {
            i32::try_from(value).map_err(|_| {
                FacesheetError::InvalidProfile(format!("{} value {} is out of range", field, value))
            })
        };

        Ok(Self {
            scale_factor: f64::from(profile.scale_factor),
            min_neighbors: int(profile.min_neighbors, "min_neighbors")?,
            min_size: (int(profile.min_size[0], "min_size")?, int(profile.min_size[1], "min_size")?),
            max_size: (int(profile.max_size[0], "max_size")?, int(profile.max_size[1], "max_size")?),
        })
    }
}

/// A trained cascade classifier that scans a page's grayscale raster
/// over an image pyramid
pub trait MultiScaleCascade: Send + Sync {
    /// Shown in logs
    fn name(&self) -> &str;

    fn detect_multi_scale(&self, document: &Document, params: &CascadeParams) -> Result<Vec<RawDetection>>;
}

/// Object detector running a cascade with the pass's profile
pub struct CascadeDetector<C> {
    cascade: C,
}

impl<C: MultiScaleCascade> CascadeDetector<C> {
    pub fn new(cascade: C) -> Self {
        Self { cascade }
    }

    pub fn cascade(&self) -> &C {
        &self.cascade
    }
}

impl<C: MultiScaleCascade> ObjectDetector for CascadeDetector<C> {
    fn detect(&self, document: &Document, profile: &DetectionProfile) -> Result<Vec<RawDetection>> {
        let params = CascadeParams::from_profile(profile)?;
        let hits = self.cascade.detect_multi_scale(document, &params)?;
        debug!(
            "{}: {} hits in '{}' ({:?})",
            self.cascade.name(),
            hits.len(),
            document.id(),
            params
        );
        Ok(hits)
    }
}
