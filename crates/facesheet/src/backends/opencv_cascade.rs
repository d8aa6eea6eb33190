use std::path::Path;
use std::sync::Mutex;

use opencv::{
    core::{Mat, Rect, Size, Vector},
    objdetect::CascadeClassifier,
    prelude::*,
};

use crate::{
    backends::cascade::{CascadeParams, MultiScaleCascade},
    error::{FacesheetError, Result},
    types::{Document, RawDetection},
};

const ADAPTER: &str = "opencv cascade";

/// Haar or LBP cascade loaded from an OpenCV XML model,
/// e.g. `haarcascade_frontalface_default.xml`
pub struct OpenCvCascade {
    name: String,
    // detect_multi_scale needs &mut
    classifier: Mutex<CascadeClassifier>,
}

impl OpenCvCascade {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let name = path.as_ref().display().to_string();
        let fail = |message: String| FacesheetError::adapter(ADAPTER, "-", message);

        let classifier = CascadeClassifier::new(&name)
            .map_err(|e| fail(format!("failed to load '{}': {}", name, e)))?;
        if classifier.empty().map_err(|e| fail(e.to_string()))? {
            return Err(fail(format!("'{}' contains no cascade", name)));
        }

        Ok(Self {
            name,
            classifier: Mutex::new(classifier),
        })
    }
}

impl MultiScaleCascade for OpenCvCascade {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect_multi_scale(&self, document: &Document, params: &CascadeParams) -> Result<Vec<RawDetection>> {
        let fail = |message: String| FacesheetError::adapter(ADAPTER, document.id(), message);

        let gray = document.grayscale();
        let rows = i32::try_from(gray.height()).map_err(|_| fail("page too tall".to_string()))?;
        let cols = i32::try_from(gray.width()).map_err(|_| fail("page too wide".to_string()))?;
        let page = Mat::new_rows_cols_with_data(rows, cols, gray.as_raw())
            .map_err(|e| fail(format!("failed to wrap page: {}", e)))?;

        let mut objects = Vector::<Rect>::new();
        let mut classifier = self
            .classifier
            .lock()
            .map_err(|_| fail("cascade lock poisoned".to_string()))?;
        classifier
            .detect_multi_scale(
                &page,
                &mut objects,
                params.scale_factor,
                params.min_neighbors,
                0,
                Size::new(params.min_size.0, params.min_size.1),
                Size::new(params.max_size.0, params.max_size.1),
            )
            .map_err(|e| fail(format!("{}: {}", self.name, e)))?;

        Ok(objects
            .iter()
            .map(|r| RawDetection::from([r.x.into(), r.y.into(), r.width.into(), r.height.into()]))
            .collect())
    }
}
