use std::io::Cursor;

use image::{GrayImage, ImageFormat};
use leptess::LepTess;
use tracing::debug;

use crate::{
    error::{FacesheetError, Result},
    traits::TextExtractor,
    types::Document,
};

const ADAPTER: &str = "tesseract";

/// OCR through a local Tesseract install
#[derive(Debug, Clone)]
pub struct TesseractExtractor {
    language: String,
}

impl TesseractExtractor {
    /// Check that Tesseract starts with `language` data available
    pub fn new(language: impl Into<String>) -> Result<Self> {
        let language = language.into();
        LepTess::new(None, &language).map_err(|e| {
            FacesheetError::adapter(
                ADAPTER,
                "-",
                format!("failed to initialize with language '{}': {}", language, e),
            )
        })?;
        Ok(Self { language })
    }
}

impl TextExtractor for TesseractExtractor {
    fn extract_text(&self, document: &Document, image: &GrayImage) -> Result<String> {
        let fail = |message: String| FacesheetError::adapter(ADAPTER, document.id(), message);

        // a handle per call: LepTess is not Sync
        let mut lt = LepTess::new(None, &self.language)
            .map_err(|e| fail(format!("failed to initialize: {}", e)))?;

        // leptess wants encoded image data
        let mut png = Cursor::new(Vec::new());
        image.write_to(&mut png, ImageFormat::Png)?;
        lt.set_image_from_mem(png.get_ref())
            .map_err(|e| fail(format!("failed to set image: {}", e)))?;

        let text = lt
            .get_utf8_text()
            .map_err(|e| fail(format!("failed to read text: {}", e)))?;
        debug!("OCR read {} characters from '{}'", text.len(), document.id());
        Ok(text)
    }
}
