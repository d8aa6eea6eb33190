use image::GrayImage;
use crate::{error::Result, traits::ImagePreprocessor};

/// Global binarisation at a fixed cut-off
#[derive(Debug, Clone)]
pub struct ThresholdPreprocessor {
    pub threshold: u8,
}

impl Default for ThresholdPreprocessor {
    fn default() -> Self {
        Self { threshold: 128 }
    }
}

impl ImagePreprocessor for ThresholdPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        Ok(imageproc::contrast::threshold(image, self.threshold))
    }
}

/// Local-mean binarisation, helps OCR on unevenly lit scans
#[derive(Debug, Clone)]
pub struct AdaptiveThresholdPreprocessor {
    /// Side of the square neighbourhood, in pixels
    pub block_size: u32,
}

impl Default for AdaptiveThresholdPreprocessor {
    fn default() -> Self {
        Self { block_size: 25 }
    }
}

impl ImagePreprocessor for AdaptiveThresholdPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        let block_radius = (self.block_size / 2).max(1);
        Ok(imageproc::contrast::adaptive_threshold(image, block_radius))
    }
}
