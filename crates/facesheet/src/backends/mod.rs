pub mod cascade;

#[cfg(feature = "opencv")]
pub mod opencv_cascade;
#[cfg(feature = "tesseract")]
pub mod tesseract;

pub use cascade::{CascadeDetector, CascadeParams, MultiScaleCascade};
#[cfg(feature = "opencv")]
pub use opencv_cascade::OpenCvCascade;
#[cfg(feature = "tesseract")]
pub use tesseract::TesseractExtractor;
