//! # Face Contact Sheet Library
//!
//! Searches scanned pages for a phrase, finds the faces on the matching pages
//! and tiles them into a captioned contact sheet per page, stacked into one
//! image for the whole collection.
//!
//! ## Core Features
//!
//! - **Face Filtering**: face detections are kept only when an eye detection
//!   is anchored inside them, then sorted and deduplicated
//! - **Contact Sheets**: fixed-width thumbnail grid under a caption banner
//! - **Trait-based Adapters**: plug in any face/eye detector and OCR engine
//! - **Archive Ingest**: read a zip of page images in archive order
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use facesheet::{DetectorKind, RecordedDetector, RecordedText, Recording, SearchPipeline};
//!
//! let recording = Arc::new(Recording::from_json_file("detections.json")?);
//! let pipeline = SearchPipeline::builder(
//!     RecordedText::new(recording.clone()),
//!     RecordedDetector::new(recording.clone(), DetectorKind::Face),
//!     RecordedDetector::new(recording, DetectorKind::Eye),
//! )
//! .build()?;
//!
//! let mut documents = facesheet::load_documents_from_zip("small_img.zip")?;
//! let outcome = pipeline.search(&mut documents, "Chris")?;
//! if let Some(sheet) = outcome.sheet {
//!     sheet.save("chris.png")?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod sheet;
pub mod pipeline;
pub mod io;
pub mod backends;

// Re-exports for convenience
pub use error::{FacesheetError, Result};
pub use types::{BoundingBox, DetectionProfile, Document, DocumentMatch, DocumentStage, FaceCandidateSet, RawDetection};
pub use traits::*;
pub use algorithms::*;
pub use sheet::{ContactSheet, NO_FACES_MESSAGE, SheetBuilder, SheetLayout, SheetStyle};
pub use sheet::annotate::annotate_faces;
pub use sheet::compositor::{stack, stack_all};
pub use pipeline::{SearchOutcome, SearchPipeline, builder::PipelineBuilder, results_caption};
pub use io::*;
pub use backends::{CascadeDetector, CascadeParams, MultiScaleCascade};
#[cfg(feature = "opencv")]
pub use backends::OpenCvCascade;
#[cfg(feature = "tesseract")]
pub use backends::TesseractExtractor;
