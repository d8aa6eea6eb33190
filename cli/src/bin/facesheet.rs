use clap::{Parser, Subcommand, ValueEnum};
use cli::SearchConfig;
use color_eyre::eyre::Result;
use color_eyre::eyre::eyre;
use facesheet::{
    DetectorKind, Document, ObjectDetector, PipelineBuilder, RecordedDetector, RecordedText,
    Recording, SearchPipeline, SheetBuilder, TextExtractor, annotate_faces, load_documents_from_zip,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OcrBackend {
    /// Use the text stored in the detections file
    Recorded,
    /// Run Tesseract on every page (needs the `tesseract` feature)
    Tesseract,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DetectorBackend {
    /// Use the boxes stored in the detections file
    Recorded,
    /// Run the OpenCV face and eye cascades (needs the `opencv` feature)
    Cascade,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a zip of scanned pages and write a contact sheet of the faces
    Search {
        /// Zip archive of page images
        #[arg(short, long)]
        archive: PathBuf,
        /// Phrase to look for (case-sensitive)
        #[arg(short, long)]
        phrase: String,
        /// Where to write the contact sheet (PNG)
        #[arg(short, long)]
        output: PathBuf,
        /// TOML or JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// JSON file of recorded face/eye detections (and text) per page,
        /// required by the recorded backends
        #[arg(short, long)]
        detections: Option<PathBuf>,
        /// Where page text comes from
        #[arg(long, value_enum, default_value = "recorded")]
        ocr: OcrBackend,
        /// Where face and eye boxes come from
        #[arg(long, value_enum, default_value = "recorded")]
        detector: DetectorBackend,
        /// Caption font, overrides `font_path` from the config
        #[arg(long)]
        font: Option<PathBuf>,
        /// Write each matching page with its faces outlined into this directory
        #[arg(long)]
        annotate_dir: Option<PathBuf>,
        /// Write a JSON report of every page
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print the JSON schema of the configuration file
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            archive,
            phrase,
            output,
            config,
            detections,
            ocr,
            detector,
            font,
            annotate_dir,
            report,
        } => {
            let config = match config {
                Some(path) => SearchConfig::from_file(&path)?,
                None => SearchConfig::default(),
            };
            let font = font.or_else(|| config.font_path.as_ref().map(PathBuf::from));
            search(
                &config,
                &archive,
                &phrase,
                &output,
                detections.as_deref(),
                Backends { ocr, detector },
                font.as_deref(),
                annotate_dir.as_deref(),
                report.as_deref(),
            )?;
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&SearchConfig::schema())?);
        }
    }

    Ok(())
}

#[derive(Clone, Copy, Debug)]
struct Backends {
    ocr: OcrBackend,
    detector: DetectorBackend,
}

#[allow(clippy::too_many_arguments)]
fn search(
    config: &SearchConfig,
    archive: &Path,
    phrase: &str,
    output: &Path,
    detections: Option<&Path>,
    backends: Backends,
    font: Option<&Path>,
    annotate_dir: Option<&Path>,
    report: Option<&Path>,
) -> Result<()> {
    let recording = match detections {
        Some(path) => {
            let recording = Recording::from_json_file(path)?;
            info!("Loaded recorded detections for {} pages", recording.documents.len());
            Some(Arc::new(recording))
        }
        None => None,
    };

    let pipeline = build_pipeline(config, recording, backends, font)?;
    info!("{}", pipeline.info());

    let mut documents = load_documents_from_zip(archive)?;
    let outcome = pipeline.search(&mut documents, phrase)?;

    match &outcome.sheet {
        Some(sheet) => {
            sheet.save(output)?;
            info!("✅ Contact sheet ({}x{}) saved to {:?}", sheet.width(), sheet.height(), output);
        }
        None => warn!("No page mentions '{}', nothing written", phrase),
    }

    if let Some(dir) = annotate_dir {
        write_annotations(dir, &documents, &outcome.documents)?;
    }

    if let Some(path) = report {
        std::fs::write(path, outcome.report_json()?)?;
        info!("📄 Report saved to {:?}", path);
    }

    Ok(())
}

fn build_pipeline(
    config: &SearchConfig,
    recording: Option<Arc<Recording>>,
    backends: Backends,
    font: Option<&Path>,
) -> Result<SearchPipeline> {
    let mut sheet_builder = SheetBuilder::new(config.layout.clone(), config.style.clone())?;
    if let Some(font) = font {
        sheet_builder = sheet_builder.with_font_file(font)?;
    }

    let text = text_extractor(config, recording.as_ref(), backends.ocr)?;
    let (faces, eyes) = detectors(config, recording.as_ref(), backends.detector)?;
    let mut builder = PipelineBuilder::new(text, faces, eyes)
        .face_profile(config.face_profile.clone())
        .eye_profile(config.eye_profile.clone())
        .thumbnail_size(config.thumbnail_size)
        .sheet_builder(sheet_builder);

    if let Some(block) = config.ocr_threshold_block {
        builder = builder.with_adaptive_threshold(block);
    }
    if config.accept_unvalidated_faces {
        builder = builder.accept_unvalidated_faces();
    }

    Ok(builder.build()?)
}

fn require_recording(recording: Option<&Arc<Recording>>, what: &str) -> Result<Arc<Recording>> {
    recording
        .cloned()
        .ok_or_else(|| eyre!("recorded {} need a --detections file", what))
}

fn text_extractor(
    config: &SearchConfig,
    recording: Option<&Arc<Recording>>,
    ocr: OcrBackend,
) -> Result<Box<dyn TextExtractor>> {
    match ocr {
        OcrBackend::Recorded => Ok(Box::new(RecordedText::new(require_recording(recording, "OCR results")?))),
        #[cfg(feature = "tesseract")]
        OcrBackend::Tesseract => Ok(Box::new(facesheet::TesseractExtractor::new(
            config.ocr_language.clone(),
        )?)),
        #[cfg(not(feature = "tesseract"))]
        OcrBackend::Tesseract => Err(eyre!(
            "Tesseract OCR ({}) requested but this build lacks the `tesseract` feature",
            config.ocr_language
        )),
    }
}

type DetectorPair = (Box<dyn ObjectDetector>, Box<dyn ObjectDetector>);

fn detectors(
    config: &SearchConfig,
    recording: Option<&Arc<Recording>>,
    backend: DetectorBackend,
) -> Result<DetectorPair> {
    match backend {
        DetectorBackend::Recorded => {
            let recording = require_recording(recording, "detections")?;
            let faces: Box<dyn ObjectDetector> =
                Box::new(RecordedDetector::new(recording.clone(), DetectorKind::Face));
            let eyes: Box<dyn ObjectDetector> = Box::new(RecordedDetector::new(recording, DetectorKind::Eye));
            Ok((faces, eyes))
        }
        #[cfg(feature = "opencv")]
        DetectorBackend::Cascade => {
            use facesheet::{CascadeDetector, OpenCvCascade};
            info!("Loading cascades {} and {}", config.face_cascade, config.eye_cascade);
            let faces: Box<dyn ObjectDetector> =
                Box::new(CascadeDetector::new(OpenCvCascade::from_file(&config.face_cascade)?));
            let eyes: Box<dyn ObjectDetector> =
                Box::new(CascadeDetector::new(OpenCvCascade::from_file(&config.eye_cascade)?));
            Ok((faces, eyes))
        }
        #[cfg(not(feature = "opencv"))]
        DetectorBackend::Cascade => Err(eyre!(
            "cascade detection ({}, {}) requested but this build lacks the `opencv` feature",
            config.face_cascade,
            config.eye_cascade
        )),
    }
}

fn write_annotations(
    dir: &Path,
    documents: &[Document],
    matches: &[facesheet::DocumentMatch],
) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    for (document, entry) in documents.iter().zip(matches).filter(|(_, m)| m.matched) {
        let stem = Path::new(document.id())
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("page");
        let path = dir.join(format!("{}_faces.png", stem));
        annotate_faces(document.pixels(), &entry.faces).save(&path)?;
        info!("Annotated '{}' -> {:?}", document.id(), path);
    }

    Ok(())
}
