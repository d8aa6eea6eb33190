use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tracing::{debug, info};
use zip::ZipArchive;

use crate::{error::Result, types::Document};

/// Upper bound on what a zip header can make us preallocate
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Buffer size to reserve for an entry whose header declares `declared` bytes
fn initial_capacity(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_PREALLOCATION)).unwrap_or(0)
}

/// Load every image in a zip archive as a document, in archive order
pub fn load_documents_from_zip<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let path = path.as_ref();
    info!("Reading documents from {:?}", path);
    let reader = BufReader::new(File::open(path)?);
    load_documents_from_reader(reader)
}

/// Same as [`load_documents_from_zip`] for an already opened archive
pub fn load_documents_from_reader<R: Read + Seek>(reader: R) -> Result<Vec<Document>> {
    let mut archive = ZipArchive::new(reader)?;
    let mut documents = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        let mut bytes = Vec::with_capacity(initial_capacity(entry.size()));
        entry.read_to_end(&mut bytes)?;

        let pixels = image::load_from_memory(&bytes)?.to_rgb8();
        debug!("Ingested '{}' ({}x{})", name, pixels.width(), pixels.height());
        documents.push(Document::new(name, pixels));
    }

    info!("Ingested {} documents", documents.len());
    Ok(documents)
}
