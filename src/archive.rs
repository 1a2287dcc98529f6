//! Agent package archiving
//!
//! The finished environment directory is compressed into a gzip tarball,
//! archived under its own basename so extraction yields a single directory.

use std::fs::File;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::info;

use crate::error::{PackagerError, Result};

/// Compress `source` into a `.tar.gz` at `destination`.
pub fn create_tarball(source: &Path, destination: &Path) -> Result<()> {
    info!("Creating tar.gz archive: {}...", destination.display());

    let archive_failed = |reason: String| PackagerError::ArchiveCreateFailed {
        path: destination.display().to_string(),
        reason,
    };

    let arcname = source
        .file_name()
        .ok_or_else(|| archive_failed("source directory has no basename".to_string()))?;

    let file = File::create(destination).map_err(|e| archive_failed(e.to_string()))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder
        .append_dir_all(arcname, source)
        .map_err(|e| archive_failed(e.to_string()))?;
    let encoder = builder
        .into_inner()
        .map_err(|e| archive_failed(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| archive_failed(e.to_string()))?;
    Ok(())
}
