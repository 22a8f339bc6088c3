//! Source package extraction
//!
//! A 3MF project package is a ZIP archive following the OPC standard. The
//! extractor unpacks the whole archive into the run's temporary extraction
//! directory; everything downstream works on plain files.

use crate::error::{Error, Result};
use std::fs::File;
use std::path::Path;
use zip::ZipArchive;

/// Unpack the archive at `archive` into `dest`.
///
/// `dest` must already exist (the caller owns the temporary directory).
/// Entry paths are sanitized by the zip crate, so a hostile archive cannot
/// write outside `dest`.
///
/// # Errors
///
/// `Error::Input` if the archive cannot be opened, `Error::Zip` if it is
/// not a valid ZIP file.
pub fn extract_package(archive: &Path, dest: &Path) -> Result<()> {
    log::debug!("extracting {} into {}", archive.display(), dest.display());

    let file = File::open(archive)
        .map_err(|e| Error::Input(format!("Cannot open '{}': {}", archive.display(), e)))?;
    let mut zip = ZipArchive::new(file)?;
    zip.extract(dest)?;

    log::debug!("extracted {} package part(s)", zip.len());
    Ok(())
}
