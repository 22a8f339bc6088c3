//! Output package assembly
//!
//! The assembler owns the run's staging directory: transformed model
//! documents are written under `3D/Objects/`, the static parts
//! (content-type descriptor, metadata) are cloned from the template, the
//! relationships document is built with one entry per model file, and the
//! staged tree is zipped into the output archive with root-relative paths.

use crate::error::{Error, Result};
use crate::opc::{CONTENT_TYPES_PATH, METADATA_DIR, MODEL_REL_TYPE, OBJECTS_DIR, RELS_PATH};
use crate::template::Template;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Staging-directory assembler for one conversion run.
///
/// Collects model documents as they are produced, then `finish` builds the
/// remaining package parts and zips everything into the output archive.
pub struct PackageAssembler {
    root: PathBuf,
    staged: Vec<String>,
}

impl PackageAssembler {
    /// Create an assembler rooted at `root` (the run's staging directory).
    pub fn new(root: &Path) -> Result<Self> {
        fs::create_dir_all(root.join(OBJECTS_DIR))?;
        Ok(Self {
            root: root.to_path_buf(),
            staged: Vec::new(),
        })
    }

    /// Write one model document under `3D/Objects/`, preserving the source
    /// file name so distinct build plates stay distinct files.
    pub fn stage_model(&mut self, file_name: &str, document: &str) -> Result<()> {
        let path = self.root.join(OBJECTS_DIR).join(file_name);
        fs::write(&path, document)?;
        log::debug!("staged model file '{}'", file_name);
        self.staged.push(file_name.to_string());
        Ok(())
    }

    /// File names staged so far, in staging order.
    pub fn staged(&self) -> &[String] {
        &self.staged
    }

    /// Build the static parts and relationships, then zip the staged tree
    /// into `output`.
    ///
    /// # Errors
    ///
    /// `Error::Assembly` if no models were staged (an archive with zero
    /// models is not a valid output) or zipping fails. A failed zip leaves
    /// no partial output file behind.
    pub fn finish(self, template: &Template, output: &Path) -> Result<()> {
        if self.staged.is_empty() {
            return Err(Error::Assembly(
                "No model files were produced; refusing to build an empty archive".to_string(),
            ));
        }

        fs::write(self.root.join(CONTENT_TYPES_PATH), &template.content_types)?;

        let rels = build_relationships(&template.rels_skeleton, &self.staged)?;
        fs::create_dir_all(self.root.join("_rels"))?;
        fs::write(self.root.join(RELS_PATH), rels)?;

        if !template.metadata.is_empty() {
            let metadata_dir = self.root.join(METADATA_DIR);
            fs::create_dir_all(&metadata_dir)?;
            for asset in &template.metadata {
                fs::write(metadata_dir.join(&asset.name), &asset.contents)?;
            }
        }

        let result = write_archive(&self.root, output);
        if result.is_err() {
            // No partial output on a failed assembly.
            let _ = fs::remove_file(output);
        }
        result
    }
}

/// Clone the relationships skeleton and append one entry per model file.
///
/// Ids are sequential starting at `rel-1`; targets are absolute part paths
/// under `/3D/Objects/`.
pub fn build_relationships(skeleton: &str, model_files: &[String]) -> Result<String> {
    let close = skeleton.find("</Relationships>").ok_or_else(|| {
        Error::Template("Relationships skeleton has no Relationships element".to_string())
    })?;

    let entries: String = model_files
        .iter()
        .enumerate()
        .map(|(index, name)| {
            format!(
                " <Relationship Target=\"/{}/{}\" Id=\"rel-{}\" Type=\"{}\"/>\n",
                OBJECTS_DIR,
                name,
                index + 1,
                MODEL_REL_TYPE
            )
        })
        .collect();

    let mut document = skeleton.to_string();
    document.insert_str(close, &entries);

    // The entries are built from file names, so re-parse before the
    // document lands in the package.
    let mut reader = Reader::from_str(&document);
    reader.config_mut().trim_text(true);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(Error::Assembly(format!(
                    "Relationships document failed to re-parse: {}",
                    err
                )));
            }
        }
    }

    Ok(document)
}

/// Zip the staged tree into `output`, paths relative to `root`.
///
/// Entries are written in sorted order so repeated runs produce identical
/// archives.
fn write_archive(root: &Path, output: &Path) -> Result<()> {
    let file = fs::File::create(output)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    paths.sort();

    for path in paths {
        let name = archive_entry_name(root, &path)?;
        zip.start_file(name.as_str(), options)
            .map_err(|e| Error::Assembly(format!("Failed to add '{}' to archive: {}", name, e)))?;
        let contents = fs::read(&path)?;
        zip.write_all(&contents)
            .map_err(|e| Error::Assembly(format!("Failed to write '{}': {}", name, e)))?;
    }

    zip.finish()
        .map_err(|e| Error::Assembly(format!("Failed to finalize archive: {}", e)))?;

    log::info!("assembled archive {}", output.display());
    Ok(())
}

/// Root-relative, forward-slash entry name for a staged file.
fn archive_entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| {
        Error::Assembly(format!("'{}' is outside the staging root", path.display()))
    })?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
