//! Static Prusa-schema template assets
//!
//! The target package is rebuilt around a fixed set of skeleton parts: a
//! model document with empty `resources`/`build` sections carrying the
//! Prusa namespace declarations, an empty relationships document, the
//! content-type descriptor, and optional metadata files. The assets are
//! versioned under `templates/3mf_template/` and embedded at compile time;
//! an alternate directory with the same layout can be loaded at runtime.

use crate::error::{Error, Result};
use crate::opc::{CONTENT_TYPES_PATH, METADATA_DIR, RELS_PATH};
use std::fs;
use std::path::Path;

/// Model skeleton path inside a template directory
///
/// The other asset paths mirror the package layout itself
/// ([`crate::opc::RELS_PATH`], [`crate::opc::CONTENT_TYPES_PATH`],
/// [`crate::opc::METADATA_DIR`]).
pub const MODEL_SKELETON_PATH: &str = "3D/3dmodel.model";

const BUNDLED_MODEL_SKELETON: &str = include_str!("../templates/3mf_template/3D/3dmodel.model");
const BUNDLED_RELS_SKELETON: &str = include_str!("../templates/3mf_template/_rels/.rels");
const BUNDLED_CONTENT_TYPES: &str =
    include_str!("../templates/3mf_template/[Content_Types].xml");

/// One static metadata file cloned verbatim into the output package.
#[derive(Debug, Clone)]
pub struct MetadataAsset {
    /// File name under the package's `Metadata/` directory
    pub name: String,
    /// Raw file contents
    pub contents: Vec<u8>,
}

/// The read-only target-schema skeleton shared across a run.
///
/// Safe to reuse across runs; nothing in the pipeline mutates it.
#[derive(Debug, Clone)]
pub struct Template {
    /// Prusa model document skeleton with empty `resources` and `build`
    pub model_skeleton: String,
    /// Empty OPC relationships document
    pub rels_skeleton: String,
    /// `[Content_Types].xml` contents
    pub content_types: String,
    /// Metadata files cloned into the output, sorted by name
    pub metadata: Vec<MetadataAsset>,
}

impl Template {
    /// The compile-time embedded template assets.
    pub fn bundled() -> Self {
        Self {
            model_skeleton: BUNDLED_MODEL_SKELETON.to_string(),
            rels_skeleton: BUNDLED_RELS_SKELETON.to_string(),
            content_types: BUNDLED_CONTENT_TYPES.to_string(),
            metadata: Vec::new(),
        }
    }

    /// Load template assets from a directory laid out like
    /// `templates/3mf_template/`.
    ///
    /// The model skeleton, relationships skeleton, and content-type
    /// descriptor are required; the `Metadata/` directory is optional and
    /// its files are picked up in sorted order.
    ///
    /// # Errors
    ///
    /// `Error::Template` if a required asset is missing or unreadable.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        log::debug!("loading template assets from {}", dir.display());
        let model_skeleton = read_asset(dir, MODEL_SKELETON_PATH)?;
        let rels_skeleton = read_asset(dir, RELS_PATH)?;
        let content_types = read_asset(dir, CONTENT_TYPES_PATH)?;

        let mut metadata = Vec::new();
        let metadata_dir = dir.join(METADATA_DIR);
        if metadata_dir.is_dir() {
            let mut entries: Vec<_> = fs::read_dir(&metadata_dir)?
                .collect::<std::io::Result<_>>()
                .map_err(Error::Io)?;
            entries.sort_by_key(|e| e.file_name());
            for entry in entries {
                if !entry.file_type()?.is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                let contents = fs::read(entry.path())?;
                metadata.push(MetadataAsset { name, contents });
            }
        }

        Ok(Self {
            model_skeleton,
            rels_skeleton,
            content_types,
            metadata,
        })
    }
}

fn read_asset(dir: &Path, rel: &str) -> Result<String> {
    let path = dir.join(rel);
    if !path.is_file() {
        return Err(Error::missing_template(&path));
    }
    fs::read_to_string(&path)
        .map_err(|e| Error::Template(format!("Unreadable template asset '{}': {}", path.display(), e)))
}
