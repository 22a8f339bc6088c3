//! OPC (Open Packaging Conventions) handling for 3MF packages
//!
//! 3MF files are ZIP archives following the OPC standard, containing
//! various parts including per-plate model files and relationships.

pub mod assemble;
pub mod extract;

pub use assemble::PackageAssembler;
pub use extract::extract_package;

/// Directory holding per-plate model files within a 3MF archive
pub const OBJECTS_DIR: &str = "3D/Objects";

/// Content types file path
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

/// Relationships file path
pub const RELS_PATH: &str = "_rels/.rels";

/// Metadata directory
pub const METADATA_DIR: &str = "Metadata";

/// Model file extension within the objects directory
pub const MODEL_EXTENSION: &str = "model";

/// Relationship type marking a package part as a 3D model
///
/// This is the type PrusaSlicer's own packages carry for model parts.
pub const MODEL_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/3dmodel";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_constants() {
        assert_eq!(OBJECTS_DIR, "3D/Objects");
        assert_eq!(CONTENT_TYPES_PATH, "[Content_Types].xml");
        assert_eq!(RELS_PATH, "_rels/.rels");
        assert!(MODEL_REL_TYPE.ends_with("/3dmodel"));
    }
}
