//! Error types for the Bambu-to-Prusa conversion pipeline
//!
//! All errors include error codes for categorization and enough context to
//! point at the failing package part.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: I/O and archive errors
//! - **E2xxx**: model transformation errors
//! - **E3xxx**: template and assembly errors
//!
//! ## Error Codes
//!
//! - `E1001`: I/O error
//! - `E1002`: ZIP archive format error
//! - `E1003`: input file missing or unreadable
//! - `E2001`: XML reader error
//! - `E2002`: model transform error
//! - `E3001`: template asset missing or malformed
//! - `E3002`: package assembly error

use std::io;
use thiserror::Error;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting a Bambu package
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading or writing package parts
    ///
    /// **Error Code**: E1001
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// ZIP archive error
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - Corrupted or truncated input archive
    /// - Input that is not a ZIP file at all
    #[error("[E1002] ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Input file missing or unreadable
    ///
    /// **Error Code**: E1003
    #[error("[E1003] Input error: {0}")]
    Input(String),

    /// XML reader error
    ///
    /// **Error Code**: E2001
    ///
    /// **Common Causes**:
    /// - Malformed XML syntax in a source model file
    /// - Unclosed tags
    #[error("[E2001] XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Model transform error
    ///
    /// **Error Code**: E2002
    ///
    /// **Common Causes**:
    /// - Model XML unparsable even after textual normalization
    /// - A required attribute (e.g. the object `id`) is absent
    ///
    /// Transform errors are scoped to one model file: the file is skipped
    /// and the rest of the batch proceeds.
    #[error("[E2002] Transform error: {0}")]
    Transform(String),

    /// Template asset missing or malformed
    ///
    /// **Error Code**: E3001
    ///
    /// **Common Causes**:
    /// - `--templates` directory lacking a required asset
    /// - A skeleton without the expected `resources`/`build` sections
    #[error("[E3001] Template error: {0}")]
    Template(String),

    /// Package assembly error
    ///
    /// **Error Code**: E3002
    ///
    /// Raised when no model files survived transformation (an archive
    /// with zero models is not a valid output) or when the staged tree
    /// cannot be zipped.
    #[error("[E3002] Assembly error: {0}")]
    Assembly(String),
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Transform(format!("Attribute parsing failed: {}", err))
    }
}

impl Error {
    /// Create a Transform error for a missing required attribute
    ///
    /// # Arguments
    /// * `element` - The XML element name
    /// * `attribute` - The missing attribute name
    pub fn missing_attribute(element: &str, attribute: &str) -> Self {
        Error::Transform(format!(
            "Element '<{}>' is missing required attribute '{}'",
            element, attribute
        ))
    }

    /// Create a Template error for a missing asset file
    pub fn missing_template(path: impl AsRef<std::path::Path>) -> Self {
        Error::Template(format!(
            "Missing template asset '{}'",
            path.as_ref().display()
        ))
    }
}
