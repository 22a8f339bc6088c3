//! # bambu2prusa
//!
//! Convert Bambu Studio 3MF project packages into PrusaSlicer-compatible
//! 3MF archives.
//!
//! 3MF files are ZIP-based containers following the Open Packaging
//! Conventions (OPC) standard. Bambu Studio layers its own dialect on top:
//! a proprietary default namespace, Production-extension UUID attributes,
//! and paint attributes PrusaSlicer does not understand. This crate
//! extracts the source package, normalizes and re-parses each model file,
//! injects the printable objects into a Prusa-schema template, and rebuilds
//! a valid OPC archive with correct internal relationships.
//!
//! ## Example
//!
//! ```no_run
//! use bambu2prusa::Converter;
//!
//! # fn main() -> bambu2prusa::Result<()> {
//! let converter = Converter::new("benchy.3mf", "benchy-prusa.3mf");
//! converter.run()?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod convert;
pub mod error;
pub mod inject;
pub mod opc;
pub mod template;
pub mod transform;

pub use convert::{Converter, default_output_path};
pub use error::{Error, Result};
pub use template::Template;
pub use transform::{ExtractedObject, ObjectRegistry, TransformedModel};
