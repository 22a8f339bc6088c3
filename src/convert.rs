//! Conversion orchestration
//!
//! One [`Converter::run`] drives a full conversion: extract the source
//! package, discover its model files, transform and inject each one, and
//! assemble the output archive. All per-run state lives in the `Converter`
//! value and two scoped temporary directories. Nothing is process-global,
//! and the temporary directories are removed on every exit path by drop.

use crate::error::{Error, Result};
use crate::inject;
use crate::opc::{self, PackageAssembler, extract_package};
use crate::template::Template;
use crate::transform;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Per-run conversion state: input/output paths plus the read-only template.
pub struct Converter {
    input: PathBuf,
    output: PathBuf,
    template: Template,
}

impl Converter {
    /// Create a converter using the bundled template assets.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self::with_template(input, output, Template::bundled())
    }

    /// Create a converter with an explicit template asset set.
    pub fn with_template(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        template: Template,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            template,
        }
    }

    /// Run one full conversion.
    ///
    /// Per-model-file transform failures are logged and the file is
    /// skipped; the rest of the batch proceeds. Everything else
    /// (extraction failures, template failures, an empty batch) aborts the
    /// run. Temporary directories are cleaned up on all paths.
    pub fn run(&self) -> Result<()> {
        log::info!(
            "converting {} -> {}",
            self.input.display(),
            self.output.display()
        );

        let extraction = tempfile::tempdir()?;
        extract_package(&self.input, extraction.path())?;

        let model_paths = discover_model_files(extraction.path());
        if model_paths.is_empty() {
            log::error!(
                "no model files found under {}/ in {}",
                opc::OBJECTS_DIR,
                self.input.display()
            );
            return Err(Error::Assembly(format!(
                "No model files found under {}",
                opc::OBJECTS_DIR
            )));
        }
        log::debug!("discovered {} model file(s)", model_paths.len());

        let staging = tempfile::tempdir()?;
        let mut assembler = PackageAssembler::new(staging.path())?;

        for path in &model_paths {
            let file_name = match path.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => continue,
            };

            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(err) => {
                    log::error!("skipping '{}': {}", file_name, err);
                    continue;
                }
            };

            let transformed = match transform::transform_model(&file_name, &content) {
                Ok(transformed) => transformed,
                Err(err) => {
                    log::error!("skipping '{}': {}", file_name, err);
                    continue;
                }
            };

            let document = match inject::inject_objects(&self.template, &transformed.objects) {
                Ok(document) => document,
                // A broken template asset dooms every file the same way.
                Err(err @ Error::Template(_)) => return Err(err),
                Err(err) => {
                    log::error!("skipping '{}': {}", file_name, err);
                    continue;
                }
            };

            assembler.stage_model(&transformed.file_name, &document)?;
        }

        assembler.finish(&self.template, &self.output)?;
        log::info!("output file created: {}", self.output.display());
        Ok(())
    }
}

/// Find every `*.model` file under the extracted package's objects
/// directory, recursively, in sorted order.
///
/// A package without the objects directory yields an empty list; the
/// caller turns that into the zero-models error.
pub fn discover_model_files(extraction_root: &Path) -> Vec<PathBuf> {
    let objects_dir = extraction_root.join(opc::OBJECTS_DIR);
    let mut paths: Vec<PathBuf> = WalkDir::new(&objects_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext == opc::MODEL_EXTENSION)
        })
        .collect();
    paths.sort();
    paths
}

/// Default output path: the input's base name with a `-prusa` suffix and a
/// `.3mf` extension. A trailing `.3mf` on the input is stripped first,
/// matched case-insensitively.
pub fn default_output_path(input: &Path) -> PathBuf {
    let name = input.to_string_lossy();
    let base = if name.len() >= 4
        && name.is_char_boundary(name.len() - 4)
        && name[name.len() - 4..].eq_ignore_ascii_case(".3mf")
    {
        &name[..name.len() - 4]
    } else {
        &name
    };
    PathBuf::from(format!("{}-prusa.3mf", base))
}
