//! End-to-end tests for the full conversion pipeline
//!
//! Each test builds a Bambu-dialect source package with `ZipWriter`, runs
//! the converter, and inspects the produced archive.

use bambu2prusa::{Converter, Error};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Render one Bambu-style model file containing the given `(id, type)`
/// objects. The first triangle carries paint attributes so the attribute
/// mapping is exercised everywhere.
fn bambu_model(objects: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (id, object_type) in objects {
        body.push_str(&format!(
            r#"  <object id="{id}" p:UUID="{id}0000000-61cb-4c03-9d28-80fed5dfa1dc" type="{object_type}">
   <mesh>
    <vertices>
     <vertex x="0" y="0" z="0"/>
     <vertex x="10" y="0" z="0"/>
     <vertex x="0" y="10" z="0"/>
    </vertices>
    <triangles>
     <triangle v1="0" v2="1" v3="2" paint_color="FF0000" paint_seam="01"/>
    </triangles>
   </mesh>
  </object>
"#
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<model unit="millimeter" xml:lang="en-US" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02" xmlns:p="http://schemas.microsoft.com/3dmanufacturing/production/2015/06" requiredextensions="p">
 <metadata name="Application">BambuStudio-01.09.00.70</metadata>
 <resources>
{body} </resources>
 <build>
  <item objectid="1" printable="1"/>
 </build>
</model>
"#
    )
}

/// Write a source package containing the given `(entry name, contents)`
/// pairs.
fn write_source_package(path: &Path, entries: &[(&str, &str)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    for (name, contents) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn read_entry(archive_path: &Path, entry: &str) -> String {
    let mut archive = ZipArchive::new(File::open(archive_path).unwrap()).unwrap();
    let mut contents = String::new();
    archive
        .by_name(entry)
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    contents
}

fn entry_names(archive_path: &Path) -> Vec<String> {
    let mut archive = ZipArchive::new(File::open(archive_path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

fn convert(source: &Path, output: &Path) -> bambu2prusa::Result<()> {
    Converter::new(source, output).run()
}

#[test]
fn test_retains_only_model_objects_across_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("input.3mf");
    let output = dir.path().join("output.3mf");

    write_source_package(
        &source,
        &[(
            "3D/Objects/plate_1.model",
            &bambu_model(&[("1", "model"), ("2", "model"), ("3", "support")]),
        )],
    );

    convert(&source, &output).unwrap();

    let model = read_entry(&output, "3D/Objects/plate_1.model");
    assert_eq!(model.matches("<object ").count(), 2);
    assert!(model.contains(r#"<object id="1""#));
    assert!(model.contains(r#"<object id="2""#));
    assert!(!model.contains(r#"<object id="3""#));
}

#[test]
fn test_paint_attributes_mapped_to_prusa_schema() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("input.3mf");
    let output = dir.path().join("output.3mf");

    write_source_package(
        &source,
        &[("3D/Objects/plate_1.model", &bambu_model(&[("1", "model")]))],
    );

    convert(&source, &output).unwrap();

    let model = read_entry(&output, "3D/Objects/plate_1.model");
    assert!(model.contains(r#"slic3rpe:mmu_segmentation="FF0000""#));
    assert!(!model.contains("paint_color"));
    assert!(!model.contains("paint_seam"));
    assert!(!model.contains("p:UUID"));
}

#[test]
fn test_output_declares_exactly_the_prusa_namespaces() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("input.3mf");
    let output = dir.path().join("output.3mf");

    write_source_package(
        &source,
        &[("3D/Objects/plate_1.model", &bambu_model(&[("1", "model")]))],
    );

    convert(&source, &output).unwrap();

    let model = read_entry(&output, "3D/Objects/plate_1.model");
    assert!(model.contains(r#"xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02""#));
    assert!(model.contains(r#"xmlns:slic3rpe="http://schemas.slic3r.org/3mf/2017/06""#));
    assert!(!model.contains("requiredextensions"));
    assert!(!model.contains("production/2015/06"));
}

#[test]
fn test_one_relationship_entry_per_model_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("input.3mf");
    let output = dir.path().join("output.3mf");

    write_source_package(
        &source,
        &[
            ("3D/Objects/plate_1.model", &bambu_model(&[("1", "model")])),
            ("3D/Objects/plate_2.model", &bambu_model(&[("1", "model")])),
        ],
    );

    convert(&source, &output).unwrap();

    let names = entry_names(&output);
    assert!(names.contains(&"[Content_Types].xml".to_string()));
    assert!(names.contains(&"_rels/.rels".to_string()));
    assert!(names.contains(&"3D/Objects/plate_1.model".to_string()));
    assert!(names.contains(&"3D/Objects/plate_2.model".to_string()));

    let rels = read_entry(&output, "_rels/.rels");
    assert_eq!(rels.matches("<Relationship ").count(), 2);
    assert!(rels.contains(r#"Target="/3D/Objects/plate_1.model" Id="rel-1""#));
    assert!(rels.contains(r#"Target="/3D/Objects/plate_2.model" Id="rel-2""#));
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("input.3mf");

    write_source_package(
        &source,
        &[
            (
                "3D/Objects/plate_1.model",
                &bambu_model(&[("1", "model"), ("2", "support")]),
            ),
            ("3D/Objects/plate_2.model", &bambu_model(&[("1", "model")])),
        ],
    );

    let first = dir.path().join("first.3mf");
    let second = dir.path().join("second.3mf");
    convert(&source, &first).unwrap();
    convert(&source, &second).unwrap();

    let first_bytes = std::fs::read(&first).unwrap();
    let second_bytes = std::fs::read(&second).unwrap();
    assert_eq!(first_bytes, second_bytes);
}

#[test]
fn test_package_without_objects_dir_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("input.3mf");
    let output = dir.path().join("output.3mf");

    write_source_package(&source, &[("Metadata/project.config", "{}")]);

    let err = convert(&source, &output).unwrap_err();
    assert!(matches!(err, Error::Assembly(_)));
    assert!(!output.exists());
}

#[test]
fn test_file_with_no_printable_objects_still_converts() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("input.3mf");
    let output = dir.path().join("output.3mf");

    write_source_package(
        &source,
        &[(
            "3D/Objects/plate_1.model",
            &bambu_model(&[("1", "support")]),
        )],
    );

    convert(&source, &output).unwrap();

    let model = read_entry(&output, "3D/Objects/plate_1.model");
    assert_eq!(model.matches("<object ").count(), 0);
    assert_eq!(model.matches("<item ").count(), 0);
    assert!(model.contains("<resources>"));
    assert!(model.contains("<build>"));
}

#[test]
fn test_unparsable_model_file_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("input.3mf");
    let output = dir.path().join("output.3mf");

    write_source_package(
        &source,
        &[
            (
                "3D/Objects/broken.model",
                "<model unit=\"millimeter\" xmlns=\"x\"><resources><object id=\"1\"></resources>",
            ),
            ("3D/Objects/plate_1.model", &bambu_model(&[("1", "model")])),
        ],
    );

    convert(&source, &output).unwrap();

    let names = entry_names(&output);
    assert!(names.contains(&"3D/Objects/plate_1.model".to_string()));
    assert!(!names.contains(&"3D/Objects/broken.model".to_string()));

    let rels = read_entry(&output, "_rels/.rels");
    assert_eq!(rels.matches("<Relationship ").count(), 1);
}

#[test]
fn test_every_source_batch_failing_aborts_assembly() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("input.3mf");
    let output = dir.path().join("output.3mf");

    write_source_package(
        &source,
        &[(
            "3D/Objects/broken.model",
            "<model unit=\"millimeter\" xmlns=\"x\"><resources><object id=\"1\"></resources>",
        )],
    );

    let err = convert(&source, &output).unwrap_err();
    assert!(matches!(err, Error::Assembly(_)));
    assert!(!output.exists());
}

#[test]
fn test_non_zip_input_is_extraction_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("input.3mf");
    let output = dir.path().join("output.3mf");
    std::fs::write(&source, b"definitely not an archive").unwrap();

    let err = convert(&source, &output).unwrap_err();
    assert!(matches!(err, Error::Zip(_)));
    assert!(!output.exists());
}

#[test]
fn test_missing_input_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output.3mf");

    let err = convert(&PathBuf::from("no-such-file.3mf"), &output).unwrap_err();
    assert!(matches!(err, Error::Input(_)));
}

#[test]
fn test_output_model_documents_reparse_as_xml() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("input.3mf");
    let output = dir.path().join("output.3mf");

    write_source_package(
        &source,
        &[(
            "3D/Objects/plate_1.model",
            &bambu_model(&[("1", "model"), ("2", "model")]),
        )],
    );

    convert(&source, &output).unwrap();

    let model = read_entry(&output, "3D/Objects/plate_1.model");
    let mut reader = quick_xml::Reader::from_str(&model);
    loop {
        match reader.read_event() {
            Ok(quick_xml::events::Event::Eof) => break,
            Ok(_) => {}
            Err(err) => panic!("output model is not well-formed XML: {}", err),
        }
    }
}
