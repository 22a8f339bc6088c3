//! Template injection: merge retained objects into the Prusa skeleton
//!
//! Build items are plain elements and could be generated any number of
//! ways, but the retained object subtrees carry their own
//! namespace-qualified markup (`slic3rpe:` attributes) that must survive
//! byte-for-byte. quick-xml has no structural subtree-import operation, so
//! the subtrees are spliced into the serialized skeleton by targeted text
//! insertion immediately after the opening `resources` tag, and the spliced
//! document is re-parsed in full as round-trip validation.

use crate::error::{Error, Result};
use crate::template::Template;
use crate::transform::ObjectRegistry;
use quick_xml::Reader;
use quick_xml::events::Event;

/// Default placement transform applied to every injected build item.
///
/// Scales the object to the Prusa print volume and centers it on the bed;
/// the source package's per-plate placements are not portable.
pub const DEFAULT_ITEM_TRANSFORM: &str =
    "0.799151571 0 0 0 0.799151571 0 0 0 0.799151571 184.67373 221.31425 1.61151839";

/// Merge a model file's retained objects into the template skeleton.
///
/// Appends one build item per retained object (referencing it by
/// identifier, with the fixed default placement and `printable="1"`) and
/// splices each object subtree into the `resources` section. An empty
/// registry yields a valid document with empty build and resources
/// sections.
///
/// # Errors
///
/// `Error::Template` if the skeleton lacks its `resources` or `build`
/// section; `Error::Transform` if the spliced document fails to re-parse.
pub fn inject_objects(template: &Template, registry: &ObjectRegistry) -> Result<String> {
    let mut document = template.model_skeleton.clone();

    // Build items first, while the skeleton's landmarks are untouched.
    let close_build = document
        .find("</build>")
        .ok_or_else(|| Error::Template("Model skeleton has no build section".to_string()))?;
    let items: String = registry
        .iter()
        .map(|object| {
            format!(
                " <item objectid=\"{}\" transform=\"{}\" printable=\"1\"/>\n",
                object.id, DEFAULT_ITEM_TRANSFORM
            )
        })
        .collect();
    document.insert_str(close_build, &items);

    let open_resources = document
        .find("<resources>")
        .ok_or_else(|| Error::Template("Model skeleton has no resources section".to_string()))?;
    let subtrees: String = registry
        .iter()
        .map(|object| format!("\n{}", object.xml))
        .collect();
    document.insert_str(open_resources + "<resources>".len(), &subtrees);

    validate_document(&document)?;
    Ok(document)
}

/// Re-parse a spliced document end to end.
///
/// The splice step works on raw text, so this is the only place a broken
/// subtree or a malformed skeleton would surface before the file is
/// written into the output package.
fn validate_document(document: &str) -> Result<()> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => return Ok(()),
            Ok(_) => {}
            Err(err) => {
                return Err(Error::Transform(format!(
                    "Injected document failed to re-parse: {}",
                    err
                )));
            }
        }
    }
}
