//! Model transformation: Bambu dialect in, retained printable objects out
//!
//! Processing is a strict two-phase pipeline. Phase one is textual
//! normalization ([`rules`]): the raw source XML may declare namespaces,
//! proprietary UUID attributes, and encoding declarations incompatible with
//! a conformant parser, so an ordered list of rewrite rules scrubs the text
//! first. Phase two parses the normalized text and captures every printable
//! `object` element under the `resources` section.

pub mod rules;

use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// One retained printable object, as raw target-dialect XML.
#[derive(Debug, Clone)]
pub struct ExtractedObject {
    /// The object's `id` attribute, unique within its origin model file.
    pub id: String,
    /// The object's full XML subtree, `<object ...>...</object>`.
    pub xml: String,
}

/// Ordered mapping from retained object identifier to its raw subtree.
///
/// Scoped to one model file and discarded once injected. Document order is
/// preserved so repeated runs produce identical output.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    objects: Vec<ExtractedObject>,
}

impl ObjectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object subtree under `id`, replacing any earlier entry
    /// with the same identifier.
    pub fn insert(&mut self, id: String, xml: String) {
        if let Some(existing) = self.objects.iter_mut().find(|o| o.id == id) {
            existing.xml = xml;
        } else {
            self.objects.push(ExtractedObject { id, xml });
        }
    }

    /// Look up an object's subtree by identifier
    pub fn get(&self, id: &str) -> Option<&str> {
        self.objects
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.xml.as_str())
    }

    /// Iterate retained objects in document order
    pub fn iter(&self) -> impl Iterator<Item = &ExtractedObject> {
        self.objects.iter()
    }

    /// Number of retained objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the registry holds no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// The transformer's output for one model file.
#[derive(Debug)]
pub struct TransformedModel {
    /// Base file name of the source model file, reused verbatim on output.
    pub file_name: String,
    /// Retained printable objects.
    pub objects: ObjectRegistry,
}

/// Transform one Bambu model file into its retained-object form.
///
/// `file_name` is the file's base name; `content` is the raw model XML.
/// Returns a [`TransformedModel`] whose registry holds every object of type
/// `"model"` (or with no type attribute, which the 3MF core schema defaults
/// to model). Other object types are discarded without error; they
/// represent auxiliary geometry the Prusa schema cannot express.
///
/// # Errors
///
/// `Error::Transform` if the text fails to parse after normalization or an
/// object lacks its `id` attribute.
pub fn transform_model(file_name: &str, content: &str) -> Result<TransformedModel> {
    log::debug!("transforming model file '{}'", file_name);
    let normalized = normalize(content);
    let objects = extract_objects(&normalized)?;
    log::debug!(
        "'{}': retained {} printable object(s)",
        file_name,
        objects.len()
    );
    Ok(TransformedModel {
        file_name: file_name.to_string(),
        objects,
    })
}

/// Apply the full normalization pipeline to raw model text.
pub fn normalize(content: &str) -> String {
    let mut text = content.to_string();
    for rule in rules::REWRITE_RULES {
        text = rule.apply(&text);
        log::trace!("applied rewrite rule '{}'", rule.name);
    }
    text
}

/// Scan normalized model XML and capture retained object subtrees.
///
/// Objects are matched by local name so any namespace prefix is tolerated.
/// The captured subtree is the raw text span of the element, which keeps
/// its internal markup byte-for-byte intact for later splicing.
fn extract_objects(xml: &str) -> Result<ObjectRegistry> {
    let mut reader = Reader::from_str(xml);
    let mut registry = ObjectRegistry::new();
    let mut in_resources = false;

    loop {
        let tag_start = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"resources" => in_resources = true,
                b"object" if in_resources => {
                    let (id, object_type) = object_identity(e)?;
                    reader
                        .read_to_end(e.name())
                        .map_err(|err| unparsable(&err))?;
                    let subtree = xml[tag_start..reader.buffer_position() as usize].trim_start();
                    register(&mut registry, id, object_type, subtree);
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if in_resources && e.local_name().as_ref() == b"object" {
                    let (id, object_type) = object_identity(e)?;
                    let subtree = xml[tag_start..reader.buffer_position() as usize].trim_start();
                    register(&mut registry, id, object_type, subtree);
                }
            }
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"resources" {
                    in_resources = false;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(unparsable(&err)),
        }
    }

    Ok(registry)
}

fn unparsable(err: &quick_xml::Error) -> Error {
    Error::Transform(format!("XML unparsable after normalization: {}", err))
}

fn register(registry: &mut ObjectRegistry, id: String, object_type: Option<String>, subtree: &str) {
    // Absent type defaults to "model" per the 3MF core schema.
    let object_type = object_type.unwrap_or_else(|| "model".to_string());
    if object_type == "model" {
        registry.insert(id, subtree.to_string());
    } else {
        log::debug!("discarding object id {} of type '{}'", id, object_type);
    }
}

/// Read the `id` and `type` attributes off an object element.
fn object_identity(e: &BytesStart) -> Result<(String, Option<String>)> {
    let mut id = None;
    let mut object_type = None;

    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"id" => id = Some(attr_text(&attr.value)?),
            b"type" => object_type = Some(attr_text(&attr.value)?),
            _ => {}
        }
    }

    let id = id.ok_or_else(|| Error::missing_attribute("object", "id"))?;
    Ok((id, object_type))
}

fn attr_text(value: &[u8]) -> Result<String> {
    std::str::from_utf8(value)
        .map(str::to_string)
        .map_err(|e| Error::Transform(e.to_string()))
}
