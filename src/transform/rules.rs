//! Textual normalization rules for Bambu model XML
//!
//! Bambu Studio model files declare namespaces, proprietary UUID attributes,
//! and encoding declarations that a conformant parser operating on
//! already-decoded text cannot consume directly. These rules rewrite the raw
//! text into the Prusa dialect before any parse attempt; the parse step
//! itself validates the result.
//!
//! The rules form an ordered list and each is independently testable.

use regex::Regex;
use std::sync::LazyLock;

/// Opening model-root tag declaring exactly the Prusa schema namespaces.
///
/// Replaces whatever namespace soup the source root carried. The core 3MF
/// namespace plus the `slic3rpe` multi-material extension, with fixed
/// language/unit attributes.
pub const PRUSA_MODEL_ROOT: &str = r#"<model unit="millimeter" xml:lang="en-US" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02" xmlns:slic3rpe="http://schemas.slic3r.org/3mf/2017/06">"#;

/// Prusa's multi-material segmentation attribute name.
pub const MMU_SEGMENTATION_ATTR: &str = "slic3rpe:mmu_segmentation";

/// One named rewrite applied to raw model text before parsing.
pub struct RewriteRule {
    /// Stable rule name, surfaced in debug logging.
    pub name: &'static str,
    rewrite: fn(&str) -> String,
}

impl RewriteRule {
    /// Apply the rule to `input`, returning the rewritten text.
    pub fn apply(&self, input: &str) -> String {
        (self.rewrite)(input)
    }
}

/// The normalization pipeline, in application order.
///
/// Order matters: the root-tag rewrite runs after the namespace and UUID
/// strips so it never has to account for them, and the seam strip runs last
/// against the already-renamed paint attributes.
pub static REWRITE_RULES: &[RewriteRule] = &[
    RewriteRule {
        name: "strip-default-namespace",
        rewrite: strip_default_namespace,
    },
    RewriteRule {
        name: "strip-production-uuid",
        rewrite: strip_production_uuid,
    },
    RewriteRule {
        name: "strip-encoding-declaration",
        rewrite: strip_encoding_declaration,
    },
    RewriteRule {
        name: "rename-paint-color",
        rewrite: rename_paint_color,
    },
    RewriteRule {
        name: "rewrite-model-root",
        rewrite: rewrite_model_root,
    },
    RewriteRule {
        name: "strip-paint-seam",
        rewrite: strip_paint_seam,
    },
];

static DEFAULT_XMLNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s+xmlns="[^"]*""#).unwrap());

static PRODUCTION_UUID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s+p:UUID="[^"]*""#).unwrap());

static ENCODING_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s+encoding=['"][\w.-]+['"]"#).unwrap());

static MODEL_ROOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<model\s[^>]*>").unwrap());

static PAINT_SEAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s*paint_seam="[0-9A-Z]*""#).unwrap());

/// Remove the source default-namespace declarations.
///
/// Prefixed declarations (`xmlns:p=...`) are left alone; the prefixed
/// attributes they qualify get stripped or renamed by later rules.
fn strip_default_namespace(input: &str) -> String {
    DEFAULT_XMLNS.replace_all(input, "").into_owned()
}

/// Remove Bambu's Production-extension `p:UUID` attributes.
fn strip_production_uuid(input: &str) -> String {
    PRODUCTION_UUID.replace_all(input, "").into_owned()
}

/// Remove `encoding="..."` from the XML declaration.
///
/// The transformer operates on already-decoded text, so a declared
/// non-UTF-8 encoding would mislead the parser.
fn strip_encoding_declaration(input: &str) -> String {
    ENCODING_DECL.replace_all(input, "").into_owned()
}

/// Rename the Bambu paint-color attribute to Prusa's segmentation attribute.
fn rename_paint_color(input: &str) -> String {
    input.replace("paint_color", MMU_SEGMENTATION_ATTR)
}

/// Replace the opening model-root tag with [`PRUSA_MODEL_ROOT`].
fn rewrite_model_root(input: &str) -> String {
    MODEL_ROOT.replace(input, PRUSA_MODEL_ROOT).into_owned()
}

/// Remove the seam-painting attribute, which the Prusa schema rejects.
fn strip_paint_seam(input: &str) -> String {
    PAINT_SEAM.replace_all(input, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> &'static RewriteRule {
        REWRITE_RULES
            .iter()
            .find(|r| r.name == name)
            .expect("rule exists")
    }

    #[test]
    fn test_strip_default_namespace() {
        let input = r#"<model xmlns="http://schemas.bambulab.com/package/2021" unit="millimeter">"#;
        let out = rule("strip-default-namespace").apply(input);
        assert_eq!(out, r#"<model unit="millimeter">"#);
    }

    #[test]
    fn test_strip_default_namespace_keeps_prefixed() {
        let input = r#"<model xmlns:p="http://schemas.microsoft.com/3dmanufacturing/production/2015/06">"#;
        let out = rule("strip-default-namespace").apply(input);
        assert_eq!(out, input);
    }

    #[test]
    fn test_strip_production_uuid() {
        let input = r#"<object id="1" p:UUID="00000001-61cb-4c03-9d28-80fed5dfa1dc" type="model">"#;
        let out = rule("strip-production-uuid").apply(input);
        assert_eq!(out, r#"<object id="1" type="model">"#);
    }

    #[test]
    fn test_strip_encoding_declaration() {
        let input = r#"<?xml version="1.0" encoding="utf-8"?>"#;
        let out = rule("strip-encoding-declaration").apply(input);
        assert_eq!(out, r#"<?xml version="1.0"?>"#);

        let single_quoted = r#"<?xml version="1.0" encoding='UTF-8'?>"#;
        let out = rule("strip-encoding-declaration").apply(single_quoted);
        assert_eq!(out, r#"<?xml version="1.0"?>"#);
    }

    #[test]
    fn test_rename_paint_color() {
        let input = r#"<triangle v1="0" v2="1" v3="2" paint_color="4"/>"#;
        let out = rule("rename-paint-color").apply(input);
        assert_eq!(
            out,
            r#"<triangle v1="0" v2="1" v3="2" slic3rpe:mmu_segmentation="4"/>"#
        );
    }

    #[test]
    fn test_rewrite_model_root() {
        let input = r#"<model unit="millimeter" xml:lang="en-US" requiredextensions="p">"#;
        let out = rule("rewrite-model-root").apply(input);
        assert_eq!(out, PRUSA_MODEL_ROOT);
        assert!(out.contains("http://schemas.microsoft.com/3dmanufacturing/core/2015/02"));
        assert!(out.contains("http://schemas.slic3r.org/3mf/2017/06"));
    }

    #[test]
    fn test_rewrite_model_root_leaves_other_tags() {
        let input = r#"<modelmetadata value="x">"#;
        let out = rule("rewrite-model-root").apply(input);
        assert_eq!(out, input);
    }

    #[test]
    fn test_strip_paint_seam() {
        let input = r#"<triangle v1="0" v2="1" v3="2" paint_seam="01"/>"#;
        let out = rule("strip-paint-seam").apply(input);
        assert_eq!(out, r#"<triangle v1="0" v2="1" v3="2"/>"#);
    }

    #[test]
    fn test_rule_order_is_stable() {
        let names: Vec<&str> = REWRITE_RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            [
                "strip-default-namespace",
                "strip-production-uuid",
                "strip-encoding-declaration",
                "rename-paint-color",
                "rewrite-model-root",
                "strip-paint-seam",
            ]
        );
    }
}
