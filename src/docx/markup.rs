//! Markup synthesis for runs and tracked changes.
//!
//! Builds the `w:r`, `w:ins`, and `w:del` elements the edit engine splices
//! into a document, and allocates the unique change identifiers that tracked
//! changes carry.
//!
//! # Architecture
//!
//! - [`Markup`]: element factory bound to the prefix of the main
//!   WordprocessingML namespace in one part
//! - [`RunFormatting`]: optional bold/italic flags for synthesized runs
//! - [`next_change_id`]: scans a tree for the highest existing `w:id`

use crate::error::{DocxError, Result};
use crate::xml::element::Element;
use crate::xml::namespace::{NamespaceMap, WORDML_NS};
use chrono::Utc;

/// Formatting flags for a synthesized run.
///
/// Unset flags add no run properties, so default-formatted output stays
/// minimal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunFormatting {
    /// Bold (`w:b`)
    pub bold: bool,
    /// Italic (`w:i`)
    pub italic: bool,
}

impl RunFormatting {
    /// No formatting.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether any run property element is needed.
    fn is_plain(&self) -> bool {
        !self.bold && !self.italic
    }
}

/// Find the next available tracked-change identifier.
///
/// Scans every element for a `w:id` attribute (namespace-resolved) and
/// returns one greater than the maximum found, or `1` when none exist.
/// Non-numeric identifier values are ignored; the counter saturates at
/// `u32::MAX` rather than wrapping back below existing identifiers.
pub fn next_change_id(root: &Element, ns: &NamespaceMap) -> u32 {
    let mut max_id = 0u32;
    for element in root.descendants() {
        for (key, value) in element.attributes() {
            if ns.attribute_is(key, WORDML_NS, "id") {
                if let Ok(id) = value.parse::<u32>() {
                    max_id = max_id.max(id);
                }
            }
        }
    }
    max_id.saturating_add(1)
}

/// Element factory for one document part.
///
/// Captures the prefix bound to the main WordprocessingML namespace so that
/// synthesized elements resolve in the part they are spliced into.
#[derive(Debug, Clone)]
pub struct Markup {
    /// Prefix for the main namespace, usually `w`; empty when the part binds
    /// it as the default namespace
    prefix: String,
}

impl Markup {
    /// Factory with the conventional `w` prefix, for freshly built parts.
    pub fn new() -> Self {
        Self {
            prefix: "w".to_string(),
        }
    }

    /// Factory bound to the prefix a part declares for the main namespace.
    ///
    /// Fails when the part declares no binding for it at all.
    pub fn from_namespaces(ns: &NamespaceMap) -> Result<Self> {
        let prefix = ns.prefix_for(WORDML_NS).ok_or_else(|| {
            DocxError::Xml("Document does not declare the WordprocessingML namespace".to_string())
        })?;
        Ok(Self {
            prefix: prefix.to_string(),
        })
    }

    fn name(&self, local: &str) -> String {
        if self.prefix.is_empty() {
            local.to_string()
        } else {
            format!("{}:{}", self.prefix, local)
        }
    }

    /// Build a text leaf (`w:t`), flagged with `xml:space="preserve"` when
    /// the text starts or ends with a space. Empty text is legal.
    pub fn text_leaf(&self, text: &str) -> Element {
        let mut t = Element::new(&self.name("t"));
        t.set_text(text);
        if needs_space_preservation(text) {
            t.set_attribute("xml:space", "preserve");
        }
        t
    }

    /// Build a run (`w:r`) with one text leaf and optional formatting.
    pub fn run(&self, text: &str, formatting: &RunFormatting) -> Element {
        let mut run = Element::new(&self.name("r"));
        if !formatting.is_plain() {
            let mut props = Element::new(&self.name("rPr"));
            if formatting.bold {
                props.add_child(Element::new(&self.name("b")));
            }
            if formatting.italic {
                props.add_child(Element::new(&self.name("i")));
            }
            run.add_child(props);
        }
        run.add_child(self.text_leaf(text));
        run
    }

    /// Build a tracked insertion (`w:ins`) wrapping one run.
    pub fn insertion(
        &self,
        text: &str,
        author: &str,
        change_id: u32,
        formatting: &RunFormatting,
    ) -> Element {
        let mut ins = Element::new(&self.name("ins"));
        self.stamp(&mut ins, author, change_id);
        ins.add_child(self.run(text, formatting));
        ins
    }

    /// Build a tracked deletion (`w:del`) wrapping one run whose leaf is
    /// deleted text (`w:delText`) rather than live text.
    pub fn deletion(&self, text: &str, author: &str, change_id: u32) -> Element {
        let mut del = Element::new(&self.name("del"));
        self.stamp(&mut del, author, change_id);

        let mut run = Element::new(&self.name("r"));
        let mut del_text = Element::new(&self.name("delText"));
        del_text.set_text(text);
        if needs_space_preservation(text) {
            del_text.set_attribute("xml:space", "preserve");
        }
        run.add_child(del_text);
        del.add_child(run);
        del
    }

    /// Stamp a tracked-change wrapper with its ID, author, and UTC timestamp.
    fn stamp(&self, element: &mut Element, author: &str, change_id: u32) {
        element.set_attribute(&self.name("id"), &change_id.to_string());
        element.set_attribute(&self.name("author"), author);
        element.set_attribute(&self.name("date"), &timestamp());
    }
}

impl Default for Markup {
    fn default() -> Self {
        Self::new()
    }
}

fn needs_space_preservation(text: &str) -> bool {
    text.starts_with(' ') || text.ends_with(' ')
}

/// Current UTC time in the OOXML revision date format.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
