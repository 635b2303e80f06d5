//! Document part accessor for an unpacked .docx directory.
//!
//! A `.docx` package unpacked to a directory keeps its main content at
//! `word/document.xml` and its settings at `word/settings.xml`. This module
//! loads and persists the main part as an [`Element`] tree and provides the
//! namespace-aware traversal (paragraphs, runs, text leaves) that the edit
//! engine is built on.

use crate::error::{DocxError, Result};
use crate::xml::element::Element;
use crate::xml::namespace::{NamespaceMap, WORDML_NS};
use std::fs;
use std::path::{Path, PathBuf};

/// Relative path of the main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Relative path of the settings part.
pub const SETTINGS_PART: &str = "word/settings.xml";

/// Accessor for the parts of an unpacked .docx directory.
///
/// The directory layout is produced by [`crate::docx::package::unpack`] (or
/// any OOXML-conformant unpacker); structural conformance is assumed, not
/// re-validated.
///
/// # Examples
///
/// ```rust,no_run
/// use redline::docx::UnpackedDocument;
///
/// let doc = UnpackedDocument::new("unpacked/");
/// let tree = doc.load()?;
/// println!("document text: {}", tree.text_content());
/// # Ok::<(), redline::DocxError>(())
/// ```
#[derive(Debug, Clone)]
pub struct UnpackedDocument {
    dir: PathBuf,
}

impl UnpackedDocument {
    /// Create an accessor for an unpacked .docx directory.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the unpacked directory.
    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the main document part.
    pub fn document_path(&self) -> PathBuf {
        self.dir.join(DOCUMENT_PART)
    }

    /// Path of the settings part.
    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_PART)
    }

    /// Load the main document part into an element tree.
    ///
    /// Fails with [`DocxError::PartNotFound`] when `word/document.xml` is
    /// absent and [`DocxError::Xml`] when it is malformed.
    pub fn load(&self) -> Result<Element> {
        let path = self.document_path();
        if !path.exists() {
            return Err(DocxError::PartNotFound(format!(
                "{} not found in {}",
                DOCUMENT_PART,
                self.dir.display()
            )));
        }
        Element::parse(&fs::read(&path)?)
    }

    /// Serialize the tree back to `word/document.xml` with the UTF-8
    /// declaration, overwriting the previous content.
    pub fn save(&self, root: &Element) -> Result<()> {
        fs::write(self.document_path(), root.to_document_xml())?;
        Ok(())
    }
}

/// All `w:p` elements under `root`, document order.
///
/// Paragraphs do not nest in WordprocessingML, so traversal does not descend
/// into a matched paragraph.
pub fn paragraphs<'a>(root: &'a Element, ns: &NamespaceMap) -> Vec<&'a Element> {
    let mut out = Vec::new();
    collect_paragraphs(root, ns, &mut out);
    out
}

fn collect_paragraphs<'a>(element: &'a Element, ns: &NamespaceMap, out: &mut Vec<&'a Element>) {
    if ns.element_is(element.tag(), WORDML_NS, "p") {
        out.push(element);
        return;
    }
    for child in element.children() {
        collect_paragraphs(child, ns, out);
    }
}

/// All `w:r` elements under `paragraph`, document order. Runs inside
/// tracked-change wrappers (`w:ins`) and similar containers are included.
pub fn runs<'a>(paragraph: &'a Element, ns: &NamespaceMap) -> Vec<&'a Element> {
    paragraph
        .descendants()
        .filter(|e| ns.element_is(e.tag(), WORDML_NS, "r"))
        .collect()
}

/// Concatenated live text (`w:t` leaves) under `element`, document order.
/// Deleted text (`w:delText`) does not count as live content.
pub fn text_of(element: &Element, ns: &NamespaceMap) -> String {
    let mut out = String::new();
    for descendant in element.descendants() {
        if ns.element_is(descendant.tag(), WORDML_NS, "t") {
            out.push_str(descendant.text());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DOC: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        r#"<w:body>"#,
        r#"<w:p><w:r><w:t xml:space="preserve">Revenue: </w:t></w:r><w:r><w:t>$100</w:t></w:r></w:p>"#,
        r#"<w:p><w:ins w:id="3" w:author="A" w:date="2024-01-01T00:00:00Z"><w:r><w:t>new</w:t></w:r></w:ins></w:p>"#,
        r#"</w:body></w:document>"#,
    );

    fn unpacked(doc_xml: &str) -> (TempDir, UnpackedDocument) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("word")).unwrap();
        fs::write(dir.path().join(DOCUMENT_PART), doc_xml).unwrap();
        let doc = UnpackedDocument::new(dir.path());
        (dir, doc)
    }

    #[test]
    fn test_load_missing_part_is_not_found() {
        let dir = TempDir::new().unwrap();
        let doc = UnpackedDocument::new(dir.path());
        assert!(matches!(doc.load(), Err(DocxError::PartNotFound(_))));
    }

    #[test]
    fn test_load_malformed_part_is_parse_error() {
        let (_dir, doc) = unpacked("<w:document><w:body>");
        assert!(matches!(doc.load(), Err(DocxError::Xml(_))));
    }

    #[test]
    fn test_paragraphs_and_runs_in_document_order() {
        let (_dir, doc) = unpacked(DOC);
        let root = doc.load().unwrap();
        let ns = NamespaceMap::from_root(&root);

        let paras = paragraphs(&root, &ns);
        assert_eq!(paras.len(), 2);
        assert_eq!(runs(paras[0], &ns).len(), 2);
        // Runs wrapped in w:ins still count.
        assert_eq!(runs(paras[1], &ns).len(), 1);
    }

    #[test]
    fn test_text_of_concatenates_live_text() {
        let (_dir, doc) = unpacked(DOC);
        let root = doc.load().unwrap();
        let ns = NamespaceMap::from_root(&root);
        let paras = paragraphs(&root, &ns);
        assert_eq!(text_of(paras[0], &ns), "Revenue: $100");
    }

    #[test]
    fn test_text_of_skips_deleted_text() {
        let xml = concat!(
            r#"<w:p xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            r#"<w:del w:id="1" w:author="A"><w:r><w:delText>gone</w:delText></w:r></w:del>"#,
            r#"<w:r><w:t>kept</w:t></w:r></w:p>"#,
        );
        let p = Element::parse(xml.as_bytes()).unwrap();
        let ns = NamespaceMap::from_root(&p);
        assert_eq!(text_of(&p, &ns), "kept");
    }

    #[test]
    fn test_save_round_trip_is_byte_stable() {
        let (_dir, doc) = unpacked(DOC);
        let root = doc.load().unwrap();
        doc.save(&root).unwrap();
        let first = fs::read(doc.document_path()).unwrap();

        let reloaded = doc.load().unwrap();
        doc.save(&reloaded).unwrap();
        let second = fs::read(doc.document_path()).unwrap();
        assert_eq!(first, second);
    }
}
