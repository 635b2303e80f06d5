//! Track-changes toggle in the settings part.

use crate::docx::document::UnpackedDocument;
use crate::error::Result;
use crate::xml::element::Element;
use crate::xml::namespace::{NamespaceMap, WORDML_NS};
use std::fs;

/// Turn on revision tracking in `word/settings.xml`.
///
/// Reads the settings part if present, otherwise creates a minimal one, and
/// inserts `<w:trackRevisions/>` as the first child unless the flag already
/// exists anywhere in the part. Idempotent: calling it repeatedly never
/// duplicates the flag.
pub fn enable_track_changes(doc: &UnpackedDocument) -> Result<()> {
    let path = doc.settings_path();
    let mut root = if path.exists() {
        Element::parse(&fs::read(&path)?)?
    } else {
        let mut settings = Element::new("w:settings");
        settings.set_attribute("xmlns:w", WORDML_NS);
        settings
    };

    let ns = NamespaceMap::from_root(&root);
    let already_enabled = root
        .descendants()
        .any(|e| ns.element_is(e.tag(), WORDML_NS, "trackRevisions"));

    if !already_enabled {
        let prefix = ns.prefix_for(WORDML_NS).unwrap_or("w");
        let tag = if prefix.is_empty() {
            "trackRevisions".to_string()
        } else {
            format!("{}:trackRevisions", prefix)
        };
        root.insert_child(0, Element::new(&tag));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, root.to_document_xml())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_settings_part_when_absent() {
        let dir = TempDir::new().unwrap();
        let doc = UnpackedDocument::new(dir.path());
        enable_track_changes(&doc).unwrap();

        let root = Element::parse(&fs::read(doc.settings_path()).unwrap()).unwrap();
        assert_eq!(root.tag(), "w:settings");
        assert_eq!(root.children()[0].tag(), "w:trackRevisions");
    }

    #[test]
    fn test_inserts_flag_first_in_existing_settings() {
        let dir = TempDir::new().unwrap();
        let doc = UnpackedDocument::new(dir.path());
        fs::create_dir_all(dir.path().join("word")).unwrap();
        let existing = concat!(
            r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            r#"<w:zoom w:percent="100"/></w:settings>"#,
        );
        fs::write(doc.settings_path(), existing).unwrap();

        enable_track_changes(&doc).unwrap();

        let root = Element::parse(&fs::read(doc.settings_path()).unwrap()).unwrap();
        let tags: Vec<&str> = root.children().iter().map(|c| c.tag()).collect();
        assert_eq!(tags, ["w:trackRevisions", "w:zoom"]);
    }

    #[test]
    fn test_enable_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let doc = UnpackedDocument::new(dir.path());
        enable_track_changes(&doc).unwrap();
        enable_track_changes(&doc).unwrap();

        let root = Element::parse(&fs::read(doc.settings_path()).unwrap()).unwrap();
        let flags = root
            .descendants()
            .filter(|e| e.tag() == "w:trackRevisions")
            .count();
        assert_eq!(flags, 1);
    }
}
