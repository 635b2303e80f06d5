//! Namespace handling utilities for WordprocessingML elements.
//!
//! Namespace bindings are carried as an explicit [`NamespaceMap`] value built
//! from a part's root element. There is no global prefix registry: every
//! component that needs namespace-aware matching receives the map it should
//! resolve against.

use crate::xml::element::Element;

/// WordprocessingML main namespace (`w`)
pub const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Office document relationships namespace (`r`)
pub const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// WordprocessingML drawing namespace (`wp`)
pub const WP_DRAWING_NS: &str =
    "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";

/// DrawingML main namespace (`a`)
pub const DRAWINGML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

/// Word 2010 extensions namespace (`w14`)
pub const WORDML_2010_NS: &str = "http://schemas.microsoft.com/office/word/2010/wordml";

/// The reserved `xml` namespace, always bound (carries `xml:space`)
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// A prefixed name split into its namespace URI and local part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName<'a> {
    /// Resolved namespace URI, if the prefix (or default namespace) is bound
    pub namespace_uri: Option<&'a str>,
    /// Local name without the prefix
    pub local_name: &'a str,
}

/// Prefix-to-URI bindings for one XML part.
///
/// Built from the `xmlns` / `xmlns:*` declarations on a part's root element.
/// Nested redeclarations are not tracked; WordprocessingML parts declare all
/// of their namespaces on the root.
#[derive(Debug, Clone, Default)]
pub struct NamespaceMap {
    /// (prefix, uri) pairs; the default namespace uses an empty prefix
    bindings: Vec<(String, String)>,
}

impl NamespaceMap {
    /// Create an empty map (only the built-in `xml` prefix resolves).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map with the conventional `w` binding, used when building
    /// fresh parts that carry no declarations yet.
    pub fn wordml() -> Self {
        let mut map = Self::new();
        map.bind("w", WORDML_NS);
        map
    }

    /// Collect the namespace declarations from a root element.
    pub fn from_root(root: &Element) -> Self {
        let mut map = Self::new();
        for (key, value) in root.attributes() {
            if key == "xmlns" {
                map.bind("", value);
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                map.bind(prefix, value);
            }
        }
        map
    }

    /// Bind a prefix to a namespace URI, replacing any previous binding.
    pub fn bind(&mut self, prefix: &str, uri: &str) {
        for (p, u) in &mut self.bindings {
            if p == prefix {
                *u = uri.to_string();
                return;
            }
        }
        self.bindings.push((prefix.to_string(), uri.to_string()));
    }

    fn uri_for(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NS);
        }
        self.bindings
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, u)| u.as_str())
    }

    /// Find a prefix bound to `uri`. Prefixed bindings win over the default
    /// namespace; the default namespace reports as an empty prefix.
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.bindings
            .iter()
            .filter(|(_, u)| u == uri)
            .map(|(p, _)| p.as_str())
            .max_by_key(|p| !p.is_empty())
    }

    /// Resolve an element tag name. Unprefixed names fall into the default
    /// namespace when one is declared.
    pub fn resolve_element<'a>(&'a self, tag: &'a str) -> QualifiedName<'a> {
        match tag.split_once(':') {
            Some((prefix, local)) => QualifiedName {
                namespace_uri: self.uri_for(prefix),
                local_name: local,
            },
            None => QualifiedName {
                namespace_uri: self.uri_for(""),
                local_name: tag,
            },
        }
    }

    /// Resolve an attribute name. Unlike elements, unprefixed attributes are
    /// never in the default namespace.
    pub fn resolve_attribute<'a>(&'a self, name: &'a str) -> QualifiedName<'a> {
        match name.split_once(':') {
            Some((prefix, local)) => QualifiedName {
                namespace_uri: self.uri_for(prefix),
                local_name: local,
            },
            None => QualifiedName {
                namespace_uri: None,
                local_name: name,
            },
        }
    }

    /// Check whether an element tag resolves to `(uri, local)`.
    pub fn element_is(&self, tag: &str, uri: &str, local: &str) -> bool {
        let name = self.resolve_element(tag);
        name.local_name == local && name.namespace_uri == Some(uri)
    }

    /// Check whether an attribute name resolves to `(uri, local)`.
    pub fn attribute_is(&self, name: &str, uri: &str, local: &str) -> bool {
        let qualified = self.resolve_attribute(name);
        qualified.local_name == local && qualified.namespace_uri == Some(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wordml_root() -> Element {
        let mut root = Element::new("w:document");
        root.set_attribute("xmlns:w", WORDML_NS);
        root.set_attribute("xmlns:r", RELATIONSHIPS_NS);
        root
    }

    #[test]
    fn test_from_root_collects_declarations() {
        let map = NamespaceMap::from_root(&wordml_root());
        assert!(map.element_is("w:p", WORDML_NS, "p"));
        assert!(!map.element_is("r:p", WORDML_NS, "p"));
        assert!(!map.element_is("w:p", WORDML_NS, "r"));
    }

    #[test]
    fn test_unbound_prefix_does_not_match() {
        let map = NamespaceMap::new();
        assert!(!map.element_is("w:p", WORDML_NS, "p"));
    }

    #[test]
    fn test_default_namespace_applies_to_elements_only() {
        let mut root = Element::new("document");
        root.set_attribute("xmlns", WORDML_NS);
        let map = NamespaceMap::from_root(&root);
        assert!(map.element_is("p", WORDML_NS, "p"));
        assert!(!map.attribute_is("id", WORDML_NS, "id"));
    }

    #[test]
    fn test_xml_prefix_is_builtin() {
        let map = NamespaceMap::new();
        assert!(map.attribute_is("xml:space", XML_NS, "space"));
    }

    #[test]
    fn test_prefix_for_prefers_prefixed_binding() {
        let mut map = NamespaceMap::new();
        map.bind("", WORDML_NS);
        map.bind("w", WORDML_NS);
        assert_eq!(map.prefix_for(WORDML_NS), Some("w"));
        assert_eq!(map.prefix_for(RELATIONSHIPS_NS), None);
    }

    #[test]
    fn test_attribute_resolution() {
        let map = NamespaceMap::from_root(&wordml_root());
        assert!(map.attribute_is("w:id", WORDML_NS, "id"));
        assert!(!map.attribute_is("id", WORDML_NS, "id"));
        assert!(map.attribute_is("r:id", RELATIONSHIPS_NS, "id"));
    }
}
