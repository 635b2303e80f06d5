//! Owned, mutable XML element tree.
//!
//! WordprocessingML parts are small enough to hold fully in memory, and the
//! edit engine needs positional child surgery (remove a run, splice new
//! nodes at its index), so parts are parsed into an owned [`Element`] tree
//! rather than streamed. Parsing is done with `quick-xml` events; the
//! serializer is hand-written so that output is deterministic: attributes
//! keep document order, empty elements self-close, and an unmodified tree
//! round-trips to identical bytes.

use crate::error::{DocxError, Result};
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

/// XML declaration written at the top of every persisted part.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// A namespace-qualified XML element.
///
/// Tag and attribute names are stored exactly as written (prefix included);
/// namespace resolution happens through [`crate::xml::NamespaceMap`]. Text
/// content is attached to the element that directly contains it, which is
/// how WordprocessingML uses text (only leaf elements such as `w:t` carry
/// character data).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name as written, e.g. `w:p`
    tag: String,
    /// Attributes in document order
    attributes: Vec<(String, String)>,
    /// Direct text content
    text: String,
    /// Child elements in document order
    children: Vec<Element>,
}

impl Element {
    /// Create a new element with no attributes, text, or children.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Get the tag name as written (prefix included).
    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Get the attributes in document order.
    #[inline]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Get an attribute value by its name as written.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing the value in place when the name already
    /// exists (keeps attribute order stable across edits).
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        for (k, v) in &mut self.attributes {
            if k == name {
                *v = value.to_string();
                return;
            }
        }
        self.attributes.push((name.to_string(), value.to_string()));
    }

    /// Remove an attribute by name. Returns the previous value, if any.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(index).1)
    }

    /// Get the direct text content.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set the direct text content.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    /// Get the child elements in document order.
    #[inline]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Get mutable access to the child elements.
    #[inline]
    pub fn children_mut(&mut self) -> &mut Vec<Element> {
        &mut self.children
    }

    /// Append a child element.
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Insert a child element at `index`, shifting later siblings right.
    pub fn insert_child(&mut self, index: usize, child: Element) {
        self.children.insert(index, child);
    }

    /// Remove and return the child element at `index`.
    pub fn remove_child(&mut self, index: usize) -> Element {
        self.children.remove(index)
    }

    /// Iterate this element and all descendants in document (pre-)order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Concatenated text of this element and all descendants, document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Parse an XML part into an element tree.
    ///
    /// Text is kept verbatim (no whitespace trimming — space inside `w:t` is
    /// significant), entities are unescaped, CDATA is treated as text, and
    /// comments/processing instructions are dropped.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    stack.push(Self::from_start(e)?);
                },
                Ok(Event::Empty(ref e)) => {
                    let element = Self::from_start(e)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        // A lone self-closing element is a complete document.
                        None => return Ok(element),
                    }
                },
                Ok(Event::Text(ref t)) => {
                    if let Some(current) = stack.last_mut() {
                        let raw = std::str::from_utf8(t.as_ref())?;
                        let text = unescape(raw)
                            .map_err(|e| DocxError::Xml(format!("Invalid entity: {}", e)))?;
                        current.text.push_str(&text);
                    }
                },
                Ok(Event::CData(ref t)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(std::str::from_utf8(t.as_ref())?);
                    }
                },
                Ok(Event::End(_)) => {
                    if let Some(element) = stack.pop() {
                        match stack.last_mut() {
                            Some(parent) => parent.children.push(element),
                            None => return Ok(element),
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Ok(_) => {}, // declaration, comments, processing instructions
                Err(e) => return Err(DocxError::Xml(format!("XML parsing error: {}", e))),
            }
            buf.clear();
        }

        Err(DocxError::Xml("No root element found".to_string()))
    }

    fn from_start(e: &BytesStart<'_>) -> Result<Self> {
        let tag = std::str::from_utf8(e.name().as_ref())?.to_string();
        let mut element = Element::new(&tag);

        for attr in e.attributes() {
            let attr = attr.map_err(|e| DocxError::Xml(format!("Invalid attribute: {}", e)))?;
            let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
            let raw = std::str::from_utf8(&attr.value)?;
            let value = unescape(raw)
                .map_err(|e| DocxError::Xml(format!("Invalid entity in attribute: {}", e)))?;
            element.attributes.push((key, value.into_owned()));
        }

        Ok(element)
    }

    /// Serialize the tree to an XML string (no declaration).
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    /// Serialize the tree with the UTF-8 XML declaration prepended, ready to
    /// be written back as a package part.
    pub fn to_document_xml(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);

        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            escape_attribute_into(value, out);
            out.push('"');
        }

        if self.children.is_empty() && self.text.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        escape_text_into(&self.text, out);
        for child in &self.children {
            child.write_xml(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

fn escape_text_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attribute_into(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// Document-order iterator over an element and its descendants.
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_tree() {
        let xml = br#"<w:p><w:r><w:t>Hello</w:t></w:r></w:p>"#;
        let p = Element::parse(xml).unwrap();
        assert_eq!(p.tag(), "w:p");
        assert_eq!(p.children().len(), 1);
        assert_eq!(p.children()[0].children()[0].text(), "Hello");
    }

    #[test]
    fn test_parse_keeps_attribute_order() {
        let xml = br#"<w:ins w:id="5" w:author="A" w:date="2024-01-01T00:00:00Z"/>"#;
        let ins = Element::parse(xml).unwrap();
        let keys: Vec<&str> = ins.attributes().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["w:id", "w:author", "w:date"]);
        assert_eq!(ins.attribute("w:id"), Some("5"));
    }

    #[test]
    fn test_parse_does_not_trim_text() {
        let xml = br#"<w:t xml:space="preserve"> spaced </w:t>"#;
        let t = Element::parse(xml).unwrap();
        assert_eq!(t.text(), " spaced ");
    }

    #[test]
    fn test_parse_unescapes_entities() {
        let xml = br#"<w:t>a &amp; b &lt; c</w:t>"#;
        let t = Element::parse(xml).unwrap();
        assert_eq!(t.text(), "a & b < c");
    }

    #[test]
    fn test_parse_malformed_xml_is_an_error() {
        let result = Element::parse(b"<w:p><w:r></w:p>");
        assert!(matches!(result, Err(DocxError::Xml(_))));
    }

    #[test]
    fn test_parse_empty_input_is_an_error() {
        assert!(matches!(Element::parse(b""), Err(DocxError::Xml(_))));
    }

    #[test]
    fn test_serialize_escapes_and_self_closes() {
        let mut t = Element::new("w:t");
        t.set_text("a & b");
        assert_eq!(t.to_xml(), "<w:t>a &amp; b</w:t>");

        let mut flag = Element::new("w:trackRevisions");
        flag.set_attribute("w:val", "\"on\"");
        assert_eq!(flag.to_xml(), r#"<w:trackRevisions w:val="&quot;on&quot;"/>"#);
    }

    #[test]
    fn test_round_trip_is_stable() {
        let xml = br#"<w:document xmlns:w="http://example"><w:body><w:p><w:r><w:t xml:space="preserve">Revenue: </w:t></w:r><w:r/></w:p></w:body></w:document>"#;
        let first = Element::parse(xml).unwrap().to_document_xml();
        let second = Element::parse(first.as_bytes()).unwrap().to_document_xml();
        assert_eq!(first, second);
    }

    #[test]
    fn test_child_surgery_preserves_order() {
        let mut p = Element::parse(b"<w:p><a/><b/><c/></w:p>").unwrap();
        let removed = p.remove_child(1);
        assert_eq!(removed.tag(), "b");
        p.insert_child(1, Element::new("x"));
        p.insert_child(2, Element::new("y"));
        let tags: Vec<&str> = p.children().iter().map(|c| c.tag()).collect();
        assert_eq!(tags, ["a", "x", "y", "c"]);
    }

    #[test]
    fn test_descendants_document_order() {
        let p = Element::parse(b"<p><r1><t1/></r1><r2/></p>").unwrap();
        let tags: Vec<&str> = p.descendants().map(|e| e.tag()).collect();
        assert_eq!(tags, ["p", "r1", "t1", "r2"]);
    }

    #[test]
    fn test_text_content_concatenates_leaves() {
        let p =
            Element::parse(b"<w:p><w:r><w:t>Revenue: </w:t></w:r><w:r><w:t>$100</w:t></w:r></w:p>")
                .unwrap();
        assert_eq!(p.text_content(), "Revenue: $100");
    }
}
