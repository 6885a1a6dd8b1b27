//! XML utilities for Maileon payloads.
//!
//! Documents are parsed into a small owned [`XmlElement`] tree. Parsing is
//! strict: DOCTYPE declarations are rejected outright, so no external or
//! internal entities are ever expanded, and only the predefined XML entities
//! and character references are decoded.

use std::fmt::Display;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::errors::{MaileonError, MaileonResult};

/// XML declaration prepended to request bodies.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// An element with its attributes, text content and child elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Creates an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text content, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Attributes in document order.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Value of an attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct children in document order.
    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All direct children with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Text of the first direct child with the given name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(XmlElement::text)
    }

    /// Returns true when the element carries `nil="true"`.
    pub fn is_nil(&self) -> bool {
        self.attribute("nil").map(|value| parse_boolean(Some(value))).unwrap_or(false)
    }

    /// Text content, or `None` for nil elements.
    pub fn nullable_text(&self) -> Option<&str> {
        if self.is_nil() {
            None
        } else {
            Some(self.text.as_deref().unwrap_or(""))
        }
    }

    /// Boolean content, or `None` for nil elements.
    pub fn nullable_bool(&self) -> Option<bool> {
        self.nullable_text().map(|text| parse_boolean(Some(text)))
    }

    /// Integer content, or `None` for nil elements.
    pub fn nullable_i32(&self) -> MaileonResult<Option<i32>> {
        self.parse_nullable()
    }

    /// Long integer content, or `None` for nil elements.
    pub fn nullable_i64(&self) -> MaileonResult<Option<i64>> {
        self.parse_nullable()
    }

    /// Floating point content, or `None` for nil elements.
    pub fn nullable_f64(&self) -> MaileonResult<Option<f64>> {
        self.parse_nullable()
    }

    fn parse_nullable<T>(&self) -> MaileonResult<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: Display,
    {
        match self.nullable_text() {
            None => Ok(None),
            Some(text) => text.trim().parse().map(Some).map_err(|e: T::Err| {
                MaileonError::client(format!(
                    "invalid value '{}' in element <{}>: {}",
                    text, self.name, e
                ))
            }),
        }
    }

    /// Sets the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Adds an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Appends a child element.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a child element in place.
    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Appends a text child, or a `nil="true"` child when the value is absent.
    pub fn push_value(&mut self, name: impl Into<String>, value: Option<&str>) {
        self.children.push(value_element(name, value));
    }

    /// Returns the first child with the given name, appending one if missing.
    pub fn child_or_insert(&mut self, name: &str) -> &mut XmlElement {
        let index = match self.children.iter().position(|child| child.name == name) {
            Some(index) => index,
            None => {
                self.children.push(XmlElement::new(name));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    /// Serializes the element without an XML declaration.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    /// Serializes the element as a complete document.
    pub fn to_document_string(&self) -> String {
        format!("{}{}", XML_DECLARATION, self.to_xml_string())
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push_str(&format!(" {}=\"{}\"", key, escape_xml(value)));
        }

        let text = self.text.as_deref().unwrap_or("");
        if text.is_empty() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        out.push_str(&escape_xml(text));
        for child in &self.children {
            child.write_to(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// Parses a document into its root element.
pub fn parse_document(xml: &str) -> MaileonResult<XmlElement> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                ensure_single_root(&root)?;
                stack.push(start_element(&e)?);
            }
            Ok(Event::Empty(e)) => {
                ensure_single_root(&root)?;
                let element = start_element(&e)?;
                close_element(element, &mut stack, &mut root);
            }
            Ok(Event::End(_)) => match stack.pop() {
                Some(element) => close_element(element, &mut stack, &mut root),
                None => return Err(parse_error("unexpected closing tag")),
            },
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| parse_error(format!("invalid text: {}", err)))?;
                append_text(&mut stack, &text)?;
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8(e.into_inner().into_owned())
                    .map_err(|err| parse_error(format!("invalid CDATA: {}", err)))?;
                append_text(&mut stack, &text)?;
            }
            Ok(Event::DocType(_)) => {
                return Err(parse_error("DOCTYPE declarations are not allowed"));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(parse_error(format!(
                    "error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            // Declarations, comments and processing instructions
            Ok(_) => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(parse_error(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| parse_error("document has no root element"))
}

fn parse_error(message: impl Display) -> MaileonError {
    MaileonError::client(format!("XML parse error: {}", message))
}

fn ensure_single_root(root: &Option<XmlElement>) -> MaileonResult<()> {
    match root {
        Some(existing) => Err(parse_error(format!(
            "content after root element <{}>",
            existing.name
        ))),
        None => Ok(()),
    }
}

fn start_element(e: &BytesStart<'_>) -> MaileonResult<XmlElement> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(|err| parse_error(format!("invalid element name: {}", err)))?
        .to_string();

    let mut element = XmlElement::new(name);
    for attribute in e.attributes() {
        let attribute =
            attribute.map_err(|err| parse_error(format!("invalid attribute: {}", err)))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|err| parse_error(format!("invalid attribute value: {}", err)))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn close_element(
    mut element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
) {
    // Indentation between child elements is not content.
    if !element.children.is_empty()
        && element.text.as_deref().map_or(false, |text| text.trim().is_empty())
    {
        element.text = None;
    }

    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn append_text(stack: &mut [XmlElement], text: &str) -> MaileonResult<()> {
    match stack.last_mut() {
        Some(current) => {
            current.text.get_or_insert_with(String::new).push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(parse_error("text outside of the root element")),
    }
}

fn value_element(name: impl Into<String>, value: Option<&str>) -> XmlElement {
    let element = XmlElement::new(name);
    match value {
        Some(value) => element.with_text(value),
        None => element.with_attribute("nil", "true"),
    }
}

/// Escape special characters for XML.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Builds the `<error><message>…</message></error>` document used by the API.
pub fn error_xml(message: &str) -> String {
    XmlElement::new("error")
        .with_child(XmlElement::new("message").with_text(message))
        .to_xml_string()
}

/// Wraps a number in a single element, e.g. `<count>42</count>`.
pub fn format_number(tag: &str, number: impl Display) -> String {
    XmlElement::new(tag).with_text(number.to_string()).to_xml_string()
}

/// Serializes a single key/value pair; an absent value becomes `nil="true"`.
pub fn key_value_pair_to_xml(key: &str, value: Option<&str>) -> String {
    value_element(key, value).to_xml_string()
}

/// Builds an element holding one child per pair.
pub fn key_value_pairs_to_element(root: &str, pairs: &[(&str, Option<&str>)]) -> XmlElement {
    let mut element = XmlElement::new(root);
    for (key, value) in pairs {
        element.push_value(*key, *value);
    }
    element
}

/// Serializes key/value pairs under a root element.
pub fn key_value_pairs_to_xml(root: &str, pairs: &[(&str, Option<&str>)]) -> String {
    key_value_pairs_to_element(root, pairs).to_xml_string()
}

/// Parses the API's lenient boolean representation.
///
/// `true`, `yes` and `1` (any case) are true; anything else, including an
/// absent value, is false.
pub fn parse_boolean(value: Option<&str>) -> bool {
    match value {
        Some(value) => {
            let value = value.trim();
            value.eq_ignore_ascii_case("true")
                || value.eq_ignore_ascii_case("yes")
                || value == "1"
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_nested_document() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <contacts count="2">
            <contact id="1"><email>a@example.com</email></contact>
            <contact id="2"><email>b@example.com</email></contact>
        </contacts>"#;

        let root = parse_document(xml).unwrap();

        assert_eq!(root.name(), "contacts");
        assert_eq!(root.attribute("count"), Some("2"));
        let emails: Vec<_> = root
            .children_named("contact")
            .filter_map(|c| c.child_text("email"))
            .collect();
        assert_eq!(emails, vec!["a@example.com", "b@example.com"]);
        assert_eq!(root.children()[1].attribute("id"), Some("2"));
    }

    #[test]
    fn test_predefined_entities_and_cdata() {
        let root = parse_document("<m>a &amp; b<![CDATA[ <raw> ]]></m>").unwrap();

        assert_eq!(root.text(), Some("a & b <raw> "));
    }

    #[test]
    fn test_leaf_text_is_verbatim() {
        let root = parse_document("<error>\n  <message>  padded  </message>\n</error>\n").unwrap();

        assert_eq!(root.text(), None);
        assert_eq!(root.child_text("message"), Some("  padded  "));
    }

    #[test]
    fn test_empty_leaf_has_no_text() {
        let root = parse_document("<error><message></message><code/></error>").unwrap();

        assert_eq!(root.child("message").map(XmlElement::text), Some(None));
        assert_eq!(root.child("code").map(XmlElement::text), Some(None));
    }

    #[test]
    fn test_rejects_doctype() {
        let xml = r#"<!DOCTYPE m [<!ENTITY e "boom">]><m>&e;</m>"#;

        let err = parse_document(xml).unwrap_err();
        assert!(err.to_string().contains("DOCTYPE"));
    }

    #[test]
    fn test_rejects_undeclared_entity() {
        assert!(parse_document("<m>&unknown;</m>").is_err());
    }

    #[test]
    fn test_rejects_malformed_documents() {
        assert!(parse_document("").is_err());
        assert!(parse_document("   ").is_err());
        assert!(parse_document("<a><b></a>").is_err());
        assert!(parse_document("<a>").is_err());
        assert!(parse_document("<a/><b/>").is_err());
        assert!(parse_document("text").is_err());
    }

    #[test]
    fn test_nil_handling() {
        let root = parse_document(
            r#"<c><name nil="true"/><age>42</age><score>1.5</score><active>yes</active></c>"#,
        )
        .unwrap();

        let name = root.child("name").unwrap();
        assert!(name.is_nil());
        assert_eq!(name.nullable_text(), None);
        assert_eq!(name.nullable_i32().unwrap(), None);
        assert_eq!(root.child("age").unwrap().nullable_i64().unwrap(), Some(42));
        assert_eq!(root.child("score").unwrap().nullable_f64().unwrap(), Some(1.5));
        assert_eq!(root.child("active").unwrap().nullable_bool(), Some(true));
        assert!(root.child("active").unwrap().nullable_i32().is_err());
    }

    #[test]
    fn test_error_xml() {
        assert_eq!(
            error_xml("a < b"),
            "<error><message>a &lt; b</message></error>"
        );
        let parsed = parse_document(&error_xml("a < b")).unwrap();
        assert_eq!(parsed.child_text("message"), Some("a < b"));
    }

    #[test]
    fn test_key_value_documents() {
        assert_eq!(key_value_pair_to_xml("name", Some("x")), "<name>x</name>");
        assert_eq!(key_value_pair_to_xml("name", None), r#"<name nil="true"/>"#);
        assert_eq!(
            key_value_pairs_to_xml("fields", &[("a", Some("1")), ("b", None)]),
            r#"<fields><a>1</a><b nil="true"/></fields>"#
        );
        assert_eq!(format_number("count", 42), "<count>42</count>");
    }

    #[test]
    fn test_child_or_insert() {
        let mut root = XmlElement::new("mailing");
        root.child_or_insert("settings").push_value("subject", Some("Hi"));
        root.child_or_insert("settings").push_value("preview", None);

        assert_eq!(root.children().len(), 1);
        assert_eq!(
            root.to_xml_string(),
            r#"<mailing><settings><subject>Hi</subject><preview nil="true"/></settings></mailing>"#
        );
    }

    #[test]
    fn test_document_string_has_declaration() {
        let doc = XmlElement::new("ping").to_document_string();

        assert!(doc.starts_with("<?xml"));
        assert!(doc.ends_with("<ping/>"));
    }

    #[test]
    fn test_parse_boolean() {
        assert!(parse_boolean(Some("TRUE")));
        assert!(parse_boolean(Some("Yes")));
        assert!(parse_boolean(Some("1")));
        assert!(!parse_boolean(Some("no")));
        assert!(!parse_boolean(Some("0")));
        assert!(!parse_boolean(None));
    }
}
