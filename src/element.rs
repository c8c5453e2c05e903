//! Owned XML element tree used by every persistence path.
//!
//! Settings, presets and hair strategies all read and write their state as
//! named child elements. [`Element`] keeps a parsed document in memory so
//! readers can look fields up by name and tolerate missing ones.

use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{Error, Result};

/// A single XML element with attributes, text and child elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    /// Creates an empty element with the given tag name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates an element holding only text content.
    pub fn with_text(name: impl Into<String>, text: impl ToString) -> Self {
        Self {
            name: name.into(),
            text: text.to_string(),
            ..Self::default()
        }
    }

    /// Adds an attribute, builder style.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push((key.into(), value.to_string()));
        self
    }

    /// Appends a child element and returns a mutable reference to it.
    pub fn add_child(&mut self, child: Element) -> &mut Element {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Appends a text-only child element.
    pub fn add_text_child(&mut self, name: &str, text: impl ToString) {
        self.children.push(Element::with_text(name, text));
    }

    /// Appends a boolean child written as `true` or `false`.
    pub fn add_bool_child(&mut self, name: &str, value: bool) {
        self.add_text_child(name, if value { "true" } else { "false" });
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the first child with the given tag name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Returns every child with the given tag name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Returns the trimmed text of the named child.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.trim())
    }

    /// Parses the text of the named child.
    ///
    /// Returns `None` when the child is absent, `Some(Err(_))` when it is
    /// present but unparseable.
    pub fn child_parsed<T: FromStr>(&self, name: &str) -> Option<std::result::Result<T, T::Err>> {
        self.child_text(name).map(str::parse)
    }

    /// Reads a boolean child; accepts `true`/`false` in any case and `1`/`0`.
    pub fn child_bool(&self, name: &str) -> Option<bool> {
        let text = self.child_text(name)?;
        if text.eq_ignore_ascii_case("true") || text == "1" {
            Some(true)
        } else if text.eq_ignore_ascii_case("false") || text == "0" {
            Some(false)
        } else {
            tracing::warn!("Invalid boolean {text:?} in <{name}>");
            None
        }
    }

    // ========================================================================
    // Parsing
    // ========================================================================

    /// Parses a document and returns its root element.
    ///
    /// # Errors
    /// Returns an error for malformed XML or when the document has no root.
    pub fn parse(content: &str) -> Result<Element> {
        let mut reader = Reader::from_str(content);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    stack.push(element_from_start(&e)?);
                }
                Event::Empty(e) => {
                    let element = element_from_start(&e)?;
                    close_element(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if let Some(current) = stack.last_mut() {
                        current
                            .text
                            .push_str(&String::from_utf8(e.into_inner().into_owned())?);
                    }
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        Error::MalformedDocument("unexpected closing tag".to_string())
                    })?;
                    close_element(&mut stack, &mut root, element)?;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(Error::MalformedDocument(format!(
                "unclosed element <{}>",
                stack.last().map(|e| e.name.as_str()).unwrap_or_default()
            )));
        }

        root.ok_or_else(|| Error::MalformedDocument("missing root element".to_string()))
    }

    /// Parses a document from raw bytes, skipping a UTF-8 byte order mark.
    ///
    /// # Errors
    /// Returns an error for invalid UTF-8 or malformed XML.
    pub fn parse_bytes(data: &[u8]) -> Result<Element> {
        let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);
        let content = String::from_utf8(data.to_vec())?;
        Self::parse(&content)
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Serializes this element as a complete, indented document.
    ///
    /// # Errors
    /// Returns an error if XML serialization fails.
    pub fn to_document(&self) -> Result<String> {
        let mut output = Vec::new();
        let mut writer = Writer::new_with_indent(&mut output, b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        write_element(&mut writer, self)?;

        Ok(String::from_utf8(output)?)
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8(start.name().as_ref().to_vec())?);
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8(attr.key.as_ref().to_vec())?;
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn close_element(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    } else {
        return Err(Error::MalformedDocument(
            "multiple root elements".to_string(),
        ));
    }
    Ok(())
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.text.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if !element.text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(&element.text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
