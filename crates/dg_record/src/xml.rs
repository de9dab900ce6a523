//! A small owned XML tree.
//!
//! Documents are parsed with `roxmltree` and written with `quick-xml`; the
//! codec itself only sees [`Element`]s, which it may consume destructively
//! (attributes are taken as they are understood).

use alloc::string::{FromUtf8Error, String, ToString};
use alloc::vec::Vec;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use thiserror::Error;

// -----------------------------------------------------------------------------
// XmlError

/// Failure of the XML adapter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum XmlError {
    #[error("malformed document: {0}")]
    Parse(#[from] roxmltree::Error),

    #[error("failed to write document: {0}")]
    Write(#[from] quick_xml::Error),

    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),

    #[error("written document is not UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

// -----------------------------------------------------------------------------
// Element

/// One element with its attributes, text and child elements.
///
/// Text is the concatenation of every text node directly inside the element.
/// Whitespace-only text is dropped when the element also has child elements,
/// so indentation never counts as content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
    line: u32,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    #[inline]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[inline]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    #[inline]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Line of the start tag, `0` for elements built in memory.
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// `true` if the element carries text other than whitespace.
    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|text| !text.trim().is_empty())
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    #[inline]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    #[inline]
    pub fn children_mut(&mut self) -> &mut [Element] {
        &mut self.children
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Removes and returns every child element.
    pub fn take_children(&mut self) -> Vec<Element> {
        core::mem::take(&mut self.children)
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    #[inline]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Removes the attribute `name`, marking it as understood.
    pub fn take_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(index).1)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Removes every remaining attribute.
    pub fn take_attributes(&mut self) -> Vec<(String, String)> {
        core::mem::take(&mut self.attributes)
    }
}

// -----------------------------------------------------------------------------
// Parsing

/// Parses a document and returns its root element.
///
/// # Examples
///
/// ```
/// let root = dg_record::xml::parse_document("<Defs>\n  <A defName=\"x\">5</A>\n</Defs>").unwrap();
///
/// assert_eq!(root.name(), "Defs");
/// assert_eq!(root.text(), None);
/// assert_eq!(root.children()[0].text(), Some("5"));
/// assert_eq!(root.children()[0].line(), 2);
/// ```
pub fn parse_document(text: &str) -> Result<Element, XmlError> {
    let document = roxmltree::Document::parse(text)?;
    Ok(convert_node(&document, document.root_element()))
}

fn convert_node(document: &roxmltree::Document<'_>, node: roxmltree::Node<'_, '_>) -> Element {
    let mut element = Element::new(node.tag_name().name())
        .with_line(document.text_pos_at(node.range().start).row);

    for attribute in node.attributes() {
        element
            .attributes
            .push((attribute.name().to_string(), attribute.value().to_string()));
    }

    let mut text = String::new();
    let mut has_text = false;
    for child in node.children() {
        if child.is_element() {
            element.children.push(convert_node(document, child));
        } else if child.is_text()
            && let Some(chunk) = child.text()
        {
            text.push_str(chunk);
            has_text = true;
        }
    }

    if has_text && !(element.has_children() && text.trim().is_empty()) {
        element.text = Some(text);
    }
    element
}

// -----------------------------------------------------------------------------
// Writing

/// Writes `root` as a document.
///
/// `indent` is the number of spaces per level; `None` writes a single line.
pub fn write_document(root: &Element, indent: Option<usize>) -> Result<String, XmlError> {
    let mut writer = match indent {
        Some(size) => Writer::new_with_indent(Vec::new(), b' ', size),
        None => Writer::new(Vec::new()),
    };
    write_element(&mut writer, root)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let text = element.text.as_deref().filter(|text| !text.is_empty());
    if text.is_none() && element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Element, parse_document, write_document};

    #[test]
    fn whitespace_between_children_is_dropped() {
        let root = parse_document("<a>\n  <b> padded </b>\n  <c/>\n</a>").unwrap();
        assert_eq!(root.text(), None);
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.children()[0].text(), Some(" padded "));
        assert_eq!(root.children()[1].text(), None);
        assert_eq!(root.children()[1].line(), 3);
    }

    #[test]
    fn mixed_content_keeps_text() {
        let root = parse_document("<a>\n 4\n <garbage/>\n</a>").unwrap();
        assert!(root.has_text());
        assert_eq!(root.text().map(str::trim), Some("4"));
        assert!(root.has_children());
    }

    #[test]
    fn malformed_document() {
        assert!(parse_document("<a><b></a>").is_err());
        assert!(parse_document("").is_err());
    }

    #[test]
    fn attributes_are_taken() {
        let mut root = parse_document(r#"<a defName="x" null="true"/>"#).unwrap();
        assert_eq!(root.take_attribute("defName").as_deref(), Some("x"));
        assert_eq!(root.take_attribute("defName"), None);
        assert_eq!(root.attributes().len(), 1);
    }

    #[test]
    fn written_text_is_escaped() {
        let root = Element::new("a")
            .with_child(Element::new("s").with_text("<tag> & more"))
            .with_child(Element::new("empty").with_attribute("null", "true"));

        let text = write_document(&root, None).unwrap();
        assert_eq!(
            text,
            r#"<a><s>&lt;tag&gt; &amp; more</s><empty null="true"/></a>"#
        );

        let back = parse_document(&text).unwrap();
        assert_eq!(back.children()[0].text(), Some("<tag> & more"));
    }

    #[test]
    fn pretty_output_keeps_text_inline() {
        let root = Element::new("a").with_child(Element::new("b").with_text("5"));
        let text = write_document(&root, Some(2)).unwrap();
        assert!(text.contains("\n  <b>5</b>\n"), "{text}");
    }
}
