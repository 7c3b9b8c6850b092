use std::fmt;

use crate::error::{Result, XmlError};
use crate::reader;
use crate::writer;

/// An owned XML element: name, ordered attributes, child elements and
/// optional text content.
///
/// Attribute order is preserved so that serialization is deterministic;
/// repeated writes of an unchanged tree yield byte-identical output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
    text: Option<String>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Parse a document; the tree of the single root element is returned.
    pub fn parse(source: &str) -> Result<Self> {
        reader::parse(source)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fail unless this element carries the expected tag name.
    pub fn expect_name(&self, expected: &str) -> Result<()> {
        if self.name == expected {
            Ok(())
        } else {
            Err(XmlError::UnexpectedElement {
                expected: expected.to_string(),
                found: self.name.clone(),
            })
        }
    }

    /// Set an attribute, replacing any previous value for the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attributes.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    /// Builder form of [`set_attribute`](Self::set_attribute).
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn require_attribute(&self, name: &str) -> Result<&str> {
        self.attribute(name).ok_or_else(|| XmlError::MissingAttribute {
            element: self.name.clone(),
            attribute: name.to_string(),
        })
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn add_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    #[must_use]
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn first_child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn require_child(&self, name: &str) -> Result<&XmlElement> {
        self.first_child(name).ok_or_else(|| XmlError::MissingChild {
            element: self.name.clone(),
            child: name.to_string(),
        })
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.text = if text.is_empty() { None } else { Some(text) };
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Text content of a named child, if both exist.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.first_child(name).and_then(XmlElement::text)
    }

    /// Parse a required attribute into any `FromStr` value, reporting the
    /// element and attribute name on failure.
    pub fn parse_attribute<T: std::str::FromStr>(&self, name: &str) -> Result<T> {
        let raw = self.require_attribute(name)?;
        raw.parse().map_err(|_| XmlError::InvalidValue {
            element: self.name.clone(),
            field: name.to_string(),
            value: raw.to_string(),
        })
    }

    /// Serialize this element (and its subtree) as an indented document
    /// without an XML declaration.
    pub fn to_xml_string(&self) -> Result<String> {
        writer::to_string(self)
    }

    /// Serialize as a full document with an XML declaration.
    pub fn to_document_string(&self) -> Result<String> {
        writer::to_document_string(self)
    }

    pub(crate) fn attributes_raw(&self) -> &[(String, String)] {
        &self.attributes
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_xml_string() {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}
