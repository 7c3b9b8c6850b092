//! Event-stream parsing into the owned element tree.

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use crate::element::XmlElement;
use crate::error::{Result, XmlError};

pub(crate) fn parse(source: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(source);

    let mut root: Option<XmlElement> = None;
    // Elements whose closing tag has not been seen yet, outermost first.
    let mut open: Vec<XmlElement> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                open.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                attach(element, &mut open, &mut root)?;
            }
            Event::End(end) => {
                let mut element = open.pop().ok_or_else(|| XmlError::MismatchedClose {
                    expected: String::new(),
                    found: decode(end.name().as_ref()),
                })?;
                let closing = decode(end.name().as_ref());
                if element.name() != closing {
                    return Err(XmlError::MismatchedClose {
                        expected: element.name().to_string(),
                        found: closing,
                    });
                }
                // Whitespace between child elements is indentation, not
                // content.
                if !element.children().is_empty()
                    && element.text().is_some_and(|text| text.trim().is_empty())
                {
                    element.set_text(String::new());
                }
                attach(element, &mut open, &mut root)?;
            }
            Event::Text(text) => {
                if let Some(current) = open.last_mut() {
                    let raw = decode(&text);
                    let value = unescape(&raw)?;
                    if !value.is_empty() {
                        let mut combined = current.text().unwrap_or("").to_string();
                        combined.push_str(&value);
                        current.set_text(combined);
                    }
                }
            }
            Event::CData(data) => {
                if let Some(current) = open.last_mut() {
                    let mut combined = current.text().unwrap_or("").to_string();
                    combined.push_str(&decode(&data));
                    current.set_text(combined);
                }
            }
            Event::GeneralRef(reference) => {
                // Entity references inside text arrive as their own events.
                if let Some(current) = open.last_mut() {
                    let name = decode(&reference);
                    let resolved =
                        resolve_reference(&name).ok_or_else(|| XmlError::InvalidValue {
                            element: current.name().to_string(),
                            field: "entity".to_string(),
                            value: name.clone(),
                        })?;
                    let mut combined = current.text().unwrap_or("").to_string();
                    combined.push(resolved);
                    current.set_text(combined);
                }
            }
            Event::Eof => break,
            // Declarations, comments and processing instructions carry no
            // model content.
            _ => {}
        }
    }

    root.ok_or(XmlError::EmptyDocument)
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement> {
    let mut element = XmlElement::new(decode(start.name().as_ref()));
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = decode(attribute.key.as_ref());
        let raw = decode(&attribute.value);
        let value = unescape(&raw)?;
        element.set_attribute(key, value.into_owned());
    }
    Ok(element)
}

/// Hand a completed element to its parent, or install it as the root.
fn attach(
    element: XmlElement,
    open: &mut Vec<XmlElement>,
    root: &mut Option<XmlElement>,
) -> Result<()> {
    if let Some(parent) = open.last_mut() {
        parent.add_child(element);
        return Ok(());
    }
    if let Some(existing) = root {
        return Err(XmlError::TrailingContent {
            root: existing.name().to_string(),
        });
    }
    *root = Some(element);
    Ok(())
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Resolve a predefined or numeric character reference.
fn resolve_reference(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
