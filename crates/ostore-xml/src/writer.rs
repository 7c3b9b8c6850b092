//! Serialization of the element tree through `quick_xml::Writer`.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::element::XmlElement;
use crate::error::Result;

pub(crate) fn to_string(element: &XmlElement) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_element(&mut writer, element)?;
    into_string(writer)
}

pub(crate) fn to_document_string(element: &XmlElement) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, element)?;
    into_string(writer)
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name());
    for (key, value) in element.attributes_raw() {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children().is_empty() && element.text().is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = element.text() {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in element.children() {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name())))?;
    Ok(())
}

fn into_string(writer: Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner();
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
