//! XML and JSON codecs for [`Element`].
//!
//! Thin wrappers around `quick-xml` and `serde_json`. XML is the persisted
//! and replicated format; JSON is a convenience rendering for tooling.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};

use crate::element::Element;
use crate::error::XmlError;

/// Parse XML text into its root [`Element`].
///
/// Text nodes, comments, processing instructions and the XML declaration
/// are skipped.
///
/// # Errors
///
/// Returns [`XmlError`] if the text is not well formed or does not contain
/// exactly one root element.
pub fn parse(text: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => open.push(element_from(&start)?),
            Event::Empty(start) => {
                let element = element_from(&start)?;
                attach(&mut open, &mut root, element)?;
            }
            Event::End(end) => {
                let element = open.pop().ok_or_else(|| {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    XmlError::UnexpectedEnd(name)
                })?;
                attach(&mut open, &mut root, element)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = open.pop() {
        return Err(XmlError::Unclosed(unclosed.tag));
    }
    root.ok_or(XmlError::Empty)
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, XmlError> {
    let mut element = Element::new(std::str::from_utf8(start.name().as_ref())?);
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = std::str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = attribute.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    open: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    if let Some(parent) = open.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlError::MultipleRoots(element.tag));
    }
    *root = Some(element);
    Ok(())
}

/// Render an [`Element`] as indented XML text.
///
/// # Errors
///
/// Returns [`XmlError`] if the writer fails.
pub fn to_string(element: &Element) -> Result<String, XmlError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_element(&mut writer, element)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    element: &Element,
) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.tag.as_str());
    for (name, value) in &element.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.tag.as_str())))?;
    Ok(())
}

/// Render an [`Element`] as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`XmlError::Json`] if serialisation fails.
pub fn to_json(element: &Element) -> Result<String, XmlError> {
    Ok(serde_json::to_string_pretty(element)?)
}

/// Read an [`Element`] from its JSON rendering.
///
/// # Errors
///
/// Returns [`XmlError::Json`] if the text is not a valid element.
pub fn from_json(text: &str) -> Result<Element, XmlError> {
    Ok(serde_json::from_str(text)?)
}
