//! Prints a [`Document`] through a `quick-xml` [`Writer`].

use super::{Config, Document, Element, Node};
use crate::errors::XmlError;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Prints a document using the default [`Config`]: no indentation, childless
/// elements are self-closed.
///
/// # Examples
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use xml_model::xml::{self, Element};
///
/// let doc = Element::new("book")
///     .with_attribute("lang", "en")
///     .with_child(Element::text("name", "Fish & Chips"))
///     .with_child(Element::new("author"))
///     .into();
/// assert_eq!(
///     xml::stringify(&doc).unwrap(),
///     r#"<book lang="en"><name>Fish &amp; Chips</name><author/></book>"#,
/// );
/// ```
pub fn stringify(doc: &Document) -> Result<String, XmlError> {
    stringify_with(doc, &Config::default())
}

/// Prints a document.
pub fn stringify_with(doc: &Document, config: &Config) -> Result<String, XmlError> {
    let mut writer = match config.indent {
        Some(indent) => Writer::new_with_indent(Vec::new(), indent.char, indent.size),
        None => Writer::new(Vec::new()),
    };
    for node in &doc.elements {
        write_node(&mut writer, node, config)?;
    }
    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node, config: &Config) -> Result<(), XmlError> {
    match node {
        Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        Node::Element(element) => write_element(writer, element, config)?,
    }
    Ok(())
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &Element,
    config: &Config,
) -> Result<(), XmlError> {
    let start = BytesStart::new(element.name.as_str()).with_attributes(
        element
            .attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str())),
    );
    if element.children.is_empty() && !config.expand_empty_elements {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child, config)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
