//! Builds a [`Document`] from `quick-xml` reader events.

use super::{Config, Document, Element, Node};
use crate::errors::XmlError;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;

/// Parses XML text into a document using the default [`Config`].
///
/// # Examples
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use xml_model::xml::{self, Element};
///
/// let doc = xml::parse("<?xml version='1.0'?><!-- books --><book><name>Dune</name></book>").unwrap();
/// assert_eq!(
///     doc,
///     Element::new("book").with_child(Element::text("name", "Dune")).into(),
/// );
/// ```
pub fn parse(text: &str) -> Result<Document, XmlError> {
    parse_with(text, &Config::default())
}

/// Parses XML text into a document.
pub fn parse_with(text: &str, config: &Config) -> Result<Document, XmlError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(config.trim_text);

    let mut builder = TreeBuilder::new(config.keep_spaces);
    loop {
        let event = reader.read_event()?;
        if builder.feed(event, reader.decoder())? {
            break;
        }
    }
    builder.finish()
}

/// Parses XML from a buffered reader into a document.
///
/// With the `encoding` feature the document encoding is detected from the BOM
/// or the XML declaration, otherwise input is assumed to be UTF-8.
pub fn parse_reader<R: BufRead>(reader: R, config: &Config) -> Result<Document, XmlError> {
    let mut reader = Reader::from_reader(reader);
    reader.config_mut().trim_text(config.trim_text);

    let mut builder = TreeBuilder::new(config.keep_spaces);
    let mut buf = Vec::new();
    loop {
        let event = reader.read_event_into(&mut buf)?;
        let done = builder.feed(event, reader.decoder())?;
        if done {
            break;
        }
        buf.clear();
    }
    builder.finish()
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Accumulates reader events into a tree.
struct TreeBuilder {
    /// Currently open elements
    parents: Vec<Element>,
    /// Completed top-level nodes
    roots: Vec<Node>,
    /// Merged consequent text and CDATA events. These events can be split with
    /// service nodes (PI and comments)
    text: Option<String>,
    keep_spaces: bool,
}

impl TreeBuilder {
    const fn new(keep_spaces: bool) -> Self {
        Self {
            parents: Vec::new(),
            roots: Vec::new(),
            text: None,
            keep_spaces,
        }
    }

    /// Pushes a new event to the builder. Returns `true` when EOF was reached.
    fn feed(&mut self, event: Event, decoder: Decoder) -> Result<bool, XmlError> {
        match event {
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}

            Event::Start(e) => {
                self.flush_text();
                let element = start_element(&e, decoder)?;
                self.parents.push(element);
            }
            Event::Empty(e) => {
                self.flush_text();
                let element = start_element(&e, decoder)?;
                self.push(Node::Element(element));
            }
            // Matching of the end tag to the start tag is checked by the reader
            Event::End(_) => {
                self.flush_text();
                if let Some(mut element) = self.parents.pop() {
                    if !self.keep_spaces {
                        strip_blank_text(&mut element.children);
                    }
                    self.push(Node::Element(element));
                }
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                self.append_text(&text);
            }
            Event::CData(e) => {
                let text = decoder.decode(&e)?;
                self.append_text(&text);
            }
            Event::Eof => {
                self.flush_text();
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn finish(mut self) -> Result<Document, XmlError> {
        if let Some(element) = self.parents.pop() {
            return Err(XmlError::UnclosedElement(element.name));
        }
        Ok(Document {
            elements: self.roots,
        })
    }

    fn push(&mut self, node: Node) {
        match self.parents.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    /// Append text to storage or store it to storage
    fn append_text(&mut self, text: &str) {
        match &mut self.text {
            Some(prefix) => prefix.push_str(text),
            None => self.text = Some(text.to_owned()),
        }
    }

    /// Turns collected text into a text node. Whitespace-only text outside of
    /// the root element is dropped unless spaces should be kept. Inside elements
    /// it is stripped when the element is closed, see [`strip_blank_text`].
    fn flush_text(&mut self) {
        if let Some(text) = self.text.take() {
            if self.keep_spaces || !self.parents.is_empty() || !is_whitespace(&text) {
                self.push(Node::Text(text));
            }
        }
    }
}

/// Creates an element from the start tag, decoding its name and attributes.
fn start_element(start: &BytesStart, decoder: Decoder) -> Result<Element, XmlError> {
    let mut element = Element::new(decoder.decode(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr?;
        let key = decoder.decode(attr.key.as_ref())?;
        let value = attr.decode_and_unescape_value(decoder)?;
        element.set_attribute(key, value);
    }
    Ok(element)
}

/// Removes whitespace-only text between element siblings. Text of an element
/// without element children is its content and is kept as is.
fn strip_blank_text(children: &mut Vec<Node>) {
    if children.iter().any(|child| matches!(child, Node::Element(_))) {
        children.retain(|child| !matches!(child, Node::Text(text) if is_whitespace(text)));
    }
}

#[inline]
fn is_whitespace(text: &str) -> bool {
    text.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty() {
        assert_eq!(parse("").unwrap(), Document::new());
        assert_eq!(parse("<empty/>").unwrap(), Element::new("empty").into());
        assert_eq!(parse("<tag></tag>").unwrap(), Element::new("tag").into());
    }

    #[test]
    fn attributes() {
        let doc = parse(r#"<point x="1" y='&lt;2&gt;'/>"#).unwrap();
        assert_eq!(
            doc,
            Element::new("point")
                .with_attribute("x", "1")
                .with_attribute("y", "<2>")
                .into()
        );
    }

    #[test]
    fn cdata_merged_with_text() {
        let doc = parse("<tag>HTML <![CDATA[is awesome! <3]]> &lt;3</tag>").unwrap();
        assert_eq!(doc, Element::text("tag", "HTML is awesome! <3 <3").into());
    }

    /// Checks, that declaration, processing instructions, DTD and comments are
    /// skipped
    #[test]
    fn misc() {
        let doc = parse(
            "<?xml version='1.0'?><!DOCTYPE root><?pi?><!--comment-->\n\r\t <root>\
                <!--inner--><a>x<!--split-->y</a>\
            </root>\n\r\t <?pi?><!--comment-->",
        )
        .unwrap();
        assert_eq!(
            doc,
            Element::new("root")
                .with_child(Element::text("a", "xy"))
                .into()
        );
    }

    mod spaces {
        use super::*;
        use pretty_assertions::assert_eq;

        const INDENTED: &str = "<tag>\n  <inner> text </inner>\n</tag>";

        #[test]
        fn dropped_by_default() {
            let doc = parse(INDENTED).unwrap();
            assert_eq!(
                doc,
                Element::new("tag")
                    .with_child(Element::text("inner", " text "))
                    .into()
            );
        }

        #[test]
        fn content_only() {
            let doc = parse("<tag><inner>   </inner><empty>\n</empty></tag>").unwrap();
            assert_eq!(
                doc,
                Element::new("tag")
                    .with_child(Element::text("inner", "   "))
                    .with_child(Element::text("empty", "\n"))
                    .into()
            );
        }

        #[test]
        fn kept() {
            let doc = parse_with(INDENTED, Config::default().keep_spaces(true)).unwrap();
            assert_eq!(
                doc,
                Element::new("tag")
                    .with_children([
                        Node::from("\n  "),
                        Node::from(Element::text("inner", " text ")),
                        Node::from("\n"),
                    ])
                    .into()
            );
        }

        #[test]
        fn trimmed() {
            let doc = parse_with(INDENTED, Config::default().trim_text(true)).unwrap();
            assert_eq!(
                doc,
                Element::new("tag")
                    .with_child(Element::text("inner", "text"))
                    .into()
            );
        }
    }

    #[test]
    fn multiple_roots() {
        let doc = parse("<one/>text<two></two>").unwrap();
        assert_eq!(
            doc,
            Document::from_nodes([
                Node::from(Element::new("one")),
                Node::from("text"),
                Node::from(Element::new("two")),
            ])
        );
    }

    #[test]
    fn from_reader() {
        let doc = parse_reader("<tag>text</tag>".as_bytes(), &Config::default()).unwrap();
        assert_eq!(doc, Element::text("tag", "text").into());
    }

    #[test]
    fn mismatched_end() {
        let error = parse("<open></close>").unwrap_err();
        assert!(matches!(error, XmlError::Parse(_)));
    }
}
