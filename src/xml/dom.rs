//! Neutral XML tree exchanged between models and the text parser/printer.
//!
//! Only elements and text nodes are modeled. Attributes keep their declaration
//! order.

use crate::errors::XmlError;
use indexmap::IndexMap;
use std::fmt;

/// An ordered sequence of top-level nodes.
///
/// A document produced by a model always has exactly one top-level element,
/// but fragments produced by property codecs may hold any number of them,
/// including none.
#[derive(Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Document {
    /// Top-level nodes
    pub elements: Vec<Node>,
}

impl Document {
    /// Creates an empty document.
    #[inline]
    pub const fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    /// Creates a document from a list of nodes.
    pub fn from_nodes<I, N>(nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        Self {
            elements: nodes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if the document has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the first top-level element, skipping text nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pretty_assertions::assert_eq;
    /// use xml_model::xml::{self, Element};
    ///
    /// let doc = xml::parse("<book><name>Dune</name></book>").unwrap();
    /// let book = doc.first_element().unwrap();
    /// assert_eq!(book.name, "book");
    /// assert_eq!(book.elements().count(), 1);
    ///
    /// assert!(xml::Document::new().first_element().is_err());
    /// ```
    pub fn first_element(&self) -> Result<&Element, XmlError> {
        self.root().ok_or(XmlError::MissingElement)
    }

    /// Returns the first top-level element, if any.
    pub fn root(&self) -> Option<&Element> {
        self.elements().next()
    }

    /// Iterates over top-level elements, skipping text nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter_map(Node::as_element)
    }

    /// Iterates mutably over top-level elements, skipping text nodes.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.elements.iter_mut().filter_map(Node::as_element_mut)
    }

    /// Appends a node to the end of the document.
    #[inline]
    pub fn push<N: Into<Node>>(&mut self, node: N) {
        self.elements.push(node.into());
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.elements).finish()
    }
}

impl From<Element> for Document {
    #[inline]
    fn from(element: Element) -> Self {
        Self {
            elements: vec![Node::Element(element)],
        }
    }
}

impl From<Vec<Element>> for Document {
    fn from(elements: Vec<Element>) -> Self {
        Self::from_nodes(elements)
    }
}

impl FromIterator<Node> for Document {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// A struct representing an XML element.
#[derive(Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Element {
    /// Tag name
    pub name: String,
    /// Unescaped attribute values, in declaration order
    pub attributes: IndexMap<String, String>,
    /// Nodes inside this element
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an element without attributes and children.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Creates an element with a single text child. An empty `content` produces
    /// an element without children.
    ///
    /// ```
    /// # use pretty_assertions::assert_eq;
    /// use xml_model::xml::{self, Element};
    ///
    /// let element = Element::text("name", "Dune");
    /// assert_eq!(element.content().unwrap(), "Dune");
    /// assert_eq!(xml::stringify(&element.into()).unwrap(), "<name>Dune</name>");
    /// ```
    pub fn text<N, T>(name: N, content: T) -> Self
    where
        N: Into<String>,
        T: Into<String>,
    {
        let content = content.into();
        let mut element = Self::new(name);
        if !content.is_empty() {
            element.children.push(Node::Text(content));
        }
        element
    }

    /// Replaces children of the element.
    pub fn with_children<I, N>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a child node.
    pub fn with_child<N: Into<Node>>(mut self, child: N) -> Self {
        self.children.push(child.into());
        self
    }

    /// Sets an attribute.
    pub fn with_attribute<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_attribute(key, value);
        self
    }

    /// Appends a child element.
    #[inline]
    pub fn add_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    /// Sets an attribute. An attribute that already exists keeps its position.
    pub fn set_attribute<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes.insert(key.into(), value.into());
    }

    /// Removes an attribute, returning its value.
    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        self.attributes.shift_remove(key)
    }

    /// Returns the value of an attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Iterates over child elements, skipping text nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Returns the inner text of an element which holds only text:
    ///
    /// - an element without children has empty content;
    /// - an element with a single text child has that text as content;
    /// - any other element has no text content.
    pub fn content(&self) -> Result<&str, XmlError> {
        match self.children.as_slice() {
            [] => Ok(""),
            [Node::Text(text)] => Ok(text),
            _ => Err(XmlError::NotText(self.name.clone())),
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Element");
        s.field("name", &self.name);
        if !self.attributes.is_empty() {
            s.field("attributes", &self.attributes);
        }
        s.field("children", &self.children).finish()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// A node in an element tree.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Node {
    /// An `Element`.
    Element(Element),
    /// An unescaped text node.
    Text(String),
}

impl Node {
    /// Returns the element if this node is an element.
    #[inline]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(e) => Some(e),
            Self::Text(_) => None,
        }
    }

    /// Returns the element if this node is an element.
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(e) => Some(e),
            Self::Text(_) => None,
        }
    }

    /// Returns the text if this node is a text node.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Element(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // to avoid render as Element(Element { ... })
            Self::Element(e) => e.fmt(f),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
        }
    }
}

impl From<Element> for Node {
    #[inline]
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<String> for Node {
    #[inline]
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Node {
    #[inline]
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn content() {
        assert_eq!(Element::new("empty").content().unwrap(), "");
        assert_eq!(Element::text("tag", "text").content().unwrap(), "text");

        let nested = Element::new("tag").with_child(Element::new("inner"));
        assert!(matches!(nested.content(), Err(XmlError::NotText(name)) if name == "tag"));

        let mixed = Element::new("tag")
            .with_child("text")
            .with_child(Element::new("inner"));
        assert!(mixed.content().is_err());
    }

    #[test]
    fn empty_text() {
        assert_eq!(Element::text("tag", ""), Element::new("tag"));
    }

    #[test]
    fn attributes() {
        let mut element = Element::new("point")
            .with_attribute("x", "1")
            .with_attribute("y", "2");
        element.set_attribute("x", "3");

        let keys: Vec<_> = element.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, ["x", "y"]);
        assert_eq!(element.attribute("x"), Some("3"));

        assert_eq!(element.remove_attribute("x"), Some("3".to_string()));
        assert_eq!(element.attribute("x"), None);
    }

    #[test]
    fn elements_skip_text() {
        let doc = Document::from_nodes([
            Node::from("lead"),
            Node::from(Element::new("a")),
            Node::from(Element::new("b")),
        ]);
        let names: Vec<_> = doc.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(doc.first_element().unwrap().name, "a");
    }
}
