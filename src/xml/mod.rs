//! XML tree model with a text parser and printer built on `quick-xml`.
//!
//! Models never see XML text: they consume and produce a [`Document`]. This
//! module converts between that tree and text.

mod dom;
mod reader;
mod writer;

pub use dom::{Document, Element, Node};
pub use reader::{parse, parse_reader, parse_with};
pub use writer::{stringify, stringify_with};

use crate::errors::XmlError;

/// Indentation of printed documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Indent {
    /// Byte to repeat, usually a space or a tab
    pub char: u8,
    /// Count of `char`s per nesting level
    pub size: usize,
}

impl Indent {
    /// Creates a new indentation.
    pub const fn new(char: u8, size: usize) -> Self {
        Self { char, size }
    }
}

/// Parser and printer configuration.
///
/// All mutators return `&mut Self` so they can be chained:
///
/// ```
/// use xml_model::xml::{Config, Indent};
///
/// let mut config = Config::default();
/// config.trim_text(true).indent(Some(Indent::new(b'\t', 1)));
/// assert!(config.trim_text);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct Config {
    /// Whether leading and trailing whitespace of text nodes is trimmed
    /// while parsing.
    ///
    /// Default: `false`
    pub trim_text: bool,

    /// Whether text nodes formed only by whitespace are kept while parsing.
    /// Such nodes usually are indentation and are dropped.
    ///
    /// Default: `false`
    pub keep_spaces: bool,

    /// Whether elements without children are printed as a pair of tags
    /// (`<a></a>`) instead of a self-closed tag (`<a/>`).
    ///
    /// Default: `false`
    pub expand_empty_elements: bool,

    /// Indentation of printed documents. `None` prints everything on one line.
    ///
    /// Default: `None`
    pub indent: Option<Indent>,
}

impl Config {
    /// Set [`Self::trim_text`].
    pub fn trim_text(&mut self, trim: bool) -> &mut Self {
        self.trim_text = trim;
        self
    }

    /// Set [`Self::keep_spaces`].
    pub fn keep_spaces(&mut self, keep: bool) -> &mut Self {
        self.keep_spaces = keep;
        self
    }

    /// Set [`Self::expand_empty_elements`].
    pub fn expand_empty_elements(&mut self, expand: bool) -> &mut Self {
        self.expand_empty_elements = expand;
        self
    }

    /// Set [`Self::indent`].
    pub fn indent(&mut self, indent: Option<Indent>) -> &mut Self {
        self.indent = indent;
        self
    }
}

/// Returns the inner text of an element. See [`Element::content`].
#[inline]
pub fn get_content(element: &Element) -> Result<&str, XmlError> {
    element.content()
}

/// Creates an element holding only text. See [`Element::text`].
#[inline]
pub fn from_content<N, T>(name: N, content: T) -> Element
where
    N: Into<String>,
    T: Into<String>,
{
    Element::text(name, content)
}
