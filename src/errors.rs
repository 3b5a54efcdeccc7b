//! Error management module

use std::fmt;
use std::io::Error as IoError;
use std::string::FromUtf8Error;
use std::sync::Arc;

/// Direction of a conversion, used to annotate conversion errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// XML tree into a typed instance
    FromXml,
    /// Typed instance into an XML tree
    ToXml,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::FromXml => f.write_str("from XML"),
            Self::ToXml => f.write_str("to XML"),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// An error raised while parsing or printing XML text, or while reading the
/// shape of an XML tree.
#[derive(Clone, Debug)]
pub enum XmlError {
    /// Low-level parse or write error reported by `quick-xml`, which includes
    /// format violations, mismatched tags and encoding issues
    Parse(quick_xml::Error),
    /// IO error raised by the underlying writer
    Io(Arc<IoError>),
    /// Printed document is not valid UTF-8
    Utf8(FromUtf8Error),
    /// An element was expected to contain only text, but contains other nodes.
    /// Holds the element name
    NotText(String),
    /// A document was expected to contain at least one element, but it is empty
    MissingElement,
    /// Input ended before the element was closed. Holds the element name
    UnclosedElement(String),
}

impl fmt::Display for XmlError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "parse error: {}", e),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Utf8(e) => write!(f, "invalid UTF-8 in printed document: {}", e),
            Self::NotText(name) => write!(f, "can't get text from element `<{}>`", name),
            Self::MissingElement => f.write_str("document does not contain any element"),
            Self::UnclosedElement(name) => write!(f, "element `<{}>` is not closed", name),
        }
    }
}

impl std::error::Error for XmlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Io(e) => Some(e.as_ref()),
            Self::Utf8(e) => Some(e),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for XmlError {
    #[inline]
    fn from(error: quick_xml::Error) -> Self {
        Self::Parse(error)
    }
}

impl From<quick_xml::events::attributes::AttrError> for XmlError {
    #[inline]
    fn from(error: quick_xml::events::attributes::AttrError) -> Self {
        Self::Parse(error.into())
    }
}

impl From<quick_xml::encoding::EncodingError> for XmlError {
    #[inline]
    fn from(error: quick_xml::encoding::EncodingError) -> Self {
        Self::Parse(error.into())
    }
}

impl From<IoError> for XmlError {
    #[inline]
    fn from(error: IoError) -> Self {
        Self::Io(Arc::new(error))
    }
}

impl From<FromUtf8Error> for XmlError {
    #[inline]
    fn from(error: FromUtf8Error) -> Self {
        Self::Utf8(error)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// The error type used by models, the registry and the conversion pipelines.
#[derive(Debug)]
pub enum Error {
    /// XML text or tree error
    Xml(XmlError),
    /// The registry does not contain a model for the class. Holds the class name
    ModelNotFound(&'static str),
    /// A model for the class is already registered. Holds the class name
    ModelExists(&'static str),
    /// A value is not an instance of the class the codec is bound to
    Mismatch {
        /// Name of the expected class
        expected: &'static str,
    },
    /// A middleware called `next` but no middleware was left in the chain
    ExhaustedPipeline,
    /// The model has no `from_xml` codec: instance construction cannot be
    /// guessed and should be provided to the model options
    FromXmlUndefined(&'static str),
    /// Property options were declared for a member which the class does not have
    UnknownProperty {
        /// Name of the class
        class: &'static str,
        /// Name of the member
        property: String,
    },
    /// A properties record does not hold a value for the member
    MissingProperty(String),
    /// A properties record holds a value of another type than requested
    UnexpectedType {
        /// Name of the member
        property: String,
        /// Name of the requested type
        expected: &'static str,
    },
    /// Text content cannot be converted to a number
    InvalidNumber(String),
    /// Decoded scalar does not correspond to any literal of a literal union
    InvalidLiteral(String),
    /// Model-level conversion failed
    Model {
        /// Name of the class of the failed model
        class: &'static str,
        /// Direction of the failed conversion
        direction: Direction,
        /// The original error
        source: Box<Error>,
    },
    /// Property-level conversion failed
    Property {
        /// Name of the class that declares the property
        class: &'static str,
        /// Name of the member
        property: &'static str,
        /// Direction of the failed conversion
        direction: Direction,
        /// The original error
        source: Box<Error>,
    },
    /// Error raised by a user-provided codec
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps any error raised by a user-provided codec.
    pub fn custom<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Custom(error.into())
    }

    /// Returns `true` if this error already carries model or property context.
    /// Such errors are propagated as-is through the nesting levels.
    #[inline]
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Model { .. } | Self::Property { .. })
    }

    /// Returns the innermost error, skipping all conversion context.
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Model { source, .. } | Self::Property { source, .. } => source.root_cause(),
            e => e,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Xml(e) => write!(f, "XML error: {}", e),
            Self::ModelNotFound(class) => write!(f, "couldn't find model for type {}", class),
            Self::ModelExists(class) => write!(f, "a model for type {} already exists", class),
            Self::Mismatch { expected } => {
                write!(f, "provided object is not an instance of {}", expected)
            }
            Self::ExhaustedPipeline => f.write_str("no more next middleware"),
            Self::FromXmlUndefined(class) => write!(
                f,
                "model {} has no `from_xml` codec: provide one in the model options",
                class
            ),
            Self::UnknownProperty { class, property } => {
                write!(f, "type {} has no property `{}`", class, property)
            }
            Self::MissingProperty(name) => write!(f, "property `{}` has no value", name),
            Self::UnexpectedType { property, expected } => {
                write!(f, "property `{}` is not of type {}", property, expected)
            }
            Self::InvalidNumber(text) => write!(f, "`{}` is not a number", text),
            Self::InvalidLiteral(text) => write!(f, "`{}` is not one of allowed literals", text),
            Self::Model {
                class,
                direction,
                source,
            } => write!(f, "failed to convert {} {}: {}", class, direction, source),
            Self::Property {
                class,
                property,
                direction,
                source,
            } => write!(
                f,
                "failed to convert property {}.{} {}: {}",
                class, property, direction, source
            ),
            Self::Custom(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Xml(e) => Some(e),
            Self::Model { source, .. } | Self::Property { source, .. } => Some(source.as_ref()),
            Self::Custom(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<XmlError> for Error {
    #[inline]
    fn from(error: XmlError) -> Self {
        Self::Xml(error)
    }
}

impl From<quick_xml::Error> for Error {
    #[inline]
    fn from(error: quick_xml::Error) -> Self {
        Self::Xml(error.into())
    }
}

/// A specialized `Result` type where the error is hard-wired to [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
