//! Contexts passed to model and property codecs, and the middleware types of
//! model pipelines.

use super::property::XmlProperty;
use super::{PropertiesRecord, XmlModel};
use crate::errors::{Error, Result};
use crate::middleware::{Middleware, Next};
use crate::reflect::{Class, Instance, ReflectClass};
use crate::xml::{Document, Element};
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Context of a model-level conversion from XML.
pub struct FromXmlContext<'a> {
    /// Document to decode. Its first element is the element of the model
    pub xml: &'a Document,
    /// Model which started the conversion
    pub model: &'a XmlModel,
}

impl<'a> FromXmlContext<'a> {
    /// Decodes the members of the model class by running its property
    /// pipeline. Each call decodes the document again.
    pub fn properties(&self) -> Result<PropertiesRecord> {
        self.model.properties_from_xml(self.xml)
    }
}

impl<'a> fmt::Debug for FromXmlContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromXmlContext")
            .field("xml", self.xml)
            .field("model", &self.model.class())
            .finish()
    }
}

/// Context of a model-level conversion to XML.
pub struct ToXmlContext<'a> {
    /// Instance to encode, always of the model class
    pub object: &'a dyn Any,
    /// Model which started the conversion
    pub model: &'a XmlModel,
}

impl<'a> ToXmlContext<'a> {
    /// Encodes the members of the object by running the property pipeline of
    /// the model. Returns an XML fragment per member, in resolution order.
    pub fn properties(&self) -> Result<IndexMap<&'static str, Document>> {
        self.model.properties_to_xml(self.object)
    }

    /// Views the object as an instance of `T`, which must be the model class
    /// or one of its ancestors.
    pub fn object<T: ReflectClass>(&self) -> Result<&'a T> {
        self.model
            .class()
            .upcast(self.object, &Class::of::<T>())
            .and_then(|object| object.downcast_ref::<T>())
            .ok_or(Error::Mismatch { expected: T::NAME })
    }
}

impl<'a> fmt::Debug for ToXmlContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToXmlContext")
            .field("model", &self.model.class())
            .finish_non_exhaustive()
    }
}

/// Context of XML element selection for a property.
pub struct SourceContext<'a> {
    /// Document of the model being decoded
    pub xml: &'a Document,
    /// Model which started the conversion
    pub model: &'a XmlModel,
    /// Property whose elements are selected
    pub property: &'a XmlProperty,
}

/// Context of a property-level conversion from XML.
pub struct PropertyFromXmlContext<'a> {
    /// Document of the model being decoded
    pub xml: &'a Document,
    /// Model which started the conversion
    pub model: &'a XmlModel,
    /// Property to decode
    pub property: &'a XmlProperty,
    /// Elements selected for the property
    pub elements: Vec<Element>,
}

/// Context of a property-level conversion to XML.
pub struct PropertyToXmlContext<'a> {
    /// Instance which holds the property, viewed as an instance of the class
    /// declaring the property
    pub object: &'a dyn Any,
    /// Model which started the conversion
    pub model: &'a XmlModel,
    /// Property to encode
    pub property: &'a XmlProperty,
    /// Value of the property, `None` if absent
    pub value: Option<&'a dyn Any>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////

macro_rules! middleware {
    ($(#[$meta:meta])* $name:ident($context:ident) -> $output:ty) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name(
            Arc<dyn for<'a, 'n> Fn(&$context<'a>, Next<'n, $name>) -> Result<$output> + Send + Sync>,
        );

        impl $name {
            /// Wraps a function into a middleware.
            pub fn new<F>(handler: F) -> Self
            where
                F: for<'a, 'n> Fn(&$context<'a>, Next<'n, $name>) -> Result<$output>
                    + Send
                    + Sync
                    + 'static,
            {
                Self(Arc::new(handler))
            }
        }

        impl Middleware for $name {
            type Context<'a> = $context<'a>;
            type Output = $output;

            #[inline]
            fn handle<'a>(&self, context: &$context<'a>, next: Next<'_, Self>) -> Result<$output> {
                (self.0)(context, next)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(stringify!($name))
            }
        }
    };
}

middleware!(
    /// Middleware of the model-level pipeline from XML.
    ModelFromXml(FromXmlContext) -> Instance
);
middleware!(
    /// Middleware of the model-level pipeline to XML.
    ModelToXml(ToXmlContext) -> Document
);
middleware!(
    /// Middleware of the property-level pipeline from XML.
    PropertiesFromXml(FromXmlContext) -> PropertiesRecord
);
middleware!(
    /// Middleware of the property-level pipeline to XML.
    PropertiesToXml(ToXmlContext) -> IndexMap<&'static str, Document>
);
