//! Object mapping between Rust types and XML trees.
//!
//! # Description
//!
//! xml-model converts instances of reflected classes to XML and back through
//! per-class *models*:
//!
//! - A [`XmlModel`] is the codec of one class. Models live in a process-wide
//!   registry and are declared with [`model`] or [`create`].
//! - Each member of a class becomes a [property] whose element name, element
//!   selection and conversion can be customized with [`prop`].
//! - Conversions run through [middleware pipelines] chained along the class
//!   hierarchy, so a derived class reuses the codecs of its parent class.
//! - Members without custom codecs are converted by the [defaults codec]
//!   according to their reflected type.
//!
//! Classes describe themselves with the [`reflect_class!`] macro. Strings,
//! booleans and numbers have built-in models.
//!
//! # Example
//!
//! ```
//! # use pretty_assertions::assert_eq;
//! use xml_model::{reflect_class, ModelOptions};
//!
//! #[derive(Debug, PartialEq)]
//! struct Book {
//!     name: String,
//!     nb_pages: u32,
//! }
//! reflect_class!(Book { name: String, nb_pages: u32 });
//!
//! xml_model::model(ModelOptions::<Book>::new().from_xml(|ctx, _next| {
//!     let mut record = ctx.properties()?;
//!     Ok(Book {
//!         name: record.take("name")?,
//!         nb_pages: record.take("nb_pages")?,
//!     })
//! }));
//!
//! let book = Book { name: "Dune".into(), nb_pages: 412 };
//! let xml = xml_model::to_string(&book).unwrap();
//! assert_eq!(xml, "<book><name>Dune</name><nb-pages>412</nb-pages></book>");
//! assert_eq!(xml_model::from_str::<Book>(&xml).unwrap(), book);
//! ```
//!
//! # Features
//!
//! `xml-model` supports the following features:
//!
//! [property]: XmlProperty
//! [middleware pipelines]: middleware
//! [defaults codec]: defaults
#![cfg_attr(
    feature = "document-features",
    cfg_attr(doc, doc = ::document_features::document_features!(
        feature_label = "<a id=\"{feature}\" href=\"#{feature}\"><strong><code>{feature}</code></strong></a>"
    ))
)]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod defaults;
pub mod errors;
pub mod middleware;
pub mod model;
pub mod reflect;
/// Not an official API, public for integration tests
#[doc(hidden)]
pub mod utils;
pub mod xml;

// reexports
pub use crate::errors::{Direction, Error, Result, XmlError};
pub use crate::model::registry::{create, find, find_class, get, get_class, model, register};
pub use crate::model::{
    prop, ModelOptions, PropertiesRecord, PropertyOptions, ResolvedProperty, SourceElements,
    XmlModel, XmlProperty,
};
pub use crate::reflect::Instance;
pub use crate::xml::{Document, Element, Node};

use crate::reflect::ReflectClass;

/// Decodes XML text with the registered model of `T`.
pub fn from_str<T: ReflectClass>(text: &str) -> Result<T> {
    get::<T>()?.from_xml_as::<T>(text)
}

/// Encodes a value with the registered model of `T`.
pub fn to_xml<T: ReflectClass>(value: &T) -> Result<Document> {
    get::<T>()?.to_xml(value)
}

/// Encodes a value with the registered model of `T` and prints the result
/// without indentation.
pub fn to_string<T: ReflectClass>(value: &T) -> Result<String> {
    Ok(xml::stringify(&to_xml(value)?)?)
}
