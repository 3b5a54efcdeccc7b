//! Models: per-class codecs between instances and XML trees.
//!
//! A model drives conversions through two levels of [middleware pipelines]:
//!
//! - the model level builds an instance from a [`PropertiesRecord`], or an
//!   element from the XML fragments of the properties;
//! - the property level decodes or encodes each member of the class.
//!
//! Pipelines of a model are chained to the pipelines of its parent model, which
//! is either given explicitly in [`ModelOptions`] or is the model of the
//! closest registered ancestor class. The [defaults codec] terminates the
//! model-level pipelines of root models.
//!
//! [middleware pipelines]: crate::middleware
//! [defaults codec]: crate::defaults

mod builtins;
mod context;
mod property;
mod record;
pub mod registry;

pub use context::{
    FromXmlContext, ModelFromXml, ModelToXml, PropertiesFromXml, PropertiesToXml,
    PropertyFromXmlContext, PropertyToXmlContext, SourceContext, ToXmlContext,
};
pub use property::{prop, PropertyOptions, SourceElements, XmlProperty};
pub use record::PropertiesRecord;

use crate::defaults;
use crate::errors::{Direction, Error, Result};
use crate::middleware::{resolve, Next, Pipeline};
use crate::reflect::{Class, Instance, Reflect, ReflectClass};
use crate::xml::{self, Document};
use indexmap::IndexMap;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock, Weak};

/// Input of [`XmlModel::from_xml`]: XML text or an already parsed tree.
#[derive(Clone, Copy, Debug)]
pub enum XmlSource<'x> {
    /// XML text, parsed with the default configuration
    Text(&'x str),
    /// Parsed tree
    Tree(&'x Document),
}

impl<'x> From<&'x str> for XmlSource<'x> {
    #[inline]
    fn from(text: &'x str) -> Self {
        Self::Text(text)
    }
}

impl<'x> From<&'x String> for XmlSource<'x> {
    #[inline]
    fn from(text: &'x String) -> Self {
        Self::Text(text)
    }
}

impl<'x> From<&'x Document> for XmlSource<'x> {
    #[inline]
    fn from(doc: &'x Document) -> Self {
        Self::Tree(doc)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Options of the model of `T`.
///
/// ```
/// use xml_model::{reflect_class, xml, ModelOptions};
///
/// struct Book {
///     name: String,
/// }
/// reflect_class!(Book { name: String });
///
/// let options = ModelOptions::<Book>::new()
///     .tagname("novel")
///     .from_xml(|ctx, _next| {
///         let mut record = ctx.properties()?;
///         Ok(Book { name: record.take("name")? })
///     });
/// let model = xml_model::model(options);
///
/// let book = model.from_xml_as::<Book>("<novel><name>Dune</name></novel>").unwrap();
/// assert_eq!(book.name, "Dune");
/// ```
pub struct ModelOptions<T> {
    tagname: Option<String>,
    parent: Option<Arc<XmlModel>>,
    from_xml: Option<ModelFromXml>,
    to_xml: Option<ModelToXml>,
    marker: PhantomData<fn() -> T>,
}

impl<T: ReflectClass> ModelOptions<T> {
    /// Creates empty options.
    pub fn new() -> Self {
        Self {
            tagname: None,
            parent: None,
            from_xml: None,
            to_xml: None,
            marker: PhantomData,
        }
    }

    /// Sets the name of the element of the model. Defaults to the class name
    /// in kebab-case.
    pub fn tagname<S: Into<String>>(mut self, tagname: S) -> Self {
        self.tagname = Some(tagname.into());
        self
    }

    /// Sets the parent model, instead of the model of the closest registered
    /// ancestor class.
    pub fn parent(mut self, parent: Arc<XmlModel>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the constructor of instances. Without it, conversion from XML fails
    /// with [`Error::FromXmlUndefined`] unless a parent model provides one.
    pub fn from_xml<F>(mut self, from_xml: F) -> Self
    where
        F: for<'a, 'n> Fn(&FromXmlContext<'a>, Next<'n, ModelFromXml>) -> Result<T>
            + Send
            + Sync
            + 'static,
    {
        self.from_xml = Some(ModelFromXml::new(move |ctx, next| {
            from_xml(ctx, next).map(|value| Box::new(value) as Instance)
        }));
        self
    }

    /// Sets the encoder of instances, which replaces the default element
    /// assembly.
    pub fn to_xml<F>(mut self, to_xml: F) -> Self
    where
        F: for<'a, 'n> Fn(&ToXmlContext<'a>, Next<'n, ModelToXml>) -> Result<Document>
            + Send
            + Sync
            + 'static,
    {
        self.to_xml = Some(ModelToXml::new(to_xml));
        self
    }
}

impl<T: ReflectClass> Default for ModelOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ModelOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelOptions")
            .field("tagname", &self.tagname)
            .field("parent", &self.parent.as_ref().map(|parent| parent.class()))
            .field("from_xml", &self.from_xml.is_some())
            .field("to_xml", &self.to_xml.is_some())
            .finish()
    }
}

/// A property together with the model which declares it.
#[derive(Clone, Debug)]
pub struct ResolvedProperty {
    /// Model of the class declaring the property
    pub model: Arc<XmlModel>,
    /// Resolved options of the property
    pub property: Arc<XmlProperty>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Codec between instances of one class and XML trees.
pub struct XmlModel {
    this: Weak<XmlModel>,
    class: Class,
    tagname: String,
    explicit_parent: Option<Arc<XmlModel>>,
    /// Cached once an ancestor model is found
    parent: OnceLock<Arc<XmlModel>>,
    /// Own properties, resolved on first use
    properties: OnceLock<IndexMap<&'static str, Arc<XmlProperty>>>,

    from_xml: Arc<Pipeline<ModelFromXml>>,
    to_xml: Arc<Pipeline<ModelToXml>>,
    properties_from_xml: Arc<Pipeline<PropertiesFromXml>>,
    properties_to_xml: Arc<Pipeline<PropertiesToXml>>,
}

/// Links a pipeline of a model to the same pipeline of its parent model.
fn parent_link<M: 'static>(
    this: &Weak<XmlModel>,
    pipeline: fn(&XmlModel) -> &Arc<Pipeline<M>>,
) -> impl Fn() -> Option<Arc<Pipeline<M>>> + Send + Sync + 'static {
    let this = Weak::clone(this);
    move || {
        let parent = this.upgrade()?.parent()?;
        Some(Arc::clone(pipeline(&parent)))
    }
}

fn upgrade(this: &Weak<XmlModel>, class: Class) -> Result<Arc<XmlModel>> {
    this.upgrade().ok_or(Error::ModelNotFound(class.name()))
}

fn has_parent(this: &Weak<XmlModel>) -> bool {
    this.upgrade()
        .is_some_and(|model| model.parent().is_some())
}

impl XmlModel {
    /// Creates a model which is not registered. Such a model can be used as
    /// the model of a property or registered later with [`registry::register`].
    pub fn detached<T: ReflectClass>(options: ModelOptions<T>) -> Arc<Self> {
        let class = Class::of::<T>();
        Arc::new_cyclic(|this| {
            let mut from_xml =
                Pipeline::new().with_parent(parent_link(this, |model| &model.from_xml));
            let weak = Weak::clone(this);
            from_xml.push(ModelFromXml::new(move |ctx, next| {
                if has_parent(&weak) {
                    next.run(ctx)
                } else {
                    defaults::from_xml(ctx)
                }
            }));
            if let Some(middleware) = options.from_xml {
                from_xml.push(middleware);
            }

            let mut to_xml = Pipeline::new().with_parent(parent_link(this, |model| &model.to_xml));
            let weak = Weak::clone(this);
            to_xml.push(ModelToXml::new(move |ctx, next| {
                if has_parent(&weak) {
                    next.run(ctx)
                } else {
                    defaults::to_xml(ctx)
                }
            }));
            if let Some(middleware) = options.to_xml {
                to_xml.push(middleware);
            }

            let mut properties_from_xml = Pipeline::new()
                .with_parent(parent_link(this, |model| &model.properties_from_xml));
            let weak = Weak::clone(this);
            properties_from_xml.push(PropertiesFromXml::new(move |ctx, next| {
                upgrade(&weak, class)?.own_properties_from_xml(ctx, next)
            }));

            let mut properties_to_xml = Pipeline::new()
                .with_parent(parent_link(this, |model| &model.properties_to_xml));
            let weak = Weak::clone(this);
            properties_to_xml.push(PropertiesToXml::new(move |ctx, next| {
                upgrade(&weak, class)?.own_properties_to_xml(ctx, next)
            }));

            Self {
                this: Weak::clone(this),
                class,
                tagname: options
                    .tagname
                    .unwrap_or_else(|| defaults::tagname_from_class(&class)),
                explicit_parent: options.parent,
                parent: OnceLock::new(),
                properties: OnceLock::new(),
                from_xml: Arc::new(from_xml),
                to_xml: Arc::new(to_xml),
                properties_from_xml: Arc::new(properties_from_xml),
                properties_to_xml: Arc::new(properties_to_xml),
            }
        })
    }

    /// Returns the class of the model.
    #[inline]
    pub fn class(&self) -> Class {
        self.class
    }

    /// Returns the name of the element of the model.
    #[inline]
    pub fn tagname(&self) -> &str {
        &self.tagname
    }

    /// Returns the parent model: the explicit one, or the model of the closest
    /// registered ancestor class. The lookup is repeated until a parent is found.
    pub fn parent(&self) -> Option<Arc<XmlModel>> {
        if let Some(parent) = &self.explicit_parent {
            return Some(Arc::clone(parent));
        }
        if let Some(parent) = self.parent.get() {
            return Some(Arc::clone(parent));
        }
        let parent = registry::find_parent(&self.class)?;
        Some(Arc::clone(self.parent.get_or_init(|| parent)))
    }

    /// Returns own properties in declaration order. Methods and ignored
    /// properties are excluded.
    pub fn properties(&self) -> Result<&IndexMap<&'static str, Arc<XmlProperty>>> {
        if let Some(properties) = self.properties.get() {
            return Ok(properties);
        }
        let reflected = self.class.reflect();
        let mut properties = IndexMap::new();
        for member in reflected.own_properties() {
            if member.is_method() {
                continue;
            }
            let property = property::get_or_resolve(self.class, member.name())?;
            if !property.is_ignored() {
                properties.insert(member.name(), property);
            }
        }
        Ok(self.properties.get_or_init(|| properties))
    }

    /// Returns properties of the parent models followed by own properties. An
    /// own property replaces an inherited one of the same name in place.
    pub fn resolve_all_properties(&self) -> Result<IndexMap<&'static str, ResolvedProperty>> {
        let mut all = match self.parent() {
            Some(parent) => parent.resolve_all_properties()?,
            None => IndexMap::new(),
        };
        let model = upgrade(&self.this, self.class)?;
        for (name, property) in self.properties()? {
            all.insert(
                *name,
                ResolvedProperty {
                    model: Arc::clone(&model),
                    property: Arc::clone(property),
                },
            );
        }
        Ok(all)
    }

    /// Decodes XML text or a tree into an instance of the model class.
    pub fn from_xml<'x, S: Into<XmlSource<'x>>>(&self, xml: S) -> Result<Instance> {
        let xml = match xml.into() {
            XmlSource::Text(text) => Cow::Owned(xml::parse(text)?),
            XmlSource::Tree(doc) => Cow::Borrowed(doc),
        };
        let context = FromXmlContext {
            xml: &xml,
            model: self,
        };
        resolve(&self.from_xml, &context).map_err(|error| self.error(error, Direction::FromXml))
    }

    /// Decodes XML text or a tree into a `T`.
    pub fn from_xml_as<'x, T: Reflect>(&self, xml: impl Into<XmlSource<'x>>) -> Result<T> {
        T::from_instance(self.from_xml(xml)?)
    }

    /// Encodes an instance of the model class, or of a class derived from it,
    /// into a document with a single element.
    ///
    /// Fails with [`Error::Mismatch`] for any other object.
    pub fn to_xml(&self, object: &dyn Any) -> Result<Document> {
        let object = self.view(object).ok_or(Error::Mismatch {
            expected: self.class.name(),
        })?;
        let context = ToXmlContext {
            object,
            model: self,
        };
        resolve(&self.to_xml, &context).map_err(|error| self.error(error, Direction::ToXml))
    }

    /// Views the object as an instance of the model class.
    fn view<'o>(&self, object: &'o dyn Any) -> Option<&'o dyn Any> {
        let id = (*object).type_id();
        if id == self.class.id() {
            return Some(object);
        }
        let derived = registry::find_by_id(id)?;
        derived.class().upcast(object, &self.class)
    }

    pub(crate) fn properties_from_xml(&self, xml: &Document) -> Result<PropertiesRecord> {
        let context = FromXmlContext { xml, model: self };
        resolve(&self.properties_from_xml, &context)
    }

    pub(crate) fn properties_to_xml(
        &self,
        object: &dyn Any,
    ) -> Result<IndexMap<&'static str, Document>> {
        let context = ToXmlContext {
            object,
            model: self,
        };
        resolve(&self.properties_to_xml, &context)
    }

    /// Decodes own properties on top of the record of the parent model.
    fn own_properties_from_xml(
        &self,
        ctx: &FromXmlContext,
        next: Next<PropertiesFromXml>,
    ) -> Result<PropertiesRecord> {
        let mut record = match self.parent() {
            Some(_) => next.run(ctx)?,
            None => PropertiesRecord::new(),
        };
        for property in self.effective_properties(ctx.model)? {
            let source = SourceContext {
                xml: ctx.xml,
                model: ctx.model,
                property,
            };
            let value = property
                .resolve_elements(&source)
                .and_then(|elements| {
                    property.from_xml(&PropertyFromXmlContext {
                        xml: ctx.xml,
                        model: ctx.model,
                        property,
                        elements,
                    })
                })
                .map_err(|error| self.property_error(error, property, Direction::FromXml))?;
            record.insert(property.name(), value);
        }
        Ok(record)
    }

    /// Encodes own properties on top of the fragments of the parent model.
    fn own_properties_to_xml(
        &self,
        ctx: &ToXmlContext,
        next: Next<PropertiesToXml>,
    ) -> Result<IndexMap<&'static str, Document>> {
        let mut fragments = match self.parent() {
            Some(_) => next.run(ctx)?,
            None => IndexMap::new(),
        };
        // Properties are read from the part of the object declared by this class
        let object = ctx
            .model
            .class()
            .upcast(ctx.object, &self.class)
            .unwrap_or(ctx.object);
        for property in self.effective_properties(ctx.model)? {
            let fragment = property
                .reflected()
                .get(object)
                .and_then(|value| {
                    property.to_xml(&PropertyToXmlContext {
                        object,
                        model: ctx.model,
                        property,
                        value,
                    })
                })
                .map_err(|error| self.property_error(error, property, Direction::ToXml))?;
            fragments.insert(property.name(), fragment);
        }
        Ok(fragments)
    }

    /// Own properties which are not shadowed by a property of the same name
    /// in a class derived from this one.
    fn effective_properties(&self, caller: &XmlModel) -> Result<Vec<&XmlProperty>> {
        let all = caller.resolve_all_properties()?;
        Ok(self
            .properties()?
            .values()
            .map(Arc::as_ref)
            .filter(|property| {
                all.get(property.name())
                    .map_or(true, |resolved| resolved.model.class() == self.class)
            })
            .collect())
    }

    fn error(&self, error: Error, direction: Direction) -> Error {
        if error.is_conversion() {
            return error;
        }
        Error::Model {
            class: self.class.name(),
            direction,
            source: Box::new(error),
        }
    }

    /// Errors of nested models gain the member context here. Errors which
    /// already name a member are kept as is.
    fn property_error(&self, error: Error, property: &XmlProperty, direction: Direction) -> Error {
        if let Error::Property { .. } = error {
            return error;
        }
        Error::Property {
            class: self.class.name(),
            property: property.name(),
            direction,
            source: Box::new(error),
        }
    }
}

impl fmt::Debug for XmlModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlModel")
            .field("class", &self.class)
            .field("tagname", &self.tagname)
            .field("parent", &self.parent().map(|parent| parent.class()))
            .finish_non_exhaustive()
    }
}
