//! Per-member conversion options and the process-wide store of resolved ones.

use super::context::{PropertyFromXmlContext, PropertyToXmlContext, SourceContext};
use super::XmlModel;
use crate::defaults;
use crate::errors::{Error, Result};
use crate::reflect::{Class, Instance, ReflectClass, ReflectedProperty};
use crate::xml::{Document, Element};
use indexmap::IndexMap;
use regex::Regex;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};
use tracing::debug;

type IsSourceFn = Arc<dyn Fn(&Element, &SourceContext) -> bool + Send + Sync>;
type ResolveElementsFn = Arc<dyn Fn(&SourceContext) -> Result<Vec<Element>> + Send + Sync>;
type FromXmlFn = Arc<dyn Fn(&PropertyFromXmlContext) -> Result<Option<Instance>> + Send + Sync>;
type ToXmlFn = Arc<dyn Fn(&PropertyToXmlContext) -> Result<Document> + Send + Sync>;

/// Selection of the XML elements which feed a property.
#[derive(Clone)]
pub enum SourceElements {
    /// Elements with exactly this name
    Name(String),
    /// Elements whose name matches the pattern
    Pattern(Regex),
    /// Elements accepted by the predicate
    Predicate(IsSourceFn),
}

impl SourceElements {
    /// Selects elements accepted by the predicate.
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&Element, &SourceContext) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(predicate))
    }

    fn matches(&self, element: &Element, context: &SourceContext) -> bool {
        match self {
            Self::Name(name) => element.name == *name,
            Self::Pattern(pattern) => pattern.is_match(&element.name),
            Self::Predicate(predicate) => predicate(element, context),
        }
    }
}

impl From<&str> for SourceElements {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for SourceElements {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Regex> for SourceElements {
    fn from(pattern: Regex) -> Self {
        Self::Pattern(pattern)
    }
}

impl fmt::Debug for SourceElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Pattern(pattern) => f.debug_tuple("Pattern").field(&pattern.as_str()).finish(),
            Self::Predicate(_) => f.write_str("Predicate"),
        }
    }
}

/// User-supplied options of a member. Everything not set is derived from the
/// reflected member when the options are resolved.
///
/// ```
/// use regex::Regex;
/// use xml_model::PropertyOptions;
///
/// let options = PropertyOptions::new()
///     .tagname("pages")
///     .source_elements(Regex::new("^(pages|nb-pages)$").unwrap());
/// ```
#[derive(Clone, Default)]
pub struct PropertyOptions {
    tagname: Option<String>,
    source_elements: Option<SourceElements>,
    resolve_elements: Option<ResolveElementsFn>,
    from_xml: Option<FromXmlFn>,
    to_xml: Option<ToXmlFn>,
    inline: bool,
    ignored: bool,
    model: Option<Arc<XmlModel>>,
}

impl PropertyOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name of the XML element of the property. Defaults to the
    /// member name in kebab-case.
    pub fn tagname<S: Into<String>>(mut self, tagname: S) -> Self {
        self.tagname = Some(tagname.into());
        self
    }

    /// Sets which child elements feed the property. By default elements named
    /// after the property tag name are selected.
    pub fn source_elements<S: Into<SourceElements>>(mut self, source: S) -> Self {
        self.source_elements = Some(source.into());
        self
    }

    /// Replaces element selection entirely.
    pub fn resolve_elements<F>(mut self, resolve: F) -> Self
    where
        F: Fn(&SourceContext) -> Result<Vec<Element>> + Send + Sync + 'static,
    {
        self.resolve_elements = Some(Arc::new(resolve));
        self
    }

    /// Sets the decoder of the property. `Ok(None)` records the member as absent.
    pub fn from_xml<F>(mut self, from_xml: F) -> Self
    where
        F: Fn(&PropertyFromXmlContext) -> Result<Option<Instance>> + Send + Sync + 'static,
    {
        self.from_xml = Some(Arc::new(from_xml));
        self
    }

    /// Sets the encoder of the property.
    pub fn to_xml<F>(mut self, to_xml: F) -> Self
    where
        F: Fn(&PropertyToXmlContext) -> Result<Document> + Send + Sync + 'static,
    {
        self.to_xml = Some(Arc::new(to_xml));
        self
    }

    /// Flattens the elements of the property into the element of the model
    /// instead of wrapping them into an element named after the property.
    pub fn inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    /// Excludes the property from conversions.
    pub fn ignore(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }

    /// Converts the property with this model instead of the model of its
    /// reflected type.
    pub fn model(mut self, model: Arc<XmlModel>) -> Self {
        self.model = Some(model);
        self
    }
}

impl fmt::Debug for PropertyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyOptions")
            .field("tagname", &self.tagname)
            .field("source_elements", &self.source_elements)
            .field("inline", &self.inline)
            .field("ignored", &self.ignored)
            .finish_non_exhaustive()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Resolved options of a class member.
pub struct XmlProperty {
    name: &'static str,
    tagname: String,
    reflected: ReflectedProperty,
    inline: bool,
    ignored: bool,
    model: Option<Arc<XmlModel>>,
    source_elements: Option<SourceElements>,
    resolve_elements: Option<ResolveElementsFn>,
    from_xml: Option<FromXmlFn>,
    to_xml: Option<ToXmlFn>,
}

impl XmlProperty {
    /// Resolves options of the member `name` of `class`. The member is looked
    /// up among own members first, then among inherited ones.
    pub fn resolve(class: Class, name: &str, options: PropertyOptions) -> Result<Self> {
        let reflected = class
            .reflect()
            .property(name)
            .filter(|property| !property.is_method())
            .ok_or_else(|| Error::UnknownProperty {
                class: class.name(),
                property: name.to_owned(),
            })?;
        let name = reflected.name();
        Ok(Self {
            name,
            tagname: options
                .tagname
                .unwrap_or_else(|| defaults::tagname_from_property(name)),
            reflected,
            inline: options.inline,
            ignored: options.ignored,
            model: options.model,
            source_elements: options.source_elements,
            resolve_elements: options.resolve_elements,
            from_xml: options.from_xml,
            to_xml: options.to_xml,
        })
    }

    /// Returns the member name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the name of the XML element of the property.
    #[inline]
    pub fn tagname(&self) -> &str {
        &self.tagname
    }

    /// Returns the reflected member.
    #[inline]
    pub fn reflected(&self) -> &ReflectedProperty {
        &self.reflected
    }

    /// Returns `true` if the elements of the property are flattened into the
    /// element of the model.
    #[inline]
    pub fn is_inline(&self) -> bool {
        self.inline
    }

    /// Returns `true` if the property takes no part in conversions.
    #[inline]
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Returns the model which overrides the model of the reflected type.
    #[inline]
    pub fn model(&self) -> Option<&Arc<XmlModel>> {
        self.model.as_ref()
    }

    /// Checks whether the element feeds this property.
    pub fn is_source_element(&self, element: &Element, context: &SourceContext) -> bool {
        match &self.source_elements {
            Some(source) => source.matches(element, context),
            None => defaults::is_source_element(element, context),
        }
    }

    /// Selects the elements which feed this property.
    pub fn resolve_elements(&self, context: &SourceContext) -> Result<Vec<Element>> {
        match &self.resolve_elements {
            Some(resolve) => resolve(context),
            None => defaults::resolve_elements(context),
        }
    }

    /// Decodes the property. An ignored property is always absent.
    pub fn from_xml(&self, context: &PropertyFromXmlContext) -> Result<Option<Instance>> {
        if self.ignored {
            return Ok(None);
        }
        match &self.from_xml {
            Some(from_xml) => from_xml(context),
            None => defaults::property_from_xml(context),
        }
    }

    /// Encodes the property. An ignored property produces an empty document.
    pub fn to_xml(&self, context: &PropertyToXmlContext) -> Result<Document> {
        if self.ignored {
            return Ok(Document::new());
        }
        match &self.to_xml {
            Some(to_xml) => to_xml(context),
            None => defaults::property_to_xml(context),
        }
    }
}

impl fmt::Debug for XmlProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlProperty")
            .field("name", &self.name)
            .field("tagname", &self.tagname)
            .field("ty", self.reflected.ty())
            .field("inline", &self.inline)
            .field("ignored", &self.ignored)
            .field("source_elements", &self.source_elements)
            .finish_non_exhaustive()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

type ClassProperties = IndexMap<&'static str, Arc<XmlProperty>>;

static PROPERTIES: LazyLock<RwLock<HashMap<TypeId, ClassProperties>>> =
    LazyLock::new(Default::default);

/// Declares options of the member `name` of `T`. Options declared again for
/// the same member replace previous ones.
///
/// Options must be declared before the first conversion of `T`, because models
/// resolve their properties once.
pub fn prop<T: ReflectClass>(name: &str, options: PropertyOptions) -> Result<Arc<XmlProperty>> {
    let class = Class::of::<T>();
    let property = Arc::new(XmlProperty::resolve(class, name, options)?);
    debug!(class = class.name(), property = property.name(), "declared property options");
    PROPERTIES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(class.id())
        .or_default()
        .insert(property.name(), Arc::clone(&property));
    Ok(property)
}

/// Returns the options of a member, resolving defaults on the first request.
pub(crate) fn get_or_resolve(class: Class, name: &'static str) -> Result<Arc<XmlProperty>> {
    let cached = PROPERTIES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&class.id())
        .and_then(|properties| properties.get(name))
        .cloned();
    if let Some(property) = cached {
        return Ok(property);
    }
    let property = Arc::new(XmlProperty::resolve(class, name, PropertyOptions::new())?);
    debug!(class = class.name(), property = name, "resolved default property options");
    Ok(PROPERTIES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(class.id())
        .or_default()
        .entry(name)
        .or_insert(property)
        .clone())
}
