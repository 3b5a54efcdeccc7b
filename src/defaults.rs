//! Codec used when a model or a property does not provide its own.
//!
//! Properties are converted according to their reflected type:
//!
//! - a class is converted by the model of that class;
//! - an array of a class is converted item by item, either wrapped into an
//!   element named after the property or, for inline properties, directly
//!   among the children of the model element;
//! - a union of literals of one scalar is converted by the model of that
//!   scalar;
//! - nothing else is supported and is skipped.
//!
//! Custom codecs may call these functions to delegate to the default behavior.

use crate::errors::{Error, Result};
use crate::model::registry;
use crate::model::{
    FromXmlContext, PropertyFromXmlContext, PropertyToXmlContext, SourceContext, ToXmlContext,
};
use crate::reflect::{Class, Instance, Literal, TypeDescriptor};
use crate::utils::kebab_case;
use crate::xml::{Document, Element, Node};
use tracing::{debug, warn};

/// Model-level decoder of root models. Always fails: instances can't be built
/// without a constructor, which should be supplied with
/// [`ModelOptions::from_xml`].
///
/// [`ModelOptions::from_xml`]: crate::ModelOptions::from_xml
pub fn from_xml(ctx: &FromXmlContext) -> Result<Instance> {
    Err(Error::FromXmlUndefined(ctx.model.class().name()))
}

/// Model-level encoder of root models. Builds an element named after the model
/// with the fragments of all properties in resolution order as children.
/// Top-level elements of a fragment are renamed after the property unless the
/// property is inline.
pub fn to_xml(ctx: &ToXmlContext) -> Result<Document> {
    let mut fragments = ctx.properties()?;
    let mut children = Vec::new();
    for (name, resolved) in ctx.model.resolve_all_properties()? {
        let Some(fragment) = fragments.shift_remove(name) else {
            continue;
        };
        let property = &resolved.property;
        for mut node in fragment.elements {
            if let Node::Element(element) = &mut node {
                if !property.is_inline() {
                    element.name = property.tagname().to_owned();
                }
            }
            children.push(node);
        }
    }
    Ok(Element::new(ctx.model.tagname())
        .with_children(children)
        .into())
}

/// Property decoder.
pub fn property_from_xml(ctx: &PropertyFromXmlContext) -> Result<Option<Instance>> {
    let property = ctx.property;
    let reflected = property.reflected();
    if reflected.is_optional() && ctx.elements.is_empty() {
        return Ok(None);
    }
    if let Some(model) = property.model() {
        return model.from_xml(&single(ctx)).map(Some);
    }
    match reflected.ty() {
        TypeDescriptor::Class(class) => {
            let model = registry::get_class(class)?;
            model.from_xml(&single(ctx)).map(Some)
        }
        TypeDescriptor::Array(array) => {
            let Some(class) = array.element().class() else {
                warn!(
                    property = property.name(),
                    "arrays of {:?} are not supported, property is skipped",
                    array.element().kind(),
                );
                return Ok(None);
            };
            let model = registry::get_class(&class)?;
            let items = match ctx.elements.as_slice() {
                elements if property.is_inline() => elements.iter().collect(),
                [wrapper] if wrapper.name == property.tagname() => {
                    wrapper.elements().collect::<Vec<_>>()
                }
                [] => Vec::new(),
                elements => {
                    debug!(
                        property = property.name(),
                        candidates = elements.len(),
                        "expected a single `<{}>` wrapper, decoding an empty array",
                        property.tagname(),
                    );
                    Vec::new()
                }
            };
            let items = items
                .into_iter()
                .map(|item| model.from_xml(&Document::from(item.clone())))
                .collect::<Result<Vec<_>>>()?;
            array.collect(items).map(Some)
        }
        ty @ TypeDescriptor::Union(union) => {
            let (Some(class), Some(bridge)) = (ty.literal_class(), union.bridge()) else {
                warn!(
                    property = property.name(),
                    "unions of non-uniform literals are not supported, property is skipped",
                );
                return Ok(None);
            };
            let scalar = registry::get_class(&class)?.from_xml(&single(ctx))?;
            let literal = Literal::from_instance(&*scalar)
                .ok_or(Error::Mismatch { expected: class.name() })?;
            bridge
                .from_literal(&literal)
                .map(Some)
                .ok_or_else(|| Error::InvalidLiteral(literal.to_string()))
        }
        ty => {
            debug!(property = property.name(), "no default decoder for {:?}", ty.kind());
            Ok(None)
        }
    }
}

/// Document of the first selected element. Only arrays consume several elements.
fn single(ctx: &PropertyFromXmlContext) -> Document {
    if ctx.elements.len() > 1 {
        debug!(
            property = ctx.property.name(),
            candidates = ctx.elements.len(),
            "several elements selected for a single value, using the first one",
        );
    }
    ctx.elements
        .first()
        .cloned()
        .map(Document::from)
        .unwrap_or_default()
}

/// Property encoder. Inline properties are flattened: top-level elements are
/// replaced by their children.
pub fn property_to_xml(ctx: &PropertyToXmlContext) -> Result<Document> {
    let Some(value) = ctx.value else {
        return Ok(Document::new());
    };
    let property = ctx.property;
    let doc = match (property.model(), property.reflected().ty()) {
        (Some(model), _) => model.to_xml(value)?,
        (None, TypeDescriptor::Class(class)) => registry::get_class(class)?.to_xml(value)?,
        (None, TypeDescriptor::Array(array)) => {
            let Some(class) = array.element().class() else {
                warn!(
                    property = property.name(),
                    "arrays of {:?} are not supported, property is skipped",
                    array.element().kind(),
                );
                return Ok(Document::new());
            };
            let model = registry::get_class(&class)?;
            let mut wrapper = Element::new("array");
            for item in array.items(value) {
                wrapper.children.extend(model.to_xml(item)?.elements);
            }
            wrapper.into()
        }
        (None, ty @ TypeDescriptor::Union(union)) => {
            let (Some(class), Some(bridge)) = (ty.literal_class(), union.bridge()) else {
                warn!(
                    property = property.name(),
                    "unions of non-uniform literals are not supported, property is skipped",
                );
                return Ok(Document::new());
            };
            let literal = bridge
                .to_literal(value)
                .ok_or_else(|| Error::InvalidLiteral(property.name().to_owned()))?;
            registry::get_class(&class)?.to_xml(&*literal.to_instance())?
        }
        (None, ty) => {
            warn!(
                property = property.name(),
                "no default encoder for {:?}, property is skipped",
                ty.kind(),
            );
            return Ok(Document::new());
        }
    };
    Ok(if property.is_inline() { flatten(doc) } else { doc })
}

fn flatten(doc: Document) -> Document {
    doc.elements
        .into_iter()
        .flat_map(|node| match node {
            Node::Element(element) => element.children,
            text => vec![text],
        })
        .collect()
}

/// Element filter: selects elements named after the property.
pub fn is_source_element(element: &Element, ctx: &SourceContext) -> bool {
    element.name == ctx.property.tagname()
}

/// Element selection: child elements of the first element of the document
/// accepted by the element filter of the property.
pub fn resolve_elements(ctx: &SourceContext) -> Result<Vec<Element>> {
    let root = ctx.xml.first_element()?;
    Ok(root
        .elements()
        .filter(|element| ctx.property.is_source_element(element, ctx))
        .cloned()
        .collect())
}

/// Tag name of a model: the class name in kebab-case.
pub fn tagname_from_class(class: &Class) -> String {
    kebab_case(class.name())
}

/// Tag name of a property: the member name in kebab-case.
pub fn tagname_from_property(name: &str) -> String {
    kebab_case(name)
}
