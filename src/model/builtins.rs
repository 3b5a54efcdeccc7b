//! Models of the scalar classes: text, numbers and booleans.
//!
//! Each scalar is encoded as a single element holding the text form of the
//! value: `<string>`, `<number>` or `<boolean>`.

use super::context::FromXmlContext;
use super::{ModelOptions, XmlModel};
use crate::errors::{Error, Result};
use crate::reflect::ReflectClass;
use crate::xml::Element;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

pub(super) fn models() -> Vec<Arc<XmlModel>> {
    vec![
        string(),
        boolean(),
        number::<i8>(),
        number::<i16>(),
        number::<i32>(),
        number::<i64>(),
        number::<u8>(),
        number::<u16>(),
        number::<u32>(),
        number::<u64>(),
        number::<isize>(),
        number::<usize>(),
        number::<f32>(),
        number::<f64>(),
    ]
}

/// Returns the inner text of the first element of the document.
fn content<'a>(ctx: &FromXmlContext<'a>) -> Result<&'a str> {
    Ok(ctx.xml.first_element()?.content()?)
}

fn string() -> Arc<XmlModel> {
    XmlModel::detached(
        ModelOptions::<String>::new()
            .tagname("string")
            .from_xml(|ctx, _next| Ok(content(ctx)?.to_owned()))
            .to_xml(|ctx, _next| {
                let value = ctx.object::<String>()?;
                Ok(Element::text(ctx.model.tagname(), value.as_str()).into())
            }),
    )
}

fn number<N>() -> Arc<XmlModel>
where
    N: ReflectClass + FromStr + Default + Display,
{
    XmlModel::detached(
        ModelOptions::<N>::new()
            .tagname("number")
            .from_xml(|ctx, _next| parse_number(content(ctx)?))
            .to_xml(|ctx, _next| {
                let value = ctx.object::<N>()?;
                Ok(Element::text(ctx.model.tagname(), value.to_string()).into())
            }),
    )
}

fn boolean() -> Arc<XmlModel> {
    XmlModel::detached(
        ModelOptions::<bool>::new()
            .tagname("boolean")
            .from_xml(|ctx, _next| Ok(parse_boolean(content(ctx)?)))
            .to_xml(|ctx, _next| {
                let value = ctx.object::<bool>()?;
                Ok(Element::text(ctx.model.tagname(), value.to_string()).into())
            }),
    )
}

/// Parses trimmed text. Empty text is zero.
fn parse_number<N: FromStr + Default>(text: &str) -> Result<N> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(N::default());
    }
    text.parse()
        .map_err(|_| Error::InvalidNumber(text.to_owned()))
}

/// Empty text, `0` and `false` are false, any other text is true.
fn parse_boolean(text: &str) -> bool {
    !matches!(text.trim(), "" | "0" | "false")
}
