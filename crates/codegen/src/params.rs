//! The `parameter: {...}` schema.

use defkit_core::{Directive, Param, ParamType};

use crate::expr::{label, literal, quote, Renderer};
use crate::writer::{Doc, Item};

/// Schema items for `params`, in declaration order. Parameter fields never
/// take part in value alignment.
pub(crate) fn schema_items(params: &[Param], r: &mut Renderer<'_>) -> Vec<Item> {
    let mut items = Vec::new();
    for param in params {
        param_items(param, r, &mut items);
    }
    items
}

fn param_items(param: &Param, r: &mut Renderer<'_>, items: &mut Vec<Item>) {
    if param.ignored {
        items.push(Item::Comment(Directive::Ignore.text()));
    }
    if let Some(description) = &param.description {
        items.push(Item::Comment(Directive::Usage(description.clone()).text()));
    }
    if let Some(short) = &param.short {
        items.push(Item::Comment(Directive::Short(short.clone()).text()));
    }

    let mut field = label(&param.name);
    if param.is_optional() {
        field.push('?');
    }
    items.push(Item::field(field, type_doc(param, r)));

    // The discriminator comes first, then one block per variant that
    // declares fields.
    if param.ty == ParamType::OneOf {
        for variant in &param.variants {
            if variant.fields.is_empty() {
                continue;
            }
            let cond = format!("{} == {}", label(&param.name), quote(&variant.value));
            items.push(Item::guarded(&cond, schema_items(&variant.fields, r)));
        }
    }
}

fn type_doc(param: &Param, r: &mut Renderer<'_>) -> Doc {
    let default = param.default.as_ref().map(|d| r.expr(d));
    match param.ty {
        ParamType::String | ParamType::Int | ParamType::Float | ParamType::Bool => {
            if param.enum_values.is_empty() {
                Doc::Inline(with_default(default, param.ty.keyword().unwrap_or("_")))
            } else {
                let values: Vec<String> = param.enum_values.iter().map(literal).collect();
                Doc::Inline(union(&values, default))
            }
        }
        ParamType::Enum => {
            if param.enum_values.is_empty() {
                Doc::Inline(with_default(default, "string"))
            } else {
                let values: Vec<String> = param.enum_values.iter().map(literal).collect();
                Doc::Inline(union(&values, default))
            }
        }
        ParamType::OneOf => {
            if param.variants.is_empty() {
                Doc::Inline(with_default(default, "string"))
            } else {
                let values: Vec<String> = param.variants.iter().map(|v| quote(&v.value)).collect();
                Doc::Inline(union(&values, default))
            }
        }
        ParamType::Struct => {
            if param.fields.is_empty() {
                Doc::Inline(with_default(default, "{...}"))
            } else {
                Doc::Block {
                    open: with_default(default, "{"),
                    items: schema_items(&param.fields, r),
                    close: "}".to_owned(),
                }
            }
        }
        ParamType::Array => match (param.element_type, param.element_fields.is_empty()) {
            (Some(ParamType::Struct), false) => Doc::Block {
                open: with_default(default, "[...{"),
                items: schema_items(&param.element_fields, r),
                close: "}]".to_owned(),
            },
            (element, _) => Doc::Inline(with_default(
                default,
                &format!("[...{}]", element_keyword(element)),
            )),
        },
        ParamType::Map => match (param.element_type, param.element_fields.is_empty()) {
            (Some(ParamType::Struct), false) => Doc::Block {
                open: with_default(default, "[string]: {"),
                items: schema_items(&param.element_fields, r),
                close: "}".to_owned(),
            },
            (element, _) => Doc::Inline(with_default(
                default,
                &format!("[string]: {}", element_keyword(element)),
            )),
        },
    }
}

fn element_keyword(element: Option<ParamType>) -> &'static str {
    match element {
        None => "_",
        Some(ParamType::Enum) | Some(ParamType::OneOf) => "string",
        Some(ParamType::Struct) => "{...}",
        Some(ParamType::Array) => "[..._]",
        Some(ParamType::Map) => "{[string]: _}",
        Some(scalar) => scalar.keyword().unwrap_or("_"),
    }
}

fn with_default(default: Option<String>, ty: &str) -> String {
    match default {
        Some(d) => format!("*{} | {}", d, ty),
        None => ty.to_owned(),
    }
}

/// `*default | a | b`; the default leads even when it is not listed.
fn union(values: &[String], default: Option<String>) -> String {
    let mut parts = Vec::with_capacity(values.len() + 1);
    if let Some(d) = &default {
        parts.push(format!("*{}", d));
    }
    parts.extend(
        values
            .iter()
            .filter(|v| default.as_ref() != Some(*v))
            .cloned(),
    );
    parts.join(" | ")
}
