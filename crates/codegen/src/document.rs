//! Layout of a complete definition document: the definition header with
//! its attributes, and the `template` block.

use defkit_core::{
    ComponentDefinition, HelperPlacement, Param, Template, TraitDefinition, WorkloadSpec,
};
use indexmap::IndexMap;

use crate::expr::{label, quote, Renderer};
use crate::params::schema_items;
use crate::tree::resource_items;
use crate::writer::{Doc, Item};

pub(crate) fn component_items(def: &ComponentDefinition, r: &mut Renderer<'_>) -> Vec<Item> {
    let spec = def.workload_spec();
    let mut workload = Vec::new();
    if let WorkloadSpec::Explicit { api_version, kind } = &spec {
        let definition = Doc::block(vec![
            Item::aligned("apiVersion", Doc::Inline(quote(api_version))),
            Item::aligned("kind", Doc::Inline(quote(kind))),
        ]);
        workload.push(Item::field("definition", definition));
    }
    workload.push(Item::field("type", Doc::Inline(quote(&spec.type_name()))));

    let mut attributes = vec![Item::field("workload", Doc::block(workload))];
    push_status(&mut attributes, def.custom_status.as_deref(), def.health_policy.as_deref());

    vec![
        header(
            &def.name,
            "component",
            &def.annotations,
            &def.labels,
            def.description.as_deref(),
            attributes,
        ),
        Item::field("template", Doc::block(template_items(&def.template, &def.params, r))),
    ]
}

pub(crate) fn trait_items(def: &TraitDefinition, r: &mut Renderer<'_>) -> Vec<Item> {
    let mut attributes = vec![Item::field(
        "podDisruptive",
        Doc::Inline(def.pod_disruptive.to_string()),
    )];
    if !def.applies_to.is_empty() {
        attributes.push(Item::field("appliesToWorkloads", string_list(&def.applies_to)));
    }
    if !def.conflicts_with.is_empty() {
        attributes.push(Item::field("conflictsWith", string_list(&def.conflicts_with)));
    }
    push_status(&mut attributes, def.custom_status.as_deref(), def.health_policy.as_deref());

    vec![
        header(
            &def.name,
            "trait",
            &def.annotations,
            &def.labels,
            def.description.as_deref(),
            attributes,
        ),
        Item::field("template", Doc::block(template_items(&def.template, &def.params, r))),
    ]
}

/// `<name>: { type, annotations, labels, description, attributes }`
fn header(
    name: &str,
    kind: &str,
    annotations: &IndexMap<String, String>,
    labels: &IndexMap<String, String>,
    description: Option<&str>,
    attributes: Vec<Item>,
) -> Item {
    let mut items = vec![
        Item::field("type", Doc::Inline(quote(kind))),
        Item::field("annotations", string_map(annotations)),
        Item::field("labels", string_map(labels)),
    ];
    if let Some(description) = description {
        items.push(Item::field("description", Doc::Inline(quote(description))));
    }
    items.push(Item::field("attributes", Doc::block(attributes)));
    Item::field(label(name), Doc::block(items))
}

fn push_status(attributes: &mut Vec<Item>, custom_status: Option<&str>, health_policy: Option<&str>) {
    let mut status = Vec::new();
    if let Some(text) = custom_status {
        status.push(Item::field("customStatus", multiline(text)));
    }
    if let Some(text) = health_policy {
        status.push(Item::field("healthPolicy", multiline(text)));
    }
    if !status.is_empty() {
        attributes.push(Item::field("status", Doc::block(status)));
    }
}

/// Snippet lines with surrounding blank lines and the common indentation
/// removed.
fn multiline(text: &str) -> Doc {
    let mut lines: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .skip_while(|l| l.is_empty())
        .collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let indent = lines
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    Doc::MultilineString(
        lines
            .iter()
            .map(|l| l.get(indent..).unwrap_or_default().to_owned())
            .collect(),
    )
}

fn string_map(map: &IndexMap<String, String>) -> Doc {
    if map.is_empty() {
        return Doc::inline("{}");
    }
    Doc::block(
        map.iter()
            .map(|(k, v)| Item::aligned(label(k), Doc::Inline(quote(v))))
            .collect(),
    )
}

fn string_list(items: &[String]) -> Doc {
    let quoted: Vec<String> = items.iter().map(|s| quote(s)).collect();
    Doc::Inline(format!("[{}]", quoted.join(", ")))
}

/// Helpers, `output`, `outputs`, `patch` and `parameter`, in that order.
fn template_items(template: &Template, params: &[Param], r: &mut Renderer<'_>) -> Vec<Item> {
    let mut items = Vec::new();
    let helpers = |placement: HelperPlacement| {
        template
            .helpers
            .iter()
            .filter(move |h| h.placement == placement)
    };

    for helper in helpers(HelperPlacement::BeforeOutput) {
        items.push(Item::field(label(&helper.name), r.value(&helper.value)));
    }
    if let Some(output) = &template.output {
        items.push(Item::field("output", Doc::block(resource_items(output, r))));
    }
    for helper in helpers(HelperPlacement::AfterOutput) {
        items.push(Item::field(label(&helper.name), r.value(&helper.value)));
    }

    if !template.outputs.is_empty() {
        let mut outputs = Vec::new();
        for named in &template.outputs {
            let body = Item::field(label(&named.name), Doc::block(resource_items(&named.resource, r)));
            match named.cond.as_ref().and_then(|c| r.cond(c)) {
                Some(cond) => outputs.push(Item::guarded(&cond, vec![body])),
                None => outputs.push(body),
            }
        }
        items.push(Item::field("outputs", Doc::block(outputs)));
    }

    if let Some(patch) = &template.patch {
        items.push(Item::field("patch", Doc::block(resource_items(patch, r))));
    }

    let parameter = schema_items(params, r);
    if parameter.is_empty() {
        items.push(Item::field("parameter", Doc::inline("{}")));
    } else {
        items.push(Item::field("parameter", Doc::block(parameter)));
    }
    items
}
