//! Component and trait definitions.

use crate::param::Param;
use crate::template::{Template, TemplateBuilder};
use indexmap::IndexMap;
use serde::Serialize;

/// Workload type used when the definition does not pin one.
pub const AUTODETECT_WORKLOAD_TYPE: &str = "autodetects.core.oam.dev";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkloadSpec {
    Explicit {
        api_version: String,
        #[serde(rename = "workload_kind")]
        kind: String,
    },
    Autodetect,
}

impl WorkloadSpec {
    /// `<plural lowercase kind>.<group>`, e.g. `deployments.apps`; core
    /// group kinds have no suffix.
    pub fn type_name(&self) -> String {
        match self {
            WorkloadSpec::Autodetect => AUTODETECT_WORKLOAD_TYPE.to_owned(),
            WorkloadSpec::Explicit { api_version, kind } => {
                let plural = pluralize(&kind.to_lowercase());
                match api_version.rsplit_once('/') {
                    Some((group, _)) if !group.is_empty() => format!("{}.{}", plural, group),
                    _ => plural,
                }
            }
        }
    }
}

fn pluralize(word: &str) -> String {
    if word.ends_with('s') || word.ends_with('x') || word.ends_with("ch") || word.ends_with("sh") {
        return format!("{}es", word);
    }
    if let Some(stem) = word.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{}ies", stem);
        }
    }
    format!("{}s", word)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentDefinition {
    pub name: String,
    pub description: Option<String>,
    pub labels: IndexMap<String, String>,
    pub annotations: IndexMap<String, String>,
    /// `None` falls back to the header of the template output.
    pub workload: Option<WorkloadSpec>,
    pub params: Vec<Param>,
    pub template: Template,
    pub custom_status: Option<String>,
    pub health_policy: Option<String>,
    /// Import paths emitted in addition to the detected ones.
    pub imports: Vec<String>,
}

impl ComponentDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        ComponentDefinition {
            name: name.into(),
            description: None,
            labels: IndexMap::new(),
            annotations: IndexMap::new(),
            workload: None,
            params: Vec::new(),
            template: Template::default(),
            custom_status: None,
            health_policy: None,
            imports: Vec::new(),
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn workload(mut self, api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        self.workload = Some(WorkloadSpec::Explicit {
            api_version: api_version.into(),
            kind: kind.into(),
        });
        self
    }

    pub fn autodetect_workload(mut self) -> Self {
        self.workload = Some(WorkloadSpec::Autodetect);
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn template(mut self, f: impl FnOnce(&mut TemplateBuilder)) -> Self {
        let mut builder = TemplateBuilder::new();
        f(&mut builder);
        self.template = builder.build();
        self
    }

    pub fn custom_status(mut self, cue: impl Into<String>) -> Self {
        self.custom_status = Some(cue.into());
        self
    }

    pub fn health_policy(mut self, cue: impl Into<String>) -> Self {
        self.health_policy = Some(cue.into());
        self
    }

    pub fn imports<I>(mut self, imports: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.imports.extend(imports.into_iter().map(Into::into));
        self
    }

    /// The effective workload: explicit, else the output header, else
    /// autodetect.
    pub fn workload_spec(&self) -> WorkloadSpec {
        if let Some(w) = &self.workload {
            return w.clone();
        }
        match &self.template.output {
            Some(out) => match (out.api_version(), out.kind()) {
                (Some(api_version), Some(kind)) => WorkloadSpec::Explicit {
                    api_version: api_version.to_owned(),
                    kind: kind.to_owned(),
                },
                _ => WorkloadSpec::Autodetect,
            },
            None => WorkloadSpec::Autodetect,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraitDefinition {
    pub name: String,
    pub description: Option<String>,
    pub labels: IndexMap<String, String>,
    pub annotations: IndexMap<String, String>,
    pub applies_to: Vec<String>,
    pub conflicts_with: Vec<String>,
    pub pod_disruptive: bool,
    pub params: Vec<Param>,
    pub template: Template,
    pub custom_status: Option<String>,
    pub health_policy: Option<String>,
    pub imports: Vec<String>,
}

impl TraitDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        TraitDefinition {
            name: name.into(),
            description: None,
            labels: IndexMap::new(),
            annotations: IndexMap::new(),
            applies_to: Vec::new(),
            conflicts_with: Vec::new(),
            pod_disruptive: false,
            params: Vec::new(),
            template: Template::default(),
            custom_status: None,
            health_policy: None,
            imports: Vec::new(),
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn applies_to<I>(mut self, workloads: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.applies_to.extend(workloads.into_iter().map(Into::into));
        self
    }

    pub fn conflicts_with<I>(mut self, traits: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.conflicts_with.extend(traits.into_iter().map(Into::into));
        self
    }

    pub fn pod_disruptive(mut self, disruptive: bool) -> Self {
        self.pod_disruptive = disruptive;
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn template(mut self, f: impl FnOnce(&mut TemplateBuilder)) -> Self {
        let mut builder = TemplateBuilder::new();
        f(&mut builder);
        self.template = builder.build();
        self
    }

    pub fn custom_status(mut self, cue: impl Into<String>) -> Self {
        self.custom_status = Some(cue.into());
        self
    }

    pub fn health_policy(mut self, cue: impl Into<String>) -> Self {
        self.health_policy = Some(cue.into());
        self
    }

    pub fn imports<I>(mut self, imports: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.imports.extend(imports.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Definition {
    Component(ComponentDefinition),
    Trait(TraitDefinition),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Component(c) => &c.name,
            Definition::Trait(t) => &t.name,
        }
    }

    /// `component` or `trait`.
    pub fn type_label(&self) -> &'static str {
        match self {
            Definition::Component(_) => "component",
            Definition::Trait(_) => "trait",
        }
    }
}

impl From<ComponentDefinition> for Definition {
    fn from(c: ComponentDefinition) -> Self {
        Definition::Component(c)
    }
}

impl From<TraitDefinition> for Definition {
    fn from(t: TraitDefinition) -> Self {
        Definition::Trait(t)
    }
}
