//! Template bodies: the primary output, auxiliary outputs, trait patches
//! and template-level helpers.

use crate::array::ArrayValue;
use crate::condition::Condition;
use crate::resource::Resource;
use crate::value::Value;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedOutput {
    pub name: String,
    pub resource: Resource,
    pub cond: Option<Condition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HelperPlacement {
    BeforeOutput,
    AfterOutput,
}

/// A named value declared at template level, e.g. a filtered port list
/// shared by several outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Helper {
    pub name: String,
    pub value: Value,
    pub placement: HelperPlacement,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Template {
    pub output: Option<Resource>,
    pub outputs: Vec<NamedOutput>,
    pub patch: Option<Resource>,
    pub helpers: Vec<Helper>,
}

impl Template {
    pub fn is_empty(&self) -> bool {
        self.output.is_none()
            && self.outputs.is_empty()
            && self.patch.is_none()
            && self.helpers.is_empty()
    }
}

/// Passed to the template closure of a definition.
#[derive(Debug, Default)]
pub struct TemplateBuilder {
    template: Template,
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&mut self, resource: impl Into<Resource>) -> &mut Self {
        self.template.output = Some(resource.into());
        self
    }

    /// An auxiliary resource under `outputs: <name>`.
    pub fn outputs(&mut self, name: impl Into<String>, resource: impl Into<Resource>) -> &mut Self {
        self.push_output(None, name.into(), resource.into());
        self
    }

    pub fn outputs_if(
        &mut self,
        cond: Condition,
        name: impl Into<String>,
        resource: impl Into<Resource>,
    ) -> &mut Self {
        self.push_output(Some(cond), name.into(), resource.into());
        self
    }

    pub fn patch(&mut self, resource: impl Into<Resource>) -> &mut Self {
        self.template.patch = Some(resource.into());
        self
    }

    pub fn helper(&mut self, name: impl Into<String>) -> HelperBuilder<'_> {
        HelperBuilder {
            template: self,
            name: name.into(),
            value: None,
            placement: HelperPlacement::BeforeOutput,
        }
    }

    pub fn build(self) -> Template {
        self.template
    }

    fn push_output(&mut self, cond: Option<Condition>, name: String, resource: Resource) {
        // Re-declaring an output replaces it in place.
        let cond = cond.filter(|c| !c.is_trivial());
        match self.template.outputs.iter_mut().find(|o| o.name == name) {
            Some(existing) => {
                existing.resource = resource;
                existing.cond = cond;
            }
            None => self.template.outputs.push(NamedOutput {
                name,
                resource,
                cond,
            }),
        }
    }
}

pub struct HelperBuilder<'a> {
    template: &'a mut TemplateBuilder,
    name: String,
    value: Option<Value>,
    placement: HelperPlacement,
}

impl<'a> HelperBuilder<'a> {
    pub fn from_array(mut self, array: impl Into<ArrayValue>) -> Self {
        self.value = Some(Value::Array(array.into()));
        self
    }

    pub fn from_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Emit the helper after `output` instead of before it.
    pub fn after_output(mut self) -> Self {
        self.placement = HelperPlacement::AfterOutput;
        self
    }

    /// Register the helper and return a reference to it.
    ///
    /// # Panics
    ///
    /// Panics when no value was given.
    pub fn build(self) -> Value {
        let value = match self.value {
            Some(v) => v,
            None => panic!("helper '{}' built without a value", self.name),
        };
        self.template.template.helpers.push(Helper {
            name: self.name.clone(),
            value,
            placement: self.placement,
        });
        Value::Helper { name: self.name }
    }
}
