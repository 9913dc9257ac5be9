//! Resource skeletons with conditional field assignments.
//!
//! A [`ResourceBuilder`] records values against dotted field paths. A path
//! holds either one unconditional value or one or more guarded values
//! (`condValues`). [`ResourceBuilder::build`] freezes the result into an
//! immutable [`Resource`].

use crate::condition::Condition;
use crate::path::FieldPath;
use crate::value::Value;
use indexmap::IndexMap;
use serde::Serialize;

/// A value recorded for a path, optionally guarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CondValue {
    pub cond: Option<Condition>,
    pub value: Value,
}

impl CondValue {
    pub fn is_unconditional(&self) -> bool {
        self.cond.is_none()
    }
}

/// A `// +...` annotation emitted before a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Directive {
    Ignore,
    Usage(String),
    Short(String),
    PatchKey(String),
    PatchStrategy(String),
    /// Any other annotation, rendered as `// +<text>`.
    Generic(String),
}

impl Directive {
    /// Emission priority; lower goes first.
    pub fn priority(&self) -> u8 {
        match self {
            Directive::Ignore => 0,
            Directive::Usage(_) => 1,
            Directive::Short(_) => 2,
            Directive::PatchKey(_) | Directive::PatchStrategy(_) | Directive::Generic(_) => 3,
        }
    }

    /// The annotation text after `// `.
    pub fn text(&self) -> String {
        match self {
            Directive::Ignore => "+ignore".to_owned(),
            Directive::Usage(s) => format!("+usage={}", s),
            Directive::Short(s) => format!("+short={}", s),
            Directive::PatchKey(s) => format!("+patchKey={}", s),
            Directive::PatchStrategy(s) => format!("+patchStrategy={}", s),
            Directive::Generic(s) => {
                if s.starts_with('+') {
                    s.clone()
                } else {
                    format!("+{}", s)
                }
            }
        }
    }
}

/// Sort directives by priority, keeping attachment order within a kind.
pub fn ordered_directives(directives: &[Directive]) -> Vec<&Directive> {
    let mut out: Vec<&Directive> = directives.iter().collect();
    out.sort_by_key(|d| d.priority());
    out
}

/// A frozen resource skeleton.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resource {
    api_version: Option<String>,
    kind: Option<String>,
    fields: IndexMap<FieldPath, Vec<CondValue>>,
    directives: IndexMap<FieldPath, Vec<Directive>>,
}

impl Resource {
    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Paths in first-write order with their recorded values.
    pub fn fields(&self) -> &IndexMap<FieldPath, Vec<CondValue>> {
        &self.fields
    }

    pub fn directives(&self) -> &IndexMap<FieldPath, Vec<Directive>> {
        &self.directives
    }

    /// Values recorded for a path given as text.
    pub fn get(&self, path: &str) -> Option<&[CondValue]> {
        let path = FieldPath::parse(path).ok()?;
        self.fields.get(&path).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResourceBuilder {
    resource: Resource,
    guards: Vec<Condition>,
}

impl ResourceBuilder {
    /// A resource with an `apiVersion`/`kind` header.
    pub fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        ResourceBuilder {
            resource: Resource {
                api_version: Some(api_version.into()),
                kind: Some(kind.into()),
                ..Resource::default()
            },
            guards: Vec::new(),
        }
    }

    /// A headerless resource, used for trait patches.
    pub fn patch() -> Self {
        Self::default()
    }

    /// Unconditional write. Inside a `begin_if` scope the write is guarded
    /// by the open scopes.
    ///
    /// # Panics
    ///
    /// Panics on a malformed path.
    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        let path = FieldPath::expect_valid(path);
        match self.scope_condition() {
            Some(cond) => self.write_conditional(path, cond, value.into()),
            None => self.write(path, value.into()),
        }
        self
    }

    /// Guarded write. Combined with any open `begin_if` scopes.
    ///
    /// # Panics
    ///
    /// Panics on a malformed path.
    pub fn set_if(mut self, cond: Condition, path: &str, value: impl Into<Value>) -> Self {
        let path = FieldPath::expect_valid(path);
        let cond = match self.scope_condition() {
            Some(scope) => crate::condition::and([scope, cond]),
            None => cond,
        };
        if cond.is_trivial() {
            self.write(path, value.into());
        } else {
            self.write_conditional(path, cond, value.into());
        }
        self
    }

    /// Open a scope; every write until the matching `end_if` is guarded by
    /// `cond`. Scopes nest and combine with `&&`.
    pub fn begin_if(mut self, cond: Condition) -> Self {
        self.guards.push(cond);
        self
    }

    /// # Panics
    ///
    /// Panics when no scope is open.
    pub fn end_if(mut self) -> Self {
        if self.guards.pop().is_none() {
            panic!("end_if called without a matching begin_if");
        }
        self
    }

    /// Attach a directive to a path.
    pub fn directive(mut self, path: &str, directive: Directive) -> Self {
        let path = FieldPath::expect_valid(path);
        self.resource
            .directives
            .entry(path)
            .or_default()
            .push(directive);
        self
    }

    /// # Panics
    ///
    /// Panics when a `begin_if` scope is still open.
    pub fn build(self) -> Resource {
        if !self.guards.is_empty() {
            panic!(
                "resource built with {} unclosed begin_if scope(s)",
                self.guards.len()
            );
        }
        self.resource
    }

    fn scope_condition(&self) -> Option<Condition> {
        match self.guards.as_slice() {
            [] => None,
            [single] => Some(single.clone()),
            many => Some(crate::condition::and(many.iter().cloned())),
        }
        .filter(|c| !c.is_trivial())
    }

    fn write(&mut self, path: FieldPath, value: Value) {
        let entry = self.resource.fields.entry(path).or_default();
        entry.clear();
        entry.push(CondValue { cond: None, value });
    }

    fn write_conditional(&mut self, path: FieldPath, cond: Condition, value: Value) {
        let entry = self.resource.fields.entry(path.clone()).or_default();

        if entry.iter().any(CondValue::is_unconditional) {
            tracing::debug!(path = %path, "conditional write replaces unconditional value");
            entry.clear();
        }

        match entry.iter_mut().find(|cv| cv.cond.as_ref() == Some(&cond)) {
            Some(existing) => existing.value = value,
            None => entry.push(CondValue {
                cond: Some(cond),
                value,
            }),
        }
    }
}

impl From<ResourceBuilder> for Resource {
    fn from(builder: ResourceBuilder) -> Self {
        builder.build()
    }
}

/// Start a resource with the given header.
pub fn resource(api_version: impl Into<String>, kind: impl Into<String>) -> ResourceBuilder {
    ResourceBuilder::new(api_version, kind)
}

/// Start a headerless trait patch.
pub fn patch() -> ResourceBuilder {
    ResourceBuilder::patch()
}
