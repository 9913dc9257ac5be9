//! Parameter schema model.
//!
//! A [`Param`] declares one input of a definition. The generator renders
//! the declared parameters as the `parameter: {...}` block; templates refer
//! to them through [`Value::Param`] references.

use crate::condition::{eq, ne, not, Condition};
use crate::value::{Literal, ParamRef, Value};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Int,
    Float,
    Bool,
    Enum,
    Struct,
    Array,
    Map,
    OneOf,
}

impl ParamType {
    /// The CUE type keyword for scalar types.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            ParamType::String => Some("string"),
            ParamType::Int => Some("int"),
            ParamType::Float => Some("float"),
            ParamType::Bool => Some("bool"),
            _ => None,
        }
    }
}

/// One alternative of a [`ParamType::OneOf`] parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    /// Discriminator value selecting this variant.
    pub value: String,
    pub fields: Vec<Param>,
}

impl Variant {
    pub fn new(value: impl Into<String>) -> Self {
        Variant {
            value: value.into(),
            fields: Vec::new(),
        }
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Param>) -> Self {
        self.fields.extend(fields);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    pub ty: ParamType,
    pub required: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
    pub short: Option<String>,
    pub ignored: bool,
    pub force_optional: bool,
    /// Allowed literal values. Also restricts `String`/`Int` parameters.
    pub enum_values: Vec<Literal>,
    /// Members of a `Struct` parameter.
    pub fields: Vec<Param>,
    /// Element type of an `Array`, value type of a `Map`.
    pub element_type: Option<ParamType>,
    /// Members of struct-typed elements of an `Array` or `Map`.
    pub element_fields: Vec<Param>,
    pub variants: Vec<Variant>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Param {
            name: name.into(),
            ty,
            required: false,
            default: None,
            description: None,
            short: None,
            ignored: false,
            force_optional: false,
            enum_values: Vec::new(),
            fields: Vec::new(),
            element_type: None,
            element_fields: Vec::new(),
            variants: Vec::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::String)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Float)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Bool)
    }

    /// `[...string]`
    pub fn string_list(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Array).element(ParamType::String)
    }

    /// An untyped list, `[..._]`, until [`Param::element`] or
    /// [`Param::fields`] narrow it.
    pub fn list(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Array)
    }

    /// An open struct, `{...}`.
    pub fn object(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Struct)
    }

    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Struct)
    }

    /// `[string]: string`
    pub fn string_key_map(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Map).element(ParamType::String)
    }

    /// `[string]: _` until [`Param::element`] narrows it.
    pub fn map(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Map)
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Enum)
    }

    pub fn one_of(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::OneOf)
    }

    /// A nested member for struct, element or variant field lists.
    pub fn field(name: impl Into<String>, ty: ParamType) -> Self {
        Self::new(name, ty)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn short(mut self, flag: impl Into<String>) -> Self {
        self.short = Some(flag.into());
        self
    }

    pub fn ignore(mut self) -> Self {
        self.ignored = true;
        self
    }

    /// Keep the optional marker even when a default is present.
    pub fn force_optional(mut self) -> Self {
        self.force_optional = true;
        self
    }

    pub fn values<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Literal>,
    {
        self.enum_values.extend(values.into_iter().map(Into::into));
        self
    }

    /// Members of a struct, or of each element of a list or map.
    pub fn fields(mut self, fields: impl IntoIterator<Item = Param>) -> Self {
        match self.ty {
            ParamType::Array | ParamType::Map => {
                self.element_type = Some(ParamType::Struct);
                self.element_fields.extend(fields);
            }
            _ => self.fields.extend(fields),
        }
        self
    }

    pub fn element(mut self, ty: ParamType) -> Self {
        self.element_type = Some(ty);
        self
    }

    /// Describe the element (for lists and maps) or the members (for
    /// structs) with another declaration.
    pub fn nested(mut self, inner: Param) -> Self {
        match self.ty {
            ParamType::Array | ParamType::Map => {
                self.element_type = Some(inner.ty);
                if inner.ty == ParamType::Struct {
                    self.element_fields = inner.fields;
                }
            }
            _ => self.fields = inner.fields,
        }
        self
    }

    pub fn variants(mut self, variants: impl IntoIterator<Item = Variant>) -> Self {
        self.variants.extend(variants);
        self
    }

    /// Whether the field renders with the `?` marker.
    pub fn is_optional(&self) -> bool {
        (!self.required && self.default.is_none())
            || (self.force_optional && self.default.is_some())
    }

    pub fn reference(&self) -> ParamRef {
        ParamRef::new(self.name.clone())
    }

    /// `parameter["name"] != _|_`
    pub fn is_set(&self) -> Condition {
        Condition::PathExists {
            path: self.reference().path(),
        }
    }

    pub fn is_not_set(&self) -> Condition {
        not(self.is_set())
    }

    pub fn is_true(&self) -> Condition {
        Condition::Truthy {
            value: Value::Param(self.reference()),
        }
    }

    pub fn is_false(&self) -> Condition {
        not(self.is_true())
    }

    pub fn equals(&self, value: impl Into<Value>) -> Condition {
        eq(self, value)
    }

    pub fn not_equals(&self, value: impl Into<Value>) -> Condition {
        ne(self, value)
    }
}
