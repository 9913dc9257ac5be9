//! Declarative list and map transformations.
//!
//! [`each`] maps every element of a list parameter to a struct described by
//! a [`FieldMap`], optionally with discriminated variant fields.
//! [`for_each_map`] builds a struct comprehension over a map.

use crate::array::DEFAULT_VAR;
use crate::condition::Condition;
use crate::param::Param;
use crate::value::Value;
use indexmap::IndexMap;
use serde::Serialize;

/// How one output field is derived from the source element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldValue {
    /// Any value; [`Value::ItemField`] reads the element.
    Value { value: Value },
    /// `v.<name>`
    Field { name: String },
    /// `v.<name>`, emitted only when the element has it.
    OptionalField { name: String },
    /// Like `OptionalField`, additionally guarded by `cond`.
    OptionalFieldWithCond { name: String, cond: Condition },
    /// `primary` when the element has `field`, `fallback` otherwise.
    OrConditional {
        field: String,
        primary: Value,
        fallback: Value,
    },
}

macro_rules! field_value_from {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for FieldValue {
                fn from(v: $t) -> Self {
                    FieldValue::Value { value: v.into() }
                }
            }
        )*
    };
}

field_value_from!(Value, &str, String, i64, i32, bool, f64, &Param);

/// Output field name to derivation. Dotted names address nested fields.
pub type FieldMap = IndexMap<String, FieldValue>;

/// Build a [`FieldMap`] from `(name, value)` pairs.
pub fn field_map<I, K>(entries: I) -> FieldMap
where
    I: IntoIterator<Item = (K, FieldValue)>,
    K: Into<String>,
{
    entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

pub fn field_ref(name: impl Into<String>) -> FieldValue {
    FieldValue::Field { name: name.into() }
}

pub fn optional_field_ref(name: impl Into<String>) -> FieldValue {
    FieldValue::OptionalField { name: name.into() }
}

pub fn optional_field_with_cond(name: impl Into<String>, cond: Condition) -> FieldValue {
    FieldValue::OptionalFieldWithCond {
        name: name.into(),
        cond,
    }
}

pub fn or_conditional(
    field: impl Into<String>,
    primary: impl Into<Value>,
    fallback: impl Into<Value>,
) -> FieldValue {
    FieldValue::OrConditional {
        field: field.into(),
        primary: primary.into(),
        fallback: fallback.into(),
    }
}

/// `v.<field>` when present, `fallback` otherwise.
pub fn or_field(field: impl Into<String>, fallback: impl Into<Value>) -> FieldValue {
    let field = field.into();
    FieldValue::OrConditional {
        primary: Value::ItemField {
            field: field.clone(),
        },
        field,
        fallback: fallback.into(),
    }
}

/// Fields emitted only for elements whose discriminator matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantMap {
    pub discriminator: String,
    pub value: String,
    pub fields: FieldMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub source: Value,
    pub var: String,
    pub guard: Option<Condition>,
    pub filter: Option<Condition>,
    pub fields: FieldMap,
    pub variants: Vec<VariantMap>,
}

/// Start a mapping over every element of `source`.
pub fn each(source: impl Into<Value>) -> Collection {
    Collection {
        source: source.into(),
        var: DEFAULT_VAR.to_owned(),
        guard: None,
        filter: None,
        fields: FieldMap::new(),
        variants: Vec::new(),
    }
}

impl Collection {
    pub fn map(mut self, fields: FieldMap) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn map_variant(
        mut self,
        discriminator: impl Into<String>,
        value: impl Into<String>,
        fields: FieldMap,
    ) -> Self {
        self.variants.push(VariantMap {
            discriminator: discriminator.into(),
            value: value.into(),
            fields,
        });
        self
    }

    pub fn filter(mut self, cond: Condition) -> Self {
        self.filter = Some(cond);
        self
    }

    pub fn guard(mut self, cond: Condition) -> Self {
        self.guard = Some(cond);
        self
    }

    pub fn var(mut self, name: impl Into<String>) -> Self {
        self.var = name.into();
        self
    }
}

/// `{for k, v in source { (key): value }}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapComprehension {
    source: String,
    key_var: String,
    val_var: String,
    key_expr: String,
    val_expr: String,
}

pub fn for_each_map() -> MapComprehension {
    MapComprehension {
        source: "parameter".to_owned(),
        key_var: "k".to_owned(),
        val_var: "v".to_owned(),
        key_expr: String::new(),
        val_expr: String::new(),
    }
}

impl MapComprehension {
    pub fn over(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_vars(mut self, key: impl Into<String>, val: impl Into<String>) -> Self {
        self.key_var = key.into();
        self.val_var = val.into();
        self
    }

    pub fn with_key_expr(mut self, expr: impl Into<String>) -> Self {
        self.key_expr = expr.into();
        self
    }

    pub fn with_val_expr(mut self, expr: impl Into<String>) -> Self {
        self.val_expr = expr.into();
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn key_var(&self) -> &str {
        &self.key_var
    }

    pub fn val_var(&self) -> &str {
        &self.val_var
    }

    /// Empty when the key variable is used as is.
    pub fn key_expr(&self) -> &str {
        &self.key_expr
    }

    /// Empty when the value variable is used as is.
    pub fn val_expr(&self) -> &str {
        &self.val_expr
    }
}
