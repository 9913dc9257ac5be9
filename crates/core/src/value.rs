//! Expression and value model.
//!
//! Every node a definition can place into a template is a [`Value`]. Values
//! are immutable trees: builders produce them, the generator only reads them.

use crate::array::ArrayValue;
use crate::collection::{Collection, MapComprehension};
use crate::condition::{CmpOp, Condition};
use crate::param::Param;
use indexmap::IndexMap;
use serde::Serialize;

// ──────────────────────────────────────────────
// Literals
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    String,
    Int,
    Float,
    Bool,
    Null,
}

/// A scalar literal. The raw text is kept so that equality is exact and
/// floats keep the representation they were written with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Unquoted content for strings, canonical text for everything else.
    pub raw: String,
}

impl Literal {
    pub fn string(s: impl Into<String>) -> Self {
        Literal {
            kind: LiteralKind::String,
            raw: s.into(),
        }
    }

    pub fn int(i: i64) -> Self {
        Literal {
            kind: LiteralKind::Int,
            raw: i.to_string(),
        }
    }

    pub fn float(f: f64) -> Self {
        // Debug formatting always keeps a fraction or exponent ("1.0", "0.5").
        Literal {
            kind: LiteralKind::Float,
            raw: format!("{:?}", f),
        }
    }

    pub fn bool(b: bool) -> Self {
        Literal {
            kind: LiteralKind::Bool,
            raw: b.to_string(),
        }
    }

    pub fn null() -> Self {
        Literal {
            kind: LiteralKind::Null,
            raw: "null".to_owned(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.kind {
            LiteralKind::String => Some(&self.raw),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.kind {
            LiteralKind::Int => self.raw.parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.kind {
            LiteralKind::Float | LiteralKind::Int => self.raw.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            LiteralKind::Bool => Some(self.raw == "true"),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        self.kind == LiteralKind::Null
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::string(s)
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::string(s)
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Literal::int(i)
    }
}

impl From<i32> for Literal {
    fn from(i: i32) -> Self {
        Literal::int(i64::from(i))
    }
}

impl From<u32> for Literal {
    fn from(i: u32) -> Self {
        Literal::int(i64::from(i))
    }
}

impl From<f64> for Literal {
    fn from(f: f64) -> Self {
        Literal::float(f)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::bool(b)
    }
}

/// Shorthand for a literal value.
pub fn lit(l: impl Into<Literal>) -> Value {
    Value::Literal(l.into())
}

/// The `null` literal.
pub fn null() -> Value {
    Value::Literal(Literal::null())
}

// ──────────────────────────────────────────────
// References
// ──────────────────────────────────────────────

/// Reference to a declared parameter, relative to `parameter`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParamRef {
    /// Dotted path below `parameter`, e.g. `config.port`.
    pub name: String,
}

impl ParamRef {
    pub fn new(name: impl Into<String>) -> Self {
        ParamRef { name: name.into() }
    }

    /// Full reference path, e.g. `parameter.config.port`.
    pub fn path(&self) -> String {
        format!("parameter.{}", self.name)
    }
}

/// A reference to a parameter by dotted path.
pub fn param_ref(path: impl Into<String>) -> Value {
    Value::Param(ParamRef::new(path))
}

/// A raw CUE reference expression, emitted verbatim.
pub fn reference(expr: impl Into<String>) -> Value {
    Value::Reference { expr: expr.into() }
}

/// References into the runtime `context` object.
pub mod context {
    use super::Value;

    fn ctx(path: &str) -> Value {
        Value::Context {
            path: path.to_owned(),
        }
    }

    pub fn name() -> Value {
        ctx("name")
    }

    pub fn namespace() -> Value {
        ctx("namespace")
    }

    pub fn app_name() -> Value {
        ctx("appName")
    }

    pub fn app_revision() -> Value {
        ctx("appRevision")
    }

    pub fn app_revision_num() -> Value {
        ctx("appRevisionNum")
    }

    /// `context.output.<path>`, the rendered workload of a component.
    pub fn output(path: &str) -> Value {
        ctx(&format!("output.{}", path))
    }

    /// Any other context path.
    pub fn path(path: &str) -> Value {
        ctx(path)
    }
}

// ──────────────────────────────────────────────
// Operators and calls
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            ArithOp::Add | ArithOp::Sub => 1,
            ArithOp::Mul | ArithOp::Div => 2,
        }
    }

    /// Whether `a op (b op c)` equals `(a op b) op c`.
    pub fn is_associative(self) -> bool {
        matches!(self, ArithOp::Add | ArithOp::Mul)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinaryOp {
    pub op: ArithOp,
    pub left: Box<Value>,
    pub right: Box<Value>,
}

/// A call into a CUE standard library package (or a builtin when the
/// package is empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionCall {
    pub package: String,
    pub function: String,
    pub args: Vec<Value>,
}

impl FunctionCall {
    pub fn new(package: &str, function: &str, args: Vec<Value>) -> Self {
        FunctionCall {
            package: package.to_owned(),
            function: function.to_owned(),
            args,
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

fn binary(op: ArithOp, left: Value, right: Value) -> Value {
    Value::Binary(BinaryOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

/// Left-folded `+` over all operands (string concatenation or addition).
///
/// # Panics
///
/// Panics when called with no operands.
pub fn plus<I>(operands: I) -> Value
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    let mut iter = operands.into_iter().map(Into::into);
    let first = iter.next().expect("plus requires at least one operand");
    iter.fold(first, |acc, next| binary(ArithOp::Add, acc, next))
}

pub fn minus(left: impl Into<Value>, right: impl Into<Value>) -> Value {
    binary(ArithOp::Sub, left.into(), right.into())
}

pub fn times(left: impl Into<Value>, right: impl Into<Value>) -> Value {
    binary(ArithOp::Mul, left.into(), right.into())
}

pub fn divide(left: impl Into<Value>, right: impl Into<Value>) -> Value {
    binary(ArithOp::Div, left.into(), right.into())
}

/// String interpolation: literal string parts are embedded as text, every
/// other part as `\(expr)`.
pub fn interpolate<I>(parts: I) -> Value
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    Value::Interpolation {
        parts: parts.into_iter().map(Into::into).collect(),
    }
}

// ──────────────────────────────────────────────
// Containers
// ──────────────────────────────────────────────

/// A struct literal with insertion-ordered fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InlineStruct {
    pub fields: IndexMap<String, Value>,
}

impl InlineStruct {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn fields(&self) -> &IndexMap<String, Value> {
        &self.fields
    }
}

/// Build a struct literal from `(name, value)` pairs.
pub fn inline_struct<I, K, V>(fields: I) -> Value
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    Value::Struct(InlineStruct {
        fields: fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
    })
}

/// A one-element list holding a struct literal, e.g. `[{containerPort: ..}]`.
pub fn inline_array<I, K, V>(fields: I) -> Value
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    Value::List {
        items: vec![inline_struct(fields)],
    }
}

/// A list literal.
pub fn list<I>(items: I) -> Value
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    Value::List {
        items: items.into_iter().map(Into::into).collect(),
    }
}

/// Concatenate two list values.
pub fn array_concat(left: impl Into<Value>, right: impl Into<Value>) -> Value {
    Value::Concat {
        left: Box::new(left.into()),
        right: Box::new(right.into()),
    }
}

// ──────────────────────────────────────────────
// Value
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Value {
    Literal(Literal),
    /// `parameter.<name>`
    Param(ParamRef),
    /// `context.<path>`
    Context { path: String },
    /// Verbatim expression text.
    Reference { expr: String },
    /// The whole iteration binding, e.g. `v`.
    IterVar { var: String },
    /// A field of a named iteration binding, e.g. `v.port`.
    FieldRef { var: String, field: String },
    /// A field of whichever iteration binding is innermost at render time.
    ItemField { field: String },
    /// A let binding declared earlier in the same item.
    LetRef { name: String },
    Call(FunctionCall),
    Binary(BinaryOp),
    Interpolation { parts: Vec<Value> },
    Struct(InlineStruct),
    List { items: Vec<Value> },
    Array(ArrayValue),
    Concat { left: Box<Value>, right: Box<Value> },
    Collection(Box<Collection>),
    MapComprehension(MapComprehension),
    /// A template-level helper declared with `TemplateBuilder::helper`.
    Helper { name: String },
}

impl Value {
    /// Convert JSON data into literals, struct literals and lists. Object
    /// key order is preserved.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => null(),
            serde_json::Value::Bool(b) => lit(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    lit(i)
                } else {
                    // u64 beyond i64 and floats both land here
                    lit(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => lit(s),
            serde_json::Value::Array(items) => Value::List {
                items: items.into_iter().map(Value::from_json).collect(),
            },
            serde_json::Value::Object(map) => Value::Struct(InlineStruct {
                fields: map
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            }),
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Value::Literal(l) => Some(l),
            _ => None,
        }
    }

    /// `len(self) != 0`
    pub fn not_empty(&self) -> Condition {
        Condition::Compare {
            op: CmpOp::Ne,
            left: Value::Call(FunctionCall::new("", "len", vec![self.clone()])),
            right: lit(0),
        }
    }
}

impl From<Literal> for Value {
    fn from(l: Literal) -> Self {
        Value::Literal(l)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        lit(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        lit(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        lit(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        lit(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        lit(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        lit(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        lit(b)
    }
}

impl From<&Value> for Value {
    fn from(v: &Value) -> Self {
        v.clone()
    }
}

impl From<ParamRef> for Value {
    fn from(r: ParamRef) -> Self {
        Value::Param(r)
    }
}

impl From<&Param> for Value {
    fn from(p: &Param) -> Self {
        Value::Param(ParamRef::new(p.name.clone()))
    }
}

impl From<Param> for Value {
    fn from(p: Param) -> Self {
        Value::Param(ParamRef::new(p.name))
    }
}

impl From<FunctionCall> for Value {
    fn from(c: FunctionCall) -> Self {
        Value::Call(c)
    }
}

impl From<InlineStruct> for Value {
    fn from(s: InlineStruct) -> Self {
        Value::Struct(s)
    }
}

impl From<ArrayValue> for Value {
    fn from(a: ArrayValue) -> Self {
        Value::Array(a)
    }
}

impl From<Collection> for Value {
    fn from(c: Collection) -> Self {
        Value::Collection(Box::new(c))
    }
}

impl From<MapComprehension> for Value {
    fn from(m: MapComprehension) -> Self {
        Value::MapComprehension(m)
    }
}
