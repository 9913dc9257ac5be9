//! Condition algebra used to guard field assignments, list entries and
//! comprehension items.

use crate::value::{lit, Literal, Value};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }

    /// The operator that holds exactly when `self` does not.
    pub fn negate(self) -> CmpOp {
        match self {
            CmpOp::Eq => CmpOp::Ne,
            CmpOp::Ne => CmpOp::Eq,
            CmpOp::Lt => CmpOp::Ge,
            CmpOp::Le => CmpOp::Gt,
            CmpOp::Gt => CmpOp::Le,
            CmpOp::Ge => CmpOp::Lt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    Compare {
        op: CmpOp,
        left: Value,
        right: Value,
    },
    /// Conjunction. Empty means "always".
    And { items: Vec<Condition> },
    /// Disjunction. Empty means "always" as well; it is never rendered.
    Or { items: Vec<Condition> },
    Not { inner: Box<Condition> },
    /// `var.field != _|_` (or `==` when negated).
    FieldExists {
        var: String,
        field: String,
        negated: bool,
    },
    /// Existence of a field of the innermost iteration binding.
    ItemFieldExists { field: String, negated: bool },
    /// `path != _|_` where `path` is a full reference such as
    /// `parameter.cpu`.
    PathExists { path: String },
    /// The value itself used as a boolean, e.g. `parameter.enabled`.
    Truthy { value: Value },
}

impl Condition {
    /// Whether this condition imposes no constraint at all.
    pub fn is_trivial(&self) -> bool {
        match self {
            Condition::And { items } | Condition::Or { items } => {
                items.iter().all(Condition::is_trivial)
            }
            _ => false,
        }
    }

    pub fn and(self, other: Condition) -> Condition {
        and([self, other])
    }

    pub fn or(self, other: Condition) -> Condition {
        or([self, other])
    }

    pub fn not(self) -> Condition {
        not(self)
    }
}

fn compare(op: CmpOp, left: impl Into<Value>, right: impl Into<Value>) -> Condition {
    Condition::Compare {
        op,
        left: left.into(),
        right: right.into(),
    }
}

pub fn eq(left: impl Into<Value>, right: impl Into<Value>) -> Condition {
    compare(CmpOp::Eq, left, right)
}

pub fn ne(left: impl Into<Value>, right: impl Into<Value>) -> Condition {
    compare(CmpOp::Ne, left, right)
}

pub fn lt(left: impl Into<Value>, right: impl Into<Value>) -> Condition {
    compare(CmpOp::Lt, left, right)
}

pub fn le(left: impl Into<Value>, right: impl Into<Value>) -> Condition {
    compare(CmpOp::Le, left, right)
}

pub fn gt(left: impl Into<Value>, right: impl Into<Value>) -> Condition {
    compare(CmpOp::Gt, left, right)
}

pub fn ge(left: impl Into<Value>, right: impl Into<Value>) -> Condition {
    compare(CmpOp::Ge, left, right)
}

pub fn and(items: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::And {
        items: items.into_iter().collect(),
    }
}

pub fn or(items: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::Or {
        items: items.into_iter().collect(),
    }
}

pub fn not(inner: Condition) -> Condition {
    Condition::Not {
        inner: Box::new(inner),
    }
}

/// Element filter comparing a field of the current iteration binding with a
/// literal, e.g. `v.expose == true`.
pub fn field_equals(field: impl Into<String>, value: impl Into<Literal>) -> Condition {
    Condition::Compare {
        op: CmpOp::Eq,
        left: Value::ItemField {
            field: field.into(),
        },
        right: lit(value),
    }
}
