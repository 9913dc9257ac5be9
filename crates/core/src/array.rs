//! List builders: static elements, conditional elements and `for`
//! comprehensions with per-item operations.

use crate::condition::Condition;
use crate::value::Value;
use indexmap::IndexMap;
use serde::Serialize;

/// Default binding name of [`ArrayBuilder::for_each_with`].
pub const DEFAULT_VAR: &str = "v";
/// Binding name of [`ArrayBuilder::for_each`].
pub const ELEMENT_VAR: &str = "m";

// ──────────────────────────────────────────────
// Static elements
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ElementOp {
    Set {
        field: String,
        value: Value,
    },
    SetIf {
        cond: Condition,
        field: String,
        value: Value,
    },
}

/// A struct element of a list, built from ordered field operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArrayElement {
    ops: Vec<ElementOp>,
}

impl ArrayElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ops.push(ElementOp::Set {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn set_if(
        mut self,
        cond: Condition,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.ops.push(ElementOp::SetIf {
            cond,
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn ops(&self) -> &[ElementOp] {
        &self.ops
    }

    /// Unconditional fields, last write wins.
    pub fn fields(&self) -> IndexMap<&str, &Value> {
        let mut out = IndexMap::new();
        for op in &self.ops {
            if let ElementOp::Set { field, value } = op {
                out.insert(field.as_str(), value);
            }
        }
        out
    }
}

// ──────────────────────────────────────────────
// Comprehension items
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ItemOp {
    Set {
        field: String,
        value: Value,
    },
    /// `field: *value | type_hint`
    SetDefault {
        field: String,
        value: Value,
        type_hint: String,
    },
    Let {
        name: String,
        value: Value,
    },
    If {
        cond: Condition,
        ops: Vec<ItemOp>,
    },
    IfFieldSet {
        field: String,
        ops: Vec<ItemOp>,
    },
    IfFieldNotSet {
        field: String,
        ops: Vec<ItemOp>,
    },
}

/// One `for` comprehension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Iteration {
    pub source: Value,
    pub var: String,
    /// Skips the whole loop when false.
    pub guard: Option<Condition>,
    /// Skips single elements when false.
    pub filter: Option<Condition>,
    pub ops: Vec<ItemOp>,
}

/// Refers to the binding of the enclosing comprehension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterVarHandle {
    var: String,
}

impl IterVarHandle {
    /// `v.<name>`
    pub fn field(&self, name: &str) -> Value {
        Value::FieldRef {
            var: self.var.clone(),
            field: name.to_owned(),
        }
    }

    /// The element itself, `v`.
    pub fn reference(&self) -> Value {
        Value::IterVar {
            var: self.var.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.var
    }
}

/// Records the operations of one comprehension item. Handed to the closure
/// of the `for_each_with*` family.
#[derive(Debug)]
pub struct ItemBuilder {
    var: String,
    ops: Vec<ItemOp>,
}

impl ItemBuilder {
    fn new(var: &str) -> Self {
        ItemBuilder {
            var: var.to_owned(),
            ops: Vec::new(),
        }
    }

    pub fn var(&self) -> IterVarHandle {
        IterVarHandle {
            var: self.var.clone(),
        }
    }

    pub fn var_name(&self) -> &str {
        &self.var
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.ops.push(ItemOp::Set {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn set_default(
        &mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
        type_hint: impl Into<String>,
    ) -> &mut Self {
        self.ops.push(ItemOp::SetDefault {
            field: field.into(),
            value: value.into(),
            type_hint: type_hint.into(),
        });
        self
    }

    /// Declare a local binding and return a reference to it. A name with a
    /// leading `_` becomes a hidden field of the item.
    pub fn let_(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Value {
        let name = name.into();
        self.ops.push(ItemOp::Let {
            name: name.clone(),
            value: value.into(),
        });
        Value::LetRef { name }
    }

    pub fn if_(&mut self, cond: Condition, f: impl FnOnce(&mut ItemBuilder)) -> &mut Self {
        let ops = self.nested(f);
        self.ops.push(ItemOp::If { cond, ops });
        self
    }

    /// Operations applied when the element has `field`.
    pub fn if_set(&mut self, field: impl Into<String>, f: impl FnOnce(&mut ItemBuilder)) -> &mut Self {
        let ops = self.nested(f);
        self.ops.push(ItemOp::IfFieldSet {
            field: field.into(),
            ops,
        });
        self
    }

    /// Operations applied when the element lacks `field`.
    pub fn if_not_set(
        &mut self,
        field: impl Into<String>,
        f: impl FnOnce(&mut ItemBuilder),
    ) -> &mut Self {
        let ops = self.nested(f);
        self.ops.push(ItemOp::IfFieldNotSet {
            field: field.into(),
            ops,
        });
        self
    }

    pub fn field_exists(&self, field: &str) -> Condition {
        Condition::FieldExists {
            var: self.var.clone(),
            field: field.to_owned(),
            negated: false,
        }
    }

    pub fn field_not_exists(&self, field: &str) -> Condition {
        Condition::FieldExists {
            var: self.var.clone(),
            field: field.to_owned(),
            negated: true,
        }
    }

    pub fn ops(&self) -> &[ItemOp] {
        &self.ops
    }

    fn nested(&self, f: impl FnOnce(&mut ItemBuilder)) -> Vec<ItemOp> {
        let mut inner = ItemBuilder::new(&self.var);
        f(&mut inner);
        inner.ops
    }
}

// ──────────────────────────────────────────────
// Arrays
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum ArrayEntry {
    Item {
        element: ArrayElement,
    },
    ItemIf {
        cond: Condition,
        element: ArrayElement,
    },
    /// `for m in source { element }`; the element reads the binding through
    /// [`Value::ItemField`].
    ForEach {
        source: Value,
        var: String,
        guard: Option<Condition>,
        element: ArrayElement,
    },
    Iteration(Iteration),
}

/// A frozen list built by [`ArrayBuilder`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArrayValue {
    pub entries: Vec<ArrayEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct ArrayBuilder {
    entries: Vec<ArrayEntry>,
}

impl ArrayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(mut self, element: ArrayElement) -> Self {
        self.entries.push(ArrayEntry::Item { element });
        self
    }

    pub fn item_if(mut self, cond: Condition, element: ArrayElement) -> Self {
        self.entries.push(ArrayEntry::ItemIf { cond, element });
        self
    }

    pub fn for_each(mut self, source: impl Into<Value>, element: ArrayElement) -> Self {
        self.entries.push(ArrayEntry::ForEach {
            source: source.into(),
            var: ELEMENT_VAR.to_owned(),
            guard: None,
            element,
        });
        self
    }

    pub fn for_each_guarded(
        mut self,
        guard: Condition,
        source: impl Into<Value>,
        element: ArrayElement,
    ) -> Self {
        self.entries.push(ArrayEntry::ForEach {
            source: source.into(),
            var: ELEMENT_VAR.to_owned(),
            guard: Some(guard),
            element,
        });
        self
    }

    pub fn for_each_with(self, source: impl Into<Value>, f: impl FnOnce(&mut ItemBuilder)) -> Self {
        self.iteration(DEFAULT_VAR, None, None, source.into(), f)
    }

    pub fn for_each_with_var(
        self,
        var: &str,
        source: impl Into<Value>,
        f: impl FnOnce(&mut ItemBuilder),
    ) -> Self {
        self.iteration(var, None, None, source.into(), f)
    }

    pub fn for_each_with_guarded_filtered(
        self,
        guard: Condition,
        filter: Condition,
        source: impl Into<Value>,
        f: impl FnOnce(&mut ItemBuilder),
    ) -> Self {
        self.iteration(DEFAULT_VAR, Some(guard), Some(filter), source.into(), f)
    }

    pub fn for_each_with_guarded_filtered_var(
        self,
        var: &str,
        guard: Condition,
        filter: Condition,
        source: impl Into<Value>,
        f: impl FnOnce(&mut ItemBuilder),
    ) -> Self {
        self.iteration(var, Some(guard), Some(filter), source.into(), f)
    }

    pub fn build(self) -> ArrayValue {
        ArrayValue {
            entries: self.entries,
        }
    }

    fn iteration(
        mut self,
        var: &str,
        guard: Option<Condition>,
        filter: Option<Condition>,
        source: Value,
        f: impl FnOnce(&mut ItemBuilder),
    ) -> Self {
        let mut item = ItemBuilder::new(var);
        f(&mut item);
        self.entries.push(ArrayEntry::Iteration(Iteration {
            source,
            var: var.to_owned(),
            guard,
            filter,
            ops: item.ops,
        }));
        self
    }
}

impl From<ArrayBuilder> for ArrayValue {
    fn from(builder: ArrayBuilder) -> Self {
        builder.build()
    }
}

impl From<ArrayBuilder> for Value {
    fn from(builder: ArrayBuilder) -> Self {
        Value::Array(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{field_equals, ne};
    use crate::functions::strconv_format_int;
    use crate::param::Param;
    use crate::value::{lit, plus};

    fn iteration(arr: &ArrayValue) -> &Iteration {
        match arr.entries.as_slice() {
            [ArrayEntry::Iteration(it)] => it,
            other => panic!("expected one iteration, got {:?}", other),
        }
    }

    #[test]
    fn test_for_each_with_default_var() {
        let ports = Param::list("ports");
        let mut seen = String::new();
        let arr = ArrayBuilder::new()
            .for_each_with(&ports, |item| {
                seen = item.var_name().to_owned();
                let v = item.var();
                item.set("containerPort", v.field("port"));
            })
            .build();
        assert_eq!(seen, "v");
        let it = iteration(&arr);
        assert_eq!(it.var, "v");
        assert_eq!(it.source, Value::from(&ports));
        assert_eq!(
            it.ops,
            vec![ItemOp::Set {
                field: "containerPort".to_owned(),
                value: Value::FieldRef {
                    var: "v".to_owned(),
                    field: "port".to_owned()
                }
            }]
        );
    }

    #[test]
    fn test_for_each_with_custom_var() {
        let ports = Param::list("ports");
        let arr = ArrayBuilder::new()
            .for_each_with_var("p", &ports, |item| {
                let v = item.var();
                assert_eq!(v.name(), "p");
                assert_eq!(
                    v.reference(),
                    Value::IterVar {
                        var: "p".to_owned()
                    }
                );
                item.set("containerPort", v.field("port"));
            })
            .build();
        assert_eq!(iteration(&arr).var, "p");
    }

    #[test]
    fn test_let_returns_reference() {
        let ports = Param::list("ports");
        let mut name_ref = None;
        let _ = ArrayBuilder::new().for_each_with(&ports, |item| {
            let v = item.var();
            let r = item.let_("_name", plus([lit("port-"), strconv_format_int(v.field("port"), 10)]));
            item.set_default("name", r.clone(), "string");
            name_ref = Some(r);
        });
        assert_eq!(
            name_ref,
            Some(Value::LetRef {
                name: "_name".to_owned()
            })
        );
    }

    #[test]
    fn test_nested_conditionals_collect_ops() {
        let ports = Param::list("ports");
        let arr = ArrayBuilder::new()
            .for_each_with(&ports, |item| {
                let v = item.var();
                item.if_set("containerPort", |item| {
                    item.set("containerPort", v.field("containerPort"));
                });
                item.if_not_set("containerPort", |item| {
                    item.set("containerPort", v.field("port"));
                });
                item.if_(ne(v.field("protocol"), "TCP"), |item| {
                    item.set("protocol", v.field("protocol"));
                });
            })
            .build();
        let ops = &iteration(&arr).ops;
        assert_eq!(ops.len(), 3);
        assert!(matches!(&ops[0], ItemOp::IfFieldSet { field, ops } if field == "containerPort" && ops.len() == 1));
        assert!(matches!(&ops[1], ItemOp::IfFieldNotSet { field, .. } if field == "containerPort"));
        assert!(matches!(&ops[2], ItemOp::If { ops, .. } if ops.len() == 1));
    }

    #[test]
    fn test_guard_and_filter_are_recorded() {
        let ports = Param::list("ports");
        let arr = ArrayBuilder::new()
            .for_each_with_guarded_filtered(
                ports.is_set(),
                field_equals("expose", true),
                &ports,
                |item| {
                    let v = item.var();
                    item.set("port", v.field("port"));
                },
            )
            .build();
        let it = iteration(&arr);
        assert_eq!(it.guard, Some(ports.is_set()));
        assert_eq!(it.filter, Some(field_equals("expose", true)));
    }

    #[test]
    fn test_field_exists_conditions() {
        let ports = Param::list("ports");
        let _ = ArrayBuilder::new().for_each_with_var("p", &ports, |item| {
            assert_eq!(
                item.field_exists("name"),
                Condition::FieldExists {
                    var: "p".to_owned(),
                    field: "name".to_owned(),
                    negated: false
                }
            );
            assert!(matches!(
                item.field_not_exists("name"),
                Condition::FieldExists { negated: true, .. }
            ));
        });
    }

    #[test]
    fn test_array_element_fields() {
        let enabled = Param::bool("enabled");
        let elem = ArrayElement::new()
            .set("name", "test")
            .set("port", 8080)
            .set_if(enabled.is_true(), "active", true);
        assert_eq!(elem.ops().len(), 3);
        let fields = elem.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["name"], &lit("test"));
        assert_eq!(fields["port"], &lit(8080));
    }

    #[test]
    fn test_static_and_conditional_entries() {
        let enabled = Param::bool("enabled");
        let arr = ArrayBuilder::new()
            .item(ArrayElement::new().set("name", "a"))
            .item_if(enabled.is_true(), ArrayElement::new().set("name", "b"))
            .for_each(Param::list("extra"), ArrayElement::new())
            .build();
        assert_eq!(arr.entries.len(), 3);
        assert!(matches!(&arr.entries[2], ArrayEntry::ForEach { var, .. } if var == "m"));
    }
}
