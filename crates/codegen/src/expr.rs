//! Rendering of values and conditions into CUE expressions.

use std::collections::BTreeSet;

use defkit_core::array::{ArrayElement, ArrayEntry, ArrayValue, ElementOp, ItemOp, Iteration};
use defkit_core::collection::{Collection, FieldValue, MapComprehension};
use defkit_core::{
    ArithOp, BinaryOp, Condition, FunctionCall, InlineStruct, Literal, LiteralKind, Value,
};

use crate::imports::FunctionTable;
use crate::scope::Scope;
use crate::writer::{Doc, Item};

// ── Lexical helpers ───────────────────────────────────────────────────────────

/// Names that must be quoted even though they look like identifiers.
const RESERVED: &[&str] = &["true", "false", "null", "_", "if", "for", "in", "let"];

pub(crate) fn is_identifier(name: &str) -> bool {
    let body = name.strip_prefix('#').unwrap_or(name);
    let mut chars = body.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// A JSON-escaped, double-quoted string literal.
pub(crate) fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

/// A field label, quoted unless it is a plain identifier.
pub(crate) fn label(name: &str) -> String {
    if is_identifier(name) && !RESERVED.contains(&name) {
        name.to_owned()
    } else {
        quote(name)
    }
}

/// Dotted keys become chained labels: `a.b` renders as `a: b`.
pub(crate) fn field_label(key: &str) -> String {
    key.split('.').map(label).collect::<Vec<_>>().join(": ")
}

/// `base.field`, or `base["field"]` when the field is not an identifier.
pub(crate) fn selector(base: &str, field: &str) -> String {
    if is_identifier(field) && !RESERVED.contains(&field) {
        format!("{}.{}", base, field)
    } else {
        format!("{}[{}]", base, quote(field))
    }
}

/// `parameter.a.b` for a dotted parameter name.
pub(crate) fn param_path(name: &str) -> String {
    name.split('.').fold("parameter".to_owned(), |acc, seg| selector(&acc, seg))
}

/// Subject of an existence test. Parameter paths use index syntax so that
/// the test never fails on a missing intermediate field.
fn exists_subject(path: &str) -> String {
    match path.strip_prefix("parameter.") {
        Some(rest) => rest.split('.').fold("parameter".to_owned(), |acc, seg| {
            format!("{}[{}]", acc, quote(seg))
        }),
        None => path.to_owned(),
    }
}

pub(crate) fn literal(l: &Literal) -> String {
    match l.kind {
        LiteralKind::String => quote(&l.raw),
        LiteralKind::Int | LiteralKind::Float | LiteralKind::Bool | LiteralKind::Null => {
            l.raw.clone()
        }
    }
}

fn paren(s: String) -> String {
    format!("({})", s)
}

// ── Renderer ──────────────────────────────────────────────────────────────────

const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_CMP: u8 = 3;
const PREC_ATOM: u8 = 4;

/// Per-generation rendering state: detected imports and the binding scope.
pub(crate) struct Renderer<'a> {
    functions: &'a FunctionTable,
    imports: BTreeSet<String>,
    scope: Scope,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(functions: &'a FunctionTable) -> Self {
        Renderer {
            functions,
            imports: BTreeSet::new(),
            scope: Scope::default(),
        }
    }

    pub(crate) fn into_imports(self) -> BTreeSet<String> {
        self.imports
    }

    /// Render a value; containers become blocks.
    pub(crate) fn value(&mut self, v: &Value) -> Doc {
        match v {
            Value::Struct(s) => self.inline_struct(s),
            Value::List { items } => self.list(items),
            Value::Array(a) => self.array(a),
            Value::Collection(c) => self.collection(c),
            Value::MapComprehension(m) => self.map_comprehension(m),
            _ => Doc::Inline(self.expr(v)),
        }
    }

    /// Render a value on a single line.
    pub(crate) fn expr(&mut self, v: &Value) -> String {
        match v {
            Value::Literal(l) => literal(l),
            Value::Param(r) => param_path(&r.name),
            Value::Context { path } => format!("context.{}", path),
            Value::Reference { expr } => self.raw(expr),
            Value::IterVar { var } => {
                self.scope.require_var(var);
                var.clone()
            }
            Value::FieldRef { var, field } => {
                self.scope.require_var(var);
                selector(var, field)
            }
            Value::ItemField { field } => selector(self.scope.current_var(field), field),
            Value::LetRef { name } => {
                self.scope.require_let(name);
                name.clone()
            }
            Value::Call(call) => self.call(call),
            Value::Binary(op) => self.binary(op),
            Value::Interpolation { parts } => self.interpolation(parts),
            Value::Concat { left, right } => {
                let call = FunctionCall::new(
                    "list",
                    "Concat",
                    vec![Value::List {
                        items: vec![(**left).clone(), (**right).clone()],
                    }],
                );
                self.call(&call)
            }
            Value::Helper { name } => name.clone(),
            Value::Struct(_)
            | Value::List { .. }
            | Value::Array(_)
            | Value::Collection(_)
            | Value::MapComprehension(_) => self.value(v).flatten(),
        }
    }

    fn call(&mut self, call: &FunctionCall) -> String {
        if let Some(import) = self.functions.import_for(call.package(), call.function()) {
            tracing::trace!(import, function = call.function(), "detected import");
            self.imports.insert(import.to_owned());
        }
        let args: Vec<String> = call.args().iter().map(|a| self.expr(a)).collect();
        if call.package().is_empty() {
            format!("{}({})", call.function(), args.join(", "))
        } else {
            format!("{}.{}({})", call.package(), call.function(), args.join(", "))
        }
    }

    fn binary(&mut self, op: &BinaryOp) -> String {
        let prec = op.op.precedence();
        let left = self.operand(&op.left, prec, None);
        let right = self.operand(&op.right, prec, Some(op.op));
        format!("{} {} {}", left, op.op.symbol(), right)
    }

    /// `parent` is set for right operands.
    fn operand(&mut self, v: &Value, prec: u8, parent: Option<ArithOp>) -> String {
        let s = self.expr(v);
        match v {
            Value::Binary(inner) => {
                let p = inner.op.precedence();
                let non_assoc_right =
                    parent.map_or(false, |op| p == prec && !op.is_associative());
                if p < prec || non_assoc_right {
                    paren(s)
                } else {
                    s
                }
            }
            _ => s,
        }
    }

    fn interpolation(&mut self, parts: &[Value]) -> String {
        let mut out = String::from("\"");
        for part in parts {
            match part {
                Value::Literal(l) if l.kind == LiteralKind::String => {
                    let quoted = quote(&l.raw);
                    out.push_str(&quoted[1..quoted.len() - 1]);
                }
                other => {
                    out.push_str("\\(");
                    out.push_str(&self.expr(other));
                    out.push(')');
                }
            }
        }
        out.push('"');
        out
    }

    // ── Containers ────────────────────────────────────────────────────────────

    fn inline_struct(&mut self, s: &InlineStruct) -> Doc {
        if s.fields().is_empty() {
            return Doc::inline("{}");
        }
        let items = s
            .fields()
            .iter()
            .map(|(k, v)| self.field_item(k, v))
            .collect();
        Doc::block(items)
    }

    fn list(&mut self, items: &[Value]) -> Doc {
        if items.is_empty() {
            return Doc::inline("[]");
        }
        let docs: Vec<Doc> = items.iter().map(|v| self.value(v)).collect();
        if docs.iter().all(Doc::is_inline) {
            let parts: Vec<String> = docs.iter().map(Doc::flatten).collect();
            return Doc::Inline(format!("[{}]", parts.join(", ")));
        }
        Doc::Block {
            open: "[".to_owned(),
            items: docs.into_iter().map(Item::Element).collect(),
            close: "]".to_owned(),
        }
    }

    /// A field of a struct body. Literal values take part in alignment.
    pub(crate) fn field_item(&mut self, key: &str, value: &Value) -> Item {
        let doc = self.value(value);
        Item::Field {
            label: field_label(key),
            value: doc,
            align: matches!(value, Value::Literal(_)) && !key.contains('.'),
        }
    }

    fn array(&mut self, array: &ArrayValue) -> Doc {
        match array.entries.as_slice() {
            [] => Doc::inline("[]"),
            [single] => {
                let (head, items) = self.entry(single);
                match head {
                    Some(head) => Doc::Block {
                        open: format!("[{} {{", head),
                        items,
                        close: "}]".to_owned(),
                    },
                    None => Doc::Block {
                        open: "[{".to_owned(),
                        items,
                        close: "}]".to_owned(),
                    },
                }
            }
            entries => {
                let mut elements = Vec::new();
                for entry in entries {
                    let (head, items) = self.entry(entry);
                    let open = match head {
                        Some(head) => format!("{} {{", head),
                        None => "{".to_owned(),
                    };
                    elements.push(Item::Element(Doc::Block {
                        open,
                        items,
                        close: "}".to_owned(),
                    }));
                }
                Doc::Block {
                    open: "[".to_owned(),
                    items: elements,
                    close: "]".to_owned(),
                }
            }
        }
    }

    /// Comprehension head (if any) and body items of one list entry.
    fn entry(&mut self, entry: &ArrayEntry) -> (Option<String>, Vec<Item>) {
        match entry {
            ArrayEntry::Item { element } => (None, self.element(element)),
            ArrayEntry::ItemIf { cond, element } => {
                let head = self.cond(cond).map(|c| format!("if {}", c));
                (head, self.element(element))
            }
            ArrayEntry::ForEach {
                source,
                var,
                guard,
                element,
            } => {
                let head = self.open_comprehension(var, source, guard.as_ref(), None);
                let items = self.element(element);
                self.scope.pop();
                (Some(head), items)
            }
            ArrayEntry::Iteration(it) => self.iteration(it),
        }
    }

    fn iteration(&mut self, it: &Iteration) -> (Option<String>, Vec<Item>) {
        let head = self.open_comprehension(&it.var, &it.source, it.guard.as_ref(), it.filter.as_ref());
        let items = self.item_ops(&it.ops);
        self.scope.pop();
        (Some(head), items)
    }

    /// Render `[if guard] for var in source [if filter]` and push the
    /// binding. The caller pops it.
    fn open_comprehension(
        &mut self,
        var: &str,
        source: &Value,
        guard: Option<&Condition>,
        filter: Option<&Condition>,
    ) -> String {
        let guard = guard.and_then(|g| self.cond(g));
        let source = self.expr(source);
        self.scope.push(var);
        let filter = filter.and_then(|f| self.cond(f));

        let mut head = String::new();
        if let Some(g) = guard {
            head.push_str(&format!("if {} ", g));
        }
        head.push_str(&format!("for {} in {}", var, source));
        if let Some(f) = filter {
            head.push_str(&format!(" if {}", f));
        }
        head
    }

    fn element(&mut self, element: &ArrayElement) -> Vec<Item> {
        let mut items = Vec::new();
        for op in element.ops() {
            match op {
                ElementOp::Set { field, value } => items.push(self.field_item(field, value)),
                ElementOp::SetIf { cond, field, value } => {
                    let item = self.field_item(field, value);
                    match self.cond(cond) {
                        Some(c) => items.push(Item::guarded(&c, vec![item])),
                        None => items.push(item),
                    }
                }
            }
        }
        items
    }

    fn item_ops(&mut self, ops: &[ItemOp]) -> Vec<Item> {
        let mut items = Vec::new();
        let mut i = 0;
        while i < ops.len() {
            match &ops[i] {
                ItemOp::Set { field, value } => items.push(self.field_item(field, value)),
                ItemOp::SetDefault {
                    field,
                    value,
                    type_hint,
                } => {
                    let default = self.expr(value);
                    items.push(Item::field(
                        field_label(field),
                        Doc::Inline(format!("*{} | {}", default, type_hint)),
                    ));
                }
                ItemOp::Let { name, value } => {
                    let doc = self.value(value);
                    self.scope.declare_let(name);
                    if name.starts_with('_') {
                        items.push(Item::field(name.clone(), doc));
                    } else {
                        items.push(Item::Line(format!("let {} = {}", name, doc.flatten())));
                    }
                }
                ItemOp::If { cond, ops } => match self.cond(cond) {
                    Some(c) => {
                        let inner = self.nested_ops(ops);
                        items.push(Item::guarded(&c, inner));
                    }
                    None => items.extend(self.item_ops(ops)),
                },
                ItemOp::IfFieldSet { field, ops: then_ops } => {
                    items.push(self.existence_branch(field, true, then_ops));
                    // A directly following `if_not_set` on the same field
                    // completes the pair.
                    if let Some(ItemOp::IfFieldNotSet {
                        field: other,
                        ops: else_ops,
                    }) = ops.get(i + 1)
                    {
                        if other == field {
                            items.push(self.existence_branch(field, false, else_ops));
                            i += 1;
                        }
                    }
                }
                ItemOp::IfFieldNotSet { field, ops } => {
                    items.push(self.existence_branch(field, false, ops));
                }
            }
            i += 1;
        }
        items
    }

    fn existence_branch(&mut self, field: &str, present: bool, ops: &[ItemOp]) -> Item {
        let subject = selector(self.scope.current_var(field), field);
        let op = if present { "!=" } else { "==" };
        let inner = self.nested_ops(ops);
        Item::guarded(&format!("{} {} _|_", subject, op), inner)
    }

    /// Operations of a guarded block; lets declared inside stay inside.
    fn nested_ops(&mut self, ops: &[ItemOp]) -> Vec<Item> {
        let mark = self.scope.let_mark();
        let items = self.item_ops(ops);
        self.scope.release_lets(mark);
        items
    }

    fn collection(&mut self, c: &Collection) -> Doc {
        let head = self.open_comprehension(&c.var, &c.source, c.guard.as_ref(), c.filter.as_ref());
        let mut items = Vec::new();
        for (key, fv) in &c.fields {
            self.field_value(&c.var, key, fv, &mut items);
        }
        for variant in &c.variants {
            let discriminator = selector(&c.var, &variant.discriminator);
            let mut inner = Vec::new();
            for (key, fv) in &variant.fields {
                self.field_value(&c.var, key, fv, &mut inner);
            }
            if !inner.is_empty() {
                let cond = format!("{} == {}", discriminator, quote(&variant.value));
                items.push(Item::guarded(&cond, inner));
            }
        }
        self.scope.pop();
        Doc::Block {
            open: format!("[{} {{", head),
            items,
            close: "}]".to_owned(),
        }
    }

    fn field_value(&mut self, var: &str, key: &str, fv: &FieldValue, items: &mut Vec<Item>) {
        match fv {
            FieldValue::Value { value } => items.push(self.field_item(key, value)),
            FieldValue::Field { name } => {
                items.push(Item::field(field_label(key), Doc::Inline(selector(var, name))));
            }
            FieldValue::OptionalField { name } => {
                let sel = selector(var, name);
                let field = Item::field(field_label(key), Doc::Inline(sel.clone()));
                items.push(Item::guarded(&format!("{} != _|_", sel), vec![field]));
            }
            FieldValue::OptionalFieldWithCond { name, cond } => {
                let sel = selector(var, name);
                let mut inner = vec![Item::field(field_label(key), Doc::Inline(sel.clone()))];
                if let Some(c) = self.cond(cond) {
                    inner = vec![Item::guarded(&c, inner)];
                }
                items.push(Item::guarded(&format!("{} != _|_", sel), inner));
            }
            FieldValue::OrConditional {
                field,
                primary,
                fallback,
            } => {
                let sel = selector(var, field);
                let primary = self.field_item(key, primary);
                let fallback = self.field_item(key, fallback);
                items.push(Item::guarded(&format!("{} != _|_", sel), vec![primary]));
                items.push(Item::guarded(&format!("{} == _|_", sel), vec![fallback]));
            }
        }
    }

    /// A caller-written expression, scanned for calls that need imports.
    fn raw(&mut self, expr: &str) -> String {
        let functions = self.functions;
        for import in functions.imports_in(expr) {
            tracing::trace!(import, "detected import in raw expression");
            self.imports.insert(import.to_owned());
        }
        expr.to_owned()
    }

    fn map_comprehension(&mut self, m: &MapComprehension) -> Doc {
        let key = if m.key_expr().is_empty() {
            m.key_var().to_owned()
        } else {
            self.raw(m.key_expr())
        };
        let value = if m.val_expr().is_empty() {
            m.val_var().to_owned()
        } else {
            self.raw(m.val_expr())
        };
        let source = self.raw(m.source());
        Doc::block(vec![Item::Block {
            open: format!("for {}, {} in {} {{", m.key_var(), m.val_var(), source),
            items: vec![Item::Line(format!("({}): {}", key, value))],
            close: "}".to_owned(),
        }])
    }

    // ── Conditions ────────────────────────────────────────────────────────────

    /// Render a guard; `None` when it imposes no constraint.
    pub(crate) fn cond(&mut self, c: &Condition) -> Option<String> {
        self.cond_prec(c).map(|(s, _)| s)
    }

    fn cond_prec(&mut self, c: &Condition) -> Option<(String, u8)> {
        match c {
            Condition::Compare { op, left, right } => Some((
                format!("{} {} {}", self.expr(left), op.symbol(), self.expr(right)),
                PREC_CMP,
            )),
            Condition::And { items } => self.junction(items, " && ", PREC_AND),
            Condition::Or { items } => self.junction(items, " || ", PREC_OR),
            Condition::Not { inner } => Some(self.negated(inner)),
            Condition::FieldExists {
                var,
                field,
                negated,
            } => {
                self.scope.require_var(var);
                Some((existence(&selector(var, field), *negated), PREC_CMP))
            }
            Condition::ItemFieldExists { field, negated } => {
                let subject = selector(self.scope.current_var(field), field);
                Some((existence(&subject, *negated), PREC_CMP))
            }
            Condition::PathExists { path } => {
                Some((existence(&exists_subject(path), false), PREC_CMP))
            }
            Condition::Truthy { value } => Some(self.truthy(value)),
        }
    }

    fn junction(&mut self, items: &[Condition], sep: &str, prec: u8) -> Option<(String, u8)> {
        let mut parts: Vec<(String, u8)> = items.iter().filter_map(|c| self.cond_prec(c)).collect();
        match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => {
                let rendered: Vec<String> = parts
                    .into_iter()
                    .map(|(s, p)| if p < prec { paren(s) } else { s })
                    .collect();
                Some((rendered.join(sep), prec))
            }
        }
    }

    fn truthy(&mut self, value: &Value) -> (String, u8) {
        let s = self.expr(value);
        if matches!(value, Value::Binary(_)) {
            (s, PREC_CMP)
        } else {
            (s, PREC_ATOM)
        }
    }

    /// Push a negation inward where CUE has a direct form.
    fn negated(&mut self, c: &Condition) -> (String, u8) {
        match c {
            Condition::Compare { op, left, right } => self
                .cond_prec(&Condition::Compare {
                    op: op.negate(),
                    left: left.clone(),
                    right: right.clone(),
                })
                .unwrap_or_else(|| ("false".to_owned(), PREC_ATOM)),
            Condition::FieldExists {
                var,
                field,
                negated,
            } => {
                self.scope.require_var(var);
                (existence(&selector(var, field), !negated), PREC_CMP)
            }
            Condition::ItemFieldExists { field, negated } => {
                let subject = selector(self.scope.current_var(field), field);
                (existence(&subject, !negated), PREC_CMP)
            }
            Condition::PathExists { path } => (existence(&exists_subject(path), true), PREC_CMP),
            Condition::Not { inner } => self
                .cond_prec(inner)
                .unwrap_or_else(|| ("true".to_owned(), PREC_ATOM)),
            Condition::Truthy { value } => {
                let (s, p) = self.truthy(value);
                let s = if p < PREC_ATOM { paren(s) } else { s };
                (format!("!{}", s), PREC_ATOM)
            }
            Condition::And { items } | Condition::Or { items } => {
                let live: Vec<&Condition> = items.iter().filter(|c| !c.is_trivial()).collect();
                match live.as_slice() {
                    [] => ("false".to_owned(), PREC_ATOM),
                    [only] => self.negated(only),
                    _ => match self.cond_prec(c) {
                        Some((s, _)) => (format!("!({})", s), PREC_ATOM),
                        None => ("false".to_owned(), PREC_ATOM),
                    },
                }
            }
        }
    }
}

fn existence(subject: &str, negated: bool) -> String {
    if negated {
        format!("{} == _|_", subject)
    } else {
        format!("{} != _|_", subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::writer::Printer;
    use defkit_core::collection::{each, field_map, field_ref, for_each_map, optional_field_ref, or_field};
    use defkit_core::functions::{strconv_format_int, strings_to_lower};
    use defkit_core::{
        and, context, divide, eq, field_equals, inline_struct, interpolate, lit, minus, ne, not,
        or, param_ref, plus, times, ArrayBuilder, ArrayElement, Param,
    };

    fn render(v: &Value) -> String {
        let table = FunctionTable::default();
        let mut r = Renderer::new(&table);
        let doc = r.value(v);
        let config = GeneratorConfig::default();
        let mut p = Printer::new(&config);
        p.doc(&doc, 0);
        p.finish()
    }

    fn cond(c: &Condition) -> Option<String> {
        let table = FunctionTable::default();
        Renderer::new(&table).cond(c)
    }

    #[test]
    fn test_labels() {
        assert_eq!(label("image"), "image");
        assert_eq!(label("_name"), "_name");
        assert_eq!(label("#Def"), "#Def");
        assert_eq!(label("my-service"), "\"my-service\"");
        assert_eq!(label("app.oam.dev/name"), "\"app.oam.dev/name\"");
        assert_eq!(label("if"), "\"if\"");
        assert_eq!(label("1st"), "\"1st\"");
        assert_eq!(field_label("metadata.name"), "metadata: name");
    }

    #[test]
    fn test_scalars_and_refs() {
        assert_eq!(render(&lit("a\"b")), "\"a\\\"b\"");
        assert_eq!(render(&lit(3)), "3");
        assert_eq!(render(&lit(true)), "true");
        assert_eq!(render(&Value::from(&Param::string("image"))), "parameter.image");
        assert_eq!(render(&param_ref("my-key")), "parameter[\"my-key\"]");
        assert_eq!(render(&param_ref("a.b")), "parameter.a.b");
        assert_eq!(render(&context::name()), "context.name");
    }

    #[test]
    fn test_arithmetic_precedence() {
        let a = Value::from(&Param::int("a"));
        let b = Value::from(&Param::int("b"));
        let c = Value::from(&Param::int("c"));
        assert_eq!(
            render(&times(plus([a.clone(), b.clone()]), c.clone())),
            "(parameter.a + parameter.b) * parameter.c"
        );
        assert_eq!(
            render(&plus([a.clone(), times(b.clone(), c.clone())])),
            "parameter.a + parameter.b * parameter.c"
        );
        assert_eq!(
            render(&minus(a.clone(), minus(b.clone(), c.clone()))),
            "parameter.a - (parameter.b - parameter.c)"
        );
        assert_eq!(
            render(&divide(a, times(b, c))),
            "parameter.a / (parameter.b * parameter.c)"
        );
    }

    #[test]
    fn test_call_records_import() {
        let table = FunctionTable::default();
        let mut r = Renderer::new(&table);
        let out = r.expr(&strings_to_lower(Param::string("name")));
        assert_eq!(out, "strings.ToLower(parameter.name)");
        assert_eq!(r.into_imports().into_iter().collect::<Vec<_>>(), vec!["strings"]);
    }

    #[test]
    fn test_interpolation() {
        let v = interpolate([lit("app-"), context::name(), lit("-svc")]);
        assert_eq!(render(&v), "\"app-\\(context.name)-svc\"");
    }

    #[test]
    fn test_inline_struct_and_list() {
        let v = inline_struct([("name", lit("x")), ("port", lit(80))]);
        assert_eq!(render(&v), "{\n\tname: \"x\"\n\tport: 80\n}");
        assert_eq!(render(&defkit_core::list([lit(1), lit(2)])), "[1, 2]");
        assert_eq!(render(&defkit_core::list(Vec::<Value>::new())), "[]");
    }

    #[test]
    fn test_conditions() {
        let cpu = Param::string("cpu");
        let enabled = Param::bool("enabled");
        assert_eq!(cond(&cpu.is_set()).as_deref(), Some("parameter[\"cpu\"] != _|_"));
        assert_eq!(cond(&cpu.is_not_set()).as_deref(), Some("parameter[\"cpu\"] == _|_"));
        assert_eq!(cond(&enabled.is_true()).as_deref(), Some("parameter.enabled"));
        assert_eq!(cond(&enabled.is_false()).as_deref(), Some("!parameter.enabled"));
        assert_eq!(
            cond(&not(eq(&cpu, "1"))).as_deref(),
            Some("parameter.cpu != \"1\"")
        );
        assert_eq!(cond(&and(Vec::new())), None);
        assert_eq!(cond(&not(and(Vec::new()))).as_deref(), Some("false"));
    }

    #[test]
    fn test_or_inside_and_is_parenthesized() {
        let a = Param::string("a");
        let b = Param::string("b");
        let c = Param::bool("c");
        let out = cond(&and([or([a.is_set(), b.is_set()]), c.is_true()]));
        assert_eq!(
            out.as_deref(),
            Some("(parameter[\"a\"] != _|_ || parameter[\"b\"] != _|_) && parameter.c")
        );
    }

    #[test]
    fn test_iteration_with_lets_and_pairs() {
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
                let name = item.let_(
                    "_name",
                    plus([lit("port-"), strconv_format_int(v.field("port"), 10)]),
                );
                item.set_default("name", name, "string");
                item.if_(ne(v.field("protocol"), "TCP"), |item| {
                    item.set("protocol", v.field("protocol"));
                });
            })
            .build();
        let expected = "[for v in parameter.ports {\n\
            \tif v.containerPort != _|_ {\n\
            \t\tcontainerPort: v.containerPort\n\
            \t}\n\
            \tif v.containerPort == _|_ {\n\
            \t\tcontainerPort: v.port\n\
            \t}\n\
            \t_name: \"port-\" + strconv.FormatInt(v.port, 10)\n\
            \tname: *_name | string\n\
            \tif v.protocol != \"TCP\" {\n\
            \t\tprotocol: v.protocol\n\
            \t}\n\
            }]";
        assert_eq!(render(&Value::Array(arr)), expected);
    }

    #[test]
    fn test_guarded_filtered_iteration() {
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
        assert_eq!(
            render(&Value::Array(arr)),
            "[if parameter[\"ports\"] != _|_ for v in parameter.ports if v.expose == true {\n\tport: v.port\n}]"
        );
    }

    #[test]
    fn test_mixed_entries() {
        let extra = Param::list("extra");
        let enabled = Param::bool("enabled");
        let arr = ArrayBuilder::new()
            .item(ArrayElement::new().set("name", "a"))
            .item_if(enabled.is_true(), ArrayElement::new().set("name", "b"))
            .for_each(&extra, ArrayElement::new().set("name", Value::ItemField { field: "name".to_owned() }))
            .build();
        let expected = "[\n\
            \t{\n\t\tname: \"a\"\n\t},\n\
            \tif parameter.enabled {\n\t\tname: \"b\"\n\t},\n\
            \tfor m in parameter.extra {\n\t\tname: m.name\n\t},\n\
            ]";
        assert_eq!(render(&Value::Array(arr)), expected);
    }

    #[test]
    fn test_collection_fields() {
        let ports = Param::list("ports");
        let c = each(&ports)
            .filter(field_equals("expose", true))
            .map(field_map([
                ("port", field_ref("port")),
                ("name", optional_field_ref("name")),
                ("targetPort", or_field("containerPort", Value::ItemField { field: "port".to_owned() })),
            ]));
        let expected = "[for v in parameter.ports if v.expose == true {\n\
            \tport: v.port\n\
            \tif v.name != _|_ {\n\t\tname: v.name\n\t}\n\
            \tif v.containerPort != _|_ {\n\t\ttargetPort: v.containerPort\n\t}\n\
            \tif v.containerPort == _|_ {\n\t\ttargetPort: v.port\n\t}\n\
            }]";
        assert_eq!(render(&Value::from(c)), expected);
    }

    #[test]
    fn test_map_comprehension() {
        let m = for_each_map().over("parameter.labels").with_key_expr("strings.ToLower(k)");
        assert_eq!(
            render(&Value::from(m)),
            "{\n\tfor k, v in parameter.labels {\n\t\t(strings.ToLower(k)): v\n\t}\n}"
        );
    }

    #[test]
    fn test_raw_expressions_record_imports() {
        let table = FunctionTable::default();
        let mut r = Renderer::new(&table);
        let m = for_each_map()
            .over("parameter.labels")
            .with_key_expr("strings.ToLower(k)")
            .with_val_expr("json.Marshal(v)");
        r.value(&Value::from(m));
        r.expr(&Value::Reference {
            expr: "strconv.Itoa(context.appRevisionNum)".to_owned(),
        });
        assert_eq!(
            r.into_imports().into_iter().collect::<Vec<_>>(),
            vec!["encoding/json", "strconv", "strings"]
        );
    }

    #[test]
    #[should_panic(expected = "outside of its comprehension")]
    fn test_iter_var_outside_comprehension_panics() {
        render(&Value::IterVar { var: "v".to_owned() });
    }

    #[test]
    #[should_panic(expected = "referenced before its declaration")]
    fn test_let_before_declaration_panics() {
        let ports = Param::list("ports");
        let arr = ArrayBuilder::new()
            .for_each_with(&ports, |item| {
                item.set("name", Value::LetRef { name: "_name".to_owned() });
            })
            .build();
        render(&Value::Array(arr));
    }

    #[test]
    #[should_panic(expected = "referenced before its declaration")]
    fn test_let_inside_if_is_not_visible_after_it() {
        let ports = Param::list("ports");
        let arr = ArrayBuilder::new()
            .for_each_with(&ports, |item| {
                let v = item.var();
                let mut proto = None;
                item.if_(ne(v.field("protocol"), "TCP"), |item| {
                    proto = Some(item.let_("proto", v.field("protocol")));
                });
                item.set("name", proto.unwrap());
            })
            .build();
        render(&Value::Array(arr));
    }

    #[test]
    fn test_let_inside_if_set_is_visible_within_branch() {
        let ports = Param::list("ports");
        let arr = ArrayBuilder::new()
            .for_each_with(&ports, |item| {
                let v = item.var();
                item.if_set("name", |item| {
                    let name = item.let_("_n", v.field("name"));
                    item.set("label", name);
                });
            })
            .build();
        let out = render(&Value::Array(arr));
        assert!(out.contains("\t\t_n: v.name\n\t\tlabel: _n\n"), "got:\n{}", out);
    }
}
