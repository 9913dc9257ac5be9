//! Calls into CUE standard library packages.
//!
//! Each helper only builds a [`FunctionCall`]; the generator decides which
//! packages must be imported.

use crate::value::{lit, null, FunctionCall, Value};

fn call(package: &str, function: &str, args: Vec<Value>) -> Value {
    Value::Call(FunctionCall::new(package, function, args))
}

/// `strconv.FormatInt(v, base)`
pub fn strconv_format_int(v: impl Into<Value>, base: i64) -> Value {
    call("strconv", "FormatInt", vec![v.into(), lit(base)])
}

/// `strconv.Itoa(v)`
pub fn strconv_itoa(v: impl Into<Value>) -> Value {
    call("strconv", "Itoa", vec![v.into()])
}

/// `strconv.Atoi(s)`
pub fn strconv_atoi(s: impl Into<Value>) -> Value {
    call("strconv", "Atoi", vec![s.into()])
}

/// `strconv.ParseInt(s, base, bits)`
pub fn strconv_parse_int(s: impl Into<Value>, base: i64, bits: i64) -> Value {
    call("strconv", "ParseInt", vec![s.into(), lit(base), lit(bits)])
}

/// `strconv.Quote(s)`
pub fn strconv_quote(s: impl Into<Value>) -> Value {
    call("strconv", "Quote", vec![s.into()])
}

pub fn strings_to_lower(s: impl Into<Value>) -> Value {
    call("strings", "ToLower", vec![s.into()])
}

pub fn strings_to_upper(s: impl Into<Value>) -> Value {
    call("strings", "ToUpper", vec![s.into()])
}

pub fn strings_has_prefix(s: impl Into<Value>, prefix: impl Into<Value>) -> Value {
    call("strings", "HasPrefix", vec![s.into(), prefix.into()])
}

pub fn strings_has_suffix(s: impl Into<Value>, suffix: impl Into<Value>) -> Value {
    call("strings", "HasSuffix", vec![s.into(), suffix.into()])
}

pub fn strings_contains(s: impl Into<Value>, substr: impl Into<Value>) -> Value {
    call("strings", "Contains", vec![s.into(), substr.into()])
}

pub fn strings_join(list: impl Into<Value>, sep: impl Into<Value>) -> Value {
    call("strings", "Join", vec![list.into(), sep.into()])
}

pub fn strings_split(s: impl Into<Value>, sep: impl Into<Value>) -> Value {
    call("strings", "Split", vec![s.into(), sep.into()])
}

/// `strings.Replace(s, old, new, n)`; `n < 0` replaces all occurrences.
pub fn strings_replace(
    s: impl Into<Value>,
    old: impl Into<Value>,
    new: impl Into<Value>,
    n: i64,
) -> Value {
    call(
        "strings",
        "Replace",
        vec![s.into(), old.into(), new.into(), lit(n)],
    )
}

pub fn strings_trim_space(s: impl Into<Value>) -> Value {
    call("strings", "TrimSpace", vec![s.into()])
}

pub fn strings_trim_prefix(s: impl Into<Value>, prefix: impl Into<Value>) -> Value {
    call("strings", "TrimPrefix", vec![s.into(), prefix.into()])
}

pub fn strings_trim_suffix(s: impl Into<Value>, suffix: impl Into<Value>) -> Value {
    call("strings", "TrimSuffix", vec![s.into(), suffix.into()])
}

/// `list.Concat([a, b])`
pub fn list_concat(a: impl Into<Value>, b: impl Into<Value>) -> Value {
    call(
        "list",
        "Concat",
        vec![Value::List {
            items: vec![a.into(), b.into()],
        }],
    )
}

pub fn list_contains(list: impl Into<Value>, item: impl Into<Value>) -> Value {
    call("list", "Contains", vec![list.into(), item.into()])
}

pub fn json_marshal(v: impl Into<Value>) -> Value {
    call("json", "Marshal", vec![v.into()])
}

/// `base64.Encode(null, v)`, standard encoding.
pub fn base64_encode(v: impl Into<Value>) -> Value {
    call("base64", "Encode", vec![null(), v.into()])
}

/// Builtin `len(v)`.
pub fn len(v: impl Into<Value>) -> Value {
    call("", "len", vec![v.into()])
}
