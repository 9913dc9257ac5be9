//! Known CUE standard library functions and the imports they need.

use std::collections::BTreeMap;

const KNOWN: &[(&str, &[&str], &str)] = &[
    (
        "strconv",
        &["FormatInt", "Itoa", "Atoi", "ParseInt", "Quote"],
        "strconv",
    ),
    (
        "strings",
        &[
            "ToLower",
            "ToUpper",
            "HasPrefix",
            "HasSuffix",
            "Contains",
            "Join",
            "Split",
            "Replace",
            "TrimSpace",
            "TrimPrefix",
            "TrimSuffix",
        ],
        "strings",
    ),
    ("list", &["Concat", "Contains"], "list"),
    ("json", &["Marshal"], "encoding/json"),
    ("base64", &["Encode"], "encoding/base64"),
];

/// `(package, function)` pairs mapped to the import path that provides
/// them. Calls outside the table render unchanged and add no import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionTable {
    known: BTreeMap<(String, String), String>,
}

impl Default for FunctionTable {
    fn default() -> Self {
        let mut known = BTreeMap::new();
        for (package, functions, import) in KNOWN {
            for function in *functions {
                known.insert(
                    ((*package).to_owned(), (*function).to_owned()),
                    (*import).to_owned(),
                );
            }
        }
        FunctionTable { known }
    }
}

impl FunctionTable {
    pub fn insert(&mut self, package: &str, function: &str, import: &str) {
        self.known.insert(
            (package.to_owned(), function.to_owned()),
            import.to_owned(),
        );
    }

    pub fn import_for(&self, package: &str, function: &str) -> Option<&str> {
        self.known
            .get(&(package.to_owned(), function.to_owned()))
            .map(String::as_str)
    }

    /// Imports needed by `package.Function(` calls written inside a raw
    /// expression such as `strings.ToLower(k)`. String literals and field
    /// selections (`a.strings.ToLower(`) are skipped.
    pub fn imports_in(&self, expr: &str) -> Vec<&str> {
        let bytes = expr.as_bytes();
        let mut found = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'"' {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
                continue;
            }
            let starts_token = i == 0 || !(is_ident_byte(bytes[i - 1]) || bytes[i - 1] == b'.');
            if !starts_token || !is_ident_start(bytes[i]) {
                i += 1;
                continue;
            }

            let package_start = i;
            while i < bytes.len() && is_ident_byte(bytes[i]) {
                i += 1;
            }
            if bytes.get(i) != Some(&b'.') {
                continue;
            }
            let function_start = i + 1;
            let mut end = function_start;
            while end < bytes.len() && is_ident_byte(bytes[end]) {
                end += 1;
            }
            if end > function_start && bytes.get(end) == Some(&b'(') {
                let package = &expr[package_start..i];
                if let Some(import) = self.import_for(package, &expr[function_start..end]) {
                    found.push(import);
                }
            }
        }
        found
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'_' | b'$' | b'#')
}

fn is_ident_byte(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}
