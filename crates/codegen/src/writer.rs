//! Line-oriented document model and printer.
//!
//! Renderers build a tree of [`Item`]s and [`Doc`]s; the printer owns
//! indentation and value alignment so that no renderer deals with
//! whitespace.

use crate::config::{GeneratorConfig, Indent};

/// A rendered value: what follows `label: `.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Doc {
    Inline(String),
    /// `open`, the items one level deeper, then `close` on its own line.
    Block {
        open: String,
        items: Vec<Item>,
        close: String,
    },
    /// `#"""` multi-line string; lines and the closing delimiter are
    /// indented one level deeper than the field.
    MultilineString(Vec<String>),
}

impl Doc {
    pub(crate) fn inline(s: impl Into<String>) -> Self {
        Doc::Inline(s.into())
    }

    pub(crate) fn block(items: Vec<Item>) -> Self {
        Doc::Block {
            open: "{".to_owned(),
            items,
            close: "}".to_owned(),
        }
    }

    pub(crate) fn is_inline(&self) -> bool {
        matches!(self, Doc::Inline(_))
    }

    /// Single-line rendering for places where a block cannot appear,
    /// e.g. operands of binary operators.
    pub(crate) fn flatten(&self) -> String {
        match self {
            Doc::Inline(s) => s.clone(),
            Doc::Block { open, items, close } => {
                if items.is_empty() {
                    return format!("{}{}", open, close);
                }
                let parts: Vec<String> = items.iter().filter_map(Item::flatten).collect();
                format!("{}{}{}", open, parts.join(", "), close)
            }
            Doc::MultilineString(lines) => {
                serde_json::to_string(&lines.join("\n")).unwrap_or_default()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Item {
    /// `// text`
    Comment(String),
    Field {
        label: String,
        value: Doc,
        /// Whether the value takes part in alignment runs.
        align: bool,
    },
    /// A raw line, e.g. `let x = ...`.
    Line(String),
    /// `open` / items / `close`, e.g. an `if` guard.
    Block {
        open: String,
        items: Vec<Item>,
        close: String,
    },
    /// A list element, printed with a trailing comma.
    Element(Doc),
}

impl Item {
    pub(crate) fn field(label: impl Into<String>, value: Doc) -> Self {
        Item::Field {
            label: label.into(),
            value,
            align: false,
        }
    }

    pub(crate) fn aligned(label: impl Into<String>, value: Doc) -> Self {
        Item::Field {
            label: label.into(),
            value,
            align: true,
        }
    }

    pub(crate) fn guarded(cond: &str, items: Vec<Item>) -> Self {
        Item::Block {
            open: format!("if {} {{", cond),
            items,
            close: "}".to_owned(),
        }
    }

    fn flatten(&self) -> Option<String> {
        match self {
            Item::Comment(_) => None,
            Item::Field { label, value, .. } => Some(format!("{}: {}", label, value.flatten())),
            Item::Line(line) => Some(line.clone()),
            Item::Block { open, items, close } => {
                let parts: Vec<String> = items.iter().filter_map(Item::flatten).collect();
                Some(format!("{} {} {}", open, parts.join(", "), close))
            }
            Item::Element(doc) => Some(doc.flatten()),
        }
    }

    fn alignable_label(&self) -> Option<&str> {
        match self {
            Item::Field {
                label,
                value: Doc::Inline(v),
                align: true,
            } if !v.contains('\n') => Some(label),
            _ => None,
        }
    }
}

pub(crate) struct Printer<'a> {
    config: &'a GeneratorConfig,
    out: String,
}

impl<'a> Printer<'a> {
    pub(crate) fn new(config: &'a GeneratorConfig) -> Self {
        Printer {
            config,
            out: String::new(),
        }
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }

    pub(crate) fn indent_unit(&self) -> String {
        match self.config.indent {
            Indent::Tab => "\t".to_owned(),
            Indent::Spaces(n) => " ".repeat(usize::from(n)),
        }
    }

    pub(crate) fn raw_line(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push('\n');
    }

    pub(crate) fn items(&mut self, items: &[Item], level: usize) {
        let widths = self.alignment_widths(items);
        for (item, width) in items.iter().zip(widths) {
            self.item(item, level, width);
        }
    }

    /// Label column width per item; zero means no padding.
    fn alignment_widths(&self, items: &[Item]) -> Vec<usize> {
        let mut widths = vec![0; items.len()];
        if !self.config.align_values {
            return widths;
        }
        let mut start = 0;
        while start < items.len() {
            if items[start].alignable_label().is_none() {
                start += 1;
                continue;
            }
            let mut end = start;
            while end < items.len() && items[end].alignable_label().is_some() {
                end += 1;
            }
            if end - start >= 2 {
                let max = items[start..end]
                    .iter()
                    .filter_map(Item::alignable_label)
                    .map(|l| l.chars().count())
                    .max()
                    .unwrap_or(0);
                for w in &mut widths[start..end] {
                    *w = max;
                }
            }
            start = end;
        }
        widths
    }

    fn indent(&mut self, level: usize) {
        let unit = self.indent_unit();
        for _ in 0..level {
            self.out.push_str(&unit);
        }
    }

    fn item(&mut self, item: &Item, level: usize, width: usize) {
        match item {
            Item::Comment(text) => {
                self.indent(level);
                self.out.push_str("// ");
                self.out.push_str(text);
                self.out.push('\n');
            }
            Item::Field { label, value, .. } => {
                self.indent(level);
                self.out.push_str(label);
                self.out.push(':');
                let pad = width.saturating_sub(label.chars().count());
                self.out.push_str(&" ".repeat(pad + 1));
                self.doc(value, level);
                self.out.push('\n');
            }
            Item::Line(line) => {
                self.indent(level);
                self.out.push_str(line);
                self.out.push('\n');
            }
            Item::Block { open, items, close } => {
                self.indent(level);
                self.block(open, items, close, level);
                self.out.push('\n');
            }
            Item::Element(doc) => {
                self.indent(level);
                self.doc(doc, level);
                self.out.push_str(",\n");
            }
        }
    }

    /// Print a value starting at the current column.
    pub(crate) fn doc(&mut self, doc: &Doc, level: usize) {
        match doc {
            Doc::Inline(s) => self.out.push_str(s),
            Doc::Block { open, items, close } => self.block(open, items, close, level),
            Doc::MultilineString(lines) => {
                self.out.push_str("#\"\"\"\n");
                for line in lines {
                    if !line.is_empty() {
                        self.indent(level + 1);
                        self.out.push_str(line);
                    }
                    self.out.push('\n');
                }
                self.indent(level + 1);
                self.out.push_str("\"\"\"#");
            }
        }
    }

    fn block(&mut self, open: &str, items: &[Item], close: &str, level: usize) {
        self.out.push_str(open);
        if items.is_empty() {
            self.out.push_str(close);
            return;
        }
        self.out.push('\n');
        self.items(items, level + 1);
        self.indent(level);
        self.out.push_str(close);
    }
}
