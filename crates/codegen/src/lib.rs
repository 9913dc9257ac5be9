//! defkit-codegen: CUE generation for defkit definitions.
//!
//! [`CueGenerator`] turns a [`Definition`] built with `defkit-core` into a
//! complete CUE document: the definition header, the `template` block with
//! its outputs and patch, the `parameter` schema, and an `import` block
//! for every standard library package the template calls into.
//!
//! # Public API
//!
//! - [`CueGenerator`] -- document, schema and resource rendering
//! - [`GeneratorConfig`] -- indentation, alignment and header comment
//! - [`FunctionTable`] -- known functions and their import paths
//! - [`write_definitions`] / [`OutputConfig`] -- write documents to disk
//! - [`CodegenError`] -- configuration and I/O errors
//!
//! Generation is deterministic: the same model always produces the same
//! bytes. Model misuse (references outside their scope, list index gaps)
//! panics.

pub mod config;
pub mod error;
pub mod imports;
pub mod output;

mod document;
mod expr;
mod params;
mod scope;
mod tree;
mod writer;

use std::collections::BTreeSet;

use defkit_core::{ComponentDefinition, Definition, Param, Resource, TraitDefinition};

use crate::expr::{quote, Renderer};
use crate::writer::{Doc, Item, Printer};

// ── Convenience re-exports ───────────────────────────────────────────

pub use config::{GeneratorConfig, Indent, OutputConfig};
pub use error::CodegenError;
pub use imports::FunctionTable;
pub use output::write_definitions;

/// Renders definitions to CUE text. Immutable once configured; one
/// generator can serve any number of definitions.
#[derive(Debug, Clone, Default)]
pub struct CueGenerator {
    config: GeneratorConfig,
    functions: FunctionTable,
}

impl CueGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Teach the generator a function whose calls need `import`.
    pub fn with_known_function(mut self, package: &str, function: &str, import: &str) -> Self {
        self.functions.insert(package, function, import);
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn generate(&self, definition: &Definition) -> String {
        match definition {
            Definition::Component(c) => self.generate_component(c),
            Definition::Trait(t) => self.generate_trait(t),
        }
    }

    pub fn generate_component(&self, def: &ComponentDefinition) -> String {
        tracing::debug!(name = %def.name, kind = "component", "generating definition");
        let mut r = Renderer::new(&self.functions);
        let items = document::component_items(def, &mut r);
        let mut imports = r.into_imports();
        imports.extend(def.imports.iter().cloned());
        self.document(&items, &imports)
    }

    pub fn generate_trait(&self, def: &TraitDefinition) -> String {
        tracing::debug!(name = %def.name, kind = "trait", "generating definition");
        let mut r = Renderer::new(&self.functions);
        let items = document::trait_items(def, &mut r);
        let mut imports = r.into_imports();
        imports.extend(def.imports.iter().cloned());
        self.document(&items, &imports)
    }

    /// The `parameter: {...}` block alone.
    pub fn parameter_schema(&self, params: &[Param]) -> String {
        let mut r = Renderer::new(&self.functions);
        let schema = params::schema_items(params, &mut r);
        let value = if schema.is_empty() {
            Doc::inline("{}")
        } else {
            Doc::block(schema)
        };
        self.print(&[Item::field("parameter", value)])
    }

    /// The fields of one resource, without surrounding braces or imports.
    pub fn render_resource(&self, resource: &Resource) -> String {
        let mut r = Renderer::new(&self.functions);
        let items = tree::resource_items(resource, &mut r);
        self.print(&items)
    }

    fn print(&self, items: &[Item]) -> String {
        let mut p = Printer::new(&self.config);
        p.items(items, 0);
        p.finish()
    }

    fn document(&self, items: &[Item], imports: &BTreeSet<String>) -> String {
        let mut p = Printer::new(&self.config);
        if let Some(header) = &self.config.header {
            for line in header.lines() {
                p.raw_line(&format!("// {}", line));
            }
            p.raw_line("");
        }
        if !imports.is_empty() {
            let unit = p.indent_unit();
            p.raw_line("import (");
            for import in imports {
                p.raw_line(&format!("{}{}", unit, quote(import)));
            }
            p.raw_line(")");
            p.raw_line("");
        }
        p.items(items, 0);
        p.finish()
    }
}
