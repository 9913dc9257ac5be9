//! Generator configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration.
//!
//! # Example
//!
//! ```toml
//! indent = { spaces = 4 }
//! align-values = false
//! header = "Code generated by defkit. DO NOT EDIT."
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CodegenError;

// ── Types ─────────────────────────────────────────────────────────────────────

/// One indentation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Indent {
    #[default]
    Tab,
    Spaces(u8),
}

/// Formatting options of [`crate::CueGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorConfig {
    pub indent: Indent,
    /// Pad runs of scalar fields so their values line up.
    pub align_values: bool,
    /// Comment emitted as the first line of every document.
    pub header: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            indent: Indent::Tab,
            align_values: true,
            header: None,
        }
    }
}

/// Where [`crate::write_definitions`] places its files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    pub out_dir: PathBuf,
}

// ── Functions ─────────────────────────────────────────────────────────────────

impl GeneratorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, CodegenError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, CodegenError> {
        let text = std::fs::read_to_string(path).map_err(|source| CodegenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

impl OutputConfig {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        OutputConfig {
            out_dir: out_dir.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = GeneratorConfig::from_toml_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.indent, Indent::Tab);
        assert!(config.align_values);
    }

    #[test]
    fn test_parse_all_fields() {
        let config = GeneratorConfig::from_toml_str(
            r#"
indent = { spaces = 2 }
align-values = false
header = "generated"
"#,
        )
        .unwrap();
        assert_eq!(config.indent, Indent::Spaces(2));
        assert!(!config.align_values);
        assert_eq!(config.header.as_deref(), Some("generated"));
    }

    #[test]
    fn test_parse_tab_indent() {
        let config = GeneratorConfig::from_toml_str("indent = \"tab\"").unwrap();
        assert_eq!(config.indent, Indent::Tab);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = GeneratorConfig::from_toml_str("align-values = \"yes\"").unwrap_err();
        assert!(matches!(err, CodegenError::Config(_)), "got {:?}", err);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GeneratorConfig::from_file(Path::new("/nonexistent/defkit.toml")).unwrap_err();
        assert!(matches!(err, CodegenError::Io { .. }), "got {:?}", err);
    }
}
