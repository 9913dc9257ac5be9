//! Writing generated definitions to a directory tree.

use std::fs;
use std::path::{Path, PathBuf};

use defkit_core::Definition;

use crate::config::OutputConfig;
use crate::error::CodegenError;
use crate::CueGenerator;

/// Generate every definition and write it to
/// `<out_dir>/components/<name>.cue` or `<out_dir>/traits/<name>.cue`.
///
/// Returns the written paths in input order. Stops at the first failure;
/// files written before it are left in place. Names that are empty, `.`,
/// `..`, or contain a path separator are rejected before anything for
/// that definition is written.
pub fn write_definitions(
    generator: &CueGenerator,
    definitions: &[Definition],
    config: &OutputConfig,
) -> Result<Vec<PathBuf>, CodegenError> {
    let mut written = Vec::with_capacity(definitions.len());
    for definition in definitions {
        check_name(definition.name())?;
        let dir = config.out_dir.join(subdirectory(definition));
        create_dir(&dir)?;

        let path = dir.join(format!("{}.cue", definition.name()));
        fs::write(&path, generator.generate(definition)).map_err(|source| CodegenError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "wrote definition");
        written.push(path);
    }
    Ok(written)
}

fn subdirectory(definition: &Definition) -> &'static str {
    match definition {
        Definition::Component(_) => "components",
        Definition::Trait(_) => "traits",
    }
}

fn check_name(name: &str) -> Result<(), CodegenError> {
    let invalid = matches!(name, "" | "." | "..") || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(CodegenError::InvalidName {
            name: name.to_owned(),
        });
    }
    Ok(())
}

fn create_dir(dir: &Path) -> Result<(), CodegenError> {
    fs::create_dir_all(dir).map_err(|source| CodegenError::Io {
        path: dir.to_path_buf(),
        source,
    })
}
