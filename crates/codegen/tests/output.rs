//! Writing definitions to disk.

mod common;

use std::fs;

use common::init_logging;
use defkit_codegen::{write_definitions, CodegenError, CueGenerator, OutputConfig};
use defkit_core::{patch, ComponentDefinition, Definition, Param, TraitDefinition};

fn definitions() -> Vec<Definition> {
    let replicas = Param::int("replicas").default(1);
    vec![
        ComponentDefinition::new("worker")
            .workload("apps/v1", "Deployment")
            .into(),
        TraitDefinition::new("scaler")
            .applies_to(["deployments.apps"])
            .params([replicas.clone()])
            .template(|tpl| {
                tpl.patch(patch().set("spec.replicas", &replicas));
            })
            .into(),
    ]
}

#[test]
fn test_write_definitions_layout() {
    init_logging();
    let dir = tempfile::tempdir().expect("temp dir");
    let gen = CueGenerator::new();
    let defs = definitions();

    let written = write_definitions(&gen, &defs, &OutputConfig::new(dir.path())).expect("write");

    assert_eq!(
        written,
        vec![
            dir.path().join("components").join("worker.cue"),
            dir.path().join("traits").join("scaler.cue"),
        ]
    );
    for (path, def) in written.iter().zip(&defs) {
        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content, gen.generate(def), "content of {}", path.display());
    }
}

#[test]
fn test_write_definitions_overwrites() {
    let dir = tempfile::tempdir().expect("temp dir");
    let target = dir.path().join("components").join("worker.cue");
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(&target, "stale").unwrap();

    write_definitions(&CueGenerator::new(), &definitions(), &OutputConfig::new(dir.path()))
        .expect("write");

    let content = fs::read_to_string(&target).unwrap();
    assert!(content.starts_with("worker: {\n"), "got:\n{}", content);
}

#[test]
fn test_unwritable_directory_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let blocker = dir.path().join("out");
    fs::write(&blocker, "not a directory").unwrap();

    let err = write_definitions(&CueGenerator::new(), &definitions(), &OutputConfig::new(&blocker))
        .unwrap_err();

    match err {
        CodegenError::Io { path, .. } => assert_eq!(path, blocker.join("components")),
        other => panic!("expected I/O error, got {:?}", other),
    }
}

#[test]
fn test_names_escaping_the_directory_are_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let out = dir.path().join("out");
    for name in ["../escape", "nested/name", "..", ""] {
        let defs: Vec<Definition> = vec![ComponentDefinition::new(name).into()];
        let err = write_definitions(&CueGenerator::new(), &defs, &OutputConfig::new(&out))
            .unwrap_err();
        match err {
            CodegenError::InvalidName { name: rejected } => assert_eq!(rejected, name),
            other => panic!("expected invalid name for {:?}, got {:?}", name, other),
        }
    }
    assert!(!dir.path().join("escape.cue").exists());
    assert!(!out.exists());
}

#[test]
fn test_empty_input_writes_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let written = write_definitions(&CueGenerator::new(), &[], &OutputConfig::new(dir.path()))
        .expect("write");
    assert!(written.is_empty());
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}
