//! Shared helpers for the codegen integration tests.
#![allow(dead_code)]

use std::sync::Once;

use defkit_codegen::{CueGenerator, GeneratorConfig, Indent};

static INIT: Once = Once::new();

/// Route `tracing` output through the test harness. Honors `RUST_LOG`.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A generator indenting with four spaces, so expected documents can be
/// written with `indoc!`.
pub fn generator() -> CueGenerator {
    CueGenerator::new().with_config(GeneratorConfig {
        indent: Indent::Spaces(4),
        ..GeneratorConfig::default()
    })
}
