//! Utility functions for integration tests
// Not all tests use all helpers
#![allow(dead_code)]

use pretty_assertions::assert_eq;
use std::sync::Once;
use xml_model::reflect::ReflectClass;
use xml_model::xml;

/// Installs a `tracing` subscriber which writes through the test harness, so
/// diagnostics are shown for failed tests only. Honors `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Encodes a value with its registered model and checks the printed XML.
/// Returns the decoded copy of the printed XML.
pub fn roundtrip<T: ReflectClass>(value: &T, expected: &str) -> T {
    init_tracing();
    let text = xml_model::to_string(value).unwrap();
    assert_eq!(text, expected);

    // Log XML that we try to decode to see it in the failed tests output
    dbg!(&text);
    xml_model::from_str::<T>(&text).unwrap()
}

/// Checks that two XML texts describe the same tree.
pub fn assert_same_tree(actual: &str, expected: &str) {
    let actual = xml::parse(actual).unwrap();
    let expected = xml::parse(expected).unwrap();
    assert_eq!(actual, expected);
}
