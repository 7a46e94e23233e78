//! Test helpers shared by the integration tests.
//!
//! Run from workspace root: `cargo test -p dynaform-core`.

#![allow(dead_code)]

pub mod fixtures;

use dynaform_core::{FieldDescriptor, Locale};

pub fn spanish() -> Locale {
    Locale::new("es_ES")
}

/// Parse `document` for `locale` and return its only field.
pub fn single_field(document: &str, locale: &Locale) -> FieldDescriptor {
    let mut fields = dynaform_core::parse(document, locale).expect("document should parse");
    assert_eq!(fields.len(), 1, "expected exactly one field");
    fields.remove(0)
}
