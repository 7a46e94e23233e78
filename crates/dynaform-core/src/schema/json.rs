//! JSON form definitions
//!
//! ```json
//! {
//!   "availableLanguageIds": ["en_US", "es_ES"],
//!   "defaultLanguageId": "en_US",
//!   "fields": [
//!     {
//!       "name": "Color",
//!       "dataType": "string",
//!       "type": "select",
//!       "required": true,
//!       "label": { "en_US": "Color", "es_ES": "Color" },
//!       "options": [{ "value": "red", "label": { "en_US": "Red" } }],
//!       "validation": { "expression": "", "errorMessage": "" },
//!       "nestedFields": []
//!     }
//!   ]
//! }
//! ```
//!
//! Localized values may also be plain strings. A field entry that does not
//! have the expected shape is skipped with a warning; the rest of the
//! document is still read.

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::error::{FormError, FormResult};
use crate::locale::Locale;
use crate::models::{DataType, EditorKind, FieldDefinition, FieldDescriptor, FieldOption};
use crate::validation::{ValidationMap, Validator};

use super::{non_empty, parse_flag, FormSchema, MetadataResolver};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonDocument {
    #[serde(default)]
    available_language_ids: Vec<String>,
    #[serde(default)]
    default_language_id: Option<String>,
    #[serde(default)]
    fields: Vec<JsonValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct JsonField {
    name: String,
    data_type: Option<String>,
    #[serde(rename = "type")]
    field_type: Option<String>,
    #[serde(deserialize_with = "flag")]
    required: bool,
    #[serde(deserialize_with = "flag")]
    repeatable: bool,
    #[serde(deserialize_with = "flag")]
    read_only: bool,
    #[serde(deserialize_with = "flag")]
    show_label: bool,
    #[serde(deserialize_with = "flag")]
    multiple: bool,
    index_type: Option<String>,
    label: Option<Localized>,
    predefined_value: Option<Localized>,
    tip: Option<Localized>,
    options: Vec<JsonOption>,
    validation: Option<JsonValue>,
    nested_fields: Vec<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct JsonOption {
    value: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    label: Option<Localized>,
}

/// Text given once for every locale, or per locale.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Localized {
    Plain(String),
    ByLocale(BTreeMap<String, String>),
}

impl Localized {
    fn resolve(&self, resolver: &MetadataResolver) -> Option<String> {
        match self {
            Localized::Plain(text) => Some(text.clone()),
            Localized::ByLocale(texts) => {
                let blocks: Vec<(Locale, &String)> = texts
                    .iter()
                    .map(|(locale, text)| (Locale::new(locale), text))
                    .collect();
                resolver.select(&blocks).map(|text| text.to_string())
            }
        }
    }
}

/// `true`, `"true"` (any case) are true; anything else is false.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(match value {
        JsonValue::Bool(value) => value,
        JsonValue::String(text) => parse_flag(Some(&text)),
        _ => false,
    })
}

pub(crate) fn parse_document(
    document: &str,
    locale: &Locale,
    config: &EngineConfig,
) -> FormResult<FormSchema> {
    let document: JsonDocument = serde_json::from_str(document)
        .map_err(|e| FormError::MalformedSchema(format!("invalid form definition: {}", e)))?;

    let available_locales = document
        .available_language_ids
        .iter()
        .map(Locale::new)
        .filter(|locale| !locale.is_empty())
        .collect();
    let default_locale = document
        .default_language_id
        .as_deref()
        .map(Locale::new)
        .filter(|locale| !locale.is_empty());

    let resolver = MetadataResolver::new(locale, default_locale.as_ref(), config);
    let mut fields = Vec::new();
    collect_fields(document.fields, &resolver, &mut fields);

    Ok(FormSchema::new(available_locales, default_locale, fields))
}

fn collect_fields(entries: Vec<JsonValue>, resolver: &MetadataResolver, fields: &mut Vec<FieldDescriptor>) {
    for (position, entry) in entries.into_iter().enumerate() {
        let mut field: JsonField = match serde_json::from_value(entry) {
            Ok(field) => field,
            Err(e) => {
                tracing::warn!(position = position, error = %e, "Skipping malformed field entry");
                continue;
            }
        };
        let nested = std::mem::take(&mut field.nested_fields);
        fields.push(FieldDescriptor::new(field_definition(field, resolver)));
        collect_fields(nested, resolver, fields);
    }
}

fn field_definition(field: JsonField, resolver: &MetadataResolver) -> FieldDefinition {
    let data_type = DataType::resolve(field.data_type.as_deref(), field.field_type.as_deref());
    let editor_kind = EditorKind::resolve(field.field_type.as_deref(), &data_type);

    if !data_type.is_supported() {
        tracing::warn!(
            field = %field.name,
            data_type = %data_type,
            "Unsupported field type, keeping it as a generic field"
        );
    }

    let localized =
        |value: &Option<Localized>| non_empty(value.as_ref().and_then(|v| v.resolve(resolver)));

    FieldDefinition {
        label: localized(&field.label),
        predefined_value: localized(&field.predefined_value),
        tip: localized(&field.tip),
        required: field.required,
        repeatable: field.repeatable,
        read_only: field.read_only,
        show_label: field.show_label,
        multiple: field.multiple,
        index_type: non_empty(field.index_type),
        options: field
            .options
            .iter()
            .map(|option| {
                FieldOption::new(
                    option.name.clone().unwrap_or_else(|| option.value.clone()),
                    option.value.clone(),
                    non_empty(option.label.as_ref().and_then(|l| l.resolve(resolver))),
                )
            })
            .collect(),
        validator: field
            .validation
            .map(|rule| validator(rule, &field.name))
            .unwrap_or_default(),
        editor_kind: Some(editor_kind),
        data_type: Some(data_type),
        name: field.name,
    }
}

/// A rule that is not a validation object leaves the field unvalidated.
fn validator(rule: JsonValue, field: &str) -> Validator {
    match serde_json::from_value::<ValidationMap>(rule) {
        Ok(map) => Validator::from_validation_map(&map),
        Err(e) => {
            tracing::warn!(field = %field, error = %e, "Ignoring malformed validation rule");
            Validator::always_valid()
        }
    }
}
