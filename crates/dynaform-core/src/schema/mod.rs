//! Schema parsing
//!
//! A schema document lists the fields of a dynamic form. Two encodings are
//! accepted, detected from the first non-whitespace character:
//!
//! - `<`: the XML structure document (`root` / `dynamic-element` /
//!   `meta-data`), see [`xsd`]
//! - `{`: the JSON form definition (`fields` with localized maps), see
//!   [`json`]
//!
//! Both produce the same [`FormSchema`]. Per-field problems never fail a
//! parse: an unknown type becomes [`DataType::Unsupported`], missing
//! metadata becomes `None`, a broken validation rule validates nothing. Only
//! a document that cannot be read at all is a [`FormError::MalformedSchema`].
//!
//! [`DataType::Unsupported`]: crate::models::DataType::Unsupported

pub mod json;
pub mod xsd;

use crate::config::EngineConfig;
use crate::error::{FormError, FormResult};
use crate::locale::Locale;
use crate::models::FieldDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Xml,
    Json,
}

impl SchemaFormat {
    pub fn detect(document: &str) -> FormResult<Self> {
        let first = document
            .trim_start_matches('\u{feff}')
            .chars()
            .find(|c| !c.is_whitespace());
        match first {
            Some('<') => Ok(SchemaFormat::Xml),
            Some('{') => Ok(SchemaFormat::Json),
            Some(other) => Err(FormError::MalformedSchema(format!(
                "unexpected '{}' at start of document",
                other
            ))),
            None => Err(FormError::MalformedSchema("document is empty".to_string())),
        }
    }
}

/// Fields of one schema document, in document order.
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    available_locales: Vec<Locale>,
    default_locale: Option<Locale>,
    fields: Vec<FieldDescriptor>,
}

impl FormSchema {
    pub fn new(
        available_locales: Vec<Locale>,
        default_locale: Option<Locale>,
        fields: Vec<FieldDescriptor>,
    ) -> Self {
        Self {
            available_locales,
            default_locale,
            fields,
        }
    }

    pub fn available_locales(&self) -> &[Locale] {
        &self.available_locales
    }

    pub fn default_locale(&self) -> Option<&Locale> {
        self.default_locale.as_ref()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [FieldDescriptor] {
        &mut self.fields
    }

    pub fn into_fields(self) -> Vec<FieldDescriptor> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field by name. With duplicate names the last declaration wins.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().rev().find(|field| field.name() == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldDescriptor> {
        self.fields.iter_mut().rev().find(|field| field.name() == name)
    }

    /// Fields whose current value does not validate.
    pub fn invalid_fields(&self) -> Vec<&FieldDescriptor> {
        self.fields.iter().filter(|field| !field.validate()).collect()
    }

    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(FieldDescriptor::validate)
    }
}

/// Chooses which locale-tagged metadata block applies to a request.
///
/// Order: the requested locale; a block of the same language (when enabled);
/// the document's default locale. Nothing else.
#[derive(Debug, Clone)]
pub(crate) struct MetadataResolver {
    requested: Locale,
    default: Locale,
    language_fallback: bool,
}

impl MetadataResolver {
    pub(crate) fn new(requested: &Locale, document_default: Option<&Locale>, config: &EngineConfig) -> Self {
        let requested = if requested.is_empty() {
            config.default_locale.clone()
        } else {
            requested.clone()
        };
        let default = document_default
            .filter(|locale| !locale.is_empty())
            .cloned()
            .unwrap_or_else(|| config.default_locale.clone());

        Self {
            requested,
            default,
            language_fallback: config.language_fallback,
        }
    }

    /// Pick the block for the requested locale out of `(locale, block)` pairs.
    pub(crate) fn select<'a, T>(&self, blocks: &'a [(Locale, T)]) -> Option<&'a T> {
        let find = |matches: &dyn Fn(&Locale) -> bool| {
            blocks
                .iter()
                .find(|(locale, _)| matches(locale))
                .map(|(_, block)| block)
        };

        find(&|locale| *locale == self.requested)
            .or_else(|| {
                if self.language_fallback {
                    find(&|locale| locale.same_language(&self.requested))
                } else {
                    None
                }
            })
            .or_else(|| find(&|locale| *locale == self.default))
    }
}

/// Empty strings read as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

/// Boolean attribute: `"true"` in any case is true, anything else false.
pub(crate) fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}

/// Parses schema documents with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct SchemaParser {
    config: EngineConfig,
}

impl SchemaParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn parse(&self, document: &str, locale: &Locale) -> FormResult<Vec<FieldDescriptor>> {
        Ok(self.parse_schema(document, locale)?.into_fields())
    }

    pub fn parse_schema(&self, document: &str, locale: &Locale) -> FormResult<FormSchema> {
        if document.len() > self.config.max_schema_bytes {
            return Err(FormError::MalformedSchema(format!(
                "document is {} bytes, the limit is {}",
                document.len(),
                self.config.max_schema_bytes
            )));
        }

        let format = SchemaFormat::detect(document)?;
        let schema = match format {
            SchemaFormat::Xml => xsd::parse_document(document, locale, &self.config),
            SchemaFormat::Json => json::parse_document(document, locale, &self.config),
        }
        .inspect_err(|e| tracing::warn!(error = %e, format = ?format, "Schema could not be parsed"))?;

        tracing::debug!(
            format = ?format,
            locale = %locale,
            fields = schema.len(),
            "Schema parsed"
        );
        Ok(schema)
    }
}

/// Parse a schema document with the default configuration.
pub fn parse(document: &str, locale: &Locale) -> FormResult<Vec<FieldDescriptor>> {
    SchemaParser::new().parse(document, locale)
}

/// Parse a schema document, keeping its locale information.
pub fn parse_schema(document: &str, locale: &Locale) -> FormResult<FormSchema> {
    SchemaParser::new().parse_schema(document, locale)
}
