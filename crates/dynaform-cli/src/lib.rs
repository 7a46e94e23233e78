//! Shared pieces of the `dynaform` command line tool.

use anyhow::Context;
use dynaform_core::{FieldDescriptor, FieldOption, FormSchema, Locale, SchemaParser};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::path::Path;

/// How command results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Shorten `s` to at most `max_len` characters, ending in "..." when cut.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Read and parse a schema document from disk.
pub fn load_schema(parser: &SchemaParser, file: &Path, locale: &Locale) -> anyhow::Result<FormSchema> {
    let document = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read schema {}", file.display()))?;
    parser
        .parse_schema(&document, locale)
        .with_context(|| format!("Failed to parse schema {}", file.display()))
}

/// Read a JSON object mapping field names to values.
pub fn load_values(file: &Path) -> anyhow::Result<Map<String, JsonValue>> {
    let values = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read values {}", file.display()))?;
    serde_json::from_str(&values).context("Values must be a JSON object")
}

/// Raw string handed to a field for a JSON value of the values file.
pub fn raw_value(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Printable view of one parsed field.
#[derive(Debug, Serialize)]
pub struct FieldSummary {
    pub name: String,
    pub data_type: String,
    pub editor: String,
    pub required: bool,
    pub repeatable: bool,
    pub read_only: bool,
    pub show_label: bool,
    pub label: Option<String>,
    pub tip: Option<String>,
    pub predefined_value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    pub validator: &'static str,
    pub value: Option<String>,
}

impl From<&FieldDescriptor> for FieldSummary {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            name: field.name().to_string(),
            data_type: field.data_type().to_string(),
            editor: field.editor_kind().to_string(),
            required: field.is_required(),
            repeatable: field.is_repeatable(),
            read_only: field.is_read_only(),
            show_label: field.show_label(),
            label: field.label().map(str::to_string),
            tip: field.tip().map(str::to_string),
            predefined_value: field.predefined_value().map(str::to_string),
            options: field.options().to_vec(),
            validator: field.validator().kind().name(),
            value: field.current_value_as_string(),
        }
    }
}

/// Printable view of a whole schema.
#[derive(Debug, Serialize)]
pub struct SchemaSummary {
    pub available_locales: Vec<String>,
    pub default_locale: Option<String>,
    pub fields: Vec<FieldSummary>,
}

impl From<&FormSchema> for SchemaSummary {
    fn from(schema: &FormSchema) -> Self {
        Self {
            available_locales: schema
                .available_locales()
                .iter()
                .map(ToString::to_string)
                .collect(),
            default_locale: schema.default_locale().map(ToString::to_string),
            fields: schema.fields().iter().map(FieldSummary::from).collect(),
        }
    }
}

/// Outcome of validating one field.
#[derive(Debug, Serialize)]
pub struct FieldReport {
    pub name: String,
    pub valid: bool,
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&FieldDescriptor> for FieldReport {
    fn from(field: &FieldDescriptor) -> Self {
        let valid = field.validate();
        Self {
            name: field.name().to_string(),
            valid,
            value: field.current_value_as_string(),
            error: field
                .validation_error()
                .filter(|message| !message.is_empty())
                .map(str::to_string),
        }
    }
}

pub fn print_fields_table(summary: &SchemaSummary) {
    println!("\n=== Form Fields ===\n");
    println!(
        "Locales: {} (default: {})",
        if summary.available_locales.is_empty() {
            "-".to_string()
        } else {
            summary.available_locales.join(", ")
        },
        summary.default_locale.as_deref().unwrap_or("-")
    );

    if summary.fields.is_empty() {
        println!("\nNo fields found.");
        return;
    }

    println!(
        "\n{:<24} {:<18} {:<10} {:<8} {:<30} {:<18}",
        "Name", "Data Type", "Editor", "Required", "Label", "Validator"
    );
    println!("{}", "-".repeat(112));

    for field in &summary.fields {
        println!(
            "{:<24} {:<18} {:<10} {:<8} {:<30} {:<18}",
            truncate_string(&field.name, 24),
            truncate_string(&field.data_type, 18),
            field.editor,
            if field.required { "yes" } else { "no" },
            truncate_string(field.label.as_deref().unwrap_or("-"), 30),
            field.validator
        );
    }
}

pub fn print_report_table(reports: &[FieldReport]) {
    println!("\n{:<24} {:<7} {:<40} {:<30}", "Name", "Valid", "Value", "Error");
    println!("{}", "-".repeat(104));

    for report in reports {
        println!(
            "{:<24} {:<7} {:<40} {:<30}",
            truncate_string(&report.name, 24),
            if report.valid { "yes" } else { "NO" },
            truncate_string(report.value.as_deref().unwrap_or("-"), 40),
            truncate_string(report.error.as_deref().unwrap_or(""), 30)
        );
    }
}

/// Outcome of running a compiled expression on one input.
#[derive(Debug, Serialize)]
pub struct Evaluation {
    pub input: String,
    pub valid: bool,
}

#[derive(Debug, Serialize)]
pub struct CompileOutput {
    pub kind: &'static str,
    pub error_message: String,
    pub results: Vec<Evaluation>,
}

pub fn print_compile_table(output: &CompileOutput) {
    println!("\nValidator: {}", output.kind);
    if !output.error_message.is_empty() {
        println!("Error message: {}", output.error_message);
    }
    if output.results.is_empty() {
        return;
    }

    println!("\n{:<50} {:<7}", "Input", "Valid");
    println!("{}", "-".repeat(58));
    for result in &output.results {
        println!(
            "{:<50} {:<7}",
            truncate_string(&result.input, 50),
            if result.valid { "yes" } else { "NO" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynaform_core::{compile, DataType, FieldDefinition};
    use std::io::Write;

    #[test]
    fn truncate_string_keeps_short_text() {
        assert_eq!(truncate_string("Name", 10), "Name");
        assert_eq!(truncate_string("", 3), "");
    }

    #[test]
    fn truncate_string_counts_characters() {
        assert_eq!(truncate_string("Descripción larga", 8), "Descr...");
        assert_eq!(truncate_string("ñññññ", 4), "ñ...");
        assert_eq!(truncate_string("abc", 2), "...");
    }

    #[test]
    fn field_report_carries_validator_message() {
        let mut field = FieldDescriptor::new(FieldDefinition {
            validator: compile("contains(Title, \"rust\")", "Mention rust"),
            ..FieldDefinition::new("Title", DataType::String)
        });
        field.set_current_value_as_string(Some("go")).unwrap();

        let report = FieldReport::from(&field);
        assert!(!report.valid);
        assert_eq!(report.error.as_deref(), Some("Mention rust"));
        assert_eq!(report.value.as_deref(), Some("go"));
    }

    #[test]
    fn schema_summary_lists_fields() {
        let schema = dynaform_core::parse_schema(
            r#"<root available-locales="en_US" default-locale="en_US">
                <dynamic-element name="Agree" dataType="boolean" type="checkbox"/>
            </root>"#,
            &Locale::default(),
        )
        .unwrap();

        let summary = SchemaSummary::from(&schema);
        assert_eq!(summary.available_locales, vec!["en_US".to_string()]);
        assert_eq!(summary.fields.len(), 1);
        assert_eq!(summary.fields[0].editor, "checkbox");
        assert_eq!(summary.fields[0].validator, "always_valid");
    }

    #[test]
    fn load_schema_reads_json_definition_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"defaultLanguageId": "en_US",
                "fields": [{{"name": "Email", "dataType": "string",
                             "label": {{"en_US": "Email", "es_ES": "Correo"}}}}]}}"#
        )
        .unwrap();

        let schema = load_schema(&SchemaParser::new(), file.path(), &Locale::new("es_ES")).unwrap();
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.fields()[0].label(), Some("Correo"));
    }

    #[test]
    fn load_schema_reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.xml");
        let err = load_schema(&SchemaParser::new(), &missing, &Locale::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to read schema"));

        let broken = dir.path().join("broken.xml");
        std::fs::write(&broken, "<root><dynamic-element name=\"A\">").unwrap();
        let err = load_schema(&SchemaParser::new(), &broken, &Locale::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse schema"));
    }

    #[test]
    fn load_values_requires_an_object() {
        let dir = tempfile::tempdir().unwrap();
        let values = dir.path().join("values.json");

        std::fs::write(&values, r#"{"Age": 42, "Name": "Ana", "Tip": null}"#).unwrap();
        let map = load_values(&values).unwrap();
        assert_eq!(raw_value(&map["Age"]).as_deref(), Some("42"));
        assert_eq!(raw_value(&map["Name"]).as_deref(), Some("Ana"));
        assert_eq!(raw_value(&map["Tip"]), None);

        std::fs::write(&values, "[1, 2]").unwrap();
        assert!(load_values(&values).is_err());
    }
}
