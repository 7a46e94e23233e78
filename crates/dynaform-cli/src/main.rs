//! Dynaform CLI: inspect and check dynamic form definitions.
//!
//! Reads DYNAFORM_* settings from the environment (or `.env`). Log verbosity
//! follows RUST_LOG.

use anyhow::Context;
use clap::{Parser, Subcommand};
use dynaform_cli::{
    init_tracing, load_schema, load_values, print_compile_table, print_fields_table,
    print_report_table, raw_value, CompileOutput, Evaluation, FieldReport, OutputFormat,
    SchemaSummary,
};
use dynaform_core::{compile, EngineConfig, Locale, SchemaParser};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dynaform", about = "Dynamic form definition tool")]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a schema document and print its fields
    Inspect {
        /// Path to the schema document (XML or JSON)
        file: PathBuf,
        /// Locale used to resolve labels, e.g. es_ES
        #[arg(long)]
        locale: Option<String>,
    },
    /// Set values on a schema's fields and report which ones are invalid
    Validate {
        /// Path to the schema document (XML or JSON)
        file: PathBuf,
        /// JSON object mapping field names to values
        #[arg(long)]
        values: PathBuf,
        /// Locale used to resolve labels, e.g. es_ES
        #[arg(long)]
        locale: Option<String>,
    },
    /// Compile a validation expression and try it on some inputs
    Compile {
        /// Expression, e.g. 'contains(name, "a")'
        expression: String,
        /// Error message carried by the validator
        #[arg(long, default_value = "")]
        error: String,
        /// Input to evaluate (repeatable)
        #[arg(long = "input")]
        inputs: Vec<String>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = EngineConfig::from_env().context("Invalid DYNAFORM_* configuration")?;
    let cli = Cli::parse();
    let table = cli.format == OutputFormat::Table;
    let locale_or_default =
        |locale: Option<String>| locale.map(Locale::new).unwrap_or_else(|| config.default_locale.clone());
    let parser = SchemaParser::with_config(config.clone());

    match cli.command {
        Commands::Inspect { file, locale } => {
            let schema = load_schema(&parser, &file, &locale_or_default(locale))?;
            let summary = SchemaSummary::from(&schema);
            if table {
                print_fields_table(&summary);
            } else {
                print_json(&summary)?;
            }
        }
        Commands::Validate {
            file,
            values,
            locale,
        } => {
            let mut schema = load_schema(&parser, &file, &locale_or_default(locale))?;

            let values = load_values(&values)?;

            for (name, value) in &values {
                let Some(field) = schema.field_mut(name) else {
                    tracing::warn!(field = %name, "No such field in schema, value ignored");
                    continue;
                };
                field
                    .set_current_value_as_string(raw_value(value).as_deref())
                    .with_context(|| format!("Invalid value for field {}", name))?;
            }

            let reports: Vec<FieldReport> = schema.fields().iter().map(FieldReport::from).collect();
            if table {
                print_report_table(&reports);
            } else {
                print_json(&reports)?;
            }

            let invalid = reports.iter().filter(|report| !report.valid).count();
            if invalid > 0 {
                anyhow::bail!("{} field(s) failed validation", invalid);
            }
        }
        Commands::Compile {
            expression,
            error,
            inputs,
        } => {
            let validator = compile(&expression, &error);
            let output = CompileOutput {
                kind: validator.kind().name(),
                error_message: validator.error_message().to_string(),
                results: inputs
                    .into_iter()
                    .map(|input| Evaluation {
                        valid: validator.evaluates(&input),
                        input,
                    })
                    .collect(),
            };
            if table {
                print_compile_table(&output);
            } else {
                print_json(&output)?;
            }
        }
    }

    Ok(())
}
