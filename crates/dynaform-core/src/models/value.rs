//! Typed field values
//!
//! Every field holds one [`FieldValue`] whose variant follows its data type.
//! Values travel as canonical strings: this module parses them from and
//! renders them to that form.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::error::{FormError, FormResult};

use super::data_type::{DataType, EditorKind};
use super::upload::DocumentValue;

/// Accepted textual date layouts, tried in order.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Choice of a select or radio field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldOption {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FieldOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>, label: Option<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            label,
        }
    }

    /// Label, or the value when the option has no label.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Decimal(f64),
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Number::Integer(value) => write!(f, "{}", value),
            Number::Decimal(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Boolean(Option<bool>),
    Number(Option<Number>),
    Date(Option<NaiveDate>),
    Options(Vec<FieldOption>),
    Document(DocumentValue),
}

impl FieldValue {
    /// Unset slot for a field of the given type.
    pub fn empty_for(data_type: &DataType, editor_kind: EditorKind) -> Self {
        if editor_kind.has_options() {
            return FieldValue::Options(Vec::new());
        }
        match data_type {
            DataType::Boolean => FieldValue::Boolean(None),
            DataType::Integer | DataType::Number | DataType::Double => FieldValue::Number(None),
            DataType::Date => FieldValue::Date(None),
            DataType::Document => FieldValue::Document(DocumentValue::default()),
            DataType::String | DataType::Html | DataType::Unsupported(_) => FieldValue::Text(None),
        }
    }

    /// Whether the value counts as "no value" for required fields.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.as_deref().map_or(true, str::is_empty),
            FieldValue::Boolean(value) => value.is_none(),
            FieldValue::Number(value) => value.is_none(),
            FieldValue::Date(value) => value.is_none(),
            FieldValue::Options(selected) => selected.is_empty(),
            FieldValue::Document(document) => !document.has_value(),
        }
    }

    /// Canonical string used for validation and submission.
    pub fn to_canonical_string(&self) -> Option<String> {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Boolean(value) => value.map(|v| v.to_string()),
            FieldValue::Number(value) => value.map(|v| v.to_string()),
            FieldValue::Date(value) => value.map(|date| epoch_millis(date).to_string()),
            FieldValue::Options(selected) if selected.is_empty() => None,
            FieldValue::Options(selected) => {
                let values: Vec<&str> = selected.iter().map(|o| o.value.as_str()).collect();
                serde_json::to_string(&values).ok()
            }
            FieldValue::Document(document) => document.state.to_submitted_json(),
        }
    }

    /// Form of the value meant for people rather than servers.
    pub fn to_label(&self) -> Option<String> {
        match self {
            FieldValue::Date(value) => value.map(|date| date.format("%Y-%m-%d").to_string()),
            FieldValue::Options(selected) if selected.is_empty() => None,
            FieldValue::Options(selected) => Some(
                selected
                    .iter()
                    .map(FieldOption::display_label)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            FieldValue::Document(document) => document.summary().map(str::to_string),
            _ => self.to_canonical_string(),
        }
    }

    /// Parse `raw` into a value of the same variant as `self`. An empty or
    /// absent string yields the unset value. Document fields are handled by
    /// the upload state machine and never reach here.
    pub fn parse_like(
        &self,
        raw: Option<&str>,
        field: &str,
        data_type: &DataType,
        options: &[FieldOption],
    ) -> FormResult<FieldValue> {
        let raw = raw.filter(|raw| !raw.is_empty());
        let value = match self {
            FieldValue::Text(_) => FieldValue::Text(raw.map(str::to_string)),
            FieldValue::Boolean(_) => {
                FieldValue::Boolean(raw.map(|raw| parse_boolean(raw, field)).transpose()?)
            }
            FieldValue::Number(_) => FieldValue::Number(
                raw.map(|raw| parse_number(raw, data_type, field))
                    .transpose()?,
            ),
            FieldValue::Date(_) => {
                FieldValue::Date(raw.map(|raw| parse_date(raw, field)).transpose()?)
            }
            FieldValue::Options(_) => match raw {
                Some(raw) => FieldValue::Options(parse_options(raw, options, field)?),
                None => FieldValue::Options(Vec::new()),
            },
            FieldValue::Document(_) => {
                return Err(FormError::invalid_value(
                    field,
                    "document values are set through the upload state",
                ))
            }
        };
        Ok(value)
    }
}

fn parse_boolean(raw: &str, field: &str) -> FormResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(FormError::invalid_value(
            field,
            format!("'{}' is not a boolean", raw),
        )),
    }
}

fn parse_number(raw: &str, data_type: &DataType, field: &str) -> FormResult<Number> {
    let raw = raw.trim();
    let not_a_number = || FormError::invalid_value(field, format!("'{}' is not a number", raw));

    if !matches!(data_type, DataType::Double) {
        if let Ok(value) = raw.parse::<i64>() {
            return Ok(Number::Integer(value));
        }
    }

    let value = raw.parse::<f64>().map_err(|_| not_a_number())?;
    if !value.is_finite() {
        return Err(not_a_number());
    }

    match data_type {
        DataType::Integer if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
            Ok(Number::Integer(value as i64))
        }
        DataType::Integer => Err(FormError::invalid_value(
            field,
            format!("'{}' is not an integer", raw),
        )),
        _ => Ok(Number::Decimal(value)),
    }
}

fn parse_date(raw: &str, field: &str) -> FormResult<NaiveDate> {
    let raw = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date);
        }
    }

    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|timestamp| timestamp.date_naive())
        .ok_or_else(|| FormError::invalid_value(field, format!("'{}' is not a date", raw)))
}

/// Selected options from a JSON array of values (or names/labels), or from a
/// single bare value.
fn parse_options(raw: &str, options: &[FieldOption], field: &str) -> FormResult<Vec<FieldOption>> {
    let wanted: Vec<String> = if raw.trim_start().starts_with('[') {
        let items: Vec<JsonValue> = serde_json::from_str(raw)
            .map_err(|e| FormError::invalid_value(field, e.to_string()))?;
        items
            .into_iter()
            .map(|item| match item {
                JsonValue::String(text) => text,
                other => other.to_string(),
            })
            .collect()
    } else {
        vec![raw.to_string()]
    };

    wanted
        .iter()
        .map(|wanted| {
            options
                .iter()
                .find(|option| option.value == *wanted)
                .or_else(|| options.iter().find(|option| option.name == *wanted))
                .or_else(|| options.iter().find(|option| option.label.as_deref() == Some(wanted)))
                .cloned()
                .ok_or_else(|| {
                    FormError::invalid_value(field, format!("'{}' is not one of the options", wanted))
                })
        })
        .collect()
}

/// Milliseconds since the epoch at UTC midnight of `date`.
pub fn epoch_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}
