//! Validation expression compiler
//!
//! Turns the small expression language found in form definitions
//! (`contains(field, "x")`, `NOT(contains(field, "x"))`, `match(field, "re")`,
//! `isEmailAddress(field)`, `isURL(field)`) into a [`Validator`].
//!
//! Compilation never fails: an empty, unknown or malformed expression compiles
//! to [`ValidatorKind::AlwaysValid`], so a broken rule in a form definition
//! removes the constraint instead of blocking the field.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::sync::LazyLock;

static CONTAINS_ARGUMENT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"^contains\(\s*\w+\s*,\s*"([^"]*)"\s*\)"#).ok());

static NOT_CONTAINS_ARGUMENT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"^NOT\(\s*contains\(\s*\w+\s*,\s*"([^"]*)"\s*\)\s*\)"#).ok()
});

static MATCH_ARGUMENT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"^match\(\s*\w+\s*,\s*"([^"]*)"\s*\)"#).ok());

static EMAIL_ADDRESS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9+._%\-]{1,256}@[a-zA-Z0-9][a-zA-Z0-9\-]{0,64}(?:\.[a-zA-Z0-9][a-zA-Z0-9\-]{0,25})+$",
    )
    .ok()
});

static WEB_URL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:(?:https?|ftp|rtsp)://)?",
        r"(?:[^\s:@/]+(?::[^\s:@/]*)?@)?",
        r"(?:(?:[a-z0-9](?:[a-z0-9\-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}",
        r"|localhost",
        r"|\d{1,3}(?:\.\d{1,3}){3})",
        r"(?::\d{1,5})?",
        r"(?:[/?#]\S*)?$",
    ))
    .ok()
});

/// Expression family, decided by literal prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKind {
    IsEmailAddress,
    IsUrl,
    Contains,
    NotContains,
    Match,
    Unrecognized,
}

impl ExpressionKind {
    /// Prefixes in priority order; the first match wins.
    const PREFIXES: [(&'static str, ExpressionKind); 5] = [
        ("isEmailAddress(", ExpressionKind::IsEmailAddress),
        ("isURL(", ExpressionKind::IsUrl),
        ("contains(", ExpressionKind::Contains),
        ("NOT(contains(", ExpressionKind::NotContains),
        ("match(", ExpressionKind::Match),
    ];

    pub fn classify(source: &str) -> Self {
        Self::PREFIXES
            .iter()
            .find(|(prefix, _)| source.starts_with(prefix))
            .map(|(_, kind)| *kind)
            .unwrap_or(ExpressionKind::Unrecognized)
    }
}

/// Compiled predicate over a field's string representation.
#[derive(Debug, Clone)]
pub enum ValidatorKind {
    Contains(String),
    NotContains(String),
    IsEmailAddress,
    IsUrl,
    MatchesPattern { pattern: String, regex: Regex },
    AlwaysValid,
}

impl ValidatorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValidatorKind::Contains(_) => "contains",
            ValidatorKind::NotContains(_) => "not_contains",
            ValidatorKind::IsEmailAddress => "is_email_address",
            ValidatorKind::IsUrl => "is_url",
            ValidatorKind::MatchesPattern { .. } => "matches_pattern",
            ValidatorKind::AlwaysValid => "always_valid",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Validator {
    kind: ValidatorKind,
    error_message: String,
}

impl Validator {
    pub fn new(kind: ValidatorKind, error_message: impl Into<String>) -> Self {
        Self {
            kind,
            error_message: error_message.into(),
        }
    }

    pub fn always_valid() -> Self {
        Self::new(ValidatorKind::AlwaysValid, "")
    }

    /// Compile the `expression` of a validation map, carrying its `error`.
    pub fn from_validation_map(map: &ValidationMap) -> Self {
        compile(&map.expression, &map.error)
    }

    pub fn kind(&self) -> &ValidatorKind {
        &self.kind
    }

    /// Message shown by the host when validation fails; never interpreted here.
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn is_always_valid(&self) -> bool {
        matches!(self.kind, ValidatorKind::AlwaysValid)
    }

    pub fn evaluates(&self, input: &str) -> bool {
        match &self.kind {
            ValidatorKind::Contains(needle) => input.contains(needle.as_str()),
            ValidatorKind::NotContains(needle) => !input.contains(needle.as_str()),
            ValidatorKind::IsEmailAddress => full_match(&EMAIL_ADDRESS, input),
            ValidatorKind::IsUrl => full_match(&WEB_URL, input),
            ValidatorKind::MatchesPattern { regex, .. } => regex.is_match(input),
            ValidatorKind::AlwaysValid => true,
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::always_valid()
    }
}

fn full_match(pattern: &LazyLock<Option<Regex>>, input: &str) -> bool {
    matches!(&**pattern, Some(re) if re.is_match(input))
}

/// Validation rule as it appears in a form definition.
///
/// Both keys are optional; a missing key, or one holding something other than
/// a string, reads as the empty string. `errorMessage` is read when `error` is
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawValidationMap")]
pub struct ValidationMap {
    pub error: String,
    pub expression: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawValidationMap {
    #[serde(default, deserialize_with = "string_or_empty")]
    error: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    error_message: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    expression: String,
}

impl From<RawValidationMap> for ValidationMap {
    fn from(raw: RawValidationMap) -> Self {
        let error = if raw.error.is_empty() {
            raw.error_message
        } else {
            raw.error
        };
        Self {
            error,
            expression: raw.expression,
        }
    }
}

impl ValidationMap {
    pub fn new(expression: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            expression: expression.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.error.is_empty() && self.expression.is_empty()
    }
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_owned).unwrap_or_default())
}

/// Compile a validation expression.
pub fn compile(expression_source: &str, error_message: &str) -> Validator {
    let source = expression_source.trim();
    let kind = match ExpressionKind::classify(source) {
        ExpressionKind::IsEmailAddress => Some(ValidatorKind::IsEmailAddress),
        ExpressionKind::IsUrl => Some(ValidatorKind::IsUrl),
        ExpressionKind::Contains => {
            first_argument(&CONTAINS_ARGUMENT, source).map(ValidatorKind::Contains)
        }
        ExpressionKind::NotContains => {
            first_argument(&NOT_CONTAINS_ARGUMENT, source).map(ValidatorKind::NotContains)
        }
        ExpressionKind::Match => first_argument(&MATCH_ARGUMENT, source).and_then(|pattern| {
            match Regex::new(&format!("^(?:{})$", pattern)) {
                Ok(regex) => Some(ValidatorKind::MatchesPattern { pattern, regex }),
                Err(e) => {
                    tracing::warn!(
                        pattern = %pattern,
                        error = %e,
                        "Invalid pattern in match() expression, field will not be validated"
                    );
                    None
                }
            }
        }),
        ExpressionKind::Unrecognized => {
            if !source.is_empty() {
                tracing::debug!(expression = %source, "Unrecognized validation expression");
            }
            None
        }
    };

    match kind {
        Some(kind) => Validator::new(kind, error_message),
        None => {
            if !source.is_empty() {
                tracing::debug!(expression = %source, "Falling back to no validation");
            }
            Validator::new(ValidatorKind::AlwaysValid, error_message)
        }
    }
}

fn first_argument(pattern: &LazyLock<Option<Regex>>, source: &str) -> Option<String> {
    (**pattern)
        .as_ref()?
        .captures(source)?
        .get(1)
        .map(|m| m.as_str().to_string())
}
