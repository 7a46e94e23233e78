use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Locale identifier as used by schema documents (`en_US`, `es_ES`, `pt`).
///
/// Hyphenated identifiers (`es-ES`) are normalized to the underscore form so
/// both spellings select the same metadata block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    pub fn new(id: impl AsRef<str>) -> Self {
        Locale(id.as_ref().trim().replace('-', "_"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Language part of the identifier (`es` for `es_ES`)
    pub fn language(&self) -> &str {
        self.0.split('_').next().unwrap_or_default()
    }

    pub fn same_language(&self, other: &Locale) -> bool {
        self.language().eq_ignore_ascii_case(other.language())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::new("en_US")
    }
}

impl From<String> for Locale {
    fn from(id: String) -> Self {
        Locale::new(id)
    }
}

impl From<&str> for Locale {
    fn from(id: &str) -> Self {
        Locale::new(id)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let locale = Locale::new(s);
        if locale.is_empty() {
            return Err(anyhow::anyhow!("Invalid locale: '{}'", s));
        }
        Ok(locale)
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}
