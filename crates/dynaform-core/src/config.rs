//! Configuration module
//!
//! Engine settings read from the environment (and a `.env` file when
//! present), with defaults for every value.

use std::env;

use crate::error::{FormError, FormResult};
use crate::locale::Locale;

const DEFAULT_LOCALE: &str = "en_US";
const MAX_SCHEMA_BYTES: usize = 1024 * 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Locale used when neither the caller nor the document provides one
    pub default_locale: Locale,
    /// Resolve metadata from a block of the same language (`es` for `es_ES`)
    pub language_fallback: bool,
    /// Documents larger than this are rejected
    pub max_schema_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_locale: Locale::new(DEFAULT_LOCALE),
            language_fallback: true,
            max_schema_bytes: MAX_SCHEMA_BYTES,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from any key lookup. Unparseable values fall
    /// back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default_locale = lookup("DYNAFORM_DEFAULT_LOCALE")
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());

        Self {
            default_locale: Locale::new(default_locale),
            language_fallback: lookup("DYNAFORM_LANGUAGE_FALLBACK")
                .unwrap_or_else(|| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            max_schema_bytes: lookup("DYNAFORM_MAX_SCHEMA_BYTES")
                .unwrap_or_else(|| MAX_SCHEMA_BYTES.to_string())
                .parse()
                .unwrap_or(MAX_SCHEMA_BYTES),
        }
    }

    pub fn validate(&self) -> FormResult<()> {
        if self.default_locale.is_empty() {
            return Err(FormError::Config(
                "DYNAFORM_DEFAULT_LOCALE must not be empty".to_string(),
            ));
        }

        if self.max_schema_bytes == 0 {
            return Err(FormError::Config(
                "DYNAFORM_MAX_SCHEMA_BYTES must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
