//! Error types and utilities for declcfg.

use crate::coerce::CoerceError;
use std::collections::BTreeMap;
use std::fmt;

/// Result type alias for declcfg operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Comprehensive error types for registration and parsing.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration source could not be decoded
    #[error("Parse error in {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// Unsupported configuration file format
    #[error("Unsupported configuration format")]
    UnsupportedFormat,

    /// Two options were registered under the same canonical name
    #[error("key={key:?} registered at {origin} conflicts with {existing:?} registered at {existing_origin}: duplicate key")]
    DuplicateKey {
        key: String,
        origin: String,
        existing: String,
        existing_origin: String,
    },

    /// An alias collides with a name or alias that is already registered
    #[error("alias {alias:?} of key={key:?} registered at {origin} conflicts with {existing:?} registered at {existing_origin}: colliding alias with key")]
    CollidingAlias {
        alias: String,
        key: String,
        origin: String,
        existing: String,
        existing_origin: String,
    },

    /// Registration attempted after parsing started
    #[error("key={key:?}: misuse: runtime option registration is not allowed")]
    RuntimeRegistration { key: String },

    /// Parse was called more than once
    #[error("misuse: parse should be called once")]
    DoubleParse,

    /// A provider reported a key that is not registered
    #[error("apply {provider:?}: set key={key:?}: no such key")]
    NoSuchKey { provider: String, key: String },

    /// A provider value could not be converted to the option type
    #[error("apply {provider:?}: set key={key:?} value={value:?}: {source}")]
    Coerce {
        provider: String,
        key: String,
        value: String,
        #[source]
        source: CoerceError,
    },

    /// A provider failed to read its source
    #[error("parse {provider:?}: {source}")]
    Provider {
        provider: String,
        #[source]
        source: Box<ConfigError>,
    },

    /// One or more providers reported keys that are not registered
    #[error(transparent)]
    UnknownFields(UnknownFields),

    /// Required options were not set by any provider
    #[error("missing required fields: {}", .keys.join(", "))]
    Required { keys: Vec<String> },

    /// Invalid configuration value
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::parse_error("JSON", err.to_string())
    }
}

impl ConfigError {
    /// Creates a new parse error with context.
    pub fn parse_error(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Creates a new invalid value error.
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue(message.into())
    }

    /// Wraps a source failure with the label of the provider that raised it.
    pub fn provider(provider: impl Into<String>, source: ConfigError) -> Self {
        Self::Provider {
            provider: provider.into(),
            source: Box::new(source),
        }
    }

    /// Returns the per-provider unknown keys if this is an unknown fields error.
    ///
    /// # Example
    /// ```
    /// use declcfg::{ConfigError, UnknownFields};
    ///
    /// let mut unknown = UnknownFields::default();
    /// unknown.add("env", ["typo.key".to_string()]);
    /// let err = ConfigError::UnknownFields(unknown);
    ///
    /// let fields = err.unknown_fields().unwrap();
    /// assert_eq!(fields.get("env"), Some(&vec!["typo.key".to_string()]));
    /// ```
    pub fn unknown_fields(&self) -> Option<&UnknownFields> {
        match self {
            ConfigError::UnknownFields(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns true if this error lists missing required options.
    pub fn is_required(&self) -> bool {
        matches!(self, ConfigError::Required { .. })
    }

    /// Returns true if parse was called twice.
    pub fn is_double_parse(&self) -> bool {
        matches!(self, ConfigError::DoubleParse)
    }

    /// Returns true if a provider value could not be coerced.
    pub fn is_coerce(&self) -> bool {
        matches!(self, ConfigError::Coerce { .. })
    }

    /// Returns true if this error is related to parsing a source.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, ConfigError::Parse { .. })
    }

    /// Returns true if this error is related to IO operations.
    pub fn is_io_error(&self) -> bool {
        matches!(self, ConfigError::Io(_))
    }
}

/// Unknown keys reported by providers, grouped by provider label.
///
/// Keys are kept sorted so the report is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownFields(BTreeMap<String, Vec<String>>);

impl UnknownFields {
    /// Records the unknown keys of one provider. Empty key sets are ignored.
    pub fn add<I>(&mut self, provider: impl Into<String>, keys: I)
    where
        I: IntoIterator<Item = String>,
    {
        let keys: Vec<String> = keys.into_iter().collect();
        if keys.is_empty() {
            return;
        }

        let entry = self.0.entry(provider.into()).or_default();
        entry.extend(keys);
        entry.sort();
    }

    /// Returns the unknown keys reported by `provider`.
    pub fn get(&self, provider: &str) -> Option<&Vec<String>> {
        self.0.get(provider)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(provider, keys)` pairs ordered by provider label.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

impl fmt::Display for UnknownFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        write!(f, "unknown fields: {data}")
    }
}

impl std::error::Error for UnknownFields {}
