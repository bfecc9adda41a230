//! Environment variable provider.

use crate::error::{ConfigError, ConfigResult};
use crate::provider::{Awaited, Provided, Provider};
use crate::value::Renderer;
use std::env;
use std::fmt;

/// Reads options from environment variables.
///
/// Every awaited key is looked up under a mangled name: characters other
/// than ASCII letters, digits and dots are dropped, the rest is uppercased
/// and dots become underscores, so `db.max-conns` reads `DB_MAXCONNS`.
/// The environment cannot be enumerated meaningfully, so this provider never
/// reports unknown keys.
pub struct EnvProvider {
    /// Optional prefix for environment variable names
    prefix: Option<String>,

    /// Custom transformation applied to the mangled name
    key_replacer: Option<Box<dyn Fn(&str) -> String + Send + Sync>>,
}

impl EnvProvider {
    /// Creates a provider without a prefix.
    pub fn new() -> Self {
        Self {
            prefix: None,
            key_replacer: None,
        }
    }

    /// Creates a provider reading `<PREFIX>_<NAME>` variables.
    ///
    /// # Example
    /// ```
    /// use declcfg::EnvProvider;
    ///
    /// let env = EnvProvider::with_prefix("APP");
    /// assert_eq!(env.transform_key("database.host"), "APP_DATABASE_HOST");
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            key_replacer: None,
        }
    }

    /// Sets a function that rewrites the mangled variable name before the
    /// prefix is added.
    ///
    /// # Example
    /// ```
    /// use declcfg::EnvProvider;
    ///
    /// let mut env = EnvProvider::new();
    /// env.set_key_replacer(Box::new(|key: &str| key.replace('_', "__")));
    /// assert_eq!(env.transform_key("db.host"), "DB__HOST");
    /// ```
    pub fn set_key_replacer<F>(&mut self, replacer: Box<F>)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.key_replacer = Some(replacer);
    }

    /// Returns the environment variable name read for an option key.
    pub fn transform_key(&self, key: &str) -> String {
        let mut env_key: String = key
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
            .map(|c| if c == '.' { '_' } else { c.to_ascii_uppercase() })
            .collect();

        if let Some(ref replacer) = self.key_replacer {
            env_key = replacer(&env_key);
        }

        match self.prefix {
            Some(ref prefix) => format!("{prefix}_{env_key}"),
            None => env_key,
        }
    }
}

impl Default for EnvProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EnvProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvProvider")
            .field("prefix", &self.prefix)
            .field("key_replacer", &self.key_replacer.is_some())
            .finish()
    }
}

impl Provider for EnvProvider {
    fn label(&self) -> String {
        "env".to_string()
    }

    fn provide(&self, awaited: &Awaited, _render: Renderer) -> ConfigResult<Provided> {
        let mut provided = Provided::default();

        for key in awaited.keys() {
            let name = self.transform_key(key);
            let Some(value) = env::var_os(&name) else {
                continue;
            };

            let value = value.into_string().map_err(|_| {
                ConfigError::invalid_value(format!(
                    "environment variable {name} is not valid unicode"
                ))
            })?;
            provided.found.insert(key.clone(), value);
        }

        Ok(provided)
    }
}
