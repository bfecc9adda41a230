//! The contract between the parse engine and configuration sources.

use crate::error::ConfigResult;
use crate::value::Renderer;
use std::collections::{BTreeMap, HashMap};

/// Keys a provider should look for during parse.
///
/// Canonical option names map to `true`, aliases map to `false`. Providers
/// may treat both the same way.
pub type Awaited = HashMap<String, bool>;

/// Values a provider read from its source.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Provided {
    /// Values for keys present in the awaited set.
    pub found: BTreeMap<String, String>,
    /// Values for keys the registry does not know about.
    pub unknown: BTreeMap<String, String>,
}

impl Provided {
    /// Files `key` under `found` or `unknown` depending on `awaited`.
    pub fn insert(&mut self, awaited: &Awaited, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if awaited.contains_key(&key) {
            self.found.insert(key, value.into());
        } else {
            self.unknown.insert(key, value.into());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty() && self.unknown.is_empty()
    }
}

/// A source of configuration values, queried once per parse.
///
/// # Example
/// ```
/// use declcfg::{Awaited, ConfigResult, Provided, Provider, Registry, Renderer};
///
/// struct Fixed;
///
/// impl Provider for Fixed {
///     fn label(&self) -> String {
///         "fixed".to_string()
///     }
///
///     fn provide(&self, awaited: &Awaited, _render: Renderer) -> ConfigResult<Provided> {
///         let mut provided = Provided::default();
///         provided.insert(awaited, "workers", "8");
///         Ok(provided)
///     }
/// }
///
/// let registry = Registry::new();
/// let workers = registry.uint("workers", 1, "worker threads", &[]);
///
/// let providers: Vec<Box<dyn Provider>> = vec![Box::new(Fixed)];
/// registry.parse(providers).unwrap();
///
/// assert_eq!(workers.get(), 8);
/// assert_eq!(registry.set_by("workers").as_deref(), Some("fixed"));
/// ```
pub trait Provider: Send + Sync {
    /// Stable identifier used in error messages and unknown field reports.
    fn label(&self) -> String;

    /// Reads the source.
    ///
    /// Only keys present in `awaited` may be reported under `found`; anything
    /// else the source contains belongs in `unknown`. Structured source values
    /// are turned into strings with `render`. A read or decode failure aborts
    /// the whole parse.
    fn provide(&self, awaited: &Awaited, render: Renderer) -> ConfigResult<Provided>;
}
