//! Configuration file provider.

use crate::error::{ConfigError, ConfigResult};
use crate::handle::Handle;
use crate::parser::detect_parser_by_extension;
use crate::provider::{Awaited, Provided, Provider};
use crate::value::{ConfigValue, Renderer};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
enum PathSource {
    Fixed(PathBuf),
    Option(Handle<String>),
}

/// Reads options from a JSON, YAML, TOML or INI file chosen by extension.
///
/// Nested keys are joined with dots. A key that matches a registered option
/// is reported with its whole subtree rendered, so list and map options
/// receive JSON; other objects are descended into and any remaining leaf is
/// reported as unknown. Null values are skipped.
///
/// The path is either fixed or read from a string option when parse runs,
/// which lets a flag pick the file. An empty path means there is no file.
///
/// # Example
/// ```
/// use declcfg::{FileProvider, FlagProvider, Provider, Registry};
///
/// let registry = Registry::new();
/// let path = registry.string("config", "", "path to the config file", &[]);
/// let level = registry.string("log.level", "info", "log level", &[]);
///
/// let providers: Vec<Box<dyn Provider>> = vec![
///     Box::new(FlagProvider::new(["--log.level", "debug"])),
///     Box::new(FileProvider::from_option(&path)),
/// ];
/// registry.parse(providers).unwrap();
///
/// assert_eq!(level.get(), "debug");
/// ```
#[derive(Debug, Clone)]
pub struct FileProvider {
    source: PathSource,
}

impl FileProvider {
    /// Creates a provider reading a fixed path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            source: PathSource::Fixed(path.into()),
        }
    }

    /// Creates a provider reading whatever path `option` holds at parse time.
    pub fn from_option(option: &Handle<String>) -> Self {
        Self {
            source: PathSource::Option(option.clone()),
        }
    }

    /// Returns the path that would be read now.
    pub fn path(&self) -> PathBuf {
        match &self.source {
            PathSource::Fixed(path) => path.clone(),
            PathSource::Option(option) => PathBuf::from(option.get()),
        }
    }

    fn format(path: &Path) -> Option<String> {
        let extension = path.extension()?.to_str()?;
        detect_parser_by_extension(extension)
            .ok()
            .map(|parser| parser.name().to_lowercase())
    }
}

impl Provider for FileProvider {
    fn label(&self) -> String {
        let path = self.path();
        let format = Self::format(&path).unwrap_or_else(|| "file".to_string());
        format!("{}:{}", format, path.display())
    }

    fn provide(&self, awaited: &Awaited, render: Renderer) -> ConfigResult<Provided> {
        let path = self.path();
        if path.as_os_str().is_empty() {
            debug!("no configuration file given");
            return Ok(Provided::default());
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or(ConfigError::UnsupportedFormat)?;
        let parser = detect_parser_by_extension(extension)?;

        let content = fs::read_to_string(&path)?;
        let tree = parser.parse(&content)?;

        let mut provided = Provided::default();
        collect(&tree, "", awaited, render, &mut provided);
        Ok(provided)
    }
}

fn collect(
    tree: &BTreeMap<String, ConfigValue>,
    prefix: &str,
    awaited: &Awaited,
    render: Renderer,
    provided: &mut Provided,
) {
    for (name, value) in tree {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };

        if awaited.contains_key(&key) {
            if !value.is_null() {
                provided.found.insert(key, render(value));
            }
            continue;
        }

        match value {
            ConfigValue::Object(children) => collect(children, &key, awaited, render, provided),
            ConfigValue::Null => {}
            other => {
                provided.unknown.insert(key, render(other));
            }
        }
    }
}
