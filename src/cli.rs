//! Provider backed by clap's parsed command line.

use crate::error::ConfigResult;
use crate::provider::{Awaited, Provided, Provider};
use crate::value::{ConfigValue, Renderer};
use clap::parser::ValueSource;
use clap::ArgMatches;
use std::collections::HashMap;

/// Supplies the arguments the user actually passed to a clap command.
///
/// Argument ids become option keys with `-` and `_` turned into dots, unless
/// an explicit mapping says otherwise. Values clap filled in from an
/// argument's `default_value` are not reported, the registered defaults stay
/// in charge. Arguments taking several values are reported as JSON arrays.
///
/// # Example
/// ```
/// use clap::{Arg, Command};
/// use declcfg::cli::ClapProvider;
/// use declcfg::{Provider, Registry};
///
/// let app = Command::new("myapp")
///     .arg(Arg::new("db_host").long("db-host"))
///     .arg(Arg::new("verbose").long("verbose").action(clap::ArgAction::SetTrue));
/// let matches = app.try_get_matches_from(["myapp", "--db-host", "db.internal"]).unwrap();
///
/// let registry = Registry::new();
/// let host = registry.string("db.host", "localhost", "database host", &[]);
/// let verbose = registry.bool("verbose", false, "verbose output", &[]);
///
/// let providers: Vec<Box<dyn Provider>> = vec![Box::new(ClapProvider::new(matches))];
/// registry.parse(providers).unwrap();
///
/// assert_eq!(host.get(), "db.internal");
/// assert!(!verbose.get());
/// ```
#[derive(Debug, Clone)]
pub struct ClapProvider {
    /// Parsed command line arguments
    matches: ArgMatches,
    /// Argument id to option key mappings
    flag_mappings: HashMap<String, String>,
}

impl ClapProvider {
    /// Creates a provider from parsed command line arguments.
    pub fn new(matches: ArgMatches) -> Self {
        Self {
            matches,
            flag_mappings: HashMap::new(),
        }
    }

    /// Creates a provider with custom argument-to-key mappings.
    ///
    /// # Example
    /// ```
    /// use clap::{Arg, Command};
    /// use declcfg::cli::ClapProvider;
    /// use std::collections::HashMap;
    ///
    /// let app = Command::new("myapp").arg(Arg::new("host").long("host"));
    /// let matches = app.try_get_matches_from(["myapp", "--host", "localhost"]).unwrap();
    ///
    /// let mut mappings = HashMap::new();
    /// mappings.insert("host".to_string(), "database.host".to_string());
    ///
    /// let provider = ClapProvider::with_mappings(matches, mappings);
    /// assert_eq!(provider.config_key("host"), "database.host");
    /// ```
    pub fn with_mappings(matches: ArgMatches, mappings: HashMap<String, String>) -> Self {
        Self {
            matches,
            flag_mappings: mappings,
        }
    }

    /// Maps an argument id to an option key.
    pub fn add_flag_mapping(&mut self, flag_name: impl Into<String>, config_key: impl Into<String>) {
        self.flag_mappings.insert(flag_name.into(), config_key.into());
    }

    pub fn flag_mappings(&self) -> &HashMap<String, String> {
        &self.flag_mappings
    }

    /// Gets the raw ArgMatches for advanced usage.
    pub fn matches(&self) -> &ArgMatches {
        &self.matches
    }

    /// Returns the option key an argument id is reported under.
    pub fn config_key(&self, arg_name: &str) -> String {
        self.flag_mappings
            .get(arg_name)
            .cloned()
            .unwrap_or_else(|| normalize_flag_name(arg_name))
    }

    fn arg_value(&self, arg_name: &str) -> Option<ConfigValue> {
        match self.matches.value_source(arg_name) {
            None | Some(ValueSource::DefaultValue) => return None,
            Some(_) => {}
        }

        // SetTrue / SetFalse
        if let Ok(Some(&flag)) = self.matches.try_get_one::<bool>(arg_name) {
            return Some(ConfigValue::Boolean(flag));
        }

        if let Ok(Some(values)) = self.matches.try_get_many::<String>(arg_name) {
            let mut values: Vec<ConfigValue> = values.map(|v| ConfigValue::from(v.as_str())).collect();
            return match values.len() {
                1 => values.pop(),
                _ => Some(ConfigValue::Array(values)),
            };
        }

        // Count
        if let Ok(Some(&count)) = self.matches.try_get_one::<u8>(arg_name) {
            return Some(ConfigValue::Integer(i64::from(count)));
        }

        None
    }
}

fn normalize_flag_name(flag_name: &str) -> String {
    flag_name.replace(['-', '_'], ".").to_lowercase()
}

impl Provider for ClapProvider {
    fn label(&self) -> String {
        "clap".to_string()
    }

    fn provide(&self, awaited: &Awaited, render: Renderer) -> ConfigResult<Provided> {
        let mut provided = Provided::default();

        for arg_id in self.matches.ids() {
            let arg_name = arg_id.as_str();
            if let Some(value) = self.arg_value(arg_name) {
                provided.insert(awaited, self.config_key(arg_name), render(&value));
            }
        }

        Ok(provided)
    }
}
