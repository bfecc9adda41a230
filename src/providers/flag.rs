//! Command-line flag provider.

use crate::error::ConfigResult;
use crate::provider::{Awaited, Provided, Provider};
use crate::value::Renderer;
use std::collections::BTreeMap;

/// Reads options from command-line arguments.
///
/// Accepted forms are `-name value`, `--name value` and `--name=value`. A flag
/// followed by another flag, or by nothing, gets the empty value, which
/// boolean options read as `true`. A value may start with `-` only when it is
/// a number. Positional arguments are ignored and `--` ends flag parsing.
/// Flags that match no registered option are reported as unknown.
///
/// # Example
/// ```
/// use declcfg::{FlagProvider, Provider, Registry};
///
/// let registry = Registry::new();
/// let port = registry.int("port", 80, "listen port", &[]);
/// let debug = registry.bool("debug", false, "debug mode", &[]);
///
/// let flags = FlagProvider::new(["serve", "--port=8080", "-debug"]);
/// let providers: Vec<Box<dyn Provider>> = vec![Box::new(flags)];
/// registry.parse(providers).unwrap();
///
/// assert_eq!(port.get(), 8080);
/// assert!(debug.get());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlagProvider {
    args: Vec<String>,
}

impl FlagProvider {
    /// Creates a provider over explicit arguments, without the program name.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a provider over the arguments of the current process.
    pub fn from_args() -> Self {
        Self::new(
            std::env::args_os()
                .skip(1)
                .map(|arg| arg.to_string_lossy().into_owned()),
        )
    }

    /// Splits the arguments into flag names and values.
    pub fn flags(&self) -> BTreeMap<String, String> {
        let mut flags = BTreeMap::new();
        let mut args = self.args.iter().peekable();

        while let Some(arg) = args.next() {
            if arg == "--" {
                break;
            }

            let name = match arg.strip_prefix("--").or_else(|| arg.strip_prefix('-')) {
                Some(name) if !name.is_empty() => name,
                _ => continue,
            };

            if let Some((name, value)) = name.split_once('=') {
                flags.insert(name.to_string(), value.to_string());
                continue;
            }

            let value = if args.peek().is_some_and(|next| is_value(next)) {
                args.next().cloned().unwrap_or_default()
            } else {
                String::new()
            };
            flags.insert(name.to_string(), value);
        }

        flags
    }
}

fn is_value(token: &str) -> bool {
    match token.strip_prefix('-') {
        Some(rest) => rest.parse::<f64>().is_ok(),
        None => !token.is_empty(),
    }
}

impl Provider for FlagProvider {
    fn label(&self) -> String {
        "flag".to_string()
    }

    fn provide(&self, awaited: &Awaited, _render: Renderer) -> ConfigResult<Provided> {
        let mut provided = Provided::default();
        for (name, value) in self.flags() {
            provided.insert(awaited, name, value);
        }
        Ok(provided)
    }
}
