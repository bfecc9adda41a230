//! The process-wide registry and free functions operating on it.

use crate::coerce::Coerce;
use crate::error::ConfigResult;
use crate::handle::Handle;
use crate::node::Modifier;
use crate::provider::Provider;
use crate::providers::FlagProvider;
use crate::registry::Registry;
use crate::value::ConfigValue;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::OnceLock;
use std::time::Duration;

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Returns the process-wide registry.
///
/// It is created on first use with the command-line flags of the current
/// process queued as the first, highest priority, provider.
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(|| {
        let flags: Box<dyn Provider> = Box::new(FlagProvider::from_args());
        Registry::with_providers([flags])
    })
}

/// Declares an option on the process-wide registry.
///
/// See [`Registry::register`].
#[track_caller]
pub fn register<T: Coerce>(
    name: &str,
    default: T,
    description: &str,
    modifiers: &[Modifier],
) -> Handle<T> {
    global().register(name, default, description, modifiers)
}

/// Resolves the process-wide registry from the command line followed by
/// `providers`.
///
/// # Example
/// ```no_run
/// use declcfg::{EnvProvider, FileProvider, Provider};
///
/// let path = declcfg::string("config", "", "path to the config file", &[]);
/// let port = declcfg::int("port", 8080, "listen port", &[]);
///
/// let providers: Vec<Box<dyn Provider>> = vec![
///     Box::new(EnvProvider::new()),
///     Box::new(FileProvider::from_option(&path)),
/// ];
/// if let Err(err) = declcfg::parse(providers) {
///     eprintln!("{err}");
///     std::process::exit(2);
/// }
///
/// println!("{}", declcfg::show());
/// println!("listening on {}", port.get());
/// ```
pub fn parse<I>(providers: I) -> ConfigResult<()>
where
    I: IntoIterator<Item = Box<dyn Provider>>,
{
    global().parse(providers)
}

/// Renders the process-wide registry. See [`Registry::show`].
pub fn show() -> String {
    global().show()
}

macro_rules! global_options {
    ($($method:ident => $ty:ty;)*) => {$(
        #[doc = concat!("Process-wide [`Registry::", stringify!($method), "`].")]
        #[track_caller]
        pub fn $method(
            name: &str,
            default: $ty,
            description: &str,
            modifiers: &[Modifier],
        ) -> Handle<$ty> {
            global().$method(name, default, description, modifiers)
        }
    )*};
}

global_options! {
    int => isize;
    ints => Vec<isize>;
    int32 => i32;
    int64 => i64;
    uint => usize;
    uint32 => u32;
    uint64 => u64;
    float32 => f32;
    floats32 => Vec<f32>;
    float64 => f64;
    floats64 => Vec<f64>;
    bool => bool;
    bools => Vec<bool>;
    duration => Duration;
    durations => Vec<Duration>;
    map => BTreeMap<String, ConfigValue>;
}

/// Process-wide [`Registry::string`].
#[track_caller]
pub fn string(
    name: &str,
    default: impl Into<String>,
    description: &str,
    modifiers: &[Modifier],
) -> Handle<String> {
    global().string(name, default, description, modifiers)
}

/// Process-wide [`Registry::strings`].
#[track_caller]
pub fn strings(
    name: &str,
    default: &[&str],
    description: &str,
    modifiers: &[Modifier],
) -> Handle<Vec<String>> {
    global().strings(name, default, description, modifiers)
}

/// Process-wide [`Registry::ip`].
#[track_caller]
pub fn ip(
    name: &str,
    default: &str,
    description: &str,
    modifiers: &[Modifier],
) -> Handle<Option<IpAddr>> {
    global().ip(name, default, description, modifiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::secret;

    #[test]
    fn test_free_functions_share_the_global_registry() {
        let token = string("global.unit.token", "abc", "token", &[secret()]);
        let retries = uint32("global.unit.retries", 3, "retries", &[]);

        assert!(std::ptr::eq(global(), global()));
        assert!(global().contains("global.unit.token"));
        assert!(show().contains("global.unit.retries"));
        assert!(show().contains("global.unit.token"));
        assert!(!show().contains("abc"));
        assert_eq!(retries.get(), 3);
        assert_eq!(token.get(), "abc");
        assert!(!global().is_parsed());
    }
}
