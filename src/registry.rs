//! The option registry and the single-pass parse engine.

use crate::coerce::Coerce;
use crate::error::{ConfigError, ConfigResult, UnknownFields};
use crate::handle::Handle;
use crate::node::{Modifier, Node};
use crate::provider::{Awaited, Provider};
use crate::value::{render_value, ConfigValue};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::net::IpAddr;
use std::panic::Location;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Mask printed by [`Registry::show`] in place of secret values.
pub const SECRET_MASK: &str = "<secret>";

/// A set of declared options and the sources that resolve them.
///
/// A registry starts open: options can be registered from anywhere, on any
/// thread. The first call to [`parse`](Registry::parse) closes it for good;
/// registering afterwards, or parsing a second time, is a misuse.
///
/// # Example
/// ```
/// use declcfg::{alias, required, EnvProvider, Provider, Registry};
///
/// let registry = Registry::new();
/// let host = registry.string("db.host", "localhost", "database host", &[alias("h")]);
/// let port = registry.int("db.port", 5432, "database port", &[]);
/// let user = registry.string("db.user", "", "database user", &[required()]);
///
/// let providers: Vec<Box<dyn Provider>> = vec![Box::new(EnvProvider::with_prefix("DECLCFG_DOC"))];
/// let err = registry.parse(providers).unwrap_err();
///
/// assert!(err.is_required());
/// assert_eq!(host.get(), "localhost");
/// assert_eq!(port.get(), 5432);
/// assert_eq!(user.get(), "");
/// ```
pub struct Registry {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    nodes: BTreeMap<String, Node>,
    aliases: HashMap<String, String>,
    locked: bool,
    /// Providers queued ahead of the ones handed to `parse`.
    providers: Vec<Box<dyn Provider>>,
}

impl State {
    /// Returns the node owning `key`, either as its name or as an alias.
    fn owner(&self, key: &str) -> Option<&Node> {
        self.nodes
            .get(key)
            .or_else(|| self.aliases.get(key).and_then(|name| self.nodes.get(name)))
    }

    fn awaited(&self) -> Awaited {
        let names = self.nodes.keys().map(|name| (name.clone(), true));
        let aliases = self.aliases.keys().map(|alias| (alias.clone(), false));
        names.chain(aliases).collect()
    }

    fn check(&self, node: &Node) -> ConfigResult<()> {
        if self.locked {
            return Err(ConfigError::RuntimeRegistration {
                key: node.name.clone(),
            });
        }

        if let Some(existing) = self.owner(&node.name) {
            return Err(ConfigError::DuplicateKey {
                key: node.name.clone(),
                origin: node.origin().to_string(),
                existing: existing.name.clone(),
                existing_origin: existing.origin().to_string(),
            });
        }

        let aliases = node.aliases();
        for (i, alias) in aliases.iter().enumerate() {
            let existing = if alias == &node.name || aliases[..i].contains(alias) {
                Some(node)
            } else {
                self.owner(alias)
            };

            if let Some(existing) = existing {
                return Err(ConfigError::CollidingAlias {
                    alias: alias.clone(),
                    key: node.name.clone(),
                    origin: node.origin().to_string(),
                    existing: existing.name.clone(),
                    existing_origin: existing.origin().to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Registry {
    /// Creates an empty registry with no queued providers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry whose parse consults `providers` first.
    pub fn with_providers<I>(providers: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Provider>>,
    {
        let registry = Self::new();
        registry.lock().providers.extend(providers);
        registry
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Declares an option and returns a handle to its value.
    ///
    /// Modifiers are applied in order before the option is inserted.
    ///
    /// # Panics
    ///
    /// Panics when `name` is empty, when the final name or one of the aliases
    /// is already taken, or when the registry has already been parsed.
    #[track_caller]
    pub fn register<T: Coerce>(
        &self,
        name: &str,
        default: T,
        description: &str,
        modifiers: &[Modifier],
    ) -> Handle<T> {
        if name.is_empty() {
            panic!("{}", ConfigError::invalid_value("option name must not be empty"));
        }

        let handle = Handle::new(default);
        let mut node = Node::new(name, description, Box::new(handle.clone()), Location::caller());
        for modifier in modifiers {
            modifier.apply(&mut node);
        }

        if let Err(err) = self.insert(node) {
            panic!("{err}");
        }

        handle
    }

    pub(crate) fn insert(&self, node: Node) -> ConfigResult<()> {
        let mut state = self.lock();
        state.check(&node)?;

        for alias in node.aliases() {
            state.aliases.insert(alias.clone(), node.name.clone());
        }
        trace!(key = %node.name, kind = node.type_name(), "registered option");
        state.nodes.insert(node.name.clone(), node);

        Ok(())
    }

    /// Resolves every registered option from the queued providers followed
    /// by `providers`.
    ///
    /// Providers are consulted in order and the first one to supply a key
    /// wins; options nobody supplies keep their defaults. Keys a provider
    /// reports as unknown are collected across all providers and returned
    /// together as [`ConfigError::UnknownFields`]; otherwise unset required
    /// options are returned as [`ConfigError::Required`].
    ///
    /// The registry is closed by the first call whatever its outcome. Later
    /// calls fail with [`ConfigError::DoubleParse`] without consulting any
    /// provider.
    pub fn parse<I>(&self, providers: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = Box<dyn Provider>>,
    {
        let (queue, awaited) = {
            let mut state = self.lock();
            if state.locked {
                return Err(ConfigError::DoubleParse);
            }
            state.locked = true;
            state.providers.extend(providers);
            (std::mem::take(&mut state.providers), state.awaited())
        };

        debug!(
            providers = queue.len(),
            keys = awaited.len(),
            "parsing configuration"
        );

        let mut unknown = UnknownFields::default();
        for provider in &queue {
            let label = provider.label();
            let provided = provider
                .provide(&awaited, render_value)
                .map_err(|err| ConfigError::provider(label.clone(), err))?;

            debug!(
                provider = %label,
                found = provided.found.len(),
                unknown = provided.unknown.len(),
                "provider finished"
            );

            self.apply(&label, provided.found)?;
            unknown.add(label, provided.unknown.into_keys());
        }

        if !unknown.is_empty() {
            warn!(%unknown, "configuration contains unknown keys");
            return Err(ConfigError::UnknownFields(unknown));
        }

        let missing: Vec<String> = self
            .lock()
            .nodes
            .values()
            .filter(|node| node.is_required() && node.set_by.is_none())
            .map(|node| node.name.clone())
            .collect();

        if !missing.is_empty() {
            warn!(keys = ?missing, "required options are not set");
            return Err(ConfigError::Required { keys: missing });
        }

        debug!("configuration parsed");
        Ok(())
    }

    fn apply(&self, label: &str, found: BTreeMap<String, String>) -> ConfigResult<()> {
        let mut state = self.lock();

        for (key, value) in found {
            let name = state.aliases.get(&key).cloned().unwrap_or(key);
            let node = state
                .nodes
                .get_mut(&name)
                .ok_or_else(|| ConfigError::NoSuchKey {
                    provider: label.to_string(),
                    key: name.clone(),
                })?;

            if let Some(writer) = &node.set_by {
                trace!(provider = label, key = %name, set_by = %writer, "skipping key already set");
                continue;
            }

            node.value
                .set(&value)
                .map_err(|source| ConfigError::Coerce {
                    provider: label.to_string(),
                    key: name.clone(),
                    value,
                    source,
                })?;
            node.set_by = Some(label.to_string());
            trace!(provider = label, key = %name, "applied key");
        }

        Ok(())
    }

    /// Renders every option as `name = value (description)`, sorted by name
    /// with aligned columns. Secret values are replaced by [`SECRET_MASK`].
    pub fn show(&self) -> String {
        let state = self.lock();

        let rows: Vec<(&str, String, &str)> = state
            .nodes
            .values()
            .map(|node| {
                let value = if node.is_secret() {
                    SECRET_MASK.to_string()
                } else {
                    node.render_value()
                };
                (node.name(), value, node.description())
            })
            .collect();

        let name_width = rows.iter().map(|(name, _, _)| name.chars().count()).max().unwrap_or(0);
        let value_width = rows.iter().map(|(_, value, _)| value.chars().count()).max().unwrap_or(0);

        rows.iter()
            .map(|(name, value, description)| {
                format!("{name:<name_width$} = {value:<value_width$} ({description})\n")
            })
            .collect()
    }

    /// Returns the label of the provider that set `key`, or `None` if the
    /// option still holds its default. Aliases are accepted.
    pub fn set_by(&self, key: &str) -> Option<String> {
        self.lock().owner(key).and_then(|node| node.set_by.clone())
    }

    /// Returns true if `key` is a registered name or alias.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().owner(key).is_some()
    }

    /// Returns the canonical name behind `key`.
    pub fn resolve(&self, key: &str) -> Option<String> {
        self.lock().owner(key).map(|node| node.name.clone())
    }

    /// Runs `f` against the node behind `key` (name or alias).
    ///
    /// `f` runs while the registry is locked and must not call back into the
    /// same registry; copy what is needed out of the node instead.
    ///
    /// ```
    /// use declcfg::{alias, Registry};
    ///
    /// let registry = Registry::new();
    /// registry.uint32("http.port", 80, "listen port", &[alias("p")]);
    ///
    /// let (kind, aliases) = registry
    ///     .with_node("p", |node| (node.type_name(), node.aliases().to_vec()))
    ///     .unwrap();
    /// assert_eq!(kind, "uint32");
    /// assert_eq!(aliases, ["p"]);
    /// ```
    pub fn with_node<R>(&self, key: &str, f: impl FnOnce(&Node) -> R) -> Option<R> {
        self.lock().owner(key).map(f)
    }

    /// Returns true once [`parse`](Registry::parse) has been called.
    pub fn is_parsed(&self) -> bool {
        self.lock().locked
    }

    /// Number of registered options.
    pub fn len(&self) -> usize {
        self.lock().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().nodes.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Registry")
            .field("nodes", &state.nodes.values().collect::<Vec<_>>())
            .field("aliases", &state.aliases)
            .field("locked", &state.locked)
            .field("providers", &state.providers.iter().map(|p| p.label()).collect::<Vec<_>>())
            .finish()
    }
}

macro_rules! typed_options {
    ($($(#[$doc:meta])* $method:ident => $ty:ty;)*) => {
        impl Registry {$(
            $(#[$doc])*
            #[track_caller]
            pub fn $method(
                &self,
                name: &str,
                default: $ty,
                description: &str,
                modifiers: &[Modifier],
            ) -> Handle<$ty> {
                self.register(name, default, description, modifiers)
            }
        )*}
    };
}

typed_options! {
    /// Registers an `isize` option.
    int => isize;
    /// Registers an `isize` list option.
    ints => Vec<isize>;
    int32 => i32;
    int64 => i64;
    /// Registers a `usize` option.
    uint => usize;
    uint32 => u32;
    uint64 => u64;
    float32 => f32;
    floats32 => Vec<f32>;
    float64 => f64;
    floats64 => Vec<f64>;
    bool => bool;
    bools => Vec<bool>;
    /// Registers a [`Duration`] option, written like `1h 30m` or `250ms`.
    duration => Duration;
    durations => Vec<Duration>;
    /// Registers a JSON object option. Setting it replaces the whole map.
    map => BTreeMap<String, ConfigValue>;
}

impl Registry {
    /// Registers a string option.
    #[track_caller]
    pub fn string(
        &self,
        name: &str,
        default: impl Into<String>,
        description: &str,
        modifiers: &[Modifier],
    ) -> Handle<String> {
        self.register(name, default.into(), description, modifiers)
    }

    /// Registers a string list option.
    #[track_caller]
    pub fn strings(
        &self,
        name: &str,
        default: &[&str],
        description: &str,
        modifiers: &[Modifier],
    ) -> Handle<Vec<String>> {
        let default = default.iter().map(|s| s.to_string()).collect();
        self.register(name, default, description, modifiers)
    }

    /// Registers an IP address option. An empty default leaves it unset.
    ///
    /// # Panics
    ///
    /// Panics if `default` is neither empty nor a valid address.
    #[track_caller]
    pub fn ip(
        &self,
        name: &str,
        default: &str,
        description: &str,
        modifiers: &[Modifier],
    ) -> Handle<Option<IpAddr>> {
        let default = match <Option<IpAddr>>::coerce(default) {
            Ok(ip) => ip,
            Err(err) => panic!(
                "{}",
                ConfigError::invalid_value(format!("key={name:?}: default: {err}"))
            ),
        };
        self.register(name, default, description, modifiers)
    }
}
