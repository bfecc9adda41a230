//! # declcfg
//!
//! Declare typed configuration options where they are used, resolve them all
//! at once from the command line, the environment and configuration files.
//!
//! Options are registered with a name, a default and a description, and the
//! registration hands back a [`Handle`] to the live value. A single call to
//! [`Registry::parse`] then asks every [`Provider`] in turn for values:
//!
//! 1. Providers are consulted in order and the **first** one to supply a
//!    key wins. Later providers never override it.
//! 2. Options nobody supplies keep their declared default.
//! 3. Keys a provider has that no option claims are collected and reported
//!    together as [`ConfigError::UnknownFields`].
//! 4. Options marked [`required()`] that are still unset fail the parse.
//!
//! ## Quick Start
//!
//! ```rust
//! use declcfg::{alias, group, required, secret, EnvProvider, FlagProvider, Group, Provider, Registry};
//! use std::time::Duration;
//!
//! let registry = Registry::new();
//! let db = Group::new("db", []);
//!
//! let host = registry.string("host", "localhost", "database host", &[group(&db), alias("H")]);
//! let password = registry.string("password", "", "database password", &[group(&db), secret(), required()]);
//! let timeout = registry.duration("timeout", Duration::from_secs(5), "request timeout", &[]);
//!
//! let providers: Vec<Box<dyn Provider>> = vec![
//!     Box::new(FlagProvider::new(["-H", "db.internal", "--db.password", "hunter2"])),
//!     Box::new(EnvProvider::with_prefix("QUICKSTART")),
//! ];
//! registry.parse(providers).unwrap();
//!
//! assert_eq!(host.get(), "db.internal");
//! assert_eq!(password.get(), "hunter2");
//! assert_eq!(timeout.get(), Duration::from_secs(5));
//! assert_eq!(registry.set_by("db.host").as_deref(), Some("flag"));
//!
//! let dump = registry.show();
//! assert!(dump.contains("db.password = <secret>"));
//! assert!(dump.contains("timeout     = 5s"));
//! ```
//!
//! ## Process-wide registry
//!
//! [`global()`] returns a registry shared by the whole process whose first
//! provider is the process's own command line. The free functions
//! ([`register`], [`int`], [`string`], ..., [`parse`], [`show`]) operate on
//! it, so libraries can declare their options without threading a registry
//! through.
//!
//! ## Sources
//!
//! - [`FlagProvider`]: `-name value`, `--name value`, `--name=value`
//! - [`EnvProvider`]: `db.host` is read from `DB_HOST`, optionally prefixed
//! - [`FileProvider`]: JSON, YAML, TOML and INI files
//! - `cli::ClapProvider` (feature `cli`): arguments parsed by clap
//!
//! Any other source only has to implement [`Provider`].

pub mod coerce;
pub mod error;
pub mod global;
pub mod group;
pub mod handle;
pub mod node;
pub mod parser;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export main types for convenience
pub use coerce::{Coerce, CoerceError, Element};
pub use error::{ConfigError, ConfigResult, UnknownFields};
pub use global::{
    bool, bools, duration, durations, float32, float64, floats32, floats64, global, int, int32,
    int64, ints, ip, map, parse, register, show, string, strings, uint, uint32, uint64,
};
pub use group::Group;
pub use handle::Handle;
pub use node::{alias, group, required, secret, Modifier, Node};
pub use provider::{Awaited, Provided, Provider};
pub use providers::{EnvProvider, FileProvider, FlagProvider};
pub use registry::{Registry, SECRET_MASK};
pub use value::{render_value, ConfigValue, Renderer};

#[cfg(feature = "cli")]
pub use cli::ClapProvider;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
