//! Built-in configuration sources.

pub mod env;
pub mod file;
pub mod flag;

pub use env::EnvProvider;
pub use file::FileProvider;
pub use flag::FlagProvider;
