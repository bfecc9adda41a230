//! Integration tests for declcfg
//!
//! These tests resolve options from real sources (flags, environment
//! variables and files on disk) to check that they work together in
//! priority order.

use declcfg::{
    alias, group, required, secret, ConfigError, EnvProvider, FileProvider, FlagProvider, Group,
    Provider, Registry,
};
use std::env;
use std::fs;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

/// Test helper to create a temporary configuration file
fn create_temp_config_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let config_path = dir.path().join(name);
    fs::write(&config_path, content).expect("Failed to write test config file");
    config_path
}

/// Test helper to set environment variables and clean them up
struct EnvVarGuard {
    vars: Vec<String>,
}

impl EnvVarGuard {
    fn new() -> Self {
        Self { vars: Vec::new() }
    }

    fn set(&mut self, key: &str, value: &str) {
        env::set_var(key, value);
        self.vars.push(key.to_string());
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for var in &self.vars {
            env::remove_var(var);
        }
    }
}

#[test]
fn test_multi_source_precedence() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let mut env_guard = EnvVarGuard::new();

    let config_path = create_temp_config_file(
        &temp_dir,
        "config.yaml",
        r#"
database:
  host: file-host
  port: 5432
  pool: 10
app:
  name: from-file
  debug: false
"#,
    );

    env_guard.set("PRECEDENCE_DATABASE_HOST", "env-host");
    env_guard.set("PRECEDENCE_APP_DEBUG", "true");

    let registry = Registry::new();
    let host = registry.string("database.host", "default-host", "db host", &[]);
    let port = registry.int("database.port", 1, "db port", &[alias("p")]);
    let pool = registry.uint32("database.pool", 4, "db pool size", &[]);
    let name = registry.string("app.name", "default-name", "app name", &[]);
    let debug = registry.bool("app.debug", false, "debug mode", &[]);
    let workers = registry.int("app.workers", 2, "workers", &[]);

    let providers: Vec<Box<dyn Provider>> = vec![
        Box::new(FlagProvider::new(["-p", "6543"])),
        Box::new(EnvProvider::with_prefix("PRECEDENCE")),
        Box::new(FileProvider::new(&config_path)),
    ];
    registry.parse(providers).expect("parse should succeed");

    // flags beat env beat file beat defaults
    assert_eq!(port.get(), 6543);
    assert_eq!(host.get(), "env-host");
    assert!(debug.get());
    assert_eq!(pool.get(), 10);
    assert_eq!(name.get(), "from-file");
    assert_eq!(workers.get(), 2);

    let file_label = format!("yaml:{}", config_path.display());
    assert_eq!(registry.set_by("database.port").as_deref(), Some("flag"));
    assert_eq!(registry.set_by("database.host").as_deref(), Some("env"));
    assert_eq!(registry.set_by("database.pool").as_deref(), Some(file_label.as_str()));
    assert_eq!(registry.set_by("app.workers"), None);
}

#[test]
fn test_file_path_chosen_by_flag() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = create_temp_config_file(
        &temp_dir,
        "service.toml",
        r#"
[server]
bind = "10.0.0.1"
timeout = "1m 30s"
tags = ["a", "b"]

[server.limits]
rps = 250.5
"#,
    );

    let registry = Registry::new();
    let path = registry.string("config", "", "path to the config file", &[alias("c")]);
    let bind = registry.ip("server.bind", "", "bind address", &[]);
    let timeout = registry.duration("server.timeout", Duration::from_secs(10), "timeout", &[]);
    let tags = registry.strings("server.tags", &[], "tags", &[]);
    let rps = registry.float64("server.limits.rps", 100.0, "rate limit", &[]);

    let args = ["-c".to_string(), config_path.display().to_string()];
    let providers: Vec<Box<dyn Provider>> = vec![
        Box::new(FlagProvider::new(args)),
        Box::new(FileProvider::from_option(&path)),
    ];
    registry.parse(providers).expect("parse should succeed");

    assert_eq!(path.get(), config_path.display().to_string());
    assert_eq!(bind.get(), Some("10.0.0.1".parse::<IpAddr>().unwrap()));
    assert_eq!(timeout.get(), Duration::from_secs(90));
    assert_eq!(tags.get(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(rps.get(), 250.5);
    assert!(registry
        .set_by("server.bind")
        .unwrap()
        .starts_with("toml:"));
}

#[test]
fn test_no_config_file_keeps_defaults() {
    let registry = Registry::new();
    let path = registry.string("config", "", "path to the config file", &[]);
    let level = registry.string("log.level", "info", "log level", &[]);

    let providers: Vec<Box<dyn Provider>> = vec![Box::new(FileProvider::from_option(&path))];
    registry.parse(providers).expect("parse should succeed");

    assert_eq!(level.get(), "info");
    assert_eq!(registry.set_by("log.level"), None);
}

#[test]
fn test_unknown_keys_across_sources() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = create_temp_config_file(
        &temp_dir,
        "app.json",
        r#"{"db": {"host": "h", "hots": "typo"}, "stale": 1}"#,
    );

    let registry = Registry::new();
    let host = registry.string("db.host", "", "db host", &[]);

    let providers: Vec<Box<dyn Provider>> = vec![
        Box::new(FlagProvider::new(["--verbose"])),
        Box::new(FileProvider::new(&config_path)),
    ];
    let err = registry.parse(providers).unwrap_err();

    let unknown = err.unknown_fields().expect("unknown fields error");
    assert_eq!(unknown.get("flag"), Some(&vec!["verbose".to_string()]));
    assert_eq!(
        unknown.get(&format!("json:{}", config_path.display())),
        Some(&vec!["db.hots".to_string(), "stale".to_string()])
    );
    assert_eq!(unknown.iter().count(), 2);

    // known keys were still applied
    assert_eq!(host.get(), "h");
}

#[test]
fn test_malformed_file_aborts_parse() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = create_temp_config_file(&temp_dir, "broken.yaml", "key: [unclosed\n");

    let registry = Registry::new();
    registry.string("key", "", "", &[]);

    let providers: Vec<Box<dyn Provider>> = vec![Box::new(FileProvider::new(&config_path))];
    let err = registry.parse(providers).unwrap_err();

    match err {
        ConfigError::Provider { provider, source } => {
            assert!(provider.starts_with("yaml:"));
            assert!(source.is_parse_error());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_wrong_type_in_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = create_temp_config_file(&temp_dir, "bad.yaml", "port: eighty\n");

    let registry = Registry::new();
    let port = registry.uint32("port", 80, "port", &[]);

    let providers: Vec<Box<dyn Provider>> = vec![Box::new(FileProvider::new(&config_path))];
    let err = registry.parse(providers).unwrap_err();

    assert!(err.is_coerce());
    let message = err.to_string();
    assert!(message.contains("port"), "{message}");
    assert!(message.contains("eighty"), "{message}");
    assert!(message.contains("bad.yaml"), "{message}");
    assert_eq!(port.get(), 80);
}

#[test]
fn test_required_and_secret_options() {
    let mut env_guard = EnvVarGuard::new();
    env_guard.set("SECRETS_DB_PASSWORD", "hunter2");

    let credentials = Group::new("db", [secret(), required()]);

    let registry = Registry::new();
    let password = registry.string("password", "", "db password", &[group(&credentials)]);
    let user = registry.string("user", "", "db user", &[group(&credentials)]);

    let providers: Vec<Box<dyn Provider>> = vec![Box::new(EnvProvider::with_prefix("SECRETS"))];
    let err = registry.parse(providers).unwrap_err();

    match err {
        ConfigError::Required { keys } => assert_eq!(keys, ["db.user"]),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(password.get(), "hunter2");
    assert_eq!(user.get(), "");

    let dump = registry.show();
    assert!(!dump.contains("hunter2"));
    assert!(dump.contains("db.password = <secret> (db password)"));
}

#[test]
fn test_lists_and_maps_from_flags_and_files() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = create_temp_config_file(
        &temp_dir,
        "lists.json",
        r#"{"ports": [80, 443], "labels": {"team": "core", "tier": 1}, "ratios": [0.5, 1.5]}"#,
    );

    let registry = Registry::new();
    let ports = registry.ints("ports", vec![8080], "ports", &[]);
    let labels = registry.map("labels", Default::default(), "labels", &[]);
    let ratios = registry.floats64("ratios", vec![], "ratios", &[]);
    let flags = registry.bools("flags", vec![], "flags", &[]);

    let providers: Vec<Box<dyn Provider>> = vec![
        Box::new(FlagProvider::new(["--flags", "[true,false,true]"])),
        Box::new(FileProvider::new(&config_path)),
    ];
    registry.parse(providers).expect("parse should succeed");

    assert_eq!(ports.get(), vec![80, 443]);
    assert_eq!(ratios.get(), vec![0.5, 1.5]);
    assert_eq!(flags.get(), vec![true, false, true]);

    let labels = labels.get();
    assert_eq!(labels["team"].as_str(), Some("core"));
    assert_eq!(labels["tier"].as_i64(), Some(1));
}
