//! Configuration file decoders.
//!
//! Each supported format implements [`ConfigParser`] and decodes a document
//! into a tree of [`ConfigValue`]s keyed by the document's top-level names.
//!
//! ## Supported Formats
//!
//! - **JSON** (`.json`)
//! - **YAML** (`.yaml`, `.yml`)
//! - **TOML** (`.toml`)
//! - **INI** (`.ini`), sections become nested objects and values stay text
//!
//! ```rust
//! use declcfg::parser::detect_parser_by_extension;
//!
//! let parser = detect_parser_by_extension("yml").unwrap();
//! let parsed = parser.parse("db:\n  port: 5432\n").unwrap();
//!
//! let db = parsed["db"].as_object().unwrap();
//! assert_eq!(db["port"].as_i64(), Some(5432));
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::value::ConfigValue;
use std::collections::BTreeMap;

/// Decoder for one configuration file format.
pub trait ConfigParser: Send + Sync {
    /// Decodes `content` into its top-level keys.
    ///
    /// # Errors
    /// * `ConfigError::Parse` - If the content is malformed or its root is not
    ///   a mapping
    fn parse(&self, content: &str) -> ConfigResult<BTreeMap<String, ConfigValue>>;

    /// File extensions handled by this parser, without the dot.
    fn supported_extensions(&self) -> &[&str];

    /// Short format name used in error messages.
    fn name(&self) -> &str;
}

/// Returns the parser for a file extension (case-insensitive).
///
/// # Errors
/// * `ConfigError::UnsupportedFormat` - If the extension is not supported
///
/// # Example
/// ```rust
/// use declcfg::parser::detect_parser_by_extension;
///
/// assert_eq!(detect_parser_by_extension("JSON").unwrap().name(), "JSON");
/// assert_eq!(detect_parser_by_extension("yml").unwrap().name(), "YAML");
/// assert!(detect_parser_by_extension("xml").is_err());
/// ```
pub fn detect_parser_by_extension(extension: &str) -> ConfigResult<Box<dyn ConfigParser>> {
    let extension = extension.to_lowercase();
    let parsers: Vec<Box<dyn ConfigParser>> = vec![
        Box::new(JsonParser),
        Box::new(YamlParser),
        Box::new(TomlParser),
        Box::new(IniParser),
    ];

    parsers
        .into_iter()
        .find(|parser| parser.supported_extensions().contains(&extension.as_str()))
        .ok_or(ConfigError::UnsupportedFormat)
}

/// JSON configuration parser.
pub struct JsonParser;

impl ConfigParser for JsonParser {
    fn parse(&self, content: &str) -> ConfigResult<BTreeMap<String, ConfigValue>> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| ConfigError::parse_error("JSON", e.to_string()))?;

        match json_to_config_value(value) {
            ConfigValue::Object(map) => Ok(map),
            _ => Err(ConfigError::parse_error("JSON", "Root must be an object")),
        }
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn name(&self) -> &str {
        "JSON"
    }
}

/// YAML configuration parser.
///
/// An empty document decodes to an empty mapping.
pub struct YamlParser;

impl ConfigParser for YamlParser {
    fn parse(&self, content: &str) -> ConfigResult<BTreeMap<String, ConfigValue>> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::parse_error("YAML", e.to_string()))?;

        match yaml_to_config_value(value) {
            ConfigValue::Object(map) => Ok(map),
            ConfigValue::Null => Ok(BTreeMap::new()),
            _ => Err(ConfigError::parse_error(
                "YAML",
                "Root must be a mapping/object",
            )),
        }
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }

    fn name(&self) -> &str {
        "YAML"
    }
}

/// TOML configuration parser.
///
/// Datetimes are kept as their textual form.
pub struct TomlParser;

impl ConfigParser for TomlParser {
    fn parse(&self, content: &str) -> ConfigResult<BTreeMap<String, ConfigValue>> {
        let table: toml::Table =
            toml::from_str(content).map_err(|e| ConfigError::parse_error("TOML", e.to_string()))?;

        Ok(table
            .into_iter()
            .map(|(k, v)| (k, toml_to_config_value(v)))
            .collect())
    }

    fn supported_extensions(&self) -> &[&str] {
        &["toml"]
    }

    fn name(&self) -> &str {
        "TOML"
    }
}

/// INI configuration parser.
///
/// Keys before the first `[section]` are top-level; each section becomes an
/// object. Lines starting with `#` or `;` are comments. Values are not typed:
/// option coercion decides how to read them.
///
/// # Example
/// ```rust
/// use declcfg::parser::{ConfigParser, IniParser};
///
/// let parsed = IniParser.parse("debug = true\n\n[db]\nhost = \"localhost\"\n").unwrap();
/// assert_eq!(parsed["debug"].as_str(), Some("true"));
/// assert_eq!(parsed["db"].as_object().unwrap()["host"].as_str(), Some("localhost"));
/// ```
pub struct IniParser;

impl ConfigParser for IniParser {
    fn parse(&self, content: &str) -> ConfigResult<BTreeMap<String, ConfigValue>> {
        parse_ini_content(content)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["ini"]
    }

    fn name(&self) -> &str {
        "INI"
    }
}

fn parse_ini_content(content: &str) -> ConfigResult<BTreeMap<String, ConfigValue>> {
    let mut result = BTreeMap::new();
    let mut current_section: Option<(String, BTreeMap<String, ConfigValue>)> = None;

    for (number, line) in content.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            if let Some((name, data)) = current_section.take() {
                result.insert(name, ConfigValue::Object(data));
            }

            let name = line[1..line.len() - 1].trim().to_string();
            if name.is_empty() {
                return Err(ConfigError::parse_error(
                    "INI",
                    format!("line {}: empty section name", number + 1),
                ));
            }
            current_section = Some((name, BTreeMap::new()));
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(ConfigError::parse_error(
                "INI",
                format!("line {}: invalid line format: {line}", number + 1),
            ));
        };

        let key = key.trim().to_string();
        if key.is_empty() {
            return Err(ConfigError::parse_error(
                "INI",
                format!("line {}: empty key name", number + 1),
            ));
        }

        let value = ConfigValue::String(unquote(value.trim()).to_string());
        match current_section.as_mut() {
            Some((_, data)) => data.insert(key, value),
            None => result.insert(key, value),
        };
    }

    if let Some((name, data)) = current_section {
        result.insert(name, ConfigValue::Object(data));
    }

    Ok(result)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn json_to_config_value(value: serde_json::Value) -> ConfigValue {
    match value {
        serde_json::Value::String(s) => ConfigValue::String(s),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                ConfigValue::Integer(i)
            } else if n.is_u64() {
                // beyond i64, keep the digits so uint64 options still parse
                ConfigValue::String(n.to_string())
            } else if let Some(f) = n.as_f64() {
                ConfigValue::Float(f)
            } else {
                ConfigValue::Null
            }
        }
        serde_json::Value::Bool(b) => ConfigValue::Boolean(b),
        serde_json::Value::Array(arr) => {
            ConfigValue::Array(arr.into_iter().map(json_to_config_value).collect())
        }
        serde_json::Value::Object(obj) => ConfigValue::Object(
            obj.into_iter()
                .map(|(k, v)| (k, json_to_config_value(v)))
                .collect(),
        ),
        serde_json::Value::Null => ConfigValue::Null,
    }
}

fn yaml_to_config_value(value: serde_yaml::Value) -> ConfigValue {
    match value {
        serde_yaml::Value::String(s) => ConfigValue::String(s),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                ConfigValue::Integer(i)
            } else if n.is_u64() {
                ConfigValue::String(n.to_string())
            } else if let Some(f) = n.as_f64() {
                ConfigValue::Float(f)
            } else {
                ConfigValue::Null
            }
        }
        serde_yaml::Value::Bool(b) => ConfigValue::Boolean(b),
        serde_yaml::Value::Sequence(arr) => {
            ConfigValue::Array(arr.into_iter().map(yaml_to_config_value).collect())
        }
        serde_yaml::Value::Mapping(map) => ConfigValue::Object(
            map.into_iter()
                .map(|(k, v)| (yaml_key_to_string(k), yaml_to_config_value(v)))
                .collect(),
        ),
        serde_yaml::Value::Null => ConfigValue::Null,
        serde_yaml::Value::Tagged(tagged) => yaml_to_config_value(tagged.value),
    }
}

fn yaml_key_to_string(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => format!("{other:?}"),
    }
}

fn toml_to_config_value(value: toml::Value) -> ConfigValue {
    match value {
        toml::Value::String(s) => ConfigValue::String(s),
        toml::Value::Integer(i) => ConfigValue::Integer(i),
        toml::Value::Float(f) => ConfigValue::Float(f),
        toml::Value::Boolean(b) => ConfigValue::Boolean(b),
        toml::Value::Array(arr) => {
            ConfigValue::Array(arr.into_iter().map(toml_to_config_value).collect())
        }
        toml::Value::Table(table) => ConfigValue::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_config_value(v)))
                .collect(),
        ),
        toml::Value::Datetime(dt) => ConfigValue::String(dt.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_detection() {
        assert!(detect_parser_by_extension("json").is_ok());
        assert!(detect_parser_by_extension("yaml").is_ok());
        assert!(detect_parser_by_extension("YML").is_ok());
        assert!(detect_parser_by_extension("toml").is_ok());
        assert!(detect_parser_by_extension("ini").is_ok());
        assert!(matches!(
            detect_parser_by_extension("unknown"),
            Err(ConfigError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_supported_extensions() {
        assert_eq!(JsonParser.supported_extensions(), &["json"]);
        assert_eq!(YamlParser.supported_extensions(), &["yaml", "yml"]);
        assert_eq!(TomlParser.name(), "TOML");
        assert_eq!(IniParser.name(), "INI");
    }

    #[test]
    fn test_json_parser_nested_object() {
        let json_content = r#"
        {
            "database": {
                "host": "localhost",
                "port": 5432,
                "ratio": 0.5,
                "credentials": {"username": "admin"}
            },
            "features": ["auth", "logging"],
            "debug": true,
            "nothing": null
        }
        "#;

        let result = JsonParser.parse(json_content).unwrap();

        let database = result["database"].as_object().expect("database object");
        assert_eq!(database["host"], ConfigValue::from("localhost"));
        assert_eq!(database["port"], ConfigValue::Integer(5432));
        assert_eq!(database["ratio"], ConfigValue::Float(0.5));
        let credentials = database["credentials"].as_object().expect("credentials object");
        assert_eq!(credentials["username"], ConfigValue::from("admin"));

        assert_eq!(
            result["features"],
            ConfigValue::Array(vec!["auth".into(), "logging".into()])
        );
        assert_eq!(result["debug"], ConfigValue::Boolean(true));
        assert!(result["nothing"].is_null());
    }

    #[test]
    fn test_json_parser_invalid_syntax() {
        let result = JsonParser.parse(r#"{"key": "value", "invalid": }"#);

        match result {
            Err(ConfigError::Parse {
                source_name,
                message,
            }) => {
                assert_eq!(source_name, "JSON");
                assert!(message.contains("expected value"));
            }
            other => panic!("Expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_json_parser_non_object_root() {
        let err = JsonParser.parse(r#"["item1", "item2"]"#).unwrap_err();
        assert_eq!(err.to_string(), "Parse error in JSON: Root must be an object");
    }

    #[test]
    fn test_large_unsigned_numbers_keep_digits() {
        let result = JsonParser.parse(r#"{"max": 18446744073709551615}"#).unwrap();
        assert_eq!(result["max"], ConfigValue::from("18446744073709551615"));

        let result = YamlParser.parse("max: 18446744073709551615\n").unwrap();
        assert_eq!(result["max"], ConfigValue::from("18446744073709551615"));
    }

    #[test]
    fn test_yaml_parser_nested_object() {
        let yaml_content = r#"
server:
  host: 0.0.0.0
  ports: [80, 443]
  tls:
    enabled: yes
    cert: "/etc/cert.pem"
timeout: 1m
1: numeric key
"#;

        let result = YamlParser.parse(yaml_content).unwrap();

        let server = result["server"].as_object().expect("server object");
        assert_eq!(server["host"], ConfigValue::from("0.0.0.0"));
        assert_eq!(
            server["ports"],
            ConfigValue::Array(vec![80i64.into(), 443i64.into()])
        );
        // YAML 1.2: `yes` is a plain string
        let tls = server["tls"].as_object().expect("tls object");
        assert_eq!(tls["enabled"], ConfigValue::from("yes"));
        assert_eq!(tls["cert"], ConfigValue::from("/etc/cert.pem"));

        assert_eq!(result["timeout"], ConfigValue::from("1m"));
        assert_eq!(result["1"], ConfigValue::from("numeric key"));
    }

    #[test]
    fn test_yaml_parser_empty_document() {
        assert!(YamlParser.parse("").unwrap().is_empty());
        assert!(YamlParser.parse("# only a comment\n").unwrap().is_empty());
    }

    #[test]
    fn test_yaml_parser_errors() {
        let err = YamlParser.parse("- a\n- b\n").unwrap_err();
        assert!(err.is_parse_error());

        let err = YamlParser.parse("key: [unclosed\n").unwrap_err();
        match err {
            ConfigError::Parse { source_name, .. } => assert_eq!(source_name, "YAML"),
            other => panic!("Expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_toml_parser_tables() {
        let toml_content = r#"
title = "app"
created = 1979-05-27T07:32:00Z

[database]
port = 5432
replicas = ["a", "b"]

[[servers]]
name = "web1"
"#;

        let result = TomlParser.parse(toml_content).unwrap();

        assert_eq!(result["title"], ConfigValue::from("app"));
        assert_eq!(result["created"], ConfigValue::from("1979-05-27T07:32:00Z"));
        let database = result["database"].as_object().expect("database table");
        assert_eq!(database["port"], ConfigValue::Integer(5432));
        assert_eq!(
            database["replicas"],
            ConfigValue::Array(vec!["a".into(), "b".into()])
        );
        assert!(matches!(&result["servers"], ConfigValue::Array(servers) if servers.len() == 1));
    }

    #[test]
    fn test_toml_parser_invalid_syntax() {
        let err = TomlParser.parse("key = = value").unwrap_err();
        assert!(err.to_string().starts_with("Parse error in TOML"));
    }

    #[test]
    fn test_ini_parser_sections() {
        let ini_content = r#"
; global settings
app_name = My App
debug = true

[database]
host = localhost
port = 5432
password = 'p=ss'

# empty sections are kept
[cache]
"#;

        let result = IniParser.parse(ini_content).unwrap();

        assert_eq!(result["app_name"], ConfigValue::from("My App"));
        assert_eq!(result["debug"], ConfigValue::from("true"));

        let database = result["database"].as_object().expect("database section");
        assert_eq!(database["host"], ConfigValue::from("localhost"));
        assert_eq!(database["port"], ConfigValue::from("5432"));
        assert_eq!(database["password"], ConfigValue::from("p=ss"));

        assert_eq!(result["cache"], ConfigValue::Object(BTreeMap::new()));
    }

    #[test]
    fn test_ini_parser_invalid_syntax() {
        let err = IniParser.parse("valid = 1\nnot a pair\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parse error in INI: line 2: invalid line format: not a pair"
        );

        assert!(IniParser.parse("[ ]\n").is_err());
        assert!(IniParser.parse(" = value\n").is_err());
    }

    #[test]
    fn test_ini_parser_empty_file() {
        assert!(IniParser.parse("").unwrap().is_empty());
    }
}
