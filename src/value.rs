//! Structured configuration values and the canonical string rendering.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A structured configuration value.
///
/// File sources decode into trees of `ConfigValue`, and map options hold
/// `ConfigValue` entries. Objects keep their keys sorted so rendering is stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// String value
    String(String),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Array of values
    Array(Vec<ConfigValue>),
    /// Object/map of key-value pairs
    Object(BTreeMap<String, ConfigValue>),
    /// Null value
    Null,
}

/// Function used by providers to turn a source value into the string form
/// accepted by option coercion.
pub type Renderer = fn(&ConfigValue) -> String;

impl ConfigValue {
    /// Returns the value as a string reference if it's a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an i64 if it's an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as an f64 if it's a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the value as an object reference if it's an object.
    pub fn as_object(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            ConfigValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Checks if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// Renders the value in the string form option coercion accepts.
    ///
    /// Scalars render bare (strings without quotes), null renders empty, and
    /// arrays and objects render as compact JSON so list and map options can
    /// decode them.
    ///
    /// # Example
    /// ```
    /// use declcfg::ConfigValue;
    ///
    /// assert_eq!(ConfigValue::from("localhost").render(), "localhost");
    /// assert_eq!(ConfigValue::from(5432i64).render(), "5432");
    /// assert_eq!(
    ///     ConfigValue::Array(vec![1i64.into(), 2i64.into()]).render(),
    ///     "[1,2]"
    /// );
    /// ```
    pub fn render(&self) -> String {
        match self {
            ConfigValue::String(s) => s.clone(),
            ConfigValue::Integer(i) => i.to_string(),
            ConfigValue::Float(f) => f.to_string(),
            ConfigValue::Boolean(b) => b.to_string(),
            ConfigValue::Null => String::new(),
            ConfigValue::Array(_) | ConfigValue::Object(_) => self.to_json().to_string(),
        }
    }

    /// Converts the value to JSON for rendering.
    ///
    /// Non-finite floats have no JSON number form and become strings such as
    /// `"inf"`, which float options accept.
    pub(crate) fn to_json(&self) -> serde_json::Value {
        match self {
            ConfigValue::String(s) => serde_json::Value::String(s.clone()),
            ConfigValue::Integer(i) => serde_json::Value::from(*i),
            ConfigValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(f.to_string())),
            ConfigValue::Boolean(b) => serde_json::Value::Bool(*b),
            ConfigValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(ConfigValue::to_json).collect())
            }
            ConfigValue::Object(obj) => serde_json::Value::Object(
                obj.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            ConfigValue::Null => serde_json::Value::Null,
        }
    }
}

/// The canonical [`Renderer`] handed to every provider during parse.
pub fn render_value(value: &ConfigValue) -> String {
    value.render()
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Integer(i)
    }
}

impl From<f64> for ConfigValue {
    fn from(f: f64) -> Self {
        ConfigValue::Float(f)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Boolean(b)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(arr: Vec<ConfigValue>) -> Self {
        ConfigValue::Array(arr)
    }
}

impl From<BTreeMap<String, ConfigValue>> for ConfigValue {
    fn from(obj: BTreeMap<String, ConfigValue>) -> Self {
        ConfigValue::Object(obj)
    }
}

impl From<Option<ConfigValue>> for ConfigValue {
    fn from(opt: Option<ConfigValue>) -> Self {
        opt.unwrap_or(ConfigValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_value_creation() {
        let string_val = ConfigValue::from("test");
        assert_eq!(string_val.as_str(), Some("test"));

        let int_val = ConfigValue::from(42i64);
        assert_eq!(int_val.as_i64(), Some(42));
        assert_eq!(int_val.as_f64(), Some(42.0));

        let bool_val = ConfigValue::from(true);
        assert_eq!(bool_val, ConfigValue::Boolean(true));

        assert!(ConfigValue::from(None::<ConfigValue>).is_null());
    }

    #[test]
    fn test_render_scalars() {
        assert_eq!(ConfigValue::String("hello".to_string()).render(), "hello");
        assert_eq!(ConfigValue::Integer(-42).render(), "-42");
        assert_eq!(ConfigValue::Float(3.5).render(), "3.5");
        assert_eq!(ConfigValue::Boolean(false).render(), "false");
        assert_eq!(ConfigValue::Null.render(), "");
    }

    #[test]
    fn test_render_structures_as_json() {
        let array = ConfigValue::Array(vec![
            ConfigValue::from("a"),
            ConfigValue::from(1i64),
            ConfigValue::from(true),
        ]);
        assert_eq!(array.render(), r#"["a",1,true]"#);

        let mut obj = BTreeMap::new();
        obj.insert("z".to_string(), ConfigValue::from(1i64));
        obj.insert("a".to_string(), ConfigValue::from("x"));
        assert_eq!(ConfigValue::Object(obj).render(), r#"{"a":"x","z":1}"#);
    }

    #[test]
    fn test_render_value_matches_render() {
        let value = ConfigValue::from(2.25f64);
        assert_eq!(render_value(&value), value.render());
    }

    #[test]
    fn test_render_non_finite_floats() {
        assert_eq!(ConfigValue::Float(f64::INFINITY).render(), "inf");

        let array = ConfigValue::Array(vec![
            ConfigValue::Float(f64::INFINITY),
            ConfigValue::Float(f64::NEG_INFINITY),
            ConfigValue::Float(f64::NAN),
            ConfigValue::Float(1.5),
        ]);
        assert_eq!(array.render(), r#"["inf","-inf","NaN",1.5]"#);

        let mut obj = BTreeMap::new();
        obj.insert("limit".to_string(), ConfigValue::Float(f64::INFINITY));
        obj.insert("none".to_string(), ConfigValue::Null);
        assert_eq!(
            ConfigValue::Object(obj).render(),
            r#"{"limit":"inf","none":null}"#
        );
    }

    #[test]
    fn test_serde_deserialization() {
        let deserialized: ConfigValue = serde_json::from_str("\"test\"").unwrap();
        assert_eq!(deserialized, ConfigValue::String("test".to_string()));

        let deserialized: ConfigValue = serde_json::from_str("42").unwrap();
        assert_eq!(deserialized, ConfigValue::Integer(42));

        let deserialized: ConfigValue = serde_json::from_str("3.14").unwrap();
        assert_eq!(deserialized, ConfigValue::Float(3.14));

        let deserialized: ConfigValue = serde_json::from_str("null").unwrap();
        assert_eq!(deserialized, ConfigValue::Null);

        let deserialized: ConfigValue = serde_json::from_str("{\"key\": [1, 2]}").unwrap();
        assert!(matches!(deserialized, ConfigValue::Object(_)));
    }
}
