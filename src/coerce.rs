//! Conversion between typed option values and their string wire form.
//!
//! Every option type implements [`Coerce`]: `coerce` parses the string a
//! provider supplied, `render` produces the canonical string that `coerce`
//! accepts back. Each type owns its own rules:
//!
//! | Type | Accepted input | Rendered as |
//! |------|----------------|-------------|
//! | integers | decimal, `0x`/`0o`/`0b` prefixes, `_` separators | decimal |
//! | floats | Rust float syntax | shortest round-trip form |
//! | `bool` | `""`, `true`, `1`, `yes` / `false`, `0`, `no` (any case) | `true` / `false` |
//! | `String` | anything | itself |
//! | `Duration` | `1h 30m`, `250ms`, `2days` | `1h 30m` |
//! | `IpAddr` | IPv4 or IPv6 text (`Option<IpAddr>` also accepts `""`) | standard text form |
//! | maps | JSON object | compact JSON |
//! | `Vec<T>` | JSON array | compact JSON |
//!
//! # Custom types
//!
//! ```
//! use declcfg::{Coerce, CoerceError, Registry};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Level {
//!     Low,
//!     High,
//! }
//!
//! impl Coerce for Level {
//!     const TYPE_NAME: &'static str = "level";
//!
//!     fn coerce(raw: &str) -> Result<Self, CoerceError> {
//!         match raw {
//!             "low" => Ok(Level::Low),
//!             "high" => Ok(Level::High),
//!             _ => Err(CoerceError::new(Self::TYPE_NAME, raw, "expected low or high")),
//!         }
//!     }
//!
//!     fn render(&self) -> String {
//!         match self {
//!             Level::Low => "low".to_string(),
//!             Level::High => "high".to_string(),
//!         }
//!     }
//! }
//!
//! let registry = Registry::new();
//! let level = registry.register("log.level", Level::Low, "verbosity", &[]);
//! assert_eq!(level.get(), Level::Low);
//! ```

use crate::value::ConfigValue;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::time::Duration;

/// Error returned when a string cannot be converted to an option type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {type_name} value {value:?}: {message}")]
pub struct CoerceError {
    pub type_name: &'static str,
    pub value: String,
    pub message: String,
}

impl CoerceError {
    pub fn new(type_name: &'static str, value: &str, message: impl ToString) -> Self {
        Self {
            type_name,
            value: value.to_string(),
            message: message.to_string(),
        }
    }
}

/// A value type that can be set from, and rendered to, a string.
///
/// Implementations must satisfy `coerce(&v.render()) == Ok(v)`.
pub trait Coerce: Sized + Send + Sync + 'static {
    /// Short type name used in errors and inspection.
    const TYPE_NAME: &'static str;

    /// Parses the string form of a value.
    fn coerce(raw: &str) -> Result<Self, CoerceError>;

    /// Produces the canonical string form of the value.
    fn render(&self) -> String;
}

/// A value type that can appear inside a list option.
///
/// Lists travel as JSON arrays; each element type decides how it is written
/// inside the array and which JSON values it accepts back.
pub trait Element: Coerce {
    /// Type name of `Vec<Self>`.
    const LIST_NAME: &'static str;

    /// Converts one decoded array element.
    fn from_json(value: serde_json::Value) -> Result<Self, CoerceError>;

    /// Writes the element as JSON text.
    fn to_json(&self) -> String;
}

fn parse_integer(raw: &str) -> Result<i128, String> {
    let (negative, unsigned) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let lower = unsigned.to_ascii_lowercase();
    let (radix, digits) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else {
        (10, lower.as_str())
    };

    if digits.is_empty()
        || digits.starts_with(['+', '-', '_'])
        || digits.ends_with('_')
    {
        return Err("invalid syntax".to_string());
    }

    let magnitude =
        i128::from_str_radix(&digits.replace('_', ""), radix).map_err(|e| e.to_string())?;

    Ok(if negative { -magnitude } else { magnitude })
}

macro_rules! coerce_integer {
    ($($ty:ty => $name:literal, $list:literal;)*) => {$(
        impl Coerce for $ty {
            const TYPE_NAME: &'static str = $name;

            fn coerce(raw: &str) -> Result<Self, CoerceError> {
                let wide = parse_integer(raw)
                    .map_err(|message| CoerceError::new(Self::TYPE_NAME, raw, message))?;

                <$ty>::try_from(wide)
                    .map_err(|_| CoerceError::new(Self::TYPE_NAME, raw, "value out of range"))
            }

            fn render(&self) -> String {
                self.to_string()
            }
        }

        impl Element for $ty {
            const LIST_NAME: &'static str = $list;

            fn from_json(value: serde_json::Value) -> Result<Self, CoerceError> {
                match value {
                    serde_json::Value::String(s) => Self::coerce(&s),
                    other => serde_json::from_value(other.clone())
                        .map_err(|e| CoerceError::new(Self::TYPE_NAME, &other.to_string(), e)),
                }
            }

            fn to_json(&self) -> String {
                self.to_string()
            }
        }
    )*};
}

coerce_integer! {
    i8 => "int8", "ints8";
    i16 => "int16", "ints16";
    i32 => "int32", "ints32";
    i64 => "int64", "ints64";
    isize => "int", "ints";
    u8 => "uint8", "uints8";
    u16 => "uint16", "uints16";
    u32 => "uint32", "uints32";
    u64 => "uint64", "uints64";
    usize => "uint", "uints";
}

macro_rules! coerce_float {
    ($($ty:ty => $name:literal, $list:literal;)*) => {$(
        impl Coerce for $ty {
            const TYPE_NAME: &'static str = $name;

            fn coerce(raw: &str) -> Result<Self, CoerceError> {
                raw.parse::<$ty>()
                    .map_err(|e| CoerceError::new(Self::TYPE_NAME, raw, e))
            }

            fn render(&self) -> String {
                self.to_string()
            }
        }

        impl Element for $ty {
            const LIST_NAME: &'static str = $list;

            fn from_json(value: serde_json::Value) -> Result<Self, CoerceError> {
                match value {
                    serde_json::Value::String(s) => Self::coerce(&s),
                    other => serde_json::from_value(other.clone())
                        .map_err(|e| CoerceError::new(Self::TYPE_NAME, &other.to_string(), e)),
                }
            }

            fn to_json(&self) -> String {
                // JSON has no literal for inf and NaN; they travel as strings.
                if self.is_finite() {
                    serde_json::to_string(self).unwrap_or_else(|_| self.render())
                } else {
                    serde_json::Value::String(self.render()).to_string()
                }
            }
        }
    )*};
}

coerce_float! {
    f32 => "float32", "floats32";
    f64 => "float64", "floats64";
}

impl Coerce for bool {
    const TYPE_NAME: &'static str = "bool";

    fn coerce(raw: &str) -> Result<Self, CoerceError> {
        match raw.to_lowercase().as_str() {
            "" | "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(CoerceError::new(
                Self::TYPE_NAME,
                raw,
                "expected one of true, 1, yes, false, 0, no",
            )),
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl Element for bool {
    const LIST_NAME: &'static str = "bools";

    fn from_json(value: serde_json::Value) -> Result<Self, CoerceError> {
        match value {
            serde_json::Value::Bool(b) => Ok(b),
            serde_json::Value::String(s) => Self::coerce(&s),
            other => Err(CoerceError::new(
                Self::TYPE_NAME,
                &other.to_string(),
                "expected a boolean",
            )),
        }
    }

    fn to_json(&self) -> String {
        self.to_string()
    }
}

impl Coerce for String {
    const TYPE_NAME: &'static str = "string";

    fn coerce(raw: &str) -> Result<Self, CoerceError> {
        Ok(raw.to_string())
    }

    fn render(&self) -> String {
        self.clone()
    }
}

impl Element for String {
    const LIST_NAME: &'static str = "strings";

    fn from_json(value: serde_json::Value) -> Result<Self, CoerceError> {
        match value {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            serde_json::Value::Bool(b) => Ok(b.to_string()),
            other => Err(CoerceError::new(
                Self::TYPE_NAME,
                &other.to_string(),
                "expected a scalar",
            )),
        }
    }

    fn to_json(&self) -> String {
        serde_json::Value::String(self.clone()).to_string()
    }
}

impl Coerce for Duration {
    const TYPE_NAME: &'static str = "duration";

    fn coerce(raw: &str) -> Result<Self, CoerceError> {
        humantime::parse_duration(raw).map_err(|e| CoerceError::new(Self::TYPE_NAME, raw, e))
    }

    fn render(&self) -> String {
        humantime::format_duration(*self).to_string()
    }
}

impl Element for Duration {
    const LIST_NAME: &'static str = "durations";

    fn from_json(value: serde_json::Value) -> Result<Self, CoerceError> {
        match value {
            serde_json::Value::String(s) => Self::coerce(&s),
            other => Err(CoerceError::new(
                Self::TYPE_NAME,
                &other.to_string(),
                "expected a duration string",
            )),
        }
    }

    fn to_json(&self) -> String {
        serde_json::Value::String(self.render()).to_string()
    }
}

impl Coerce for IpAddr {
    const TYPE_NAME: &'static str = "ip";

    fn coerce(raw: &str) -> Result<Self, CoerceError> {
        raw.parse::<IpAddr>()
            .map_err(|e| CoerceError::new(Self::TYPE_NAME, raw, e))
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl Element for IpAddr {
    const LIST_NAME: &'static str = "ips";

    fn from_json(value: serde_json::Value) -> Result<Self, CoerceError> {
        match value {
            serde_json::Value::String(s) => Self::coerce(&s),
            other => Err(CoerceError::new(
                Self::TYPE_NAME,
                &other.to_string(),
                "expected an IP address string",
            )),
        }
    }

    fn to_json(&self) -> String {
        serde_json::Value::String(self.render()).to_string()
    }
}

/// An address option that may be left unset; the empty string means `None`.
impl Coerce for Option<IpAddr> {
    const TYPE_NAME: &'static str = "ip";

    fn coerce(raw: &str) -> Result<Self, CoerceError> {
        if raw.is_empty() {
            return Ok(None);
        }
        IpAddr::coerce(raw).map(Some)
    }

    fn render(&self) -> String {
        self.map(|ip| ip.render()).unwrap_or_default()
    }
}

impl Coerce for BTreeMap<String, ConfigValue> {
    const TYPE_NAME: &'static str = "map";

    fn coerce(raw: &str) -> Result<Self, CoerceError> {
        serde_json::from_str(raw).map_err(|e| CoerceError::new(Self::TYPE_NAME, raw, e))
    }

    fn render(&self) -> String {
        let object = self.iter().map(|(k, v)| (k.clone(), v.to_json())).collect();
        serde_json::Value::Object(object).to_string()
    }
}

impl<T: Element> Coerce for Vec<T> {
    const TYPE_NAME: &'static str = T::LIST_NAME;

    fn coerce(raw: &str) -> Result<Self, CoerceError> {
        let items: Vec<serde_json::Value> =
            serde_json::from_str(raw).map_err(|e| CoerceError::new(Self::TYPE_NAME, raw, e))?;

        items
            .into_iter()
            .map(|item| {
                T::from_json(item).map_err(|e| CoerceError::new(Self::TYPE_NAME, raw, e))
            })
            .collect()
    }

    fn render(&self) -> String {
        let items: Vec<String> = self.iter().map(Element::to_json).collect();
        format!("[{}]", items.join(","))
    }
}
