//! Generic key-value configuration exchanged with a binding layer.

use std::collections::BTreeMap;
use std::fmt;

/// A single configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Named fields of an item, ordered by key.
pub type Config = BTreeMap<String, ConfigValue>;

/// The type a configuration key expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Text,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Text => "text",
        };
        f.write_str(name)
    }
}

impl ValueType {
    /// Whether a value can be stored in a field of this type.
    /// Float fields also take integers.
    pub fn accepts(self, value: &ConfigValue) -> bool {
        matches!(
            (self, value),
            (ValueType::Bool, ConfigValue::Bool(_))
                | (ValueType::Int, ConfigValue::Int(_))
                | (ValueType::Float, ConfigValue::Float(_) | ConfigValue::Int(_))
                | (ValueType::Text, ConfigValue::Text(_))
        )
    }
}

impl ConfigValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            ConfigValue::Bool(_) => ValueType::Bool,
            ConfigValue::Int(_) => ValueType::Int,
            ConfigValue::Float(_) => ValueType::Float,
            ConfigValue::Text(_) => ValueType::Text,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(v) => Some(*v),
            ConfigValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(v) => write!(f, "{v}"),
            ConfigValue::Int(v) => write!(f, "{v}"),
            ConfigValue::Float(v) => write!(f, "{v}"),
            ConfigValue::Text(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Int(v)
    }
}

impl From<i32> for ConfigValue {
    fn from(v: i32) -> Self {
        ConfigValue::Int(i64::from(v))
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Float(v)
    }
}

impl From<f32> for ConfigValue {
    fn from(v: f32) -> Self {
        ConfigValue::Float(f64::from(v))
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Text(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::Text(v)
    }
}

/// Build a [`Config`] from `key => value` pairs.
///
/// ```ignore
/// let config = config! { "label" => "Save", "width" => 120 };
/// ```
#[macro_export]
macro_rules! config {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut config = $crate::item::Config::new();
        $(config.insert(::std::string::String::from($key), $crate::item::ConfigValue::from($value));)*
        config
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_accepts_int() {
        assert!(ValueType::Float.accepts(&ConfigValue::Int(3)));
        assert!(!ValueType::Int.accepts(&ConfigValue::Float(3.0)));
        assert!(!ValueType::Bool.accepts(&ConfigValue::Text("true".into())));
    }

    #[test]
    fn test_config_macro() {
        let config = crate::config! { "label" => "Save", "width" => 120, "show" => false };
        assert_eq!(config.len(), 3);
        assert_eq!(config["label"], ConfigValue::Text("Save".into()));
        assert_eq!(config["width"], ConfigValue::Int(120));
        assert_eq!(config["show"], ConfigValue::Bool(false));
    }

    #[test]
    fn test_as_float_widens_int() {
        assert_eq!(ConfigValue::Int(4).as_float(), Some(4.0));
        assert_eq!(ConfigValue::Text("4".into()).as_float(), None);
    }
}
