use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A dynamically typed configuration value.
///
/// Build and template configuration are free-form documents, so every
/// leaf is one of these variants. Objects use `IndexMap` so that a
/// document written to Git keeps the key order the caller supplied.
///
/// # Example
///
/// ```
/// use strata_core::ConfigValue;
///
/// let replicas: ConfigValue = 3.into();
/// assert_eq!(replicas.as_i64(), Some(3));
///
/// let image: ConfigValue = "nginx:1.27".into();
/// assert_eq!(image.type_name(), "string");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Explicit null (`~` in YAML)
    Null,
    /// Boolean value
    Bool(bool),
    /// Signed integer
    Integer(i64),
    /// Floating point, wrapped so documents stay `Eq`
    Float(OrderedFloat<f64>),
    /// String value
    String(String),
    /// Sequence of values
    Array(Vec<ConfigValue>),
    /// Nested mapping
    Object(IndexMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Returns a short name for the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Integer(_) => "integer",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
            ConfigValue::Array(_) => "array",
            ConfigValue::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(f.into_inner()),
            ConfigValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, ConfigValue>> {
        match self {
            ConfigValue::Object(map) => Some(map),
            _ => None,
        }
    }
}

macro_rules! convert {
    ($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$ty> for ConfigValue {
                fn from($v: $ty) -> Self {
                    $body
                }
            }
        )*
    };
}

convert! {
    bool => |v| ConfigValue::Bool(v),
    i64 => |v| ConfigValue::Integer(v),
    i32 => |v| ConfigValue::Integer(i64::from(v)),
    u32 => |v| ConfigValue::Integer(i64::from(v)),
    f64 => |v| ConfigValue::Float(OrderedFloat(v)),
    String => |v| ConfigValue::String(v),
    &str => |v| ConfigValue::String(v.to_owned()),
    IndexMap<String, ConfigValue> => |v| ConfigValue::Object(v),
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(v: Vec<T>) -> Self {
        ConfigValue::Array(v.into_iter().map(Into::into).collect())
    }
}
