use super::{format_time, parse_time, Type};
use crate::{Error, Result};

use jiff::Timestamp;
use serde::ser::{Serialize, Serializer};
use std::fmt;

/// A dynamically typed column value.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Signed 64-bit integer. All integer widths and enums use this variant.
    I64(i64),

    /// 64-bit float
    F64(f64),

    /// Text, including UUIDs in their hyphenated form
    String(String),

    /// Raw bytes
    Bytes(Vec<u8>),

    /// A JSON document
    Json(serde_json::Value),

    /// An instant in time
    Time(Timestamp),
}

impl Value {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::I64(_) => "I64",
            Value::F64(_) => "F64",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
            Value::Json(_) => "Json",
            Value::Time(_) => "Time",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I64(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F64(v) => Some(v),
            Value::I64(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            Value::String(v) => Some(v.as_bytes()),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<Timestamp> {
        match *self {
            Value::Time(v) => Some(v),
            _ => None,
        }
    }

    /// Converts a decoded database value into the requested type.
    ///
    /// Databases disagree on how they report some types (SQLite has no
    /// boolean or timestamp storage class, MySQL returns `DECIMAL` aggregates
    /// as text) so drivers decode into the closest native value and then
    /// cast.
    pub fn cast(self, ty: Type) -> Result<Value> {
        let value = match (ty, self) {
            (_, Value::Null) => Value::Null,
            (Type::Any, value) => value,

            (Type::Bool, Value::Bool(v)) => Value::Bool(v),
            (Type::Bool, Value::I64(v)) => Value::Bool(v != 0),
            (Type::Bool, Value::String(ref v)) if v == "1" || v == "true" => Value::Bool(true),
            (Type::Bool, Value::String(ref v)) if v == "0" || v == "false" => Value::Bool(false),

            (Type::I64, Value::I64(v)) => Value::I64(v),
            (Type::I64, Value::Bool(v)) => Value::I64(v as i64),
            (Type::I64, Value::F64(v)) if v.fract() == 0.0 => Value::I64(v as i64),
            (Type::I64, value @ (Value::String(_) | Value::Bytes(_))) => {
                let text = text(&value, ty)?;
                match text.parse::<i64>() {
                    Ok(v) => Value::I64(v),
                    // `DECIMAL` results come back as "3.0000"
                    Err(_) => match text.parse::<f64>() {
                        Ok(v) if v.fract() == 0.0 => Value::I64(v as i64),
                        _ => return Err(Error::type_conversion(&value, ty.name())),
                    },
                }
            }

            (Type::F64, Value::F64(v)) => Value::F64(v),
            (Type::F64, Value::I64(v)) => Value::F64(v as f64),
            (Type::F64, value @ (Value::String(_) | Value::Bytes(_))) => {
                match text(&value, ty)?.parse::<f64>() {
                    Ok(v) => Value::F64(v),
                    Err(_) => return Err(Error::type_conversion(&value, ty.name())),
                }
            }

            (Type::String, Value::String(v)) => Value::String(v),
            (Type::String, Value::Bytes(v)) => match String::from_utf8(v) {
                Ok(v) => Value::String(v),
                Err(err) => {
                    let value = Value::Bytes(err.into_bytes());
                    return Err(Error::type_conversion(&value, ty.name()));
                }
            },
            (Type::String, Value::Time(v)) => Value::String(format_time(v)),

            (Type::Bytes, Value::Bytes(v)) => Value::Bytes(v),
            (Type::Bytes, Value::String(v)) => Value::Bytes(v.into_bytes()),

            (Type::Json, Value::Json(v)) => Value::Json(v),
            (Type::Json, Value::String(v)) => Value::Json(serde_json::from_str(&v)?),
            (Type::Json, Value::Bytes(v)) => Value::Json(serde_json::from_slice(&v)?),

            (Type::Time, Value::Time(v)) => Value::Time(v),
            (Type::Time, value @ (Value::String(_) | Value::Bytes(_))) => {
                Value::Time(parse_time(text(&value, ty)?)?)
            }

            (ty, value) => return Err(Error::type_conversion(&value, ty.name())),
        };

        Ok(value)
    }

    /// Converts the value into a JSON value. Bytes that are not UTF-8 become
    /// an array of numbers; times become RFC 3339 strings.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null => Json::Null,
            Value::Bool(v) => Json::Bool(*v),
            Value::I64(v) => Json::from(*v),
            Value::F64(v) => serde_json::Number::from_f64(*v)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::String(v) => Json::String(v.clone()),
            Value::Bytes(v) => match std::str::from_utf8(v) {
                Ok(v) => Json::String(v.to_string()),
                Err(_) => Json::from(v.clone()),
            },
            Value::Json(v) => v.clone(),
            Value::Time(v) => Json::String(format_time(*v)),
        }
    }
}

fn text(value: &Value, ty: Type) -> Result<&str> {
    match value {
        Value::String(v) => Ok(v),
        Value::Bytes(v) => {
            std::str::from_utf8(v).map_err(|_| Error::type_conversion(value, ty.name()))
        }
        _ => Err(Error::type_conversion(value, ty.name())),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => fmt::Display::fmt(v, f),
            Value::I64(v) => fmt::Display::fmt(v, f),
            Value::F64(v) => fmt::Display::fmt(v, f),
            Value::String(v) => f.write_str(v),
            Value::Bytes(v) => write!(f, "{v:?}"),
            Value::Json(v) => fmt::Display::fmt(v, f),
            Value::Time(v) => f.write_str(&format_time(*v)),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::String(v) => serializer.serialize_str(v),
            Value::Bytes(v) => serializer.serialize_bytes(v),
            Value::Json(v) => v.serialize(serializer),
            Value::Time(v) => serializer.collect_str(&format_time(*v)),
        }
    }
}

impl From<bool> for Value {
    fn from(src: bool) -> Self {
        Self::Bool(src)
    }
}

macro_rules! impl_from_int {
    ( $( $ty:ty ),* ) => {
        $(
            impl From<$ty> for Value {
                fn from(src: $ty) -> Self {
                    Self::I64(src.into())
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(src: f32) -> Self {
        Self::F64(src.into())
    }
}

impl From<f64> for Value {
    fn from(src: f64) -> Self {
        Self::F64(src)
    }
}

impl From<String> for Value {
    fn from(src: String) -> Self {
        Self::String(src)
    }
}

impl From<&String> for Value {
    fn from(src: &String) -> Self {
        Self::String(src.clone())
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Self {
        Self::String(src.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(src: Vec<u8>) -> Self {
        Self::Bytes(src)
    }
}

impl From<&[u8]> for Value {
    fn from(src: &[u8]) -> Self {
        Self::Bytes(src.to_vec())
    }
}

impl From<serde_json::Value> for Value {
    fn from(src: serde_json::Value) -> Self {
        Self::Json(src)
    }
}

impl From<Timestamp> for Value {
    fn from(src: Timestamp) -> Self {
        Self::Time(src)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(src: uuid::Uuid) -> Self {
        Self::String(src.hyphenated().to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    fn from(src: Option<T>) -> Self {
        match src {
            Some(value) => Value::from(value),
            None => Value::Null,
        }
    }
}
