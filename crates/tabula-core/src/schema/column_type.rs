use crate::stmt::{self, Value};

use std::fmt;

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Bool,
    Time,
    Json,
    Bytes,
    Uuid,
    String,
    /// Enumerations are stored as their integer discriminant.
    Enum,
    Int8,
    Int16,
    Int32,
    Int64,
    Int,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uint,
    Float32,
    Float64,
    /// Database-specific type. Values pass through undecoded.
    Other,
}

impl ColumnType {
    /// The type rows of this column are decoded into.
    pub fn ty(self) -> stmt::Type {
        use ColumnType::*;

        match self {
            Bool => stmt::Type::Bool,
            Time => stmt::Type::Time,
            Json => stmt::Type::Json,
            Bytes => stmt::Type::Bytes,
            Uuid | String => stmt::Type::String,
            Enum | Int8 | Int16 | Int32 | Int64 | Int | Uint8 | Uint16 | Uint32 | Uint64
            | Uint => stmt::Type::I64,
            Float32 | Float64 => stmt::Type::F64,
            Other => stmt::Type::Any,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self.ty(), stmt::Type::I64)
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    pub fn is_unsigned(self) -> bool {
        use ColumnType::*;
        matches!(self, Uint8 | Uint16 | Uint32 | Uint64 | Uint)
    }

    /// Inclusive range of integers representable by this column.
    fn int_range(self) -> Option<(i64, i64)> {
        use ColumnType::*;

        Some(match self {
            Int8 => (i8::MIN.into(), i8::MAX.into()),
            Int16 => (i16::MIN.into(), i16::MAX.into()),
            Int32 => (i32::MIN.into(), i32::MAX.into()),
            Int64 | Int | Enum => (i64::MIN, i64::MAX),
            Uint8 => (0, u8::MAX.into()),
            Uint16 => (0, u16::MAX.into()),
            Uint32 => (0, u32::MAX.into()),
            Uint64 | Uint => (0, i64::MAX),
            _ => return None,
        })
    }

    /// Returns `true` if a non-null `value` can be stored in a column of this
    /// type. Null handling depends on the column and is not checked here.
    pub fn accepts(self, value: &Value) -> bool {
        use ColumnType::*;

        match (self, value) {
            (_, Value::Null) => true,
            (Other, _) => true,
            (Bool, Value::Bool(_)) => true,
            (Time, Value::Time(_)) => true,
            (Time, Value::String(s)) => stmt::parse_time(s).is_ok(),
            (Json, Value::Json(_)) => true,
            (Json, Value::String(s)) => serde_json::from_str::<serde_json::Value>(s).is_ok(),
            (Bytes, Value::Bytes(_) | Value::String(_)) => true,
            (Uuid, Value::String(s)) => uuid::Uuid::parse_str(s).is_ok(),
            (String, Value::String(_)) => true,
            (Float32 | Float64, Value::F64(_) | Value::I64(_)) => true,
            (ty, Value::I64(v)) => match ty.int_range() {
                Some((min, max)) => (min..=max).contains(v),
                None => false,
            },
            _ => false,
        }
    }

    /// Normalizes an accepted value into the representation stored for this
    /// column type (for example, RFC 3339 strings become timestamps).
    pub fn normalize(self, value: Value) -> crate::Result<Value> {
        use ColumnType::*;

        Ok(match (self, value) {
            (Time, Value::String(s)) => Value::Time(stmt::parse_time(&s)?),
            (Json, Value::String(s)) => Value::Json(serde_json::from_str(&s)?),
            (Bytes, Value::String(s)) => Value::Bytes(s.into_bytes()),
            (Float32 | Float64, Value::I64(v)) => Value::F64(v as f64),
            (_, value) => value,
        })
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
