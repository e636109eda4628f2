use jiff::Timestamp;
use std::time::SystemTime;
use tabula_core::{
    stmt::{self, format_time, parse_time, Value as CoreValue},
    Error, Result,
};
use tokio_postgres::{
    types::{private::BytesMut, to_sql_checked, IsNull, ToSql, Type},
    Column, Row,
};

type BoxError = Box<dyn std::error::Error + Sync + Send>;

#[derive(Debug)]
pub struct Value(pub(crate) CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl Value {
    pub fn into_inner(self) -> CoreValue {
        self.0
    }

    /// Converts a PostgreSQL value within a row to a Tabula value of type `ty`.
    pub fn from_sql(row: &Row, index: usize, column: &Column, ty: stmt::Type) -> Result<Self> {
        fn get<'a, T: tokio_postgres::types::FromSql<'a>>(
            row: &'a Row,
            index: usize,
        ) -> Result<Option<T>> {
            row.try_get::<_, Option<T>>(index).map_err(Error::driver)
        }

        // The inner representation of `Type` is private, so each supported
        // type is matched by constant.
        let core_value = match *column.type_() {
            Type::BOOL => get::<bool>(row, index)?.map(CoreValue::Bool),
            Type::INT2 => get::<i16>(row, index)?.map(|v| CoreValue::I64(v as i64)),
            Type::INT4 => get::<i32>(row, index)?.map(|v| CoreValue::I64(v as i64)),
            Type::INT8 => get::<i64>(row, index)?.map(CoreValue::I64),
            Type::FLOAT4 => get::<f32>(row, index)?.map(|v| CoreValue::F64(v as f64)),
            Type::FLOAT8 => get::<f64>(row, index)?.map(CoreValue::F64),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
                get::<String>(row, index)?.map(CoreValue::String)
            }
            Type::UUID => get::<uuid::Uuid>(row, index)?.map(CoreValue::from),
            Type::JSON | Type::JSONB => get::<serde_json::Value>(row, index)?.map(CoreValue::Json),
            Type::BYTEA => get::<Vec<u8>>(row, index)?.map(CoreValue::Bytes),
            Type::TIMESTAMPTZ | Type::TIMESTAMP => match get::<SystemTime>(row, index)? {
                Some(time) => Some(CoreValue::Time(Timestamp::try_from(time)?)),
                None => None,
            },
            ref other => {
                return Err(Error::unsupported_feature(format!(
                    "decoding PostgreSQL type {other}"
                )))
            }
        };

        Ok(Value(core_value.unwrap_or(CoreValue::Null).cast(ty)?))
    }
}

fn out_of_range(value: i64, ty: &Type) -> BoxError {
    format!("{value} is out of range for {ty}").into()
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError>
    where
        Self: Sized,
    {
        match &self.0 {
            CoreValue::Null => Ok(IsNull::Yes),
            CoreValue::Bool(value) => match *ty {
                Type::INT2 | Type::INT4 | Type::INT8 => {
                    Value(CoreValue::I64(*value as i64)).to_sql(ty, out)
                }
                _ => value.to_sql(ty, out),
            },
            CoreValue::I64(value) => match *ty {
                Type::INT2 => i16::try_from(*value)
                    .map_err(|_| out_of_range(*value, ty))?
                    .to_sql(ty, out),
                Type::INT4 => i32::try_from(*value)
                    .map_err(|_| out_of_range(*value, ty))?
                    .to_sql(ty, out),
                Type::FLOAT4 => (*value as f32).to_sql(ty, out),
                Type::FLOAT8 => (*value as f64).to_sql(ty, out),
                Type::BOOL => (*value != 0).to_sql(ty, out),
                Type::TEXT | Type::VARCHAR => value.to_string().to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
            CoreValue::F64(value) => match *ty {
                Type::FLOAT4 => (*value as f32).to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
            CoreValue::String(value) => match *ty {
                Type::UUID => uuid::Uuid::parse_str(value)?.to_sql(ty, out),
                Type::JSON | Type::JSONB => {
                    serde_json::from_str::<serde_json::Value>(value)?.to_sql(ty, out)
                }
                Type::TIMESTAMPTZ | Type::TIMESTAMP => {
                    SystemTime::from(parse_time(value)?).to_sql(ty, out)
                }
                Type::BYTEA => value.as_bytes().to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
            CoreValue::Bytes(value) => match *ty {
                Type::BYTEA => value.to_sql(ty, out),
                _ => std::str::from_utf8(value)?.to_sql(ty, out),
            },
            CoreValue::Json(value) => match *ty {
                Type::JSON | Type::JSONB => value.to_sql(ty, out),
                _ => value.to_string().to_sql(ty, out),
            },
            CoreValue::Time(value) => match *ty {
                Type::TIMESTAMPTZ | Type::TIMESTAMP => SystemTime::from(*value).to_sql(ty, out),
                _ => format_time(*value).to_sql(ty, out),
            },
        }
    }

    fn accepts(_: &Type) -> bool {
        true
    }

    to_sql_checked!();
}
