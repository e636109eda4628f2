use jiff::{civil, tz::TimeZone, Timestamp};
use mysql_async::prelude::ToValue;
use tabula_core::{
    stmt::{self, Value as CoreValue},
    Error, Result,
};

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl Value {
    pub fn into_inner(self) -> CoreValue {
        self.0
    }

    /// Converts a MySQL value to a Tabula value of type `ty`.
    ///
    /// `DECIMAL` aggregates and text columns arrive as bytes; `DATETIME`
    /// values are read as UTC.
    pub fn from_sql(value: mysql_async::Value, ty: stmt::Type) -> Result<Self> {
        use mysql_async::Value as SqlValue;

        let core_value = match value {
            SqlValue::NULL => CoreValue::Null,
            SqlValue::Bytes(value) => CoreValue::Bytes(value),
            SqlValue::Int(value) => CoreValue::I64(value),
            SqlValue::UInt(value) => match i64::try_from(value) {
                Ok(value) => CoreValue::I64(value),
                Err(_) => CoreValue::F64(value as f64),
            },
            SqlValue::Float(value) => CoreValue::F64(value as f64),
            SqlValue::Double(value) => CoreValue::F64(value),
            SqlValue::Date(year, month, day, hour, minute, second, micros) => {
                let datetime = civil::DateTime::new(
                    year as i16,
                    month as i8,
                    day as i8,
                    hour as i8,
                    minute as i8,
                    second as i8,
                    micros as i32 * 1_000,
                )?;
                CoreValue::Time(datetime.to_zoned(TimeZone::UTC)?.timestamp())
            }
            SqlValue::Time(..) => {
                return Err(Error::unsupported_feature("MySQL TIME columns"));
            }
        };

        Ok(Value(core_value.cast(ty)?))
    }
}

fn to_datetime(ts: Timestamp) -> mysql_async::Value {
    let datetime = ts.to_zoned(TimeZone::UTC).datetime();

    mysql_async::Value::Date(
        datetime.year() as u16,
        datetime.month() as u8,
        datetime.day() as u8,
        datetime.hour() as u8,
        datetime.minute() as u8,
        datetime.second() as u8,
        (datetime.subsec_nanosecond() / 1_000) as u32,
    )
}

impl ToValue for Value {
    fn to_value(&self) -> mysql_async::Value {
        match &self.0 {
            CoreValue::Null => mysql_async::Value::NULL,
            CoreValue::Bool(value) => value.to_value(),
            CoreValue::I64(value) => value.to_value(),
            CoreValue::F64(value) => value.to_value(),
            CoreValue::String(value) => value.to_value(),
            CoreValue::Bytes(value) => value.to_value(),
            CoreValue::Json(value) => value.to_string().to_value(),
            CoreValue::Time(value) => to_datetime(*value),
        }
    }
}
