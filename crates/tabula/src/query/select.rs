use super::Query;
use crate::{
    stmt::{Expr, ValueRecord},
    Error, Result, Value,
};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;

/// A projected row, keyed by column or aggregate label.
pub type Record = IndexMap<String, Value>;

/// Scans selected columns instead of loading entities.
#[derive(Debug, Clone)]
pub struct Select {
    query: Query,
    fields: Vec<String>,
}

impl Select {
    pub(super) fn new(query: Query, fields: Vec<String>) -> Select {
        Select { query, fields }
    }

    pub async fn scan(&self) -> Result<Vec<Record>> {
        self.query.prepare()?;

        let table = self.query.table.schema();
        let fields: Vec<String> = match self.fields.is_empty() {
            true => table.column_names().into_iter().map(str::to_string).collect(),
            false => self.fields.clone(),
        };

        let ret = fields
            .iter()
            .map(|field| table.resolve(field).map(|column| column.ty.ty()))
            .collect::<Result<Vec<_>>>()?;

        let stmt = self
            .query
            .select_stmt(fields.iter().map(|field| Expr::column(field)).collect())?;
        let rows = self.query.table.client().query(stmt, ret).await?;

        Ok(rows.into_iter().map(|row| to_record(&fields, row)).collect())
    }

    /// Scans each row into `T` through its `serde` representation.
    pub async fn scan_into<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        deserialize(self.scan().await?)
    }

    pub async fn ints(&self) -> Result<Vec<i64>> {
        self.scalars("ints", "i64", Value::as_i64).await
    }

    pub async fn floats(&self) -> Result<Vec<f64>> {
        self.scalars("floats", "f64", Value::as_f64).await
    }

    pub async fn strings(&self) -> Result<Vec<String>> {
        self.scalars("strings", "String", |value| value.as_str().map(str::to_string))
            .await
    }

    pub async fn bools(&self) -> Result<Vec<bool>> {
        self.scalars("bools", "bool", Value::as_bool).await
    }

    pub async fn int(&self) -> Result<i64> {
        self.scalar(self.ints().await?)
    }

    pub async fn float(&self) -> Result<f64> {
        self.scalar(self.floats().await?)
    }

    pub async fn string(&self) -> Result<String> {
        self.scalar(self.strings().await?)
    }

    pub async fn bool(&self) -> Result<bool> {
        self.scalar(self.bools().await?)
    }

    async fn scalars<T>(
        &self,
        name: &str,
        ty: &'static str,
        convert: impl Fn(&Value) -> Option<T>,
    ) -> Result<Vec<T>> {
        if self.fields.len() != 1 {
            return Err(Error::validation(
                None::<String>,
                format!("{name} is not achievable when selecting {} fields", self.fields.len()),
            ));
        }

        self.scan()
            .await?
            .into_iter()
            .map(|record| {
                let value = record.into_values().next().unwrap_or(Value::Null);
                convert(&value).ok_or_else(|| Error::type_conversion(&value, ty))
            })
            .collect()
    }

    fn scalar<T>(&self, mut values: Vec<T>) -> Result<T> {
        match values.len() {
            0 => Err(self.query.not_found()),
            1 => Ok(values.remove(0)),
            _ => Err(self.query.not_singular()),
        }
    }
}

pub(super) fn to_record(labels: &[String], row: ValueRecord) -> Record {
    labels.iter().cloned().zip(row.into_vec()).collect()
}

pub(super) fn deserialize<T: DeserializeOwned>(records: Vec<Record>) -> Result<Vec<T>> {
    records
        .into_iter()
        .map(|record| -> Result<T> {
            let object = record
                .into_iter()
                .map(|(label, value)| (label, value.to_json()))
                .collect::<serde_json::Map<_, _>>();

            Ok(serde_json::from_value(serde_json::Value::Object(object))?)
        })
        .collect()
}
