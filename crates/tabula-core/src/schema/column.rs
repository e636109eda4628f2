use super::ColumnType;
use crate::{stmt::Value, Error, Result};

/// A column of a runtime table descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// The column name
    pub name: String,

    /// The column's declared type
    pub ty: ColumnType,

    /// Whether the column accepts NULL
    pub nullable: bool,

    /// Whether a unique constraint is declared on the column
    pub unique: bool,

    /// Maximum length for string columns, where the database supports one
    pub size: Option<u64>,

    /// Value used when a created row does not set the column
    pub default: Option<Value>,

    /// Explicit storage type used in `CREATE TABLE`, overriding the mapping
    /// derived from `ty`.
    pub sql_type: Option<String>,

    /// True only for the `id` primary key.
    pub auto_increment: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Column {
        Column {
            name: name.into(),
            ty,
            nullable: false,
            unique: false,
            size: None,
            default: None,
            sql_type: None,
            auto_increment: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn sql_type(mut self, sql_type: impl Into<String>) -> Self {
        self.sql_type = Some(sql_type.into());
        self
    }

    /// Checks that `value` may be stored in this column.
    pub fn check(&self, value: &Value) -> Result<()> {
        if value.is_null() {
            if self.nullable {
                return Ok(());
            }

            return Err(Error::validation(
                Some(&self.name),
                "column is not nullable",
            ));
        }

        if !self.ty.accepts(value) {
            return Err(Error::validation(
                Some(&self.name),
                format!("cannot store {} value in {} column", value.kind_name(), self.ty),
            ));
        }

        if let (Some(size), Some(s)) = (self.size, value.as_str()) {
            if s.chars().count() as u64 > size {
                return Err(Error::validation(
                    Some(&self.name),
                    format!("value exceeds column size {size}"),
                ));
            }
        }

        Ok(())
    }

    /// Checks `value` and converts it into the representation stored for
    /// this column.
    pub fn coerce(&self, value: Value) -> Result<Value> {
        self.check(&value)?;
        self.ty
            .normalize(value)
            .map_err(|err| Error::validation(Some(&self.name), err.to_string()))
    }
}
