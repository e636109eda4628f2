use super::{Column, ColumnType};
use crate::{Error, Result};

use indexmap::IndexMap;

/// A runtime table descriptor.
///
/// Every table has an auto-increment integer primary key named `id`. It is
/// added by [`Table::new`] and cannot be declared again.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// The table name
    pub name: String,

    /// Columns in declaration order, `id` first
    columns: IndexMap<String, Column>,

    /// Secondary indexes
    pub indexes: Vec<Index>,

    /// Foreign keys, each referencing the `id` of another table
    pub foreign_keys: Vec<ForeignKey>,
}

/// A secondary index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Referencing column on this table
    pub column: String,

    /// Referenced table. The referenced column is always `id`.
    pub ref_table: String,

    pub on_delete: ReferenceOption,
}

/// Action taken on referencing rows when the referenced row is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferenceOption {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
}

impl Table {
    /// Name of the primary key column.
    pub const ID: &'static str = "id";

    pub fn new(name: impl Into<String>) -> Table {
        let mut id = Column::new(Table::ID, ColumnType::Int64);
        id.auto_increment = true;

        let mut columns = IndexMap::new();
        columns.insert(Table::ID.to_string(), id);

        Table {
            name: name.into(),
            columns,
            indexes: vec![],
            foreign_keys: vec![],
        }
    }

    /// Builds a table from a list of columns.
    pub fn with_columns(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = Column>,
    ) -> Result<Table> {
        let mut table = Table::new(name);
        for column in columns {
            table.add_column(column)?;
        }
        Ok(table)
    }

    pub fn add_column(&mut self, column: Column) -> Result<&mut Self> {
        if column.name.is_empty() {
            return Err(Error::validation(
                None::<String>,
                format!("empty column name for table {:?}", self.name),
            ));
        }

        if column.name == Table::ID {
            return Err(Error::validation(
                Some(Table::ID),
                "the primary key column is reserved",
            ));
        }

        if self.columns.contains_key(&column.name) {
            return Err(Error::validation(
                Some(&column.name),
                format!("duplicate column for table {:?}", self.name),
            ));
        }

        if let Some(default) = &column.default {
            column.check(default)?;
        }

        self.columns.insert(column.name.clone(), column);
        Ok(self)
    }

    pub fn add_index(&mut self, index: Index) -> Result<&mut Self> {
        for name in &index.columns {
            if !self.has_column(name) {
                return Err(Error::unknown_column(&self.name, name));
            }
        }

        self.indexes.push(index);
        Ok(self)
    }

    pub fn add_foreign_key(&mut self, foreign_key: ForeignKey) -> Result<&mut Self> {
        let Some(column) = self.column(&foreign_key.column) else {
            return Err(Error::unknown_column(&self.name, &foreign_key.column));
        };

        if !column.ty.is_integer() {
            return Err(Error::validation(
                Some(&column.name),
                "foreign key columns must have an integer type",
            ));
        }

        if foreign_key.on_delete == ReferenceOption::SetNull && !column.nullable {
            return Err(Error::validation(
                Some(&column.name),
                "ON DELETE SET NULL requires a nullable column",
            ));
        }

        self.foreign_keys.push(foreign_key);
        Ok(self)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// All columns, `id` first.
    pub fn columns(&self) -> impl ExactSizeIterator<Item = &Column> + '_ {
        self.columns.values()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// The columns stored in an entity's row, which is every column except `id`.
    pub fn fields(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.values().filter(|column| column.name != Table::ID)
    }

    pub fn primary_key(&self) -> &Column {
        // `Table::new` always inserts `id` first and `add_column` refuses to
        // replace it.
        &self.columns[0]
    }

    /// Returns an error naming this table if `name` is not one of its columns.
    pub fn resolve(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| Error::unknown_column(&self.name, name))
    }
}

impl Index {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Index
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Index {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

impl ForeignKey {
    pub fn new(column: impl Into<String>, ref_table: impl Into<String>) -> ForeignKey {
        ForeignKey {
            column: column.into(),
            ref_table: ref_table.into(),
            on_delete: ReferenceOption::default(),
        }
    }

    pub fn on_delete(mut self, option: ReferenceOption) -> Self {
        self.on_delete = option;
        self
    }
}

impl ReferenceOption {
    pub fn as_sql(self) -> &'static str {
        match self {
            ReferenceOption::NoAction => "NO ACTION",
            ReferenceOption::Restrict => "RESTRICT",
            ReferenceOption::Cascade => "CASCADE",
            ReferenceOption::SetNull => "SET NULL",
        }
    }
}
