use super::Statement;

/// Counts the tables named `table` in the current database (MySQL), schema
/// (PostgreSQL) or file (SQLite).
#[derive(Debug, Clone)]
pub struct TableExists {
    pub table: String,
}

impl Statement {
    pub fn table_exists(table: impl Into<String>) -> Self {
        TableExists {
            table: table.into(),
        }
        .into()
    }
}

impl From<TableExists> for Statement {
    fn from(value: TableExists) -> Self {
        Self::TableExists(value)
    }
}
