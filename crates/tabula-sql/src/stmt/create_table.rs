use super::Statement;

use tabula_core::schema::Table;

#[derive(Debug, Clone)]
pub struct CreateTable {
    pub table: Table,

    /// Render the table's foreign keys as `FOREIGN KEY` clauses
    pub foreign_keys: bool,
}

impl Statement {
    pub fn create_table(table: &Table, foreign_keys: bool) -> Self {
        CreateTable {
            table: table.clone(),
            foreign_keys,
        }
        .into()
    }
}

impl From<CreateTable> for Statement {
    fn from(value: CreateTable) -> Self {
        Self::CreateTable(value)
    }
}
