use super::Operation;
use crate::schema::Table;

use std::sync::Arc;

/// Creates a table, then its secondary indexes.
#[derive(Debug, Clone)]
pub struct CreateTable {
    pub table: Arc<Table>,

    /// Emit the table's `FOREIGN KEY` clauses
    pub foreign_keys: bool,
}

impl From<CreateTable> for Operation {
    fn from(value: CreateTable) -> Self {
        Self::CreateTable(value)
    }
}
