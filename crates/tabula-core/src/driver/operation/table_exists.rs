use super::Operation;

/// Responds with a count of 1 when the table exists in the current
/// database or schema, 0 otherwise.
#[derive(Debug, Clone)]
pub struct TableExists {
    pub table: String,
}

impl From<TableExists> for Operation {
    fn from(value: TableExists) -> Self {
        Self::TableExists(value)
    }
}
