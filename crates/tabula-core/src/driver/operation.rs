mod create_table;
pub use create_table::CreateTable;

mod query_sql;
pub use query_sql::QuerySql;

mod set_id_offset;
pub use set_id_offset::SetIdOffset;

mod table_exists;
pub use table_exists::TableExists;

mod transaction;
pub use transaction::Transaction;

#[derive(Debug, Clone)]
pub enum Operation {
    /// Create a table and its indexes
    CreateTable(CreateTable),

    /// Execute a SQL statement
    QuerySql(QuerySql),

    /// Move a table's auto-increment sequence
    SetIdOffset(SetIdOffset),

    /// Check whether a table exists
    TableExists(TableExists),

    /// Execute a transaction lifecycle op
    Transaction(Transaction),
}

impl Operation {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateTable(_) => "create_table",
            Operation::QuerySql(_) => "query_sql",
            Operation::SetIdOffset(_) => "set_id_offset",
            Operation::TableExists(_) => "table_exists",
            Operation::Transaction(_) => "transaction",
        }
    }

    pub fn as_query_sql(&self) -> Option<&QuerySql> {
        match self {
            Operation::QuerySql(op) => Some(op),
            _ => None,
        }
    }
}
