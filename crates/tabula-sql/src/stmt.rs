mod create_index;
pub use create_index::CreateIndex;

mod create_table;
pub use create_table::CreateTable;

mod set_id_offset;
pub use set_id_offset::SetIdOffset;

mod table_exists;
pub use table_exists::TableExists;

pub use tabula_core::stmt::*;

/// A statement the serializer can render: the data statements of
/// `tabula_core::stmt` plus the DDL and catalog queries used by schema
/// creation.
#[derive(Debug, Clone)]
pub enum Statement {
    CreateIndex(CreateIndex),
    CreateTable(CreateTable),
    Delete(Delete),
    Insert(Insert),
    Query(Select),
    SetIdOffset(SetIdOffset),
    TableExists(TableExists),
    Update(Update),
}

impl Statement {
    /// Returns the number of columns the statement returns, if it returns rows.
    pub fn returning_len(&self) -> Option<usize> {
        match self {
            Statement::Query(select) => Some(select.returning.len()),
            Statement::Insert(insert) => insert.returning_id.then_some(1),
            Statement::TableExists(_) => Some(1),
            _ => None,
        }
    }
}

impl From<tabula_core::stmt::Statement> for Statement {
    fn from(value: tabula_core::stmt::Statement) -> Self {
        match value {
            tabula_core::stmt::Statement::Delete(stmt) => Statement::Delete(stmt),
            tabula_core::stmt::Statement::Insert(stmt) => Statement::Insert(stmt),
            tabula_core::stmt::Statement::Query(stmt) => Statement::Query(stmt),
            tabula_core::stmt::Statement::Update(stmt) => Statement::Update(stmt),
        }
    }
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Statement::Query(value)
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Statement::Insert(value)
    }
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Statement::Update(value)
    }
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Statement::Delete(value)
    }
}
