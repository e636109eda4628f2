use super::Statement;

use tabula_core::schema::Index;

#[derive(Debug, Clone)]
pub struct CreateIndex {
    /// Name of the index
    pub name: String,

    /// Which table to index
    pub on: String,

    /// The columns to index
    pub columns: Vec<String>,

    /// When true, the index is unique
    pub unique: bool,
}

impl Statement {
    pub fn create_index(table: &str, index: &Index) -> Self {
        CreateIndex {
            name: index.name.clone(),
            on: table.to_string(),
            columns: index.columns.clone(),
            unique: index.unique,
        }
        .into()
    }
}

impl From<CreateIndex> for Statement {
    fn from(value: CreateIndex) -> Self {
        Self::CreateIndex(value)
    }
}
