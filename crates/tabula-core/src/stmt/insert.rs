use super::Value;

/// Multi-row `INSERT`.
///
/// Every row holds one value per entry in `columns`. An empty `columns` list
/// inserts rows made entirely of defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,

    /// Append `RETURNING id`. Only set for databases that support it.
    pub returning_id: bool,
}

impl Insert {
    pub fn new(table: impl Into<String>, columns: Vec<String>) -> Insert {
        Insert {
            table: table.into(),
            columns,
            rows: vec![],
            returning_id: false,
        }
    }
}
