use super::Expr;

/// Relation cardinality between the statement's table and a neighbor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rel {
    O2O,
    O2M,
    M2O,
    M2M,
}

/// Checks that a row has at least one neighbor through a foreign key.
///
/// `columns[0]` is the foreign key column. For `M2O`, and for inverse `O2O`
/// and `O2M` edges, it lives on the statement's own table; otherwise it lives
/// on `table`. For `M2M`, `table` is the join table and `columns` holds its
/// two key columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprHasNeighbors {
    pub rel: Rel,
    pub inverse: bool,
    pub table: String,
    pub columns: Vec<String>,
}

impl ExprHasNeighbors {
    /// Whether the foreign key column is on the statement's own table.
    pub fn fk_on_self(&self) -> bool {
        match self.rel {
            Rel::M2O => true,
            Rel::O2O | Rel::O2M => self.inverse,
            Rel::M2M => false,
        }
    }

    /// The neighbor column compared against the statement's `id`.
    pub fn neighbor_column(&self) -> Option<&str> {
        let index = match (self.rel, self.inverse) {
            (Rel::M2M, true) => 1,
            _ => 0,
        };
        self.columns.get(index).map(String::as_str)
    }
}

impl From<ExprHasNeighbors> for Expr {
    fn from(value: ExprHasNeighbors) -> Self {
        Self::HasNeighbors(value)
    }
}
