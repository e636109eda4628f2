use super::Expr;

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: String,
    pub filter: Option<Expr>,
}

impl Delete {
    pub fn new(table: impl Into<String>) -> Delete {
        Delete {
            table: table.into(),
            filter: None,
        }
    }
}
