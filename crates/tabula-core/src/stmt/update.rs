use super::Expr;

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub assignments: Vec<Assignment>,
    pub filter: Option<Expr>,
}

/// `column = expr` in an `UPDATE ... SET` list.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub expr: Expr,
}

impl Update {
    pub fn new(table: impl Into<String>) -> Update {
        Update {
            table: table.into(),
            assignments: vec![],
            filter: None,
        }
    }

    pub fn set(&mut self, column: impl Into<String>, expr: impl Into<Expr>) {
        self.assignments.push(Assignment {
            column: column.into(),
            expr: expr.into(),
        });
    }
}
