use super::{Expr, OrderBy};

/// `SELECT` from a single table.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: String,

    pub distinct: bool,

    /// Projected expressions, in result column order
    pub returning: Vec<Expr>,

    pub filter: Option<Expr>,

    pub group_by: Vec<String>,

    pub order_by: Vec<OrderBy>,

    pub limit: Option<u64>,

    pub offset: Option<u64>,
}

impl Select {
    pub fn new(table: impl Into<String>, returning: Vec<Expr>) -> Select {
        Select {
            table: table.into(),
            distinct: false,
            returning,
            filter: None,
            group_by: vec![],
            order_by: vec![],
            limit: None,
            offset: None,
        }
    }

    /// ANDs `expr` into the filter.
    pub fn add_filter(&mut self, expr: impl Into<Expr>) {
        self.filter = Some(match self.filter.take() {
            Some(filter) => Expr::and(filter, expr),
            None => expr.into(),
        });
    }
}
