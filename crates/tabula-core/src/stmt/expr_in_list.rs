use super::{Expr, Value};

/// `expr [NOT] IN (list...)`
///
/// An empty list renders as a constant: false for `IN`, true for `NOT IN`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprInList {
    pub expr: Box<Expr>,
    pub list: Vec<Value>,
    pub negate: bool,
}

impl Expr {
    pub fn in_list(expr: impl Into<Self>, list: impl IntoIterator<Item = Value>) -> Self {
        ExprInList {
            expr: Box::new(expr.into()),
            list: list.into_iter().collect(),
            negate: false,
        }
        .into()
    }

    pub fn not_in_list(expr: impl Into<Self>, list: impl IntoIterator<Item = Value>) -> Self {
        ExprInList {
            expr: Box::new(expr.into()),
            list: list.into_iter().collect(),
            negate: true,
        }
        .into()
    }
}

impl From<ExprInList> for Expr {
    fn from(value: ExprInList) -> Self {
        Self::InList(value)
    }
}
