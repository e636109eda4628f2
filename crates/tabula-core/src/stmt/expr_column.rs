use super::Expr;

/// References a column by name.
///
/// When `table` is `None` the serializer resolves the column against the
/// statement's own table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprColumn {
    pub table: Option<String>,
    pub name: String,
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        ExprColumn {
            table: None,
            name: name.into(),
        }
        .into()
    }

    pub fn qualified_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        ExprColumn {
            table: Some(table.into()),
            name: name.into(),
        }
        .into()
    }

    pub fn as_column(&self) -> Option<&ExprColumn> {
        match self {
            Expr::Column(column) => Some(column),
            _ => None,
        }
    }
}

impl From<ExprColumn> for Expr {
    fn from(value: ExprColumn) -> Self {
        Self::Column(value)
    }
}
