use super::Expr;

/// Negates a boolean expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprNot {
    /// The expression to negate.
    pub expr: Box<Expr>,
}

impl Expr {
    /// Creates a `Not` expression. Double negation collapses.
    pub fn not(expr: impl Into<Self>) -> Self {
        match expr.into() {
            Expr::Not(ExprNot { expr }) => *expr,
            expr => ExprNot {
                expr: Box::new(expr),
            }
            .into(),
        }
    }

    /// Returns true if this is a `Not` expression.
    pub fn is_not(&self) -> bool {
        matches!(self, Self::Not(_))
    }
}

impl From<ExprNot> for Expr {
    fn from(value: ExprNot) -> Self {
        Self::Not(value)
    }
}
