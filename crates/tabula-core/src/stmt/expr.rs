use super::*;

/// A SQL expression. Filters, projections and assignments are built from
/// these and rendered by the SQL serializer.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// AND a set of expressions
    And(ExprAnd),

    /// Binary expression
    BinaryOp(ExprBinaryOp),

    /// References a column of the statement's table
    Column(ExprColumn),

    /// Function call (aggregates and `COALESCE`)
    Func(ExprFunc),

    /// Checks that a row has at least one neighbor over a relation
    HasNeighbors(ExprHasNeighbors),

    /// In list
    InList(ExprInList),

    /// Whether an expression is (or is not) null. This is different from a
    /// binary expression because of how databases treat null comparisons.
    IsNull(ExprIsNull),

    /// Negates a boolean expression
    Not(ExprNot),

    /// OR a set of expressions
    Or(ExprOr),

    /// String pattern match
    Pattern(ExprPattern),

    /// A constant value, bound as a statement parameter
    Value(Value),
}

impl Expr {
    /// An expression that always holds.
    pub fn true_() -> Self {
        Expr::And(ExprAnd { operands: vec![] })
    }

    /// An expression that never holds.
    pub fn false_() -> Self {
        Expr::Or(ExprOr { operands: vec![] })
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    pub fn is_column(&self) -> bool {
        matches!(self, Self::Column(_))
    }

    /// Visits every column referenced by the expression.
    pub fn for_each_column(&self, f: &mut impl FnMut(&ExprColumn)) {
        match self {
            Expr::And(expr) => expr.operands.iter().for_each(|e| e.for_each_column(&mut *f)),
            Expr::Or(expr) => expr.operands.iter().for_each(|e| e.for_each_column(&mut *f)),
            Expr::BinaryOp(expr) => {
                expr.lhs.for_each_column(f);
                expr.rhs.for_each_column(f);
            }
            Expr::Column(expr) => f(expr),
            Expr::Func(func) => func.for_each_arg(|e| e.for_each_column(&mut *f)),
            Expr::InList(expr) => expr.expr.for_each_column(f),
            Expr::IsNull(expr) => expr.expr.for_each_column(f),
            Expr::Not(expr) => expr.expr.for_each_column(f),
            Expr::Pattern(expr) => expr.expr.for_each_column(f),
            Expr::HasNeighbors(_) | Expr::Value(_) => {}
        }
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}
